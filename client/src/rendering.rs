//! Macroquad-backed drawing: the board's surface and per-frame draw helpers.

use macroquad::prelude::*;
use shared::{DrawSurface, Rgba, Shape, UserSnapshot, PREVIEW_COLOR};

#[derive(Debug, Clone, Copy)]
struct Transform {
    tx: f32,
    ty: f32,
    rotation: f32,
}

impl Transform {
    const IDENTITY: Transform = Transform {
        tx: 0.0,
        ty: 0.0,
        rotation: 0.0,
    };

    /// Maps a local point through this transform.
    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let (sin, cos) = self.rotation.sin_cos();
        (
            self.tx + x * cos - y * sin,
            self.ty + x * sin + y * cos,
        )
    }
}

/// [`DrawSurface`] over macroquad's immediate-mode calls.
///
/// Macroquad has no transform stack of its own, so translate/rotate are
/// tracked here and folded into each primitive. `no_stroke` is a no-op:
/// macroquad fills are strokeless already.
pub struct MacroquadSurface {
    stack: Vec<Transform>,
    current: Transform,
    fill: Color,
}

impl MacroquadSurface {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            current: Transform::IDENTITY,
            fill: WHITE,
        }
    }
}

impl Default for MacroquadSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawSurface for MacroquadSurface {
    fn push(&mut self) {
        self.stack.push(self.current);
    }

    fn pop(&mut self) {
        self.current = self.stack.pop().unwrap_or(Transform::IDENTITY);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        let (tx, ty) = self.current.apply(dx, dy);
        self.current.tx = tx;
        self.current.ty = ty;
    }

    fn rotate(&mut self, radians: f32) {
        self.current.rotation += radians;
    }

    fn fill(&mut self, color: Rgba) {
        self.fill = Color::from_rgba(color.r, color.g, color.b, color.a);
    }

    fn no_stroke(&mut self) {}

    fn ellipse(&mut self, x: f32, y: f32, diameter: f32) {
        let (cx, cy) = self.current.apply(x, y);
        draw_circle(cx, cy, diameter / 2.0, self.fill);
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let (cx, cy) = self.current.apply(x, y);
        draw_rectangle_ex(
            cx,
            cy,
            width,
            height,
            DrawRectangleParams {
                rotation: self.current.rotation,
                color: self.fill,
                ..Default::default()
            },
        );
    }
}

/// Draws every user's placed shapes in their assigned color.
pub fn draw_users(surface: &mut MacroquadSurface, users: &[UserSnapshot]) {
    for user in users {
        let color = user.color.rgba();
        for shape in &user.placed_shapes {
            shape.draw(surface, color);
        }
    }
}

/// Draws the local in-progress pattern in the translucent preview color.
pub fn draw_preview(surface: &mut MacroquadSurface, shapes: &[Shape]) {
    for shape in shapes {
        shape.draw(surface, PREVIEW_COLOR);
    }
}
