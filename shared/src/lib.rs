//! Value types and the wire contract shared by the board server and client.
//!
//! The server stores and re-broadcasts [`Shape`] values without interpreting
//! them; the client generates them from stamp patterns and renders them
//! through the [`DrawSurface`] capability.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Canvas dimensions in pixels. Pattern generation clamps pointer positions
/// into these bounds before placing anything.
pub const CANVAS_WIDTH: f32 = 800.0;
pub const CANVAS_HEIGHT: f32 = 800.0;

/// Edge length / diameter of a newly stamped shape.
pub const DEFAULT_SHAPE_SIZE: f32 = 10.0;

/// Fixed palette a connecting user's color is sampled from.
pub const PALETTE: [UserColor; 6] = [
    UserColor::Red,
    UserColor::Blue,
    UserColor::Green,
    UserColor::Yellow,
    UserColor::Purple,
    UserColor::Orange,
];

/// Translucent white used for the local in-progress preview.
pub const PREVIEW_COLOR: Rgba = Rgba::new(255, 255, 255, 127);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl UserColor {
    /// Samples a color uniformly from [`PALETTE`].
    pub fn random(rng: &mut impl Rng) -> Self {
        PALETTE[rng.gen_range(0..PALETTE.len())]
    }

    pub fn rgba(self) -> Rgba {
        match self {
            UserColor::Red => Rgba::new(255, 0, 0, 255),
            UserColor::Blue => Rgba::new(0, 0, 255, 255),
            UserColor::Green => Rgba::new(0, 128, 0, 255),
            UserColor::Yellow => Rgba::new(255, 255, 0, 255),
            UserColor::Purple => Rgba::new(128, 0, 128, 255),
            UserColor::Orange => Rgba::new(255, 165, 0, 255),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Surface the board draws through.
///
/// `push`/`pop` save and restore the transform state. The client backs this
/// with its windowing library; tests record the call sequence instead.
pub trait DrawSurface {
    fn push(&mut self);
    fn pop(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, radians: f32);
    fn fill(&mut self, color: Rgba);
    fn no_stroke(&mut self);
    fn ellipse(&mut self, x: f32, y: f32, diameter: f32);
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32);
}

/// A placed (or previewed) shape.
///
/// Immutable once constructed; [`Shape::jitter`] returns a displaced copy.
/// The wire form is tagged with `type: "circle" | "rectangle"`, and `size`
/// (and `rotation`) fall back to their defaults when a peer omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Circle {
        x: f32,
        y: f32,
        #[serde(default = "default_size")]
        size: f32,
    },
    Rectangle {
        x: f32,
        y: f32,
        #[serde(default)]
        rotation: f32,
        #[serde(default = "default_size")]
        size: f32,
    },
}

fn default_size() -> f32 {
    DEFAULT_SHAPE_SIZE
}

impl Shape {
    /// A default-sized circle at (x, y).
    pub fn circle(x: f32, y: f32) -> Self {
        Shape::Circle {
            x,
            y,
            size: DEFAULT_SHAPE_SIZE,
        }
    }

    /// A default-sized, axis-aligned rectangle at (x, y).
    pub fn rectangle(x: f32, y: f32) -> Self {
        Shape::Rectangle {
            x,
            y,
            rotation: 0.0,
            size: DEFAULT_SHAPE_SIZE,
        }
    }

    pub fn position(&self) -> (f32, f32) {
        match *self {
            Shape::Circle { x, y, .. } => (x, y),
            Shape::Rectangle { x, y, .. } => (x, y),
        }
    }

    /// Draws the shape at its position with the given fill and no stroke.
    pub fn draw(&self, surface: &mut dyn DrawSurface, color: Rgba) {
        match *self {
            Shape::Circle { x, y, size } => {
                surface.push();
                surface.translate(x, y);
                surface.fill(color);
                surface.no_stroke();
                surface.ellipse(0.0, 0.0, size);
                surface.pop();
            }
            Shape::Rectangle {
                x,
                y,
                rotation,
                size,
            } => {
                surface.push();
                surface.translate(x, y);
                surface.rotate(rotation);
                surface.fill(color);
                surface.no_stroke();
                surface.rect(0.0, 0.0, size, size);
                surface.pop();
            }
        }
    }

    /// Returns a copy displaced by independent uniform noise in
    /// `[-magnitude, magnitude]` on each axis. All other fields carry over.
    pub fn jitter(&self, rng: &mut impl Rng, magnitude: f32) -> Shape {
        let dx = rng.gen_range(-magnitude..=magnitude);
        let dy = rng.gen_range(-magnitude..=magnitude);

        match *self {
            Shape::Circle { x, y, size } => Shape::Circle {
                x: x + dx,
                y: y + dy,
                size,
            },
            Shape::Rectangle {
                x,
                y,
                rotation,
                size,
            } => Shape::Rectangle {
                x: x + dx,
                y: y + dy,
                rotation,
                size,
            },
        }
    }
}

/// Events a client sends over its socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Ask the server to broadcast the current snapshot to every client.
    UpdateRequest,
    /// Commit a run of shapes to the sender's placed list, in order.
    PlaceObjects(Vec<Shape>),
}

/// One user's entry in a full-state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub id: u32,
    pub color: UserColor,
    pub placed_shapes: Vec<Shape>,
}

/// Events the server pushes to clients.
///
/// `Update` replaces the receiver's entire view; there is no incremental form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    Update { users: Vec<UserSnapshot> },
}
