//! Stamp-pattern generation: one pointer position in, a run of shapes out.
//!
//! Both converters are pure apart from the explicit RNG used for jitter, so
//! every placement rule here is testable with a seeded generator.

use rand::Rng;
use shared::Shape;

/// Spacing between consecutive stamps along a line pattern.
pub const LINE_STEP: f32 = 20.0;

/// Which shape a pattern stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Circle,
    Rectangle,
}

impl ObjectKind {
    pub fn toggled(self) -> Self {
        match self {
            ObjectKind::Circle => ObjectKind::Rectangle,
            ObjectKind::Rectangle => ObjectKind::Circle,
        }
    }

    fn stamp(self, x: f32, y: f32) -> Shape {
        match self {
            ObjectKind::Circle => Shape::circle(x, y),
            ObjectKind::Rectangle => Shape::rectangle(x, y),
        }
    }
}

/// A line formation: walk from the pointer along `angle`, one stamp per step.
#[derive(Debug, Clone, Copy)]
pub struct LineCollection {
    pub object_kind: ObjectKind,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub repeat_count: u32,
    pub jitter_factor: f32,
}

/// A radial formation: a ring of stamps around the pointer.
#[derive(Debug, Clone, Copy)]
pub struct RadialCollection {
    pub object_kind: ObjectKind,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub repeat_count: u32,
    pub jitter_factor: f32,
}

/// Walks from the clamped start point in [`LINE_STEP`] increments, stamping
/// one shape per step.
///
/// The bounds check gates the next step, so the first stepped position
/// outside `[0, width) x [0, height)` is still stamped and the walk then
/// stops. Emits between 0 and `repeat_count` shapes.
pub fn convert_line_collection(
    rng: &mut impl Rng,
    collection: &LineCollection,
    width: f32,
    height: f32,
) -> Vec<Shape> {
    let mut cur_x = collection.x.clamp(0.0, width);
    let mut cur_y = collection.y.clamp(0.0, height);
    let mut shapes = Vec::new();

    while in_bounds(cur_x, cur_y, width, height)
        && (shapes.len() as u32) < collection.repeat_count
    {
        cur_x += collection.angle.cos() * LINE_STEP;
        cur_y += collection.angle.sin() * LINE_STEP;
        shapes.push(collection.object_kind.stamp(cur_x, cur_y));
    }

    jitter_all(rng, shapes, collection.jitter_factor)
}

/// Places exactly `repeat_count` stamps evenly spaced around the clamped
/// center at the given radius.
pub fn convert_radial_collection(
    rng: &mut impl Rng,
    collection: &RadialCollection,
    width: f32,
    height: f32,
) -> Vec<Shape> {
    let center_x = collection.x.clamp(0.0, width);
    let center_y = collection.y.clamp(0.0, height);
    let mut shapes = Vec::with_capacity(collection.repeat_count as usize);

    for i in 0..collection.repeat_count {
        let angle = std::f32::consts::TAU * i as f32 / collection.repeat_count as f32;
        let x = center_x + angle.cos() * collection.radius;
        let y = center_y + angle.sin() * collection.radius;
        shapes.push(collection.object_kind.stamp(x, y));
    }

    jitter_all(rng, shapes, collection.jitter_factor)
}

fn in_bounds(x: f32, y: f32, width: f32, height: f32) -> bool {
    x >= 0.0 && x < width && y >= 0.0 && y < height
}

fn jitter_all(rng: &mut impl Rng, shapes: Vec<Shape>, magnitude: f32) -> Vec<Shape> {
    shapes
        .iter()
        .map(|shape| shape.jitter(rng, magnitude))
        .collect()
}
