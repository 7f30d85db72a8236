//! Client-local pattern controls: the state the next placement is built from.
//!
//! None of this travels to the server; only the shapes generated from it do.

use crate::collections::{
    convert_line_collection, convert_radial_collection, LineCollection, ObjectKind,
    RadialCollection,
};
use rand::Rng;
use shared::{Shape, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Jitter ramp: starts at the initial value, scales geometrically every
/// `JITTER_FRAME_INTERVAL` frames, saturates at the limit.
pub const JITTER_INITIAL: f32 = 0.5;
pub const JITTER_SCALING: f32 = 1.1;
pub const JITTER_LIMIT: f32 = 10.0;
pub const JITTER_FRAME_INTERVAL: u32 = 60;

pub const REPEAT_COUNT_MIN: u32 = 1;
pub const REPEAT_COUNT_MAX: u32 = 20;
pub const RADIUS_MIN: f32 = 10.0;
pub const RADIUS_MAX: f32 = 200.0;

/// Values the mode-specific field resets to when the pattern is toggled.
pub const DEFAULT_ANGLE: f32 = 0.0;
pub const DEFAULT_RADIUS: f32 = 20.0;

const ANGLE_STEP: f32 = 0.1;
const RADIUS_STEP: f32 = 1.0;

/// The mode-specific half of the controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    Line { angle: f32 },
    Radial { radius: f32 },
}

/// Direction keys held during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Everything the next placement is computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternControls {
    pub pattern: Pattern,
    pub repeat_count: u32,
    pub object_kind: ObjectKind,
    pub jitter_factor: f32,
    jitter_frame_counter: u32,
}

impl PatternControls {
    pub fn new() -> Self {
        Self {
            pattern: Pattern::Line {
                angle: DEFAULT_ANGLE,
            },
            repeat_count: 20,
            object_kind: ObjectKind::Rectangle,
            jitter_factor: JITTER_INITIAL,
            jitter_frame_counter: 0,
        }
    }

    /// Advances the jitter ramp by one frame.
    pub fn tick(&mut self) {
        self.jitter_frame_counter += 1;
        if self.jitter_frame_counter >= JITTER_FRAME_INTERVAL {
            self.jitter_factor = (self.jitter_factor * JITTER_SCALING).clamp(0.0, JITTER_LIMIT);
            self.jitter_frame_counter = 0;
        }
    }

    /// Applies the direction keys held this frame.
    ///
    /// Left/right steer the active pattern: angle for lines, radius for
    /// rings. Up/down change the repeat count in either mode. Radius and
    /// repeat count never leave their bounds.
    pub fn apply_held_keys(&mut self, keys: HeldKeys) {
        if keys.left {
            match &mut self.pattern {
                Pattern::Line { angle } => *angle -= ANGLE_STEP,
                Pattern::Radial { radius } => {
                    *radius = (*radius - RADIUS_STEP).clamp(RADIUS_MIN, RADIUS_MAX)
                }
            }
        }
        if keys.right {
            match &mut self.pattern {
                Pattern::Line { angle } => *angle += ANGLE_STEP,
                Pattern::Radial { radius } => {
                    *radius = (*radius + RADIUS_STEP).clamp(RADIUS_MIN, RADIUS_MAX)
                }
            }
        }
        if keys.up {
            self.repeat_count = (self.repeat_count + 1).clamp(REPEAT_COUNT_MIN, REPEAT_COUNT_MAX);
        }
        if keys.down {
            self.repeat_count = self
                .repeat_count
                .saturating_sub(1)
                .clamp(REPEAT_COUNT_MIN, REPEAT_COUNT_MAX);
        }
    }

    /// Flips between stamping circles and rectangles.
    pub fn toggle_object_kind(&mut self) {
        self.object_kind = self.object_kind.toggled();
    }

    /// Switches line <-> radial. Repeat count, object kind and jitter factor
    /// carry over; the mode-specific field resets to its default.
    pub fn toggle_pattern(&mut self) {
        self.pattern = match self.pattern {
            Pattern::Line { .. } => Pattern::Radial {
                radius: DEFAULT_RADIUS,
            },
            Pattern::Radial { .. } => Pattern::Line {
                angle: DEFAULT_ANGLE,
            },
        };
    }

    /// Generates the preview for the current pointer position.
    pub fn preview(&self, rng: &mut impl Rng, pointer_x: f32, pointer_y: f32) -> Vec<Shape> {
        match self.pattern {
            Pattern::Line { angle } => convert_line_collection(
                rng,
                &LineCollection {
                    object_kind: self.object_kind,
                    x: pointer_x,
                    y: pointer_y,
                    angle,
                    repeat_count: self.repeat_count,
                    jitter_factor: self.jitter_factor,
                },
                CANVAS_WIDTH,
                CANVAS_HEIGHT,
            ),
            Pattern::Radial { radius } => convert_radial_collection(
                rng,
                &RadialCollection {
                    object_kind: self.object_kind,
                    x: pointer_x,
                    y: pointer_y,
                    radius,
                    repeat_count: self.repeat_count,
                    jitter_factor: self.jitter_factor,
                },
                CANVAS_WIDTH,
                CANVAS_HEIGHT,
            ),
        }
    }

    /// Resets the jitter ramp after a placement is committed.
    pub fn commit(&mut self) {
        self.jitter_factor = JITTER_INITIAL;
        self.jitter_frame_counter = 0;
    }
}

impl Default for PatternControls {
    fn default() -> Self {
        Self::new()
    }
}
