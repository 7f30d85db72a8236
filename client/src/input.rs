//! Frame-by-frame key sampling with edge detection for the toggle actions.

use crate::session::HeldKeys;
use macroquad::prelude::*;

/// One frame's worth of input.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Arrows held down; applied continuously while held.
    pub held: HeldKeys,
    /// Space went down this frame: flip circle/rectangle.
    pub toggle_object_kind: bool,
    /// C went down this frame: flip line/radial.
    pub toggle_pattern: bool,
    /// Pointer pressed this frame: commit the preview.
    pub commit: bool,
    /// Pointer position in canvas coordinates.
    pub pointer: (f32, f32),
}

/// Samples the keyboard and pointer once per frame.
///
/// Held arrows repeat every frame; the toggles fire only on the frame their
/// key goes down (current && !previous).
pub struct InputManager {
    prev_toggle_object: bool,
    prev_toggle_pattern: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_toggle_object: false,
            prev_toggle_pattern: false,
        }
    }

    pub fn sample(&mut self) -> FrameInput {
        let held = HeldKeys {
            left: is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::Right),
            up: is_key_down(KeyCode::Up),
            down: is_key_down(KeyCode::Down),
        };

        let toggle_object_key = is_key_down(KeyCode::Space);
        let toggle_pattern_key = is_key_down(KeyCode::C);

        let input = FrameInput {
            held,
            toggle_object_kind: toggle_object_key && !self.prev_toggle_object,
            toggle_pattern: toggle_pattern_key && !self.prev_toggle_pattern,
            commit: is_mouse_button_pressed(MouseButton::Left),
            pointer: mouse_position(),
        };

        self.prev_toggle_object = toggle_object_key;
        self.prev_toggle_pattern = toggle_pattern_key;

        input
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
