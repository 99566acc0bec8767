//! Input State
//!
//! Device-independent button state, written by the platform layer and read
//! by gameplay components. Timestamps are in game-time seconds so
//! "triggered" checks stay consistent with frame deltas.

use serde::{Deserialize, Serialize};

use crate::object::Resettable;

/// Logical buttons gameplay reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Attack,
}

impl Button {
    /// Every button
    pub const ALL: [Button; 6] = [
        Button::Left,
        Button::Right,
        Button::Up,
        Button::Down,
        Button::Jump,
        Button::Attack,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// State of one button
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputButton {
    down: bool,
    /// Time at which the button last went down
    down_time: f32,
    /// Analog strength in `[0, 1]`; digital presses use 1
    magnitude: f32,
    /// Up-to-down transitions so far
    presses: u32,
}

impl InputButton {
    /// Press the button at `time`
    ///
    /// Repeated presses while held keep the original down time but update
    /// the magnitude.
    pub fn press(&mut self, time: f32, magnitude: f32) {
        if !self.down {
            self.down = true;
            self.down_time = time;
            self.presses = self.presses.wrapping_add(1);
        }
        self.magnitude = magnitude.clamp(0.0, 1.0);
    }

    /// Release the button
    pub fn release(&mut self) {
        self.down = false;
    }

    /// Whether the button is held
    pub fn pressed(&self) -> bool {
        self.down
    }

    /// Whether the button is held and went down within the last two frames
    pub fn triggered(&self, time: f32, frame_delta: f32) -> bool {
        self.down && time - self.down_time <= frame_delta * 2.0
    }

    /// Seconds the button has been held, 0 when up
    pub fn pressed_duration(&self, time: f32) -> f32 {
        if self.down {
            (time - self.down_time).max(0.0)
        } else {
            0.0
        }
    }

    /// Time the button last went down
    pub fn down_time(&self) -> f32 {
        self.down_time
    }

    /// Number of times the button went down
    ///
    /// Tells presses apart even when game time stands still between them.
    pub fn press_count(&self) -> u32 {
        self.presses
    }

    /// Analog strength, 0 when up
    pub fn magnitude(&self) -> f32 {
        if self.down { self.magnitude } else { 0.0 }
    }
}

impl Resettable for InputButton {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// State of every logical button
#[derive(Debug, Clone, Default)]
pub struct InputSystem {
    buttons: [InputButton; Button::ALL.len()],
}

impl InputSystem {
    /// Create a system with every button up
    pub fn new() -> Self {
        Self::default()
    }

    /// State of `button`
    pub fn button(&self, button: Button) -> &InputButton {
        &self.buttons[button.index()]
    }

    /// Press `button` at `time`
    pub fn press(&mut self, button: Button, time: f32, magnitude: f32) {
        self.buttons[button.index()].press(time, magnitude);
    }

    /// Release `button`
    pub fn release(&mut self, button: Button) {
        self.buttons[button.index()].release();
    }

    /// Whether `button` is held
    pub fn pressed(&self, button: Button) -> bool {
        self.button(button).pressed()
    }

    /// Whether `button` went down within the last two frames
    pub fn triggered(&self, button: Button, time: f32, frame_delta: f32) -> bool {
        self.button(button).triggered(time, frame_delta)
    }

    /// Horizontal direction from the left/right pair in `[-1, 1]`
    pub fn horizontal_axis(&self) -> f32 {
        self.button(Button::Right).magnitude() - self.button(Button::Left).magnitude()
    }
}

impl Resettable for InputSystem {
    fn reset(&mut self) {
        self.buttons.iter_mut().for_each(InputButton::reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_press_keeps_first_down_time() {
        let mut button = InputButton::default();
        button.press(1.0, 1.0);
        button.press(2.0, 0.5);
        assert!(button.pressed());
        assert_eq!(button.down_time(), 1.0);
        assert_eq!(button.magnitude(), 0.5);
        assert_eq!(button.pressed_duration(2.5), 1.5);
    }

    #[test]
    fn test_press_count_tracks_transitions() {
        let mut button = InputButton::default();
        button.press(1.0, 1.0);
        button.press(1.0, 1.0);
        assert_eq!(button.press_count(), 1);
        button.release();
        button.press(1.0, 1.0);
        assert_eq!(button.press_count(), 2);
        assert_eq!(button.down_time(), 1.0);
    }

    #[test]
    fn test_triggered_window() {
        let mut button = InputButton::default();
        button.press(1.0, 1.0);
        assert!(button.triggered(1.0, FRAME));
        assert!(button.triggered(1.0 + FRAME, FRAME));
        assert!(!button.triggered(1.0 + 3.0 * FRAME, FRAME));

        button.release();
        assert!(!button.triggered(1.0, FRAME));
    }

    #[test]
    fn test_released_button_reads_zero() {
        let mut button = InputButton::default();
        button.press(0.0, 0.8);
        button.release();
        assert_eq!(button.magnitude(), 0.0);
        assert_eq!(button.pressed_duration(5.0), 0.0);
    }

    #[test]
    fn test_horizontal_axis() {
        let mut input = InputSystem::new();
        input.press(Button::Left, 0.0, 1.0);
        assert_eq!(input.horizontal_axis(), -1.0);
        input.press(Button::Right, 0.0, 1.0);
        assert_eq!(input.horizontal_axis(), 0.0);
        input.release(Button::Left);
        assert_eq!(input.horizontal_axis(), 1.0);
    }

    #[test]
    fn test_reset_releases_everything() {
        let mut input = InputSystem::new();
        for button in Button::ALL {
            input.press(button, 1.0, 1.0);
        }
        input.reset();
        assert!(Button::ALL.iter().all(|b| !input.pressed(*b)));
    }
}
