//! Time Management
//!
//! Two clocks advance every frame:
//! - **Real time** follows the wall-clock delta fed in by the game thread
//! - **Game time** follows real time scaled by the current time scale, and
//!   stands still while the game is frozen
//!
//! Gameplay code reads game time only, so freezes and slow-motion apply to
//! everything at once.

use crate::object::Resettable;

/// Real seconds spent blending into and out of a time scale
pub const EASE_DURATION: f32 = 0.5;

/// An active time-scale request
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScaleWindow {
    /// Real time at which the window opened
    start: f32,
    /// Length of the window in real seconds
    duration: f32,
    /// Scale held in the middle of the window
    target: f32,
    /// Blend at both ends instead of snapping
    ease: bool,
}

impl ScaleWindow {
    /// Scale in effect `elapsed` real seconds into the window
    fn scale_at(&self, elapsed: f32) -> f32 {
        if !self.ease {
            return self.target;
        }
        let ease_out_start = self.duration - EASE_DURATION;
        if elapsed < EASE_DURATION {
            TimeSystem::ease(1.0, self.target, EASE_DURATION, elapsed)
        } else if elapsed >= ease_out_start {
            TimeSystem::ease(self.target, 1.0, EASE_DURATION, elapsed - ease_out_start)
        } else {
            self.target
        }
    }
}

/// Game and real clocks, with freeze and scale effects
#[derive(Debug, Clone, Default)]
pub struct TimeSystem {
    /// Scaled time since the last reset
    game_time: f32,
    /// Unscaled time since the last reset
    real_time: f32,
    /// Game-time advance of the last frame
    frame_delta: f32,
    /// Real-time advance of the last frame
    real_frame_delta: f32,
    /// Real seconds of freeze left
    freeze_remaining: f32,
    scale: Option<ScaleWindow>,
    frame_count: u64,
}

impl TimeSystem {
    /// Create a system with both clocks at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance both clocks by `time_delta` real seconds
    ///
    /// Negative or non-finite deltas count as zero.
    pub fn update(&mut self, time_delta: f32) {
        let dt = if time_delta.is_finite() { time_delta.max(0.0) } else { 0.0 };

        self.real_time += dt;
        self.real_frame_delta = dt;
        self.frame_count += 1;

        if self.freeze_remaining > 0.0 {
            self.freeze_remaining = (self.freeze_remaining - dt).max(0.0);
            self.frame_delta = 0.0;
            return;
        }

        let scale = self.current_scale();
        self.frame_delta = dt * scale;
        self.game_time += self.frame_delta;
    }

    fn current_scale(&mut self) -> f32 {
        let Some(window) = self.scale else {
            return 1.0;
        };
        let elapsed = self.real_time - window.start;
        if elapsed > window.duration {
            self.scale = None;
            return 1.0;
        }
        window.scale_at(elapsed)
    }

    /// Stop game time for `seconds` of real time
    ///
    /// A shorter freeze never cuts an active one short.
    pub fn freeze(&mut self, seconds: f32) {
        if seconds.is_finite() {
            self.freeze_remaining = self.freeze_remaining.max(seconds);
        }
    }

    /// Check if game time is currently frozen
    pub fn is_frozen(&self) -> bool {
        self.freeze_remaining > 0.0
    }

    /// Scale game-time advance by `scale` for `duration` real seconds
    ///
    /// With `ease` the first and last [`EASE_DURATION`] seconds blend
    /// between normal speed and `scale`. Replaces any active scale.
    pub fn apply_scale(&mut self, scale: f32, duration: f32, ease: bool) {
        if !(scale.is_finite() && duration.is_finite()) || duration <= 0.0 {
            log::warn!("Ignoring time scale {scale} for {duration}s");
            return;
        }
        self.scale = Some(ScaleWindow {
            start: self.real_time,
            duration,
            target: scale.max(0.0),
            ease,
        });
    }

    /// Cubic ease-in/ease-out from `start` to `target`
    ///
    /// `time` runs from 0 to `duration`; at or past `duration` the result is
    /// exactly `target`.
    pub fn ease(start: f32, target: f32, duration: f32, time: f32) -> f32 {
        if time >= duration || duration <= 0.0 {
            return target;
        }
        let range = target - start;
        let percent = time / (duration / 2.0);
        if percent < 1.0 {
            start + (range / 2.0) * percent * percent * percent
        } else {
            let shifted = percent - 2.0;
            start + (range / 2.0) * (shifted * shifted * shifted + 2.0)
        }
    }

    /// Scaled seconds since the last reset
    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    /// Unscaled seconds since the last reset
    pub fn real_time(&self) -> f32 {
        self.real_time
    }

    /// Game-time advance of the last frame
    pub fn frame_delta(&self) -> f32 {
        self.frame_delta
    }

    /// Real-time advance of the last frame
    pub fn real_frame_delta(&self) -> f32 {
        self.real_frame_delta
    }

    /// Frames since the last reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Resettable for TimeSystem {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_clocks_advance_together() {
        let mut time = TimeSystem::new();
        time.update(FRAME);
        time.update(FRAME);

        assert!(approx(time.game_time(), 2.0 * FRAME));
        assert!(approx(time.real_time(), 2.0 * FRAME));
        assert!(approx(time.frame_delta(), FRAME));
        assert_eq!(time.frame_count(), 2);
    }

    #[test]
    fn test_bad_deltas_count_as_zero() {
        let mut time = TimeSystem::new();
        time.update(-1.0);
        time.update(f32::NAN);
        time.update(f32::INFINITY);
        assert_eq!(time.game_time(), 0.0);
        assert_eq!(time.real_time(), 0.0);
        assert_eq!(time.frame_delta(), 0.0);
    }

    #[test]
    fn test_freeze_stops_game_time() {
        let mut time = TimeSystem::new();
        time.freeze(0.1);
        assert!(time.is_frozen());

        time.update(0.05);
        assert_eq!(time.game_time(), 0.0);
        assert_eq!(time.frame_delta(), 0.0);
        assert!(approx(time.real_time(), 0.05));

        time.update(0.06);
        assert!(!time.is_frozen());

        time.update(0.05);
        assert!(approx(time.game_time(), 0.05));
    }

    #[test]
    fn test_scale_without_ease() {
        let mut time = TimeSystem::new();
        time.apply_scale(0.5, 1.0, false);
        time.update(0.1);
        assert!(approx(time.frame_delta(), 0.05));
    }

    #[test]
    fn test_scale_expires() {
        let mut time = TimeSystem::new();
        time.apply_scale(0.5, 0.2, false);
        for _ in 0..3 {
            time.update(0.1);
        }
        // Third frame lands past the window
        assert!(approx(time.frame_delta(), 0.1));
    }

    #[test]
    fn test_eased_scale_blends_in() {
        let mut time = TimeSystem::new();
        time.apply_scale(0.0, 2.0, true);

        time.update(0.25);
        // Half-way through the ease-in the scale is half-way to the target
        assert!(approx(time.frame_delta(), 0.25 * 0.5));

        time.update(0.5);
        assert!(approx(time.frame_delta(), 0.0));
    }

    #[test]
    fn test_ease_curve() {
        assert!(approx(TimeSystem::ease(0.0, 1.0, 1.0, 0.0), 0.0));
        assert!(approx(TimeSystem::ease(0.0, 1.0, 1.0, 0.5), 0.5));
        assert!(approx(TimeSystem::ease(0.0, 1.0, 1.0, 0.25), 0.0625));
        assert!(approx(TimeSystem::ease(0.0, 1.0, 1.0, 0.75), 0.9375));
        assert_eq!(TimeSystem::ease(2.0, 4.0, 1.0, 1.0), 4.0);
        assert_eq!(TimeSystem::ease(2.0, 4.0, 1.0, 3.0), 4.0);
    }

    #[test]
    fn test_reset() {
        let mut time = TimeSystem::new();
        time.update(1.0);
        time.freeze(1.0);
        time.reset();
        assert_eq!(time.game_time(), 0.0);
        assert_eq!(time.real_time(), 0.0);
        assert!(!time.is_frozen());
        time.reset();
        assert_eq!(time.frame_count(), 0);
    }
}
