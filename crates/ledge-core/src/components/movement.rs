use glam::Vec2;

use crate::game_object::{ComponentContext, GameComponent};
use crate::object::{Phase, Phased, Resettable};

/// Integrates impulse, velocity and position
///
/// Each axis with a non-zero `acceleration` moves its velocity towards
/// `target_velocity` at that rate; axes with zero acceleration are left to
/// impulses alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementComponent {
    /// Largest speed per axis, 0 for unbounded
    max_speed: f32,
}

impl MovementComponent {
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn set_max_speed(&mut self, max_speed: f32) {
        self.max_speed = max_speed.max(0.0);
    }
}

fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

impl Phased for MovementComponent {
    fn phase(&self) -> Phase {
        Phase::Movement
    }
}

impl Resettable for MovementComponent {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl GameComponent for MovementComponent {
    fn update(&mut self, time_delta: f32, context: &mut ComponentContext<'_>) {
        let object = &mut *context.object;

        object.velocity += object.impulse;
        object.impulse = Vec2::ZERO;

        if object.acceleration.x > 0.0 {
            object.velocity.x = approach(
                object.velocity.x,
                object.target_velocity.x,
                object.acceleration.x * time_delta,
            );
        }
        if object.acceleration.y > 0.0 {
            object.velocity.y = approach(
                object.velocity.y,
                object.target_velocity.y,
                object.acceleration.y * time_delta,
            );
        }

        if self.max_speed > 0.0 {
            object.velocity = object.velocity.clamp(
                Vec2::splat(-self.max_speed),
                Vec2::splat(self.max_speed),
            );
        }

        object.position += object.velocity * time_delta;
    }
}
