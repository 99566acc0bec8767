use glam::Vec2;

use crate::game_object::{ComponentContext, GameComponent};
use crate::object::{Phase, Phased, Resettable};

/// Adds a constant acceleration to the object's impulse
#[derive(Debug, Clone, PartialEq)]
pub struct GravityComponent {
    gravity: Vec2,
}

impl GravityComponent {
    /// Downward pull in units per second squared
    pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -1000.0);

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }
}

impl Default for GravityComponent {
    fn default() -> Self {
        Self {
            gravity: Self::DEFAULT_GRAVITY,
        }
    }
}

impl Phased for GravityComponent {
    fn phase(&self) -> Phase {
        Phase::Physics
    }
}

impl Resettable for GravityComponent {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl GameComponent for GravityComponent {
    fn update(&mut self, time_delta: f32, context: &mut ComponentContext<'_>) {
        context.object.impulse += self.gravity * time_delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{registry, step};
    use crate::game_object::ObjectState;

    #[test]
    fn test_accumulates_into_impulse() {
        let mut systems = registry();
        let mut object = ObjectState::default();
        let mut gravity = GravityComponent::default();
        gravity.set_gravity(Vec2::new(0.0, -10.0));

        step(&mut gravity, 0.5, &mut object, &mut systems);
        step(&mut gravity, 0.5, &mut object, &mut systems);
        assert_eq!(object.impulse, Vec2::new(0.0, -10.0));
        assert_eq!(object.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_reset_restores_default() {
        let mut gravity = GravityComponent::default();
        gravity.set_gravity(Vec2::ZERO);
        gravity.reset();
        gravity.reset();
        assert_eq!(gravity, GravityComponent::default());
    }
}
