use crate::game_object::{
    ActionType, AnimationKind, AnimationState, ComponentContext, GameComponent, ObjectState,
};
use crate::object::{Phase, Phased, Resettable};

/// Picks the object's animation from its action and motion
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationComponent {
    /// Horizontal speed below which a grounded object counts as standing
    move_threshold: f32,
    /// Vertical speed beyond which an object counts as jumping or falling
    air_threshold: f32,
}

impl AnimationComponent {
    pub const DEFAULT_MOVE_THRESHOLD: f32 = 5.0;
    pub const DEFAULT_AIR_THRESHOLD: f32 = 20.0;

    pub fn set_thresholds(&mut self, move_threshold: f32, air_threshold: f32) {
        self.move_threshold = move_threshold.max(0.0);
        self.air_threshold = air_threshold.max(0.0);
    }

    fn select(&self, object: &ObjectState) -> AnimationKind {
        match object.current_action {
            ActionType::Death => AnimationKind::Death,
            ActionType::HitReact => AnimationKind::HitReact,
            ActionType::Attack => AnimationKind::Attack,
            ActionType::Frozen | ActionType::Hide => object.animation.kind,
            ActionType::Invalid | ActionType::Idle | ActionType::Move => {
                let velocity = object.velocity;
                if velocity.y > self.air_threshold {
                    AnimationKind::Jump
                } else if velocity.y < -self.air_threshold && !object.touching_ground() {
                    AnimationKind::Fall
                } else if velocity.x.abs() > self.move_threshold {
                    AnimationKind::Move
                } else {
                    AnimationKind::Idle
                }
            }
        }
    }
}

impl Default for AnimationComponent {
    fn default() -> Self {
        Self {
            move_threshold: Self::DEFAULT_MOVE_THRESHOLD,
            air_threshold: Self::DEFAULT_AIR_THRESHOLD,
        }
    }
}

impl Phased for AnimationComponent {
    fn phase(&self) -> Phase {
        Phase::Animation
    }
}

impl Resettable for AnimationComponent {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl GameComponent for AnimationComponent {
    fn update(&mut self, time_delta: f32, context: &mut ComponentContext<'_>) {
        let kind = self.select(context.object);
        let animation = &mut context.object.animation;
        if kind == animation.kind {
            animation.elapsed += time_delta;
        } else {
            *animation = AnimationState { kind, elapsed: 0.0 };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{registry, step};
    use crate::game_object::ContactFlags;
    use glam::Vec2;

    fn animate(object: &mut ObjectState) -> AnimationKind {
        let mut systems = registry();
        step(&mut AnimationComponent::default(), 0.1, object, &mut systems);
        object.animation.kind
    }

    #[test]
    fn test_selection_from_motion() {
        let mut object = ObjectState {
            contacts: ContactFlags::GROUND,
            ..ObjectState::default()
        };
        assert_eq!(animate(&mut object), AnimationKind::Idle);

        object.velocity = Vec2::new(50.0, 0.0);
        assert_eq!(animate(&mut object), AnimationKind::Move);

        object.velocity = Vec2::new(0.0, 100.0);
        assert_eq!(animate(&mut object), AnimationKind::Jump);

        object.contacts = ContactFlags::empty();
        object.velocity = Vec2::new(0.0, -100.0);
        assert_eq!(animate(&mut object), AnimationKind::Fall);
    }

    #[test]
    fn test_actions_override_motion() {
        let mut object = ObjectState {
            velocity: Vec2::new(50.0, 0.0),
            current_action: ActionType::Attack,
            ..ObjectState::default()
        };
        assert_eq!(animate(&mut object), AnimationKind::Attack);

        object.current_action = ActionType::Frozen;
        assert_eq!(animate(&mut object), AnimationKind::Attack);

        object.current_action = ActionType::Death;
        assert_eq!(animate(&mut object), AnimationKind::Death);
    }

    #[test]
    fn test_clock_restarts_on_change() {
        let mut object = ObjectState::default();
        animate(&mut object);
        animate(&mut object);
        assert!((object.animation.elapsed - 0.2).abs() < 1e-6);

        object.current_action = ActionType::HitReact;
        animate(&mut object);
        assert_eq!(object.animation.elapsed, 0.0);
    }
}
