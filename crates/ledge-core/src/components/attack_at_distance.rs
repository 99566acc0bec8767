use crate::game_object::{ActionType, ComponentContext, GameComponent};
use crate::object::{Phase, Phased, Resettable};

/// Starts an attack when the player comes within range
///
/// An attack starts when the player is closer than `attack_distance`, at
/// least `attack_duration + attack_delay` game seconds have passed since the
/// previous attack began, and (if `require_facing` is set) the object faces
/// the player. The object returns to `Idle` once `attack_duration` game
/// seconds have passed since the attack began.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackAtDistanceComponent {
    attack_distance: f32,
    attack_delay: f32,
    attack_duration: f32,
    require_facing: bool,
    /// Game time at which the last attack began
    last_attack_time: f32,
}

impl AttackAtDistanceComponent {
    pub const DEFAULT_ATTACK_DISTANCE: f32 = 100.0;
    pub const DEFAULT_ATTACK_DELAY: f32 = 0.0;
    pub const DEFAULT_ATTACK_DURATION: f32 = 1.0;

    /// Configure range, cooldown, attack length and facing requirement
    pub fn setup(&mut self, distance: f32, delay: f32, duration: f32, require_facing: bool) {
        self.attack_distance = distance;
        self.attack_delay = delay;
        self.attack_duration = duration;
        self.require_facing = require_facing;
    }

    /// Game time at which the last attack began
    pub fn last_attack_time(&self) -> f32 {
        self.last_attack_time
    }
}

impl Default for AttackAtDistanceComponent {
    fn default() -> Self {
        Self {
            attack_distance: Self::DEFAULT_ATTACK_DISTANCE,
            attack_delay: Self::DEFAULT_ATTACK_DELAY,
            attack_duration: Self::DEFAULT_ATTACK_DURATION,
            require_facing: false,
            last_attack_time: 0.0,
        }
    }
}

impl Phased for AttackAtDistanceComponent {
    fn phase(&self) -> Phase {
        Phase::Think
    }
}

impl Resettable for AttackAtDistanceComponent {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl GameComponent for AttackAtDistanceComponent {
    fn update(&mut self, _time_delta: f32, context: &mut ComponentContext<'_>) {
        let object = &mut *context.object;
        let game_time = context.systems.time.game_time();
        let since_attack = game_time - self.last_attack_time;

        if object.current_action == ActionType::Attack {
            if since_attack >= self.attack_duration {
                object.current_action = ActionType::Idle;
            }
            return;
        }
        if matches!(object.current_action, ActionType::Death | ActionType::Frozen) {
            return;
        }

        let Some(player) = context.systems.player else {
            return;
        };
        let in_range = object.position.distance_squared(player.position)
            < self.attack_distance * self.attack_distance;
        let rested = since_attack >= self.attack_duration + self.attack_delay;
        let facing = !self.require_facing || object.facing(player.position);

        if in_range && rested && facing {
            object.current_action = ActionType::Attack;
            self.last_attack_time = game_time;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_support::{registry, step};
    use crate::game_object::ObjectState;
    use crate::registry::{PlayerSnapshot, SystemRegistry};
    use glam::Vec2;

    fn world_at(game_time: f32, player: Vec2) -> SystemRegistry {
        let mut systems = registry();
        systems.time.update(game_time);
        systems.player = Some(PlayerSnapshot {
            position: player,
            facing_direction: Vec2::X,
            action: ActionType::Idle,
            life: 3,
        });
        systems
    }

    fn idle_attacker() -> ObjectState {
        ObjectState {
            current_action: ActionType::Idle,
            ..ObjectState::default()
        }
    }

    #[test]
    fn test_attack_then_revert_after_duration() {
        let mut systems = world_at(10.0, Vec2::new(50.0, 0.0));
        let mut object = idle_attacker();
        let mut attack = AttackAtDistanceComponent::default();
        attack.setup(100.0, 0.0, 1.0, true);

        step(&mut attack, 0.016, &mut object, &mut systems);
        assert_eq!(object.current_action, ActionType::Attack);
        assert_eq!(attack.last_attack_time(), 10.0);

        // Not yet over
        systems.time.update(0.5);
        step(&mut attack, 0.5, &mut object, &mut systems);
        assert_eq!(object.current_action, ActionType::Attack);

        // Exactly start + duration reverts
        systems.time.update(0.5);
        assert_eq!(systems.time.game_time(), 11.0);
        step(&mut attack, 0.5, &mut object, &mut systems);
        assert_eq!(object.current_action, ActionType::Idle);
    }

    #[test]
    fn test_out_of_range() {
        let mut systems = world_at(10.0, Vec2::new(150.0, 0.0));
        let mut object = idle_attacker();
        step(&mut AttackAtDistanceComponent::default(), 0.016, &mut object, &mut systems);
        assert_eq!(object.current_action, ActionType::Idle);
    }

    #[test]
    fn test_facing_requirement() {
        let mut systems = world_at(10.0, Vec2::new(-50.0, 0.0));
        let mut object = idle_attacker();
        let mut attack = AttackAtDistanceComponent::default();
        attack.setup(100.0, 0.0, 1.0, true);

        step(&mut attack, 0.016, &mut object, &mut systems);
        assert_eq!(object.current_action, ActionType::Idle);

        object.facing_direction = Vec2::NEG_X;
        step(&mut attack, 0.016, &mut object, &mut systems);
        assert_eq!(object.current_action, ActionType::Attack);
    }

    #[test]
    fn test_delay_spaces_attacks() {
        let mut systems = world_at(10.0, Vec2::new(10.0, 0.0));
        let mut object = idle_attacker();
        let mut attack = AttackAtDistanceComponent::default();
        attack.setup(100.0, 2.0, 1.0, false);

        step(&mut attack, 0.016, &mut object, &mut systems);
        assert_eq!(object.current_action, ActionType::Attack);

        systems.time.update(1.0);
        step(&mut attack, 1.0, &mut object, &mut systems);
        assert_eq!(object.current_action, ActionType::Idle);

        // Cooling down until duration + delay has passed
        step(&mut attack, 0.0, &mut object, &mut systems);
        assert_eq!(object.current_action, ActionType::Idle);

        systems.time.update(2.0);
        step(&mut attack, 2.0, &mut object, &mut systems);
        assert_eq!(object.current_action, ActionType::Attack);
        assert_eq!(attack.last_attack_time(), 13.0);
    }

    #[test]
    fn test_no_player_no_attack() {
        let mut systems = registry();
        systems.time.update(10.0);
        let mut object = idle_attacker();
        step(&mut AttackAtDistanceComponent::default(), 0.016, &mut object, &mut systems);
        assert_eq!(object.current_action, ActionType::Idle);
    }
}
