use crate::events::GameEvent;
use crate::game_object::{ActionType, ComponentContext, GameComponent};
use crate::object::{Phase, Phased, Resettable};
use crate::registry::SoundId;

/// Kills the object when its life runs out or its time is up
///
/// Death switches the action to [`ActionType::Death`], plays the death
/// sound, counts the death event and, once `removal_delay` seconds of game
/// time have passed, marks the object for removal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifetimeComponent {
    /// Seconds the object lives, if limited
    time_to_live: Option<f32>,
    /// Seconds between death and removal, leaving room for a death animation
    removal_delay: f32,
    death_sound: Option<SoundId>,
    death_event: Option<GameEvent>,
    /// Game seconds since the object started living
    age: f32,
    /// Game seconds since death
    dead_for: Option<f32>,
}

impl LifetimeComponent {
    pub fn set_time_to_live(&mut self, seconds: f32) {
        self.time_to_live = Some(seconds);
    }

    pub fn set_removal_delay(&mut self, seconds: f32) {
        self.removal_delay = seconds.max(0.0);
    }

    pub fn set_death_sound(&mut self, sound: SoundId) {
        self.death_sound = Some(sound);
    }

    pub fn set_death_event(&mut self, event: GameEvent) {
        self.death_event = Some(event);
    }

    /// Whether the object has died
    pub fn is_dead(&self) -> bool {
        self.dead_for.is_some()
    }

    fn die(&mut self, context: &mut ComponentContext<'_>) {
        self.dead_for = Some(0.0);
        context.object.current_action = ActionType::Death;

        if let Some(sound) = self.death_sound {
            context.systems.play_sound(sound, 1.0);
        }
        if let Some(event) = self.death_event {
            context.systems.events.increment(event);
        }
        if context.object.is_player {
            context
                .systems
                .events
                .set_last_death_position(context.object.position);
        }
        log::debug!("Object died at {:?}", context.object.position);
    }
}

impl Phased for LifetimeComponent {
    fn phase(&self) -> Phase {
        Phase::Think
    }
}

impl Resettable for LifetimeComponent {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl GameComponent for LifetimeComponent {
    fn update(&mut self, time_delta: f32, context: &mut ComponentContext<'_>) {
        match self.dead_for {
            Some(dead_for) => {
                let dead_for = dead_for + time_delta;
                self.dead_for = Some(dead_for);
                if dead_for >= self.removal_delay {
                    context.object.marked_for_removal = true;
                }
                return;
            }
            None => self.age += time_delta,
        }

        let expired = self.time_to_live.is_some_and(|ttl| self.age >= ttl);
        if context.object.life <= 0 || expired {
            self.die(context);
            if self.removal_delay <= 0.0 {
                context.object.marked_for_removal = true;
            }
        }
    }
}
