use crate::game_object::{ComponentContext, ContactFlags, GameComponent};
use crate::object::{Phase, Phased, Resettable};

/// Keeps the object on top of the level floor
///
/// Does nothing when the registry has no collision system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundCollisionComponent;

impl Phased for GroundCollisionComponent {
    fn phase(&self) -> Phase {
        Phase::CollisionResponse
    }
}

impl Resettable for GroundCollisionComponent {
    fn reset(&mut self) {}
}

impl GameComponent for GroundCollisionComponent {
    fn update(&mut self, _time_delta: f32, context: &mut ComponentContext<'_>) {
        let Some(collision) = context.systems.collision.as_ref() else {
            return;
        };
        let object = &mut *context.object;

        let probe_x = object.position.x + object.width * 0.5;
        match collision.floor_height(probe_x, object.position.y) {
            Some(floor) if object.position.y <= floor => {
                object.position.y = floor;
                object.velocity.y = object.velocity.y.max(0.0);
                object.contacts.insert(ContactFlags::GROUND);
                object.last_touched_floor_time = context.systems.time.game_time();
            }
            _ => object.contacts.remove(ContactFlags::GROUND),
        }
    }
}
