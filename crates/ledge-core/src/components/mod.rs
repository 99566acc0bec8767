//! Gameplay Components
//!
//! The stock components a level is assembled from. Each runs in one phase:
//!
//! | Component                    | Phase               |
//! |------------------------------|---------------------|
//! | [`PlayerInputComponent`]     | `Think`             |
//! | [`AttackAtDistanceComponent`]| `Think`             |
//! | [`LifetimeComponent`]        | `Think`             |
//! | [`GravityComponent`]         | `Physics`           |
//! | [`MovementComponent`]        | `Movement`          |
//! | [`GroundCollisionComponent`] | `CollisionResponse` |
//! | [`AnimationComponent`]       | `Animation`         |
//! | [`RenderComponent`]          | `Draw`              |

mod animation;
mod attack_at_distance;
mod gravity;
mod ground_collision;
mod lifetime;
mod movement;
mod player_input;
mod render;

pub use animation::AnimationComponent;
pub use attack_at_distance::AttackAtDistanceComponent;
pub use gravity::GravityComponent;
pub use ground_collision::GroundCollisionComponent;
pub use lifetime::LifetimeComponent;
pub use movement::MovementComponent;
pub use player_input::{PlayerInputComponent, JUMP_CHANNEL};
pub use render::RenderComponent;

use crate::factory::GameObjectFactory;

/// Number of stock component kinds
pub const STOCK_COMPONENT_KINDS: usize = 8;

/// Register a pool for every stock component, `size` instances each
pub fn register_stock_pools(factory: &mut GameObjectFactory, size: usize) {
    factory.register_component_pool(size, PlayerInputComponent::default);
    factory.register_component_pool(size, AttackAtDistanceComponent::default);
    factory.register_component_pool(size, LifetimeComponent::default);
    factory.register_component_pool(size, GravityComponent::default);
    factory.register_component_pool(size, MovementComponent::default);
    factory.register_component_pool(size, GroundCollisionComponent::default);
    factory.register_component_pool(size, AnimationComponent::default);
    factory.register_component_pool(size, RenderComponent::default);
}
