//! Game Object Factory
//!
//! Owns every pool a level draws from: one pool of game objects and one
//! pool per registered component kind. Objects are assembled from pooled
//! parts and taken apart again on release, so a level that is running
//! never allocates.

use std::any::TypeId;
use std::sync::Arc;

use ahash::AHashMap;

use crate::game_object::{GameComponent, GameObject};
use crate::memory::AllocationTracker;
use crate::object::Resettable;
use crate::pool::{GameComponentPool, ObjectPool};
use crate::{CoreError, CoreResult, EngineConfig};

fn scrub_object(object: &mut GameObject) {
    object.reset();
}

/// Pools for game objects and their components
pub struct GameObjectFactory {
    objects: ObjectPool<GameObject>,
    components: AHashMap<TypeId, GameComponentPool>,
    tracker: Arc<AllocationTracker>,
    /// Radius stamped on every freshly allocated object
    activation_radius: f32,
}

impl GameObjectFactory {
    /// Build the object pool sized by `config`; component pools are registered separately
    pub fn new(config: &EngineConfig) -> Self {
        let tracker = Arc::new(AllocationTracker::new());
        let max_components = config.max_components_per_object;
        let objects = ObjectPool::new("game_objects", config.max_game_objects, || {
            GameObject::new(max_components)
        })
        .with_scrubber(scrub_object)
        .with_stats(tracker.register("game_objects"));

        Self {
            objects,
            components: AHashMap::new(),
            tracker,
            activation_radius: config.activation_radius,
        }
    }

    /// Create a pool of `size` components of kind `C`
    ///
    /// Registering the same kind twice replaces the earlier pool.
    pub fn register_component_pool<C: GameComponent>(
        &mut self,
        size: usize,
        factory: impl FnMut() -> C,
    ) {
        let pool = GameComponentPool::new(size, factory);
        let stats = self.tracker.register(pool.name());
        let pool = pool.with_stats(stats);
        log::debug!("Registered pool of {size} {}", pool.name());
        if self.components.insert(TypeId::of::<C>(), pool).is_some() {
            log::warn!("Replaced component pool for {}", std::any::type_name::<C>());
        }
    }

    /// Check whether a pool exists for `C`
    pub fn has_component_pool<C: GameComponent>(&self) -> bool {
        self.components.contains_key(&TypeId::of::<C>())
    }

    /// Check out a blank game object
    ///
    /// # Panics
    /// Panics when every game object is in use.
    pub fn allocate_object(&mut self) -> GameObject {
        let mut object = self.objects.allocate();
        object.state.activation_radius = self.activation_radius;
        object
    }

    /// Check out a freshly reset component of kind `C`
    pub fn try_allocate_component<C: GameComponent>(&mut self) -> CoreResult<Box<dyn GameComponent>> {
        self.components
            .get_mut(&TypeId::of::<C>())
            .ok_or(CoreError::UnknownComponentKind(std::any::type_name::<C>()))?
            .try_allocate()
    }

    /// Check out a freshly reset component of kind `C`
    ///
    /// # Panics
    /// Panics when no pool is registered for `C` or the pool is empty.
    pub fn allocate_component<C: GameComponent>(&mut self) -> Box<dyn GameComponent> {
        match self.try_allocate_component::<C>() {
            Ok(component) => component,
            Err(err) => {
                log::error!("GameObjectFactory::allocate_component: {err}");
                panic!("GameObjectFactory::allocate_component: {err}");
            }
        }
    }

    /// Check out a component of kind `C` and configure it before it is attached
    pub fn allocate_component_with<C: GameComponent>(
        &mut self,
        configure: impl FnOnce(&mut C),
    ) -> Box<dyn GameComponent> {
        let mut component = self.allocate_component::<C>();
        if let Some(concrete) = component.downcast_mut::<C>() {
            configure(concrete);
        }
        component
    }

    /// Return a component to its kind's pool
    ///
    /// Components with no registered pool are dropped with a warning.
    pub fn release_component(&mut self, component: Box<dyn GameComponent>) {
        match self.components.get_mut(&component.kind()) {
            Some(pool) => pool.release(component),
            None => log::warn!("No pool for {}, dropping it", component.name()),
        }
    }

    /// Take an object apart, returning every component and the object itself to their pools
    pub fn release_object(&mut self, mut object: GameObject) {
        object.drain_components(|component| self.release_component(component));
        self.objects.release(object);
    }

    /// Game objects currently checked out
    pub fn allocated_objects(&self) -> usize {
        self.objects.allocated_count()
    }

    /// Components of kind `C` currently checked out
    pub fn allocated_components<C: GameComponent>(&self) -> usize {
        self.components
            .get(&TypeId::of::<C>())
            .map_or(0, GameComponentPool::allocated_count)
    }

    /// Pool statistics for leak reporting
    pub fn tracker(&self) -> &Arc<AllocationTracker> {
        &self.tracker
    }
}
