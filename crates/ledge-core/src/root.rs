//! Game Root
//!
//! Drives one simulation. Each frame runs in a fixed order:
//! 1. Clamp the incoming delta
//! 2. Advance time, so everything after sees this frame's clocks
//! 3. Update the object tree with the game-time delta
//! 4. Sort the render queue
//! 5. Commit structural changes, the frame's single commit point

use crate::components::register_stock_pools;
use crate::factory::GameObjectFactory;
use crate::game_object::GameObject;
use crate::game_object_manager::GameObjectManager;
use crate::manager::CommitSummary;
use crate::memory::PoolReport;
use crate::object::{ObjectHandle, Resettable};
use crate::registry::SystemRegistry;
use crate::render_queue::RenderQueue;
use crate::{CoreResult, EngineConfig};

/// Root driver owning every part of one simulation
pub struct GameRoot {
    config: EngineConfig,
    systems: SystemRegistry,
    factory: GameObjectFactory,
    objects: GameObjectManager,
    last_commit: CommitSummary,
}

impl GameRoot {
    /// Create a simulation with pools for every stock component
    pub fn new(config: EngineConfig) -> Self {
        let systems = SystemRegistry::new(&config);
        Self::with_systems(config, systems)
    }

    /// Create a simulation around a prepared registry
    ///
    /// Use this to install collision or sound backends.
    pub fn with_systems(config: EngineConfig, systems: SystemRegistry) -> Self {
        let mut factory = GameObjectFactory::new(&config);
        register_stock_pools(&mut factory, config.component_pool_size);
        let objects = GameObjectManager::new(config.max_game_objects);
        log::info!(
            "Game root ready: {} objects, {} components per kind",
            config.max_game_objects,
            config.component_pool_size
        );

        Self {
            config,
            systems,
            factory,
            objects,
            last_commit: CommitSummary::default(),
        }
    }

    /// Run one frame of `time_delta` real seconds
    pub fn update(&mut self, time_delta: f32) {
        let dt = if time_delta.is_finite() {
            time_delta.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };

        self.systems.time.update(dt);
        let game_delta = self.systems.time.frame_delta();

        self.systems.render_queue.clear();
        self.objects.update(game_delta, &mut self.systems);
        self.systems.render_queue.finish_frame();

        self.last_commit = self.objects.commit_updates(&mut self.factory);
    }

    /// Assemble an object from pooled parts and queue it for the next commit
    ///
    /// `build` receives a blank object and the factory to draw components
    /// from.
    ///
    /// # Panics
    /// Panics when a pool or the object manager is exhausted.
    pub fn spawn(
        &mut self,
        build: impl FnOnce(&mut GameObject, &mut GameObjectFactory),
    ) -> ObjectHandle {
        let mut object = self.factory.allocate_object();
        build(&mut object, &mut self.factory);
        self.objects.add(object)
    }

    /// Tear the level down and return every system to its initial state
    ///
    /// Returns the pools that still had instances checked out afterwards.
    pub fn restart(&mut self) -> Vec<PoolReport> {
        self.objects.clear(&mut self.factory);
        self.systems.reset();
        self.last_commit = CommitSummary::default();

        let leaks = self.factory.tracker().leaks();
        if leaks.is_empty() {
            log::info!("Restarted cleanly");
        } else {
            log::warn!("Restarted with {} leaking pool(s)", leaks.len());
        }
        leaks
    }

    /// Hand the last finished frame's draws to `target`
    ///
    /// `target` must have been created with the configured
    /// `render_queue_capacity`.
    pub fn take_frame(&mut self, target: &mut RenderQueue) {
        self.systems.render_queue.swap_into(target);
    }

    /// Fallible version of [`take_frame`](Self::take_frame)
    pub fn try_take_frame(&mut self, target: &mut RenderQueue) -> CoreResult<()> {
        self.systems.render_queue.try_swap_into(target)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut SystemRegistry {
        &mut self.systems
    }

    pub fn factory(&self) -> &GameObjectFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut GameObjectFactory {
        &mut self.factory
    }

    pub fn objects(&self) -> &GameObjectManager {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut GameObjectManager {
        &mut self.objects
    }

    /// What the last commit changed
    pub fn last_commit(&self) -> CommitSummary {
        self.last_commit
    }
}
