//! # Ledge Core
//!
//! Core runtime library for the Ledge 2D platformer engine.
//!
//! Everything here is sized up front. Once a level is loaded, frames run
//! without heap allocation:
//! - **Containers**: fixed-capacity, comparator-driven sortable storage
//! - **Pools**: pre-built instances checked out and back in
//! - **Managers**: deferred add/remove with a single commit point per frame,
//!   phase-ordered execution for components
//! - **Game objects**: a shared state record driven by sibling components
//! - **Systems**: time, input, channels, events and the render queue, reached
//!   through an explicit [`SystemRegistry`]

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod channel;
pub mod components;
pub mod container;
pub mod events;
pub mod factory;
pub mod game_object;
pub mod game_object_manager;
pub mod input;
pub mod manager;
pub mod memory;
pub mod object;
pub mod pool;
pub mod registry;
pub mod render_queue;
pub mod root;
pub mod sort;
pub mod time;

pub use container::FixedCapacityContainer;
pub use factory::GameObjectFactory;
pub use game_object::{ActionType, ComponentContext, GameComponent, GameObject, ObjectState};
pub use game_object_manager::GameObjectManager;
pub use manager::{CommitSummary, ObjectManager, PhasedObjectManager, Removal};
pub use object::{ObjectHandle, Phase, Phased, Resettable, Updatable};
pub use pool::{GameComponentPool, ObjectPool, VectorPool};
pub use registry::{CollisionSystem, SoundSystem, SystemRegistry};
pub use root::GameRoot;
pub use sort::SortAlgorithm;
pub use time::TimeSystem;

/// Core engine errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("container capacity of {capacity} exceeded")]
    CapacityExceeded { capacity: usize },

    #[error("pool '{pool}' exhausted: all {capacity} instances allocated")]
    PoolExhausted { pool: &'static str, capacity: usize },

    #[error("pool '{pool}' overflow: released more instances than its capacity of {capacity}")]
    PoolOverflow { pool: &'static str, capacity: usize },

    #[error("no component pool registered for {0}")]
    UnknownComponentKind(&'static str),

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Engine configuration
///
/// Every fixed capacity in the engine comes from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum concurrent game objects
    pub max_game_objects: usize,
    /// Maximum components attached to one game object
    pub max_components_per_object: usize,
    /// Instances pre-built per component kind
    pub component_pool_size: usize,
    /// Scratch vectors available to components
    pub vector_pool_size: usize,
    /// Maximum named channels
    pub max_channels: usize,
    /// Maximum drawables scheduled per frame
    pub render_queue_capacity: usize,
    /// Largest frame delta fed to the simulation, in seconds
    pub max_frame_delta: f32,
    /// Target frame rate of the game thread
    pub target_fps: u32,
    /// Default distance from the camera focus beyond which objects sleep
    pub activation_radius: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_game_objects: 384,
            max_components_per_object: 24,
            component_pool_size: 32,
            vector_pool_size: 128,
            max_channels: 32,
            render_queue_capacity: 512,
            max_frame_delta: 0.1,
            target_fps: 60,
            activation_radius: 1000.0,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| CoreError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults on any problem
    ///
    /// Malformed content is logged and never fatal.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .map_err(CoreError::from)
            .and_then(|json| Self::from_json_str(&json));

        match loaded {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Using default engine config, {} unusable: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Target duration of one frame in seconds
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }

    fn validate(&self) -> CoreResult<()> {
        let capacities = [
            ("max_game_objects", self.max_game_objects),
            ("max_components_per_object", self.max_components_per_object),
            ("component_pool_size", self.component_pool_size),
            ("vector_pool_size", self.vector_pool_size),
            ("max_channels", self.max_channels),
            ("render_queue_capacity", self.render_queue_capacity),
        ];
        if let Some((name, _)) = capacities.iter().find(|(_, value)| *value == 0) {
            return Err(CoreError::Config(format!("{name} must be greater than zero")));
        }
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(CoreError::Config("max_frame_delta must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_game_objects, 384);
        assert_eq!(config.target_fps, 60);
        assert!((config.frame_duration() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_config() {
        let config = EngineConfig::from_json_str(r#"{ "max_game_objects": 64 }"#).unwrap();
        assert_eq!(config.max_game_objects, 64);
        assert_eq!(config.vector_pool_size, 128);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "max_channels": 0 }"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_missing_config_falls_back() {
        let config = EngineConfig::load_or_default("/nonexistent/ledge.json");
        assert_eq!(config, EngineConfig::default());
    }
}
