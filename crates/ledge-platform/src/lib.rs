//! # Ledge Platform
//!
//! Platform boundary for the Ledge engine.
//!
//! This crate sits between the host (an activity, a window, a test harness)
//! and the simulation:
//! - **Input**: captured key and touch events translated into core buttons
//! - **Game thread**: frame pacing plus pause, resume and quit control
//! - **Watchdog**: stall detection for the render path
//! - **Timers**: frame profiling and scoped timing

pub mod game_thread;
pub mod input;
pub mod timer;
pub mod watchdog;

pub use game_thread::{GameCommand, GameThread, GameThreadConfig};
pub use input::{InputEvent, InputTranslator, KeyCode, KeyMap, TouchArea};
pub use timer::{FrameProfiler, ScopedTimer};
pub use watchdog::Watchdog;

use thiserror::Error;

/// Platform-specific errors
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Failed to spawn thread '{name}': {source}")]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Thread '{0}' panicked")]
    ThreadPanicked(String),

    #[error("Game thread is no longer running")]
    Disconnected,
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;
