//! System Registry
//!
//! The per-simulation context every game object and component receives
//! during its update. It replaces process-wide singletons: two simulations
//! own two registries and never observe each other.

use std::fmt;
use std::sync::Arc;

use glam::Vec2;

use crate::channel::ChannelSystem;
use crate::events::EventRecorder;
use crate::game_object::ActionType;
use crate::input::InputSystem;
use crate::object::Resettable;
use crate::pool::VectorPool;
use crate::render_queue::RenderQueue;
use crate::time::TimeSystem;
use crate::EngineConfig;

/// Level collision queries
pub trait CollisionSystem: Send {
    /// Height of the floor supporting a body at `(x, y)`, if there is one
    fn floor_height(&self, x: f32, y: f32) -> Option<f32>;
}

/// Sound identifier understood by the active [`SoundSystem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundId(pub u32);

/// Fire-and-forget sound playback
pub trait SoundSystem: Send {
    fn play(&mut self, sound: SoundId, volume: f32);
}

/// Endless flat floor, optionally with a pit, for headless runs and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatFloor {
    pub height: f32,
    /// Horizontal span `[start, end)` with no floor
    pub pit: Option<(f32, f32)>,
}

impl CollisionSystem for FlatFloor {
    fn floor_height(&self, x: f32, _y: f32) -> Option<f32> {
        match self.pit {
            Some((start, end)) if x >= start && x < end => None,
            _ => Some(self.height),
        }
    }
}

/// What the rest of the world may know about the player this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSnapshot {
    pub position: Vec2,
    pub facing_direction: Vec2,
    pub action: ActionType,
    pub life: i32,
}

/// Systems shared by every object of one simulation
pub struct SystemRegistry {
    pub time: TimeSystem,
    pub input: InputSystem,
    pub channels: ChannelSystem,
    pub vector_pool: VectorPool,
    pub render_queue: RenderQueue,
    pub events: Arc<EventRecorder>,
    pub collision: Option<Box<dyn CollisionSystem>>,
    pub sound: Option<Box<dyn SoundSystem>>,
    /// Published by the game object manager before objects update
    pub player: Option<PlayerSnapshot>,
}

impl SystemRegistry {
    /// Create every system sized by `config`
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            time: TimeSystem::new(),
            input: InputSystem::new(),
            channels: ChannelSystem::new(config.max_channels),
            vector_pool: VectorPool::new(config.vector_pool_size),
            render_queue: RenderQueue::new(config.render_queue_capacity),
            events: Arc::new(EventRecorder::new()),
            collision: None,
            sound: None,
            player: None,
        }
    }

    /// Install the level's collision system
    pub fn with_collision(mut self, collision: impl CollisionSystem + 'static) -> Self {
        self.collision = Some(Box::new(collision));
        self
    }

    /// Install a sound backend
    pub fn with_sound(mut self, sound: impl SoundSystem + 'static) -> Self {
        self.sound = Some(Box::new(sound));
        self
    }

    /// Play `sound` if a sound backend is installed
    pub fn play_sound(&mut self, sound: SoundId, volume: f32) {
        if let Some(backend) = self.sound.as_mut() {
            backend.play(sound, volume);
        }
    }

    /// Point objects are activated around: the player, or the origin
    pub fn camera_focus(&self) -> Vec2 {
        self.player.map_or(Vec2::ZERO, |player| player.position)
    }
}

impl Resettable for SystemRegistry {
    /// Reset every system at a restart boundary
    ///
    /// Channel registrations and installed backends survive; values,
    /// clocks, counters and the player snapshot do not.
    fn reset(&mut self) {
        self.time.reset();
        self.input.reset();
        self.channels.reset();
        self.render_queue.reset();
        self.events.reset();
        self.player = None;
    }
}

impl fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemRegistry")
            .field("time", &self.time)
            .field("channels", &self.channels.len())
            .field("render_queue", &self.render_queue.len())
            .field("collision", &self.collision.is_some())
            .field("sound", &self.sound.is_some())
            .field("player", &self.player)
            .finish()
    }
}
