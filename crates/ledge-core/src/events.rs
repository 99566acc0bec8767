//! Game Event Recording
//!
//! Counters written by the simulation thread and read by UI code running on
//! other threads, so every access goes through one lock.

use glam::Vec2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Counted gameplay events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    RobotsDestroyed,
    PearlsCollected,
    PearlsTotal,
    PlayerDeaths,
}

impl GameEvent {
    /// Every counted event
    pub const ALL: [GameEvent; 4] = [
        GameEvent::RobotsDestroyed,
        GameEvent::PearlsCollected,
        GameEvent::PearlsTotal,
        GameEvent::PlayerDeaths,
    ];
}

/// Copy of every counter at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub robots_destroyed: u32,
    pub pearls_collected: u32,
    pub pearls_total: u32,
    pub player_deaths: u32,
    pub last_death_position: Option<Vec2>,
}

impl EventSnapshot {
    /// Counter for `event`
    pub fn count(&self, event: GameEvent) -> u32 {
        match event {
            GameEvent::RobotsDestroyed => self.robots_destroyed,
            GameEvent::PearlsCollected => self.pearls_collected,
            GameEvent::PearlsTotal => self.pearls_total,
            GameEvent::PlayerDeaths => self.player_deaths,
        }
    }

    fn count_mut(&mut self, event: GameEvent) -> &mut u32 {
        match event {
            GameEvent::RobotsDestroyed => &mut self.robots_destroyed,
            GameEvent::PearlsCollected => &mut self.pearls_collected,
            GameEvent::PearlsTotal => &mut self.pearls_total,
            GameEvent::PlayerDeaths => &mut self.player_deaths,
        }
    }
}

/// Thread-safe event counters, shared as `Arc<EventRecorder>`
#[derive(Debug, Default)]
pub struct EventRecorder {
    state: Mutex<EventSnapshot>,
}

impl EventRecorder {
    /// Create a recorder with every counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `event`
    pub fn increment(&self, event: GameEvent) {
        let mut state = self.state.lock();
        let counter = state.count_mut(event);
        *counter = counter.saturating_add(1);
    }

    /// Current count of `event`
    pub fn count(&self, event: GameEvent) -> u32 {
        self.state.lock().count(event)
    }

    /// Remember where the player last died
    pub fn set_last_death_position(&self, position: Vec2) {
        self.state.lock().last_death_position = Some(position);
    }

    /// Where the player last died, if they have
    pub fn last_death_position(&self) -> Option<Vec2> {
        self.state.lock().last_death_position
    }

    /// Copy every counter under a single lock
    pub fn snapshot(&self) -> EventSnapshot {
        *self.state.lock()
    }

    /// Zero every counter and forget the death position
    pub fn reset(&self) {
        *self.state.lock() = EventSnapshot::default();
    }
}
