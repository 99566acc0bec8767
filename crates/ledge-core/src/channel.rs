//! Channels
//!
//! Named value cells that let otherwise unrelated components talk without
//! references to each other. Names are resolved once, at registration, into
//! a [`ChannelId`]; per-frame reads and writes go through the id.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::container::FixedCapacityContainer;
use crate::object::Resettable;
use crate::{CoreError, CoreResult};

/// Index of a registered channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(usize);

impl ChannelId {
    /// Registration slot of this channel
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Value held by a channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ChannelValue {
    #[default]
    Empty,
    Bool(bool),
    Float(f32),
}

impl ChannelValue {
    /// Boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ChannelValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Float payload, if any
    pub fn as_float(&self) -> Option<f32> {
        match self {
            ChannelValue::Float(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Channel {
    name: String,
    value: ChannelValue,
}

/// Name lookup entry, kept sorted by name
#[derive(Debug)]
struct IndexEntry {
    name: String,
    id: ChannelId,
}

fn by_name(a: &IndexEntry, b: &IndexEntry) -> Ordering {
    a.name.cmp(&b.name)
}

/// Fixed registry of named channels
#[derive(Debug)]
pub struct ChannelSystem {
    /// Channels in registration order; `ChannelId` indexes this
    channels: FixedCapacityContainer<Channel>,
    index: FixedCapacityContainer<IndexEntry>,
}

impl ChannelSystem {
    /// Create a registry with room for `capacity` channels
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: FixedCapacityContainer::new(capacity),
            index: FixedCapacityContainer::with_comparator(capacity, by_name),
        }
    }

    /// Register `name`, returning the existing id if already known
    pub fn register(&mut self, name: &str) -> CoreResult<ChannelId> {
        if let Some(id) = self.lookup(name) {
            return Ok(id);
        }

        let id = ChannelId(self.channels.len());
        self.channels.try_add(Channel {
            name: name.to_string(),
            value: ChannelValue::Empty,
        })?;
        self.index.add(IndexEntry {
            name: name.to_string(),
            id,
        });
        self.index.sort(false);
        log::debug!("Registered channel '{name}' as {}", id.index());
        Ok(id)
    }

    /// Resolve `name` to an id
    pub fn lookup(&self, name: &str) -> Option<ChannelId> {
        self.index
            .find_by(true, |entry| entry.name.as_str().cmp(name))
            .and_then(|slot| self.index.get(slot))
            .map(|entry| entry.id)
    }

    /// Current value of a channel
    pub fn get(&self, id: ChannelId) -> ChannelValue {
        self.channels
            .get(id.0)
            .map(|channel| channel.value)
            .unwrap_or_default()
    }

    /// Write a channel; ids from another registry are ignored
    pub fn set(&mut self, id: ChannelId, value: ChannelValue) {
        if let Some(channel) = self.channels.get_mut(id.0) {
            channel.value = value;
        }
    }

    /// Write a channel by name
    pub fn set_by_name(&mut self, name: &str, value: ChannelValue) -> CoreResult<()> {
        let id = self
            .lookup(name)
            .ok_or_else(|| CoreError::UnknownChannel(name.to_string()))?;
        self.set(id, value);
        Ok(())
    }

    /// Name a channel was registered under
    pub fn name(&self, id: ChannelId) -> Option<&str> {
        self.channels.get(id.0).map(|channel| channel.name.as_str())
    }

    /// Number of registered channels
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Check if no channel is registered
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl Resettable for ChannelSystem {
    /// Clear every value; registrations survive
    fn reset(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.value = ChannelValue::Empty;
        }
    }
}
