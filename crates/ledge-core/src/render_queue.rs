//! Render Queue
//!
//! The simulation's half of the rendering boundary. Components schedule
//! drawables here during the `Draw` phase; once the frame is finished the
//! sorted buffer is swapped out to the render thread. Nothing in this module
//! knows how drawables are drawn.

use std::cmp::Ordering;

use glam::Vec2;

use crate::container::FixedCapacityContainer;
use crate::object::Resettable;
use crate::{CoreError, CoreResult};

/// Opaque reference to a drawable owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableId(pub u32);

/// One scheduled draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderElement {
    pub drawable: DrawableId,
    /// Lower priorities draw first
    pub priority: i32,
    /// World-space position
    pub position: Vec2,
    pub scale: Vec2,
    /// Scheduling order within the frame
    pub sequence: u32,
}

fn by_priority(a: &RenderElement, b: &RenderElement) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then(a.sequence.cmp(&b.sequence))
}

/// Fixed-capacity, per-frame list of draws
#[derive(Debug)]
pub struct RenderQueue {
    elements: FixedCapacityContainer<RenderElement>,
    next_sequence: u32,
    /// Draws dropped this frame for lack of room
    dropped: usize,
}

impl RenderQueue {
    /// Create a queue with room for `capacity` draws per frame
    pub fn new(capacity: usize) -> Self {
        Self {
            elements: FixedCapacityContainer::with_comparator(capacity, by_priority),
            next_sequence: 0,
            dropped: 0,
        }
    }

    /// Schedule a draw for this frame
    ///
    /// When the queue is full the draw is dropped; the first drop of a frame
    /// is logged.
    pub fn schedule(&mut self, drawable: DrawableId, priority: i32, position: Vec2, scale: Vec2) {
        let element = RenderElement {
            drawable,
            priority,
            position,
            scale,
            sequence: self.next_sequence,
        };
        if self.elements.try_add(element).is_err() {
            if self.dropped == 0 {
                log::warn!(
                    "Render queue full at {} elements, dropping draws",
                    self.elements.capacity()
                );
            }
            self.dropped += 1;
            return;
        }
        self.next_sequence += 1;
    }

    /// Sort the frame's draws by priority, keeping scheduling order for ties
    pub fn finish_frame(&mut self) {
        self.elements.sort(false);
    }

    /// Exchange the finished frame with `other`, leaving this queue empty
    ///
    /// Whatever `other` held before is discarded. Storage changes hands
    /// instead of being copied, so the hand-off never allocates. Both queues
    /// must have the same capacity, otherwise the swap would resize them.
    pub fn try_swap_into(&mut self, other: &mut RenderQueue) -> CoreResult<()> {
        if other.capacity() != self.capacity() {
            return Err(CoreError::CapacityExceeded {
                capacity: other.capacity(),
            });
        }
        std::mem::swap(&mut self.elements, &mut other.elements);
        other.dropped = self.dropped;
        self.clear();
        Ok(())
    }

    /// Fatal version of [`try_swap_into`](Self::try_swap_into)
    pub fn swap_into(&mut self, other: &mut RenderQueue) {
        if let Err(err) = self.try_swap_into(other) {
            log::error!(
                "RenderQueue::swap_into: {err} (queue holds {})",
                self.capacity()
            );
            panic!("RenderQueue::swap_into: {err}");
        }
    }

    /// Drop every scheduled draw
    pub fn clear(&mut self) {
        self.elements.clear();
        self.next_sequence = 0;
        self.dropped = 0;
    }

    /// Scheduled draws in queue order
    pub fn elements(&self) -> &[RenderElement] {
        self.elements.as_slice()
    }

    /// Number of scheduled draws
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Maximum draws per frame
    pub fn capacity(&self) -> usize {
        self.elements.capacity()
    }

    /// Draws dropped this frame
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Resettable for RenderQueue {
    fn reset(&mut self) {
        self.clear();
    }
}
