//! Frame Exchange
//!
//! Hands finished frames from the simulation thread to the render thread.
//! Both sides swap queues with a shared slot under a mutex, so storage
//! circulates between three queues and nothing is copied or allocated.
//! The render thread always sees the newest frame; a frame the renderer
//! never picked up is overwritten by the next one.

use std::time::{Duration, Instant};

use ledge_core::render_queue::RenderQueue;
use parking_lot::{Condvar, Mutex};

struct Slot {
    queue: RenderQueue,
    fresh: bool,
    published: u64,
    skipped: u64,
}

/// Single-slot mailbox of sorted frames
pub struct FrameExchange {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl FrameExchange {
    /// Create an exchange for frames of up to `capacity` draws
    pub fn new(capacity: usize) -> Self {
        Self {
            slot: Mutex::new(Slot {
                queue: RenderQueue::new(capacity),
                fresh: false,
                published: 0,
                skipped: 0,
            }),
            ready: Condvar::new(),
        }
    }

    /// Publish the frame in `frame`, leaving `frame` empty for reuse
    pub fn publish(&self, frame: &mut RenderQueue) {
        let mut slot = self.slot.lock();
        if slot.fresh {
            slot.skipped += 1;
            log::trace!("Render thread skipped a frame");
        }
        frame.swap_into(&mut slot.queue);
        slot.fresh = true;
        slot.published += 1;
        drop(slot);
        self.ready.notify_one();
    }

    /// Take the newest frame into `target` if one arrived since the last take
    pub fn try_take(&self, target: &mut RenderQueue) -> bool {
        let mut slot = self.slot.lock();
        Self::take_locked(&mut slot, target)
    }

    /// Wait up to `timeout` for a new frame and take it into `target`
    pub fn take(&self, target: &mut RenderQueue, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        while !slot.fresh {
            if self.ready.wait_until(&mut slot, deadline).timed_out() {
                break;
            }
        }
        Self::take_locked(&mut slot, target)
    }

    fn take_locked(slot: &mut Slot, target: &mut RenderQueue) -> bool {
        if !slot.fresh {
            return false;
        }
        slot.queue.swap_into(target);
        slot.fresh = false;
        true
    }

    /// Frames published so far
    pub fn published(&self) -> u64 {
        self.slot.lock().published
    }

    /// Frames overwritten before the render thread took them
    pub fn skipped(&self) -> u64 {
        self.slot.lock().skipped
    }
}

impl std::fmt::Debug for FrameExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("FrameExchange")
            .field("fresh", &slot.fresh)
            .field("published", &slot.published)
            .field("skipped", &slot.skipped)
            .finish()
    }
}
