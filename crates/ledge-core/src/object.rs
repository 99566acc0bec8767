//! Object Lifecycle
//!
//! Small capability traits shared by everything the managers drive. A type
//! opts into exactly the capabilities it has: per-frame update, reset for
//! reuse, and an execution phase.

use serde::{Deserialize, Serialize};

/// Per-frame update, dispatched by an [`ObjectManager`](crate::manager::ObjectManager)
///
/// `P` is whatever the owner hands down: a game object's state for
/// components, the system registry for game objects.
pub trait Updatable<P: ?Sized> {
    /// Advance by `time_delta` seconds of game time
    fn update(&mut self, time_delta: f32, parent: &mut P);
}

/// Return to the default state so a pooled instance can be reused
///
/// Implementations must be idempotent: resetting twice is observably the
/// same as resetting once.
pub trait Resettable {
    /// Re-initialize to the default state
    fn reset(&mut self);
}

/// Execution bucket of an object within a frame
pub trait Phased {
    /// Phase this object runs in; treat as fixed once the object is managed
    fn phase(&self) -> Phase;
}

/// Ordered execution buckets within one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// Decisions: input, AI, state transitions
    Think = 0,
    /// Forces such as gravity
    Physics = 1,
    /// Fix-ups after forces
    PostPhysics = 2,
    /// Velocity and position integration
    Movement = 3,
    /// Overlap queries
    CollisionDetection = 4,
    /// Reacting to contacts
    CollisionResponse = 5,
    /// Fix-ups after collision
    PostCollision = 6,
    /// Animation selection
    Animation = 7,
    /// Last chance to adjust before drawing
    PreDraw = 8,
    /// Submit to the render queue
    Draw = 9,
    /// End-of-frame bookkeeping
    FrameEnd = 10,
}

impl Phase {
    /// Every phase in execution order
    pub const ALL: [Phase; 11] = [
        Phase::Think,
        Phase::Physics,
        Phase::PostPhysics,
        Phase::Movement,
        Phase::CollisionDetection,
        Phase::CollisionResponse,
        Phase::PostCollision,
        Phase::Animation,
        Phase::PreDraw,
        Phase::Draw,
        Phase::FrameEnd,
    ];

    /// Position of this phase in execution order
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Phase at `index` in execution order
    pub fn from_index(index: u8) -> Option<Phase> {
        Self::ALL.get(usize::from(index)).copied()
    }
}

/// Identity of one membership in a manager
///
/// Handles are issued in strictly increasing order, which doubles as the
/// insertion order used to break ties between equal phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw handle value
    pub fn id(&self) -> u64 {
        self.0
    }
}
