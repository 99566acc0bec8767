//! Allocation Tracking
//!
//! Opt-in leak detection for pools. A pool given a [`PoolStats`] records
//! every checkout and return; an [`AllocationTracker`] groups the stats of
//! many pools so outstanding instances can be reported at restart
//! boundaries, when every pool is expected to be full again.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Checkout statistics for one pool
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Total allocations since the last reset
    allocations: AtomicUsize,
    /// Total releases since the last reset
    releases: AtomicUsize,
    /// Instances currently checked out
    outstanding: AtomicUsize,
    /// Highest `outstanding` seen
    peak: AtomicUsize,
}

impl PoolStats {
    /// Create zeroed stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a checkout
    pub fn record_allocate(&self) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        let now = self.outstanding.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak.fetch_max(now, Ordering::Relaxed);
    }

    /// Record a return
    pub fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
        // Saturate rather than wrap if a pool was pre-seeded with foreign instances
        let _ = self
            .outstanding
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_sub(1)));
    }

    /// Instances currently checked out
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Relaxed)
    }

    /// Highest number of instances checked out at once
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    /// Total allocations
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Total releases
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }

    /// Zero every counter
    pub fn reset(&self) {
        self.allocations.store(0, Ordering::Relaxed);
        self.releases.store(0, Ordering::Relaxed);
        self.outstanding.store(0, Ordering::Relaxed);
        self.peak.store(0, Ordering::Relaxed);
    }
}

/// One row of an [`AllocationTracker`] report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolReport {
    /// Pool name given at registration
    pub name: String,
    /// Instances currently checked out
    pub outstanding: usize,
    /// Highest number checked out at once
    pub peak: usize,
}

/// Registry of pool statistics for leak reporting
#[derive(Debug, Default)]
pub struct AllocationTracker {
    pools: Mutex<Vec<(String, Arc<PoolStats>)>>,
}

impl AllocationTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pool and get the stats it should record into
    pub fn register(&self, name: &str) -> Arc<PoolStats> {
        let stats = Arc::new(PoolStats::new());
        self.pools.lock().push((name.to_string(), Arc::clone(&stats)));
        stats
    }

    /// Number of registered pools
    pub fn pool_count(&self) -> usize {
        self.pools.lock().len()
    }

    /// Usage of every registered pool
    pub fn report(&self) -> Vec<PoolReport> {
        self.pools
            .lock()
            .iter()
            .map(|(name, stats)| PoolReport {
                name: name.clone(),
                outstanding: stats.outstanding(),
                peak: stats.peak(),
            })
            .collect()
    }

    /// Pools that still have instances checked out, logging each
    pub fn leaks(&self) -> Vec<PoolReport> {
        let leaks: Vec<PoolReport> = self
            .report()
            .into_iter()
            .filter(|row| row.outstanding > 0)
            .collect();
        for row in &leaks {
            log::warn!("Pool '{}' leaked {} instance(s)", row.name, row.outstanding);
        }
        leaks
    }
}
