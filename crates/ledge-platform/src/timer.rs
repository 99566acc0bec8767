//! Frame Timing
//!
//! Rolling frame-time statistics for the game thread and scoped timers for
//! ad hoc measurements.

use std::time::{Duration, Instant};

/// Rolling frame-time statistics over the last `window` frames
#[derive(Debug, Clone)]
pub struct FrameProfiler {
    samples: Vec<f64>,
    index: usize,
    count: usize,
    frame_count: u64,
    total_time: f64,
}

impl FrameProfiler {
    /// Samples kept when no window is given
    pub const DEFAULT_WINDOW: usize = 60;

    /// Create a profiler averaging over `window` frames
    pub fn new(window: usize) -> Self {
        Self {
            samples: vec![0.0; window.max(1)],
            index: 0,
            count: 0,
            frame_count: 0,
            total_time: 0.0,
        }
    }

    /// Record one frame that took `seconds`
    pub fn record(&mut self, seconds: f64) {
        self.samples[self.index] = seconds;
        self.index = (self.index + 1) % self.samples.len();
        self.count = (self.count + 1).min(self.samples.len());
        self.frame_count += 1;
        self.total_time += seconds;
    }

    /// Record one frame from a duration
    pub fn record_duration(&mut self, duration: Duration) {
        self.record(duration.as_secs_f64());
    }

    fn window(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().take(self.count).copied()
    }

    /// Average frame time in the window, in seconds
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.window().sum::<f64>() / self.count as f64
    }

    /// Shortest frame in the window, in seconds
    pub fn min(&self) -> f64 {
        self.window().reduce(f64::min).unwrap_or(0.0)
    }

    /// Longest frame in the window, in seconds
    pub fn max(&self) -> f64 {
        self.window().reduce(f64::max).unwrap_or(0.0)
    }

    pub fn average_ms(&self) -> f64 {
        self.average() * 1000.0
    }

    pub fn min_ms(&self) -> f64 {
        self.min() * 1000.0
    }

    pub fn max_ms(&self) -> f64 {
        self.max() * 1000.0
    }

    /// Frame rate implied by the window average
    pub fn fps(&self) -> f64 {
        let average = self.average();
        if average > 0.0 { 1.0 / average } else { 0.0 }
    }

    /// Frames recorded since creation or the last reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of every recorded frame, in seconds
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Samples currently in the window
    pub fn sample_count(&self) -> usize {
        self.count
    }

    /// Emit the current statistics under the `timing` target
    pub fn trace(&self) {
        tracing::debug!(
            target: "timing",
            frames = self.frame_count,
            average_ms = self.average_ms(),
            min_ms = self.min_ms(),
            max_ms = self.max_ms(),
            "Frame profile"
        );
    }

    /// Forget every sample
    pub fn reset(&mut self) {
        self.samples.fill(0.0);
        self.index = 0;
        self.count = 0;
        self.frame_count = 0;
        self.total_time = 0.0;
    }
}

impl Default for FrameProfiler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

/// Timer that reports its duration when dropped
pub struct ScopedTimer<'a> {
    name: &'a str,
    start: Instant,
    callback: Option<Box<dyn FnMut(&str, Duration) + 'a>>,
}

impl<'a> ScopedTimer<'a> {
    /// Time a scope and hand the duration to `callback`
    pub fn new<F>(name: &'a str, callback: F) -> Self
    where
        F: FnMut(&str, Duration) + 'a,
    {
        Self {
            name,
            start: Instant::now(),
            callback: Some(Box::new(callback)),
        }
    }

    /// Time a scope and emit the duration through tracing
    pub fn traced(name: &'a str) -> Self {
        Self {
            name,
            start: Instant::now(),
            callback: None,
        }
    }

    /// Time elapsed so far
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        match self.callback.take() {
            Some(mut callback) => callback(self.name, duration),
            None => tracing::debug!(
                target: "timing",
                name = self.name,
                duration_us = duration.as_micros() as u64,
                "Timer completed"
            ),
        }
    }
}
