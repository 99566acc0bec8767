//! Render Watchdog
//!
//! Supervises the render path from a separate thread. The renderer calls
//! [`Watchdog::acknowledge`] once per drawn frame; when no acknowledgement
//! arrives within the timeout, the stall handler runs. The default handler
//! logs the stall and aborts the process.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::{PlatformError, PlatformResult};

/// Runs when the render path stops acknowledging frames
pub type StallHandler = Box<dyn FnMut(Duration) + Send + 'static>;

struct WatchState {
    last_acknowledged: Instant,
    stopped: bool,
}

struct Shared {
    state: Mutex<WatchState>,
    wake: Condvar,
}

/// Stall detector for the render thread
pub struct Watchdog {
    shared: Arc<Shared>,
    timeout: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Watchdog {
    /// Start watching with the log-and-abort handler
    pub fn start(timeout: Duration) -> PlatformResult<Self> {
        Self::with_handler(
            timeout,
            Box::new(|stalled| {
                log::error!(
                    "Render thread stalled for {:.1} s, aborting",
                    stalled.as_secs_f32()
                );
                std::process::abort();
            }),
        )
    }

    /// Start watching with a custom stall handler
    ///
    /// The handler runs on the watchdog thread. After it returns, the clock
    /// restarts, so a lasting stall fires again one timeout later.
    pub fn with_handler(timeout: Duration, mut on_stall: StallHandler) -> PlatformResult<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(WatchState {
                last_acknowledged: Instant::now(),
                stopped: false,
            }),
            wake: Condvar::new(),
        });

        let watched = Arc::clone(&shared);
        let name = "ledge-watchdog".to_string();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let mut state = watched.state.lock();
                while !state.stopped {
                    let deadline = state.last_acknowledged + timeout;
                    let now = Instant::now();
                    if now < deadline {
                        watched.wake.wait_for(&mut state, deadline - now);
                        continue;
                    }

                    let stalled = now - state.last_acknowledged;
                    state.last_acknowledged = now;
                    // Acknowledgements must not wait on the handler
                    drop(state);
                    log::warn!("No frame acknowledged for {:.3} s", stalled.as_secs_f32());
                    on_stall(stalled);
                    state = watched.state.lock();
                }
            })
            .map_err(|source| PlatformError::ThreadSpawn { name, source })?;

        log::debug!("Watchdog started with a {timeout:?} timeout");
        Ok(Self {
            shared,
            timeout,
            handle: Some(handle),
        })
    }

    /// Record that a frame was drawn
    pub fn acknowledge(&self) {
        self.shared.state.lock().last_acknowledged = Instant::now();
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Stop watching and wait for the watchdog thread to exit
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.shared.state.lock().stopped = true;
        self.shared.wake.notify_all();
        if handle.join().is_err() {
            log::error!("Watchdog thread panicked");
        }
    }

    /// Whether the watchdog thread is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}
