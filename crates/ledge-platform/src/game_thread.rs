//! Game Thread
//!
//! Runs a [`GameRoot`] on a dedicated thread. Frames are paced to the target
//! rate, deltas are measured from the wall clock and clamped, and the host
//! steers the loop through commands on a crossbeam channel. Input events
//! travel the same channel so they are applied between frames, stamped with
//! the game time they arrive at.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use ledge_core::{EngineConfig, GameRoot};
use parking_lot::Mutex;

use crate::input::{InputEvent, InputTranslator};
use crate::timer::FrameProfiler;
use crate::{PlatformError, PlatformResult};

/// Messages from the host to the game thread
#[derive(Debug, Clone, PartialEq)]
pub enum GameCommand {
    /// Stop running frames until resumed
    Pause,
    /// Continue after a pause; the paused span is not simulated
    Resume,
    /// Leave the loop and hand the root back
    Quit,
    /// Raw input to translate before the next frame
    Input(InputEvent),
}

/// Pacing parameters for the game loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameThreadConfig {
    /// Target frame duration
    pub frame_duration: Duration,
    /// Largest delta handed to the simulation, in seconds
    pub max_frame_delta: f32,
}

impl From<&EngineConfig> for GameThreadConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            frame_duration: Duration::from_secs_f32(config.frame_duration()),
            max_frame_delta: config.max_frame_delta,
        }
    }
}

/// Called after every frame with the root, e.g. to publish the render queue
pub type FrameHook = Box<dyn FnMut(&mut GameRoot) + Send + 'static>;

/// Handle to a running game loop
pub struct GameThread {
    commands: Sender<GameCommand>,
    handle: Option<JoinHandle<GameRoot>>,
    paused: Arc<AtomicBool>,
    frames: Arc<AtomicU64>,
    profiler: Arc<Mutex<FrameProfiler>>,
}

struct GameLoop {
    root: GameRoot,
    config: GameThreadConfig,
    translator: InputTranslator,
    on_frame: Option<FrameHook>,
    commands: Receiver<GameCommand>,
    paused: Arc<AtomicBool>,
    frames: Arc<AtomicU64>,
    profiler: Arc<Mutex<FrameProfiler>>,
}

impl GameThread {
    /// Start running `root` on a thread named `ledge-game`
    pub fn spawn(
        root: GameRoot,
        translator: InputTranslator,
        on_frame: Option<FrameHook>,
    ) -> PlatformResult<Self> {
        let config = GameThreadConfig::from(root.config());
        Self::spawn_with(root, config, translator, on_frame)
    }

    /// Start running `root` with explicit pacing
    pub fn spawn_with(
        root: GameRoot,
        config: GameThreadConfig,
        translator: InputTranslator,
        on_frame: Option<FrameHook>,
    ) -> PlatformResult<Self> {
        let (sender, receiver) = unbounded();
        let paused = Arc::new(AtomicBool::new(false));
        let frames = Arc::new(AtomicU64::new(0));
        let profiler = Arc::new(Mutex::new(FrameProfiler::default()));

        let game_loop = GameLoop {
            root,
            config,
            translator,
            on_frame,
            commands: receiver,
            paused: Arc::clone(&paused),
            frames: Arc::clone(&frames),
            profiler: Arc::clone(&profiler),
        };

        let name = "ledge-game".to_string();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || game_loop.run())
            .map_err(|source| PlatformError::ThreadSpawn { name, source })?;

        log::info!(
            "Game thread started at {:.1} ms per frame",
            config.frame_duration.as_secs_f64() * 1000.0
        );

        Ok(Self {
            commands: sender,
            handle: Some(handle),
            paused,
            frames,
            profiler,
        })
    }

    /// Send a command to the loop
    pub fn send(&self, command: GameCommand) -> PlatformResult<()> {
        self.commands
            .send(command)
            .map_err(|_| PlatformError::Disconnected)
    }

    pub fn pause(&self) -> PlatformResult<()> {
        self.send(GameCommand::Pause)
    }

    pub fn resume(&self) -> PlatformResult<()> {
        self.send(GameCommand::Resume)
    }

    /// Forward raw input to the loop
    pub fn input(&self, event: InputEvent) -> PlatformResult<()> {
        self.send(GameCommand::Input(event))
    }

    /// Whether the loop has acknowledged a pause
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Frames simulated so far
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Copy of the loop's frame statistics
    pub fn profile(&self) -> FrameProfiler {
        self.profiler.lock().clone()
    }

    /// Stop the loop and take the root back
    pub fn quit(mut self) -> PlatformResult<GameRoot> {
        // A loop that already exited has dropped its receiver
        let _ = self.commands.send(GameCommand::Quit);
        let handle = self.handle.take().ok_or(PlatformError::Disconnected)?;
        handle
            .join()
            .map_err(|_| PlatformError::ThreadPanicked("ledge-game".to_string()))
    }
}

impl Drop for GameThread {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.commands.send(GameCommand::Quit);
            let _ = handle.join();
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

impl GameLoop {
    fn run(mut self) -> GameRoot {
        let mut last_frame = Instant::now();

        loop {
            if let Flow::Quit = self.drain_commands() {
                break;
            }

            if self.paused.load(Ordering::Acquire) {
                match self.wait_while_paused() {
                    Flow::Quit => break,
                    Flow::Continue => {
                        // Time spent paused is not simulated
                        last_frame = Instant::now();
                        continue;
                    }
                }
            }

            let frame_start = Instant::now();
            let delta = (frame_start - last_frame)
                .as_secs_f32()
                .min(self.config.max_frame_delta);
            last_frame = frame_start;

            self.root.update(delta);
            if let Some(on_frame) = self.on_frame.as_mut() {
                on_frame(&mut self.root);
            }

            let work = frame_start.elapsed();
            {
                let mut profiler = self.profiler.lock();
                profiler.record_duration(work);
                if profiler.frame_count() % 600 == 0 {
                    profiler.trace();
                }
            }
            self.frames.fetch_add(1, Ordering::AcqRel);

            if let Some(remaining) = self.config.frame_duration.checked_sub(work) {
                if let Flow::Quit = self.sleep(remaining) {
                    break;
                }
            }
        }

        log::info!(
            "Game thread stopped after {} frames",
            self.frames.load(Ordering::Acquire)
        );
        self.root
    }

    fn handle(&mut self, command: GameCommand) -> Flow {
        match command {
            GameCommand::Pause => {
                log::debug!("Game paused");
                self.paused.store(true, Ordering::Release);
                // Nothing should be held down when play resumes
                self.translator
                    .release_all(&mut self.root.systems_mut().input);
            }
            GameCommand::Resume => {
                if self.paused.swap(false, Ordering::AcqRel) {
                    log::debug!("Game resumed");
                }
            }
            GameCommand::Quit => return Flow::Quit,
            GameCommand::Input(event) => {
                let systems = self.root.systems_mut();
                let time = systems.time.game_time();
                self.translator.apply(event, time, &mut systems.input);
            }
        }
        Flow::Continue
    }

    fn drain_commands(&mut self) -> Flow {
        while let Ok(command) = self.commands.try_recv() {
            if let Flow::Quit = self.handle(command) {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    fn wait_while_paused(&mut self) -> Flow {
        while self.paused.load(Ordering::Acquire) {
            match self.commands.recv() {
                Ok(command) => {
                    if let Flow::Quit = self.handle(command) {
                        return Flow::Quit;
                    }
                }
                Err(_) => return Flow::Quit,
            }
        }
        Flow::Continue
    }

    /// Sleep until the next frame is due, waking early for commands
    fn sleep(&mut self, duration: Duration) -> Flow {
        match self.commands.recv_timeout(duration) {
            Ok(command) => self.handle(command),
            Err(RecvTimeoutError::Timeout) => Flow::Continue,
            Err(RecvTimeoutError::Disconnected) => Flow::Quit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;
    use ledge_core::input::Button;
    use ledge_core::render_queue::RenderQueue;

    fn fast_config() -> GameThreadConfig {
        GameThreadConfig {
            frame_duration: Duration::from_millis(2),
            max_frame_delta: 0.1,
        }
    }

    fn root() -> GameRoot {
        GameRoot::new(EngineConfig {
            max_game_objects: 8,
            component_pool_size: 8,
            ..EngineConfig::default()
        })
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn test_runs_frames_and_returns_root() {
        let game = GameThread::spawn_with(root(), fast_config(), InputTranslator::default(), None)
            .unwrap();
        assert!(wait_for(|| game.frames() >= 5));

        let root = game.quit().unwrap();
        assert!(root.systems().time.game_time() > 0.0);
        assert!(root.systems().time.frame_count() >= 5);
    }

    #[test]
    fn test_pause_stops_simulation() {
        let game = GameThread::spawn_with(root(), fast_config(), InputTranslator::default(), None)
            .unwrap();
        assert!(wait_for(|| game.frames() >= 2));

        game.pause().unwrap();
        assert!(wait_for(|| game.is_paused()));
        let frozen_at = game.frames();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(game.frames(), frozen_at);

        game.resume().unwrap();
        assert!(wait_for(|| game.frames() > frozen_at));
        game.quit().unwrap();
    }

    #[test]
    fn test_input_reaches_simulation() {
        let game = GameThread::spawn_with(root(), fast_config(), InputTranslator::default(), None)
            .unwrap();
        game.input(InputEvent::KeyDown(KeyCode::Right)).unwrap();
        assert!(wait_for(|| game.frames() >= 2));

        let root = game.quit().unwrap();
        assert!(root.systems().input.pressed(Button::Right));
    }

    #[test]
    fn test_frame_hook_and_profile() {
        let published = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&published);
        let root = root();
        let capacity = root.config().render_queue_capacity;
        let mut frame = RenderQueue::new(capacity);
        let hook: FrameHook = Box::new(move |root| {
            root.take_frame(&mut frame);
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let game = GameThread::spawn_with(root, fast_config(), InputTranslator::default(), Some(hook))
            .unwrap();
        assert!(wait_for(|| game.frames() >= 3));
        let profile = game.profile();
        assert!(profile.frame_count() >= 3);
        let root = game.quit().unwrap();
        assert_eq!(root.systems().render_queue.capacity(), capacity);
        assert!(published.load(Ordering::Relaxed) >= 3);
    }

    #[test]
    fn test_pacing_config_from_engine() {
        let config = GameThreadConfig::from(&EngineConfig {
            target_fps: 50,
            ..EngineConfig::default()
        });
        assert!((config.frame_duration.as_secs_f64() - 0.020).abs() < 1e-6);
        assert_eq!(config.max_frame_delta, 0.1);
    }
}
