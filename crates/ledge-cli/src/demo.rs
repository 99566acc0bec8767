//! Demo Level
//!
//! A small flat level for headless runs: a scripted player walking and
//! jumping past a row of attackers, with falling debris that expires on a
//! timer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Result, ensure};
use glam::Vec2;
use ledge_core::components::{
    AnimationComponent, AttackAtDistanceComponent, GravityComponent, GroundCollisionComponent,
    LifetimeComponent, MovementComponent, PlayerInputComponent, RenderComponent,
};
use ledge_core::events::{EventSnapshot, GameEvent};
use ledge_core::input::Button;
use ledge_core::registry::FlatFloor;
use ledge_core::render_queue::{DrawableId, RenderQueue};
use ledge_core::{ActionType, EngineConfig, GameRoot, SystemRegistry};
use ledge_platform::game_thread::FrameHook;
use ledge_platform::{
    FrameProfiler, GameThread, InputEvent, InputTranslator, KeyCode, ScopedTimer, Watchdog,
};
use ledge_render::{DrawableLibrary, FrameExchange, RenderContext, Renderer, Sprite, TextureId};
use serde::Serialize;

pub const PLAYER_DRAWABLE: DrawableId = DrawableId(1);
pub const ATTACKER_DRAWABLE: DrawableId = DrawableId(2);
pub const DEBRIS_DRAWABLE: DrawableId = DrawableId(3);

const ATTACKER_SPACING: f32 = 80.0;
const DEBRIS_HEIGHT: f32 = 200.0;
const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(5);

/// Root with a flat floor at height zero
pub fn demo_root(config: EngineConfig) -> GameRoot {
    let systems = SystemRegistry::new(&config).with_collision(FlatFloor {
        height: 0.0,
        pit: None,
    });
    GameRoot::with_systems(config, systems)
}

/// Spawn the player and `objects - 1` other objects
///
/// Every third non-player object is debris; the rest are attackers.
pub fn populate(root: &mut GameRoot, objects: usize) -> Result<()> {
    let config = root.config();
    ensure!(objects >= 1, "the demo level needs at least the player");
    ensure!(
        objects <= config.max_game_objects,
        "{objects} objects exceed max_game_objects ({})",
        config.max_game_objects
    );
    ensure!(
        objects <= config.component_pool_size,
        "{objects} objects exceed component_pool_size ({})",
        config.component_pool_size
    );

    spawn_player(root);
    for index in 1..objects {
        if index % 3 == 0 {
            spawn_debris(root, index);
        } else {
            spawn_attacker(root, index);
        }
    }
    log::info!("Demo level spawned {objects} objects");
    Ok(())
}

fn spawn_player(root: &mut GameRoot) {
    root.spawn(|object, factory| {
        object.state.is_player = true;
        object.state.current_action = ActionType::Idle;
        object.add(factory.allocate_component::<PlayerInputComponent>());
        object.add(factory.allocate_component::<GravityComponent>());
        object.add(factory.allocate_component::<MovementComponent>());
        object.add(factory.allocate_component::<GroundCollisionComponent>());
        object.add(factory.allocate_component::<AnimationComponent>());
        object.add(factory.allocate_component_with::<RenderComponent>(|render| {
            render.set_drawable(PLAYER_DRAWABLE);
            render.set_priority(10);
        }));
    });
}

fn spawn_attacker(root: &mut GameRoot, index: usize) {
    let x = index as f32 * ATTACKER_SPACING;
    root.spawn(|object, factory| {
        object.state.position = Vec2::new(x, 0.0);
        object.state.facing_direction = Vec2::NEG_X;
        object.state.current_action = ActionType::Idle;
        object.add(factory.allocate_component_with::<AttackAtDistanceComponent>(|attack| {
            attack.setup(100.0, 0.5, 0.75, true);
        }));
        object.add(factory.allocate_component::<AnimationComponent>());
        object.add(factory.allocate_component_with::<RenderComponent>(|render| {
            render.set_drawable(ATTACKER_DRAWABLE);
            render.set_priority(5);
        }));
    });
}

fn spawn_debris(root: &mut GameRoot, index: usize) {
    let x = index as f32 * ATTACKER_SPACING * 0.5;
    root.spawn(|object, factory| {
        object.state.position = Vec2::new(x, DEBRIS_HEIGHT);
        object.add(factory.allocate_component::<GravityComponent>());
        object.add(factory.allocate_component::<MovementComponent>());
        object.add(factory.allocate_component::<GroundCollisionComponent>());
        object.add(factory.allocate_component_with::<LifetimeComponent>(|lifetime| {
            lifetime.set_time_to_live(0.5 + index as f32 * 0.1);
            lifetime.set_removal_delay(0.25);
            lifetime.set_death_event(GameEvent::RobotsDestroyed);
        }));
        object.add(factory.allocate_component_with::<RenderComponent>(|render| {
            render.set_drawable(DEBRIS_DRAWABLE);
        }));
    });
}

/// Scripted controls: walk right, hop every second and a half
fn drive_player(root: &mut GameRoot, frame: u32) {
    let systems = root.systems_mut();
    let now = systems.time.game_time();
    match frame {
        30 => systems.input.press(Button::Right, now, 1.0),
        240 => systems.input.release(Button::Right),
        _ => {}
    }
    match frame % 90 {
        45 => systems.input.press(Button::Jump, now, 1.0),
        50 => systems.input.release(Button::Jump),
        _ => {}
    }
}

/// Results of a headless run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub frames: u32,
    pub game_time: f32,
    /// Objects still alive at the end
    pub objects_alive: usize,
    /// Most draws scheduled in one frame
    pub peak_draws: usize,
    /// Frames in which at least one attacker was attacking
    pub attack_frames: u32,
    pub events: EventSnapshot,
    pub average_frame_ms: f64,
    pub min_frame_ms: f64,
    pub max_frame_ms: f64,
    /// Pools with instances still out after the final restart
    pub leaking_pools: usize,
}

impl SimulationReport {
    pub fn log(&self) {
        log::info!(
            "Simulated {} frames ({:.2} s of game time)",
            self.frames,
            self.game_time
        );
        log::info!(
            "  objects alive: {}, peak draws: {}, attack frames: {}",
            self.objects_alive,
            self.peak_draws,
            self.attack_frames
        );
        log::info!(
            "  events: {} robots destroyed, {} player deaths",
            self.events.robots_destroyed,
            self.events.player_deaths
        );
        log::info!(
            "  frame time: avg {:.3} ms, min {:.3} ms, max {:.3} ms",
            self.average_frame_ms,
            self.min_frame_ms,
            self.max_frame_ms
        );
        if self.leaking_pools > 0 {
            log::warn!("  {} pool(s) leaked", self.leaking_pools);
        }
    }
}

/// Run the demo level for `frames` fixed steps on the calling thread
pub fn simulate(config: EngineConfig, frames: u32, objects: usize) -> Result<SimulationReport> {
    let _timer = ScopedTimer::traced("simulate");
    let frame_delta = config.frame_duration();
    let mut frame = RenderQueue::new(config.render_queue_capacity);
    let mut root = demo_root(config);
    populate(&mut root, objects)?;

    let mut profiler = FrameProfiler::default();
    let mut peak_draws = 0;
    let mut attack_frames = 0;
    for index in 0..frames {
        drive_player(&mut root, index);

        let started = Instant::now();
        root.update(frame_delta);
        profiler.record_duration(started.elapsed());

        root.take_frame(&mut frame);
        peak_draws = peak_draws.max(frame.len());
        if root
            .objects()
            .iter()
            .any(|object| object.state.current_action == ActionType::Attack)
        {
            attack_frames += 1;
        }
    }

    let report = SimulationReport {
        frames,
        game_time: root.systems().time.game_time(),
        objects_alive: root.objects().len(),
        peak_draws,
        attack_frames,
        events: root.systems().events.snapshot(),
        average_frame_ms: profiler.average_ms(),
        min_frame_ms: profiler.min_ms(),
        max_frame_ms: profiler.max_ms(),
        leaking_pools: root.restart().len(),
    };
    Ok(report)
}

/// Renderer with a sprite for every demo drawable
pub fn demo_renderer(queue_capacity: usize) -> Result<Renderer> {
    let mut context = RenderContext::default();
    let sprites = [
        (PLAYER_DRAWABLE, TextureId(1), "player", Vec2::splat(32.0)),
        (ATTACKER_DRAWABLE, TextureId(2), "attacker", Vec2::splat(32.0)),
        (DEBRIS_DRAWABLE, TextureId(3), "debris", Vec2::splat(8.0)),
    ];
    for (_, texture, name, _) in &sprites {
        context.textures_mut().allocate(*texture, name)?;
    }
    context.upload_pending();

    let mut renderer = Renderer::new(context, DrawableLibrary::new(), queue_capacity);
    for (drawable, texture, _, size) in sprites {
        renderer.register(drawable, Sprite::new(texture, size));
    }
    Ok(renderer)
}

/// Results of a threaded run
#[derive(Debug, Clone, Serialize)]
pub struct ThreadedReport {
    pub simulated_frames: u64,
    pub rendered_frames: u64,
    /// Frames the render side never picked up
    pub skipped_frames: u64,
    pub draw_calls: u64,
    pub average_frame_ms: f64,
    pub leaking_pools: usize,
}

/// Run the demo level on a game thread for `seconds`, drawing on this thread
pub fn run_threaded(config: EngineConfig, seconds: f32, objects: usize) -> Result<ThreadedReport> {
    let capacity = config.render_queue_capacity;
    let mut root = demo_root(config);
    populate(&mut root, objects)?;

    let exchange = Arc::new(FrameExchange::new(capacity));
    let publisher = Arc::clone(&exchange);
    let mut staging = RenderQueue::new(capacity);
    let hook: FrameHook = Box::new(move |root: &mut GameRoot| {
        root.take_frame(&mut staging);
        publisher.publish(&mut staging);
    });

    let game = GameThread::spawn(root, InputTranslator::default(), Some(hook))?;
    game.input(InputEvent::KeyDown(KeyCode::Right))?;

    let mut renderer = demo_renderer(capacity)?;
    let mut watchdog = Watchdog::start(WATCHDOG_TIMEOUT)?;
    let deadline = Instant::now() + Duration::from_secs_f32(seconds.max(0.0));
    let mut draw_calls = 0;
    while Instant::now() < deadline {
        if let Some(stats) = renderer.render_next(&exchange, Duration::from_millis(50)) {
            watchdog.acknowledge();
            draw_calls += u64::from(stats.draw_calls);
        }
    }
    watchdog.stop();

    let simulated_frames = game.frames();
    let average_frame_ms = game.profile().average_ms();
    let mut root = game.quit()?;

    Ok(ThreadedReport {
        simulated_frames,
        rendered_frames: renderer.frames_drawn(),
        skipped_frames: exchange.skipped(),
        draw_calls,
        average_frame_ms,
        leaking_pools: root.restart().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EngineConfig {
        EngineConfig {
            max_game_objects: 16,
            component_pool_size: 16,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_populate_respects_capacities() {
        let mut root = demo_root(small_config());
        assert!(populate(&mut root, 0).is_err());
        assert!(populate(&mut root, 17).is_err());

        populate(&mut root, 7).unwrap();
        assert_eq!(root.objects().pending_len(), 7);
    }

    #[test]
    fn test_simulation_runs_clean() {
        let report = simulate(small_config(), 300, 10).unwrap();
        assert_eq!(report.frames, 300);
        assert!((report.game_time - 5.0).abs() < 1e-3);
        assert_eq!(report.leaking_pools, 0);
        assert!(report.peak_draws >= 10);
        // Debris expires well within five seconds
        assert_eq!(report.events.robots_destroyed, 3);
        assert_eq!(report.objects_alive, 7);
        // The player walks through the attackers' range
        assert!(report.attack_frames > 0);
    }

    #[test]
    fn test_renderer_covers_demo_drawables() {
        let renderer = demo_renderer(16).unwrap();
        for id in [PLAYER_DRAWABLE, ATTACKER_DRAWABLE, DEBRIS_DRAWABLE] {
            assert!(renderer.drawables().contains(id));
        }
        assert_eq!(renderer.context().textures().loaded_count(), 3);
    }

    #[test]
    fn test_threaded_run() {
        let report = run_threaded(small_config(), 0.3, 6).unwrap();
        assert!(report.simulated_frames > 0);
        assert!(report.rendered_frames > 0);
        assert!(report.draw_calls > 0);
        assert_eq!(report.leaking_pools, 0);
    }
}
