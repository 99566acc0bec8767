//! # Ledge CLI
//!
//! Command-line interface for the Ledge engine.
//!
//! ## Commands
//! - `simulate` - Run the demo level headless and report pool, event and timing stats
//! - `run` - Run the demo level on a game thread with a headless renderer
//! - `pools` - Print the effective capacities of a configuration

pub mod demo;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use ledge_core::EngineConfig;
use ledge_core::components::STOCK_COMPONENT_KINDS;

/// Ledge engine CLI
#[derive(Parser)]
#[command(name = "ledge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the demo level for a fixed number of frames
    Simulate {
        /// Frames to simulate
        #[arg(short, long, default_value_t = 600)]
        frames: u32,

        /// Objects in the level, the player included
        #[arg(short, long, default_value_t = 16)]
        objects: usize,

        /// Engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the demo level on a game thread in real time
    Run {
        /// Wall-clock seconds to run for
        #[arg(short, long, default_value_t = 3.0)]
        seconds: f32,

        /// Objects in the level, the player included
        #[arg(short, long, default_value_t = 16)]
        objects: usize,

        /// Engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the capacities a configuration resolves to
    Pools {
        /// Engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the full configuration as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Resolve the configuration to run with; unusable files fall back to defaults
pub fn load_config(path: Option<&Path>) -> EngineConfig {
    match path {
        Some(path) => EngineConfig::load_or_default(path),
        None => EngineConfig::default(),
    }
}

/// Every fixed capacity in `config`, by name
pub fn capacities(config: &EngineConfig) -> Vec<(&'static str, usize)> {
    vec![
        ("game_objects", config.max_game_objects),
        ("components_per_object", config.max_components_per_object),
        ("components_per_kind", config.component_pool_size),
        ("components_total", config.component_pool_size * STOCK_COMPONENT_KINDS),
        ("vectors", config.vector_pool_size),
        ("channels", config.max_channels),
        ("render_queue", config.render_queue_capacity),
    ]
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match cli.command {
        Commands::Simulate { frames, objects, config, json } => {
            let config = load_config(config.as_deref());
            let report = demo::simulate(config, frames, objects)?;
            report.log();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }

        Commands::Run { seconds, objects, config } => {
            let config = load_config(config.as_deref());
            log::info!("Running demo level for {seconds:.1} s...");
            let report = demo::run_threaded(config, seconds, objects)?;
            log::info!(
                "Simulated {} frames, rendered {} ({} skipped, {} draw calls)",
                report.simulated_frames,
                report.rendered_frames,
                report.skipped_frames,
                report.draw_calls
            );
            log::info!("  average frame: {:.3} ms", report.average_frame_ms);
            if report.leaking_pools > 0 {
                log::warn!("  {} pool(s) leaked", report.leaking_pools);
            }
        }

        Commands::Pools { config, json } => {
            let config = load_config(config.as_deref());
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                for (name, capacity) in capacities(&config) {
                    println!("{name:<24}{capacity:>8}");
                }
                println!("{:<24}{:>8.3}", "max_frame_delta", config.max_frame_delta);
                println!("{:<24}{:>8}", "target_fps", config.target_fps);
                println!("{:<24}{:>8.1}", "activation_radius", config.activation_radius);
            }
        }
    }

    Ok(())
}
