//! Headless endless-terrain demo.
//!
//! Flies a viewer across the terrain, streaming chunks in around it and logging
//! streaming statistics, or renders a single preview of the origin chunk.

mod flight;
mod preview;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use vista_config::{CliArgs, ConfigWatcher, ExecutorKind, TerrainConfig};

use crate::flight::{FlightPlan, fly};
use crate::preview::{PreviewMode, run_preview};

#[derive(Parser, Debug)]
#[command(name = "vista-demo", about = "Fly through endless procedural terrain")]
struct DemoArgs {
    #[command(flatten)]
    terrain: CliArgs,

    /// Render a preview of the origin chunk instead of streaming.
    #[arg(long, value_enum)]
    preview: Option<PreviewMode>,

    /// Directory preview images are written to.
    #[arg(long, default_value = "previews")]
    out: PathBuf,

    /// Number of streaming ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Viewer speed in world units per tick.
    #[arg(long, default_value_t = 4.0)]
    speed: f32,

    /// Run jobs on a bounded worker pool with this many threads.
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = DemoArgs::parse();

    // Resolve config directory
    let config_dir = args
        .terrain
        .config
        .clone()
        .unwrap_or_else(vista_config::default_config_dir);

    // Load or create config, then apply CLI overrides
    let file_config = TerrainConfig::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        TerrainConfig::default()
    });
    let config = effective_config(&file_config, &args)?;

    let log_dir = config_dir.join("logs");
    vista_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        config_dir = %config_dir.display(),
        seed = config.noise.seed,
        chunk_world_size = config.chunk_world_size()?,
        "vista demo starting"
    );

    if let Some(mode) = args.preview {
        run_preview(mode, &config, &args.out)?;
        return Ok(());
    }

    let watcher = ConfigWatcher::new(config_dir, file_config);
    let plan = FlightPlan {
        ticks: args.ticks,
        speed: args.speed,
    };
    let summary = fly(config, watcher, &plan, |file_config| {
        effective_config(file_config, &args)
    })?;
    info!(%summary, "flight finished");
    Ok(())
}

/// The file config with command-line overrides applied on top.
fn effective_config(
    file_config: &TerrainConfig,
    args: &DemoArgs,
) -> Result<TerrainConfig, Box<dyn Error>> {
    let mut config = file_config.clone();
    config.apply_cli_overrides(&args.terrain)?;
    if let Some(workers) = args.workers {
        config.streaming.executor = ExecutorKind::Pool { workers };
    }
    config.validate()?;
    Ok(config)
}
