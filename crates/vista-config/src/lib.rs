//! Terrain configuration.
//!
//! Groups every tunable of the terrain pipeline into one [`TerrainConfig`]
//! persisted as `terrain.ron`. Supports CLI overrides via clap, upfront
//! validation, and section-level change detection on reload.

mod cli;
mod config;
mod error;
mod watcher;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, DebugConfig, ExecutorKind, StreamingSettings, TerrainConfig,
    default_config_dir,
};
pub use error::ConfigError;
pub use watcher::{ConfigChange, ConfigWatcher};
