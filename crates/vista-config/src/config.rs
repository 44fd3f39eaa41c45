//! Terrain configuration with sensible defaults, validation and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vista_lod::LodSettings;
use vista_mesh::{ChunkLayout, MeshSettings};
use vista_terrain::debug_viz::TextureSettings;
use vista_terrain::{DecorationSettings, MAX_NOISE_OCTAVES, NoiseSettings, TerrainSettings};

use crate::error::ConfigError;

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "terrain.ron";

/// Top-level terrain configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Height noise parameters.
    pub noise: NoiseSettings,
    /// Terrain shaping: scale, falloff, height response.
    pub terrain: TerrainSettings,
    /// Chunk size selection.
    pub mesh: MeshSettings,
    /// Decoration categories and spacing.
    pub decorations: DecorationSettings,
    /// Detail levels and the collider LOD.
    pub lod: LodSettings,
    pub streaming: StreamingSettings,
    /// Colour bands for the terrain texture.
    pub texture: TextureSettings,
    pub debug: DebugConfig,
}

/// How height and mesh jobs are run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExecutorKind {
    /// One short-lived thread per job.
    #[default]
    ThreadPerJob,
    /// A fixed pool of worker threads sharing a job queue.
    Pool { workers: usize },
    /// Run jobs on the calling thread at dispatch time.
    Inline,
}

/// Viewer-driven streaming thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingSettings {
    /// Distance the viewer must travel before the visible set is refreshed.
    pub viewer_move_threshold: f32,
    /// Distance to a chunk's bounds below which its collision mesh is locked in.
    pub collider_generation_distance: f32,
    pub executor: ExecutorKind,
}

impl Default for StreamingSettings {
    fn default() -> Self {
        Self {
            viewer_move_threshold: 25.0,
            collider_generation_distance: 5.0,
            executor: ExecutorKind::ThreadPerJob,
        }
    }
}

impl StreamingSettings {
    pub fn sqr_viewer_move_threshold(&self) -> f32 {
        self.viewer_move_threshold * self.viewer_move_threshold
    }

    pub fn sqr_collider_generation_distance(&self) -> f32 {
        self.collider_generation_distance * self.collider_generation_distance
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Detail level used for mesh previews.
    pub preview_lod: vista_lod::LevelOfDetail,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            preview_lod: vista_lod::LevelOfDetail::FULL,
        }
    }
}

/// Platform config directory for the terrain tools, falling back to the
/// working directory when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vista")
}

// --- Derived values ---

impl TerrainConfig {
    /// Chunk layout for the active shading mode.
    pub fn layout(&self) -> Result<ChunkLayout, ConfigError> {
        Ok(self.mesh.layout(self.terrain.use_flat_shading)?)
    }

    /// Edge length of a chunk in world units, uniform scale applied.
    pub fn chunk_world_size(&self) -> Result<f32, ConfigError> {
        Ok(self.layout()?.world_size() * self.terrain.uniform_scale)
    }

    /// Check every section. Errors surface here so the pipeline never sees
    /// an invalid combination.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_noise()?;
        self.validate_terrain()?;
        self.mesh.validate()?;
        self.lod.validate()?;
        self.validate_decorations()?;
        self.validate_streaming()?;
        Ok(())
    }

    fn validate_noise(&self) -> Result<(), ConfigError> {
        let noise = &self.noise;
        if noise.octaves > MAX_NOISE_OCTAVES {
            return Err(ConfigError::InvalidNoise(format!(
                "octaves must be at most {MAX_NOISE_OCTAVES}, got {}",
                noise.octaves
            )));
        }
        let finite = [
            ("scale", noise.scale),
            ("persistence", noise.persistence),
            ("lacunarity", noise.lacunarity),
            ("offset.x", noise.offset.x),
            ("offset.y", noise.offset.y),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::InvalidNoise(format!("{name} must be finite, got {value}")));
        }
        if noise.global_height_divisor.is_nan() || noise.global_height_divisor <= 0.0 {
            return Err(ConfigError::InvalidNoise(format!(
                "global_height_divisor must be positive, got {}",
                noise.global_height_divisor
            )));
        }
        Ok(())
    }

    fn validate_terrain(&self) -> Result<(), ConfigError> {
        let terrain = &self.terrain;
        if terrain.uniform_scale.is_nan() || terrain.uniform_scale <= 0.0 {
            return Err(ConfigError::InvalidTerrain(format!(
                "uniform_scale must be positive, got {}",
                terrain.uniform_scale
            )));
        }
        if !terrain.height_multiplier.is_finite() || !terrain.falloff_strength.is_finite() {
            return Err(ConfigError::InvalidTerrain(
                "height_multiplier and falloff_strength must be finite".to_string(),
            ));
        }
        let keys = terrain.height_curve.keys();
        if keys.windows(2).any(|pair| pair[0].time > pair[1].time) {
            return Err(ConfigError::InvalidTerrain(
                "height curve keys must be ordered by time".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_decorations(&self) -> Result<(), ConfigError> {
        let settings = &self.decorations;
        let invalid = |category: &str, reason: String| ConfigError::InvalidDecoration {
            category: category.to_string(),
            reason,
        };
        if settings.min_spawn_distance.is_nan() || settings.min_spawn_distance < 0.0 {
            return Err(invalid(
                "*",
                format!("min_spawn_distance must be >= 0, got {}", settings.min_spawn_distance),
            ));
        }
        for category in &settings.categories {
            if !(0.0..=1.0).contains(&category.density) {
                return Err(invalid(
                    &category.name,
                    format!("density must be within [0, 1], got {}", category.density),
                ));
            }
            if category.min_spawn_height > category.max_spawn_height {
                return Err(invalid(
                    &category.name,
                    format!(
                        "min_spawn_height {} exceeds max_spawn_height {}",
                        category.min_spawn_height, category.max_spawn_height
                    ),
                ));
            }
        }
        Ok(())
    }

    fn validate_streaming(&self) -> Result<(), ConfigError> {
        let streaming = &self.streaming;
        if streaming.viewer_move_threshold.is_nan() || streaming.viewer_move_threshold < 0.0 {
            return Err(ConfigError::InvalidStreaming(format!(
                "viewer_move_threshold must be >= 0, got {}",
                streaming.viewer_move_threshold
            )));
        }
        if streaming.collider_generation_distance.is_nan()
            || streaming.collider_generation_distance < 0.0
        {
            return Err(ConfigError::InvalidStreaming(format!(
                "collider_generation_distance must be >= 0, got {}",
                streaming.collider_generation_distance
            )));
        }
        if let ExecutorKind::Pool { workers: 0 } = streaming.executor {
            return Err(ConfigError::InvalidStreaming(
                "a worker pool needs at least one worker".to_string(),
            ));
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl TerrainConfig {
    /// Load config from the given directory, or create a default config file.
    ///
    /// A loaded config is validated before it is returned.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            config.validate()?;
            log::info!("Loaded terrain config from {}", config_path.display());
            Ok(config)
        } else {
            let config = TerrainConfig::default();
            config.save(config_dir)?;
            log::info!("Created default terrain config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `terrain.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;

        if &new_config != self {
            new_config.validate()?;
            log::info!("Terrain config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
