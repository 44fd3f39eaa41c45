//! Command-line overrides for the terrain configuration.

use std::path::PathBuf;

use clap::Parser;
use vista_lod::LevelOfDetail;
use vista_terrain::NormalizeMode;

use crate::{ConfigError, TerrainConfig};

/// Terrain command-line arguments.
///
/// CLI values override settings loaded from `terrain.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "vista", about = "Endless procedural terrain")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of noise octaves.
    #[arg(long)]
    pub octaves: Option<u32>,

    /// Noise scale (non-positive values are clamped).
    #[arg(long, allow_negative_numbers = true)]
    pub scale: Option<f32>,

    /// Height normalisation: `local` (per chunk) or `global` (seam-free).
    #[arg(long, value_parser = parse_normalize_mode)]
    pub normalize_mode: Option<NormalizeMode>,

    /// Use flat shading.
    #[arg(long)]
    pub flat_shading: Option<bool>,

    /// Subtract the island falloff mask.
    #[arg(long)]
    pub falloff: Option<bool>,

    /// Detail level for mesh previews (0-4).
    #[arg(long)]
    pub preview_lod: Option<u8>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_normalize_mode(s: &str) -> Result<NormalizeMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "local" => Ok(NormalizeMode::Local),
        "global" => Ok(NormalizeMode::Global),
        other => Err(format!("unknown normalize mode `{other}` (expected local or global)")),
    }
}

impl TerrainConfig {
    /// Apply CLI overrides to a loaded config.
    ///
    /// Fails without modifying the config when an override is out of range.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) -> Result<(), ConfigError> {
        let preview_lod = args.preview_lod.map(LevelOfDetail::new).transpose()?;

        if let Some(seed) = args.seed {
            self.noise.seed = seed;
        }
        if let Some(octaves) = args.octaves {
            self.noise.octaves = octaves;
        }
        if let Some(scale) = args.scale {
            self.noise.scale = scale;
        }
        if let Some(mode) = args.normalize_mode {
            self.noise.normalize_mode = mode;
        }
        if let Some(flat) = args.flat_shading {
            self.terrain.use_flat_shading = flat;
        }
        if let Some(falloff) = args.falloff {
            self.terrain.use_falloff = falloff;
        }
        if let Some(lod) = preview_lod {
            self.debug.preview_lod = lod;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = TerrainConfig::default();
        let args = CliArgs {
            seed: Some(7),
            octaves: Some(6),
            falloff: Some(true),
            ..Default::default()
        };
        config.apply_cli_overrides(&args).unwrap();
        assert_eq!(config.noise.seed, 7);
        assert_eq!(config.noise.octaves, 6);
        assert!(config.terrain.use_falloff);
        // Non-overridden fields retain defaults
        assert_eq!(config.noise.scale, 50.0);
        assert!(!config.terrain.use_flat_shading);
    }

    #[test]
    fn test_cli_no_override() {
        let original = TerrainConfig::default();
        let mut config = TerrainConfig::default();
        config.apply_cli_overrides(&CliArgs::default()).unwrap();
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::try_parse_from([
            "vista",
            "--seed",
            "12",
            "--normalize-mode",
            "Local",
            "--scale",
            "-2",
            "--preview-lod",
            "3",
            "--flat-shading",
            "true",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(12));
        assert_eq!(args.normalize_mode, Some(NormalizeMode::Local));
        assert_eq!(args.scale, Some(-2.0));
        assert_eq!(args.preview_lod, Some(3));
        assert_eq!(args.flat_shading, Some(true));
    }

    #[test]
    fn test_cli_rejects_unsupported_lod() {
        let mut config = TerrainConfig::default();
        let args = CliArgs {
            seed: Some(5),
            preview_lod: Some(9),
            ..Default::default()
        };
        let result = config.apply_cli_overrides(&args);
        assert!(matches!(result, Err(ConfigError::InvalidLod(_))));
        assert_eq!(config, TerrainConfig::default(), "config untouched on error");
    }
}
