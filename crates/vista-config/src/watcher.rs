//! Configuration-changed notification.
//!
//! The owning application polls a [`ConfigWatcher`] (e.g. once per second);
//! each poll re-reads `terrain.ron` and reports which sections changed so the
//! caller can decide between regenerating terrain and just re-applying colours.

use std::path::{Path, PathBuf};

use crate::config::TerrainConfig;
use crate::error::ConfigError;

/// Set of config sections that differ between two configs. Combines via bitwise OR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConfigChange(pub u8);

impl ConfigChange {
    pub const NONE: Self = Self(0);
    pub const NOISE: Self = Self(1 << 0);
    pub const TERRAIN: Self = Self(1 << 1);
    pub const MESH: Self = Self(1 << 2);
    pub const DECORATIONS: Self = Self(1 << 3);
    pub const LOD: Self = Self(1 << 4);
    pub const STREAMING: Self = Self(1 << 5);
    pub const TEXTURE: Self = Self(1 << 6);
    pub const DEBUG: Self = Self(1 << 7);

    /// Sections that differ between `old` and `new`.
    pub fn between(old: &TerrainConfig, new: &TerrainConfig) -> Self {
        let mut change = Self::NONE;
        let sections = [
            (old.noise != new.noise, Self::NOISE),
            (old.terrain != new.terrain, Self::TERRAIN),
            (old.mesh != new.mesh, Self::MESH),
            (old.decorations != new.decorations, Self::DECORATIONS),
            (old.lod != new.lod, Self::LOD),
            (old.streaming != new.streaming, Self::STREAMING),
            (old.texture != new.texture, Self::TEXTURE),
            (old.debug != new.debug, Self::DEBUG),
        ];
        for (changed, section) in sections {
            if changed {
                change |= section;
            }
        }
        change
    }

    /// Returns true if `self` contains all bits in `other`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether existing chunks are stale: their heights, meshes or
    /// decorations depend on a changed section.
    #[must_use]
    pub fn needs_regeneration(self) -> bool {
        let generation = Self::NOISE | Self::TERRAIN | Self::MESH | Self::DECORATIONS;
        self.0 & generation.0 != 0
    }
}

impl std::ops::BitOr for ConfigChange {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ConfigChange {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Owns the active config and the directory it was loaded from.
#[derive(Debug)]
pub struct ConfigWatcher {
    dir: PathBuf,
    current: TerrainConfig,
}

impl ConfigWatcher {
    pub fn new(dir: impl Into<PathBuf>, current: TerrainConfig) -> Self {
        Self {
            dir: dir.into(),
            current,
        }
    }

    /// Load (or create) the config in `dir` and watch it.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        let current = TerrainConfig::load_or_create(&dir)?;
        Ok(Self { dir, current })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn current(&self) -> &TerrainConfig {
        &self.current
    }

    /// Re-read the config file.
    ///
    /// Returns the changed sections when the file differs from the current
    /// config and validates; the new config becomes current. On error the
    /// current config is kept.
    pub fn poll(&mut self) -> Result<Option<ConfigChange>, ConfigError> {
        let Some(new_config) = self.current.reload(&self.dir)? else {
            return Ok(None);
        };
        let change = ConfigChange::between(&self.current, &new_config);
        log::debug!("Terrain config sections changed: {:#010b}", change.0);
        self.current = new_config;
        Ok(Some(change))
    }
}
