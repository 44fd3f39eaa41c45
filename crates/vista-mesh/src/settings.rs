//! Supported chunk sizes and the grid layout derived from them.

use serde::{Deserialize, Serialize};
use vista_lod::LevelOfDetail;

/// Rendered chunk edge lengths usable with smooth shading. Every entry is
/// divisible by every [`LevelOfDetail::stride`].
pub const SUPPORTED_CHUNK_SIZES: [usize; 9] = [48, 72, 96, 120, 144, 168, 192, 216, 240];

/// Rendered chunk edge lengths usable with flat shading.
pub const SUPPORTED_FLAT_SHADED_CHUNK_SIZES: [usize; 3] = [48, 72, 96];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MeshSettingsError {
    #[error("chunk size index {index} out of range (0..{len})")]
    ChunkSizeIndex { index: usize, len: usize },
    #[error("flat-shaded chunk size index {index} out of range (0..{len})")]
    FlatShadedChunkSizeIndex { index: usize, len: usize },
}

/// Which entry of the chunk-size tables to use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    pub chunk_size_index: usize,
    pub flat_shaded_chunk_size_index: usize,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            chunk_size_index: 2,
            flat_shaded_chunk_size_index: 2,
        }
    }
}

impl MeshSettings {
    pub fn validate(&self) -> Result<(), MeshSettingsError> {
        self.layout(false)?;
        self.layout(true)?;
        Ok(())
    }

    /// Grid layout for the configured chunk size under the given shading mode.
    pub fn layout(&self, flat_shading: bool) -> Result<ChunkLayout, MeshSettingsError> {
        let chunk_size = if flat_shading {
            SUPPORTED_FLAT_SHADED_CHUNK_SIZES
                .get(self.flat_shaded_chunk_size_index)
                .copied()
                .ok_or(MeshSettingsError::FlatShadedChunkSizeIndex {
                    index: self.flat_shaded_chunk_size_index,
                    len: SUPPORTED_FLAT_SHADED_CHUNK_SIZES.len(),
                })?
        } else {
            SUPPORTED_CHUNK_SIZES
                .get(self.chunk_size_index)
                .copied()
                .ok_or(MeshSettingsError::ChunkSizeIndex {
                    index: self.chunk_size_index,
                    len: SUPPORTED_CHUNK_SIZES.len(),
                })?
        };
        Ok(ChunkLayout { chunk_size })
    }
}

/// Sample counts for one chunk.
///
/// ```text
/// |<---------------- grid_size = chunk_size + 5 ---------------->|
///   |<------------ vertices_per_line = chunk_size + 3 -------->|
///   border | edge | connection | ... main ... | connection | edge | border
/// ```
///
/// The outermost ring only feeds normals. The rendered span between the
/// first and last rendered vertex is `chunk_size + 2` units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkLayout {
    pub chunk_size: usize,
}

impl ChunkLayout {
    /// Height samples per line, border included.
    pub fn grid_size(&self) -> usize {
        self.chunk_size + 5
    }

    /// Rendered vertices per line at full resolution. This is the
    /// `map_chunk_size` handed to the height grid assembler.
    pub fn vertices_per_line(&self) -> usize {
        self.chunk_size + 3
    }

    /// Edge length of a chunk in unscaled world units.
    pub fn world_size(&self) -> f32 {
        (self.chunk_size + 2) as f32
    }

    /// Rendered vertices per line along the interior at `lod`, not counting the
    /// full-resolution edge rings.
    pub fn interior_vertices_per_line(&self, lod: LevelOfDetail) -> usize {
        self.chunk_size / lod.stride() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = MeshSettings::default().layout(false).expect("default is valid");
        assert_eq!(layout.chunk_size, 96);
        assert_eq!(layout.grid_size(), 101);
        assert_eq!(layout.vertices_per_line(), 99);
        assert_eq!(layout.world_size(), 98.0);
    }

    #[test]
    fn test_flat_shading_uses_its_own_table() {
        let settings = MeshSettings {
            chunk_size_index: 8,
            flat_shaded_chunk_size_index: 0,
        };
        assert_eq!(settings.layout(false).map(|l| l.chunk_size), Ok(240));
        assert_eq!(settings.layout(true).map(|l| l.chunk_size), Ok(48));
    }

    #[test]
    fn test_out_of_range_indices_rejected() {
        let settings = MeshSettings {
            chunk_size_index: 9,
            flat_shaded_chunk_size_index: 0,
        };
        assert_eq!(
            settings.validate(),
            Err(MeshSettingsError::ChunkSizeIndex { index: 9, len: 9 })
        );

        let settings = MeshSettings {
            chunk_size_index: 0,
            flat_shaded_chunk_size_index: 3,
        };
        assert!(matches!(
            settings.layout(true),
            Err(MeshSettingsError::FlatShadedChunkSizeIndex { index: 3, .. })
        ));
    }

    #[test]
    fn test_interior_vertices_per_lod() {
        let layout = ChunkLayout { chunk_size: 240 };
        let counts: Vec<usize> = LevelOfDetail::all()
            .map(|lod| layout.interior_vertices_per_line(lod))
            .collect();
        assert_eq!(counts, vec![241, 121, 61, 41, 31]);
    }
}
