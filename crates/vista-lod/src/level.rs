//! Mesh detail reduction factor.

use serde::{Deserialize, Serialize};

/// Number of distinct detail levels a mesh can be built at.
pub const NUM_SUPPORTED_LODS: u8 = 5;

/// Returned when a detail level is outside `0..NUM_SUPPORTED_LODS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("level of detail {0} is not supported (expected 0..{NUM_SUPPORTED_LODS})")]
pub struct LevelOfDetailError(pub u8);

/// A mesh detail level. `0` is full resolution.
///
/// Only `0..NUM_SUPPORTED_LODS` can be constructed, so every level's stride
/// divides every supported chunk size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LevelOfDetail(pub(crate) u8);

impl LevelOfDetail {
    pub const FULL: Self = Self(0);

    pub fn new(level: u8) -> Result<Self, LevelOfDetailError> {
        if level < NUM_SUPPORTED_LODS {
            Ok(Self(level))
        } else {
            Err(LevelOfDetailError(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Sampling stride between rendered vertices.
    ///
    /// Level 0 samples every vertex; level `n > 0` samples every `2n`th, so the
    /// sequence is 1, 2, 4, 6, 8.
    pub fn stride(self) -> usize {
        if self.0 == 0 { 1 } else { self.0 as usize * 2 }
    }

    /// All supported levels, finest first.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_SUPPORTED_LODS).map(Self)
    }
}

impl TryFrom<u8> for LevelOfDetail {
    type Error = LevelOfDetailError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<LevelOfDetail> for u8 {
    fn from(lod: LevelOfDetail) -> Self {
        lod.0
    }
}

impl std::fmt::Display for LevelOfDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LOD{}", self.0)
    }
}
