//! Configuration error types.

use vista_lod::{LevelOfDetailError, LodSettingsError};
use vista_mesh::MeshSettingsError;

/// Errors that can occur when loading, saving, parsing or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(#[source] MeshSettingsError),

    #[error("invalid level of detail: {0}")]
    InvalidLod(#[from] LevelOfDetailError),

    #[error("invalid detail levels: {0}")]
    InvalidDetailLevels(#[source] LodSettingsError),

    #[error("collider LOD index {index} out of range for {len} detail levels")]
    InvalidColliderLod { index: usize, len: usize },

    #[error("invalid noise settings: {0}")]
    InvalidNoise(String),

    #[error("invalid terrain settings: {0}")]
    InvalidTerrain(String),

    #[error("invalid decoration category `{category}`: {reason}")]
    InvalidDecoration { category: String, reason: String },

    #[error("invalid streaming settings: {0}")]
    InvalidStreaming(String),
}

impl From<LodSettingsError> for ConfigError {
    fn from(err: LodSettingsError) -> Self {
        match err {
            LodSettingsError::ColliderIndexOutOfRange { index, len } => {
                Self::InvalidColliderLod { index, len }
            }
            other => Self::InvalidDetailLevels(other),
        }
    }
}

impl From<MeshSettingsError> for ConfigError {
    fn from(err: MeshSettingsError) -> Self {
        Self::InvalidChunkSize(err)
    }
}
