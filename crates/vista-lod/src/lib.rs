//! Level-of-detail management: detail levels, distance-based LOD selection and
//! chunk bounds.

mod bounds;
mod level;
mod selector;

pub use bounds::ChunkBounds;
pub use level::{LevelOfDetail, LevelOfDetailError, NUM_SUPPORTED_LODS};
pub use selector::{DetailLevel, LodSelector, LodSettings, LodSettingsError};
