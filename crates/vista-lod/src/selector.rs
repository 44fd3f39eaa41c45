//! Distance-based LOD selection over an ordered list of detail levels.

use serde::{Deserialize, Serialize};

use crate::level::LevelOfDetail;

/// One entry of the LOD table: use `lod` until the viewer is farther than
/// `visible_distance`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailLevel {
    pub lod: LevelOfDetail,
    pub visible_distance: f32,
}

impl DetailLevel {
    pub fn new(lod: LevelOfDetail, visible_distance: f32) -> Self {
        Self {
            lod,
            visible_distance,
        }
    }

    pub fn sqr_visible_distance(&self) -> f32 {
        self.visible_distance * self.visible_distance
    }
}

/// Reasons a LOD table is rejected.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LodSettingsError {
    #[error("at least one detail level is required")]
    Empty,
    #[error("detail level {index} has non-positive visible distance {distance}")]
    NonPositiveDistance { index: usize, distance: f32 },
    #[error("visible distances must be strictly increasing (level {index}: {distance} <= {previous})")]
    NotIncreasing {
        index: usize,
        distance: f32,
        previous: f32,
    },
    #[error("collider LOD index {index} out of range for {len} detail levels")]
    ColliderIndexOutOfRange { index: usize, len: usize },
}

/// Ordered LOD table plus the index of the level used for collision meshes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodSettings {
    pub detail_levels: Vec<DetailLevel>,
    pub collider_lod_index: usize,
}

impl Default for LodSettings {
    fn default() -> Self {
        Self {
            detail_levels: vec![
                DetailLevel::new(LevelOfDetail::FULL, 200.0),
                DetailLevel::new(LevelOfDetail(1), 400.0),
                DetailLevel::new(LevelOfDetail(4), 600.0),
            ],
            collider_lod_index: 0,
        }
    }
}

impl LodSettings {
    pub fn validate(&self) -> Result<(), LodSettingsError> {
        if self.detail_levels.is_empty() {
            return Err(LodSettingsError::Empty);
        }
        for (index, level) in self.detail_levels.iter().enumerate() {
            let distance = level.visible_distance;
            if distance.is_nan() || distance <= 0.0 {
                return Err(LodSettingsError::NonPositiveDistance { index, distance });
            }
            if index > 0 {
                let previous = self.detail_levels[index - 1].visible_distance;
                if distance <= previous {
                    return Err(LodSettingsError::NotIncreasing {
                        index,
                        distance,
                        previous,
                    });
                }
            }
        }
        if self.collider_lod_index >= self.detail_levels.len() {
            return Err(LodSettingsError::ColliderIndexOutOfRange {
                index: self.collider_lod_index,
                len: self.detail_levels.len(),
            });
        }
        Ok(())
    }

    /// Farthest distance at which any chunk is shown: the last level's threshold.
    pub fn max_view_distance(&self) -> f32 {
        self.detail_levels
            .last()
            .map_or(0.0, |level| level.visible_distance)
    }
}

/// Picks a detail-level index for a chunk from its distance to the viewer.
#[derive(Clone, Debug)]
pub struct LodSelector {
    settings: LodSettings,
}

impl LodSelector {
    pub fn new(settings: LodSettings) -> Result<Self, LodSettingsError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Index into the detail-level table for a chunk `distance` away.
    ///
    /// Starts at the finest level and steps to the next one for every
    /// threshold the distance exceeds. The last level's threshold is the view
    /// distance, so it never advances past the last index.
    pub fn select(&self, distance: f32) -> usize {
        let levels = &self.settings.detail_levels;
        let mut index = 0;
        for (i, level) in levels.iter().enumerate().take(levels.len() - 1) {
            if distance > level.visible_distance {
                index = i + 1;
            } else {
                break;
            }
        }
        index
    }

    /// Whether a chunk at `distance` is inside the view distance.
    pub fn is_visible(&self, distance: f32) -> bool {
        distance <= self.max_view_distance()
    }

    pub fn detail_level(&self, index: usize) -> &DetailLevel {
        &self.settings.detail_levels[index]
    }

    pub fn detail_levels(&self) -> &[DetailLevel] {
        &self.settings.detail_levels
    }

    pub fn collider_lod_index(&self) -> usize {
        self.settings.collider_lod_index
    }

    pub fn max_view_distance(&self) -> f32 {
        self.settings.max_view_distance()
    }

    pub fn settings(&self) -> &LodSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lod(level: u8) -> LevelOfDetail {
        LevelOfDetail::new(level).expect("supported level")
    }

    fn selector(distances: &[f32]) -> LodSelector {
        let detail_levels = distances
            .iter()
            .enumerate()
            .map(|(i, &d)| DetailLevel::new(lod(i as u8), d))
            .collect();
        LodSelector::new(LodSettings {
            detail_levels,
            collider_lod_index: 0,
        })
        .expect("valid settings")
    }

    #[test]
    fn test_distance_between_first_thresholds_selects_second_level() {
        let selector = selector(&[100.0, 200.0, 400.0]);
        assert_eq!(selector.select(150.0), 1);
    }

    #[test]
    fn test_zero_distance_selects_finest() {
        let selector = selector(&[100.0, 200.0, 400.0]);
        assert_eq!(selector.select(0.0), 0);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let selector = selector(&[100.0, 200.0, 400.0]);
        assert_eq!(selector.select(100.0), 0, "exactly on a threshold keeps the finer level");
        assert_eq!(selector.select(100.001), 1);
        assert_eq!(selector.select(200.0), 1);
        assert_eq!(selector.select(250.0), 2);
    }

    #[test]
    fn test_far_distance_clamps_to_last_level() {
        let selector = selector(&[100.0, 200.0, 400.0]);
        assert_eq!(selector.select(10_000.0), 2);
        assert!(!selector.is_visible(10_000.0));
        assert!(selector.is_visible(400.0));
    }

    #[test]
    fn test_selection_monotonic_with_distance() {
        let selector = selector(&[50.0, 120.0, 300.0, 500.0]);
        let mut previous = 0;
        for step in 0..700 {
            let index = selector.select(step as f32);
            assert!(index >= previous, "index must not decrease: d={step}, {index} < {previous}");
            previous = index;
        }
    }

    #[test]
    fn test_single_level_always_selected() {
        let selector = selector(&[300.0]);
        assert_eq!(selector.select(0.0), 0);
        assert_eq!(selector.select(1_000.0), 0);
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = LodSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_view_distance(), 600.0);
    }

    #[test]
    fn test_invalid_tables_rejected() {
        let empty = LodSettings {
            detail_levels: vec![],
            collider_lod_index: 0,
        };
        assert_eq!(empty.validate(), Err(LodSettingsError::Empty));

        let decreasing = LodSettings {
            detail_levels: vec![DetailLevel::new(lod(0), 200.0), DetailLevel::new(lod(1), 100.0)],
            collider_lod_index: 0,
        };
        assert!(matches!(
            decreasing.validate(),
            Err(LodSettingsError::NotIncreasing { index: 1, .. })
        ));

        let collider = LodSettings {
            collider_lod_index: 3,
            ..Default::default()
        };
        assert_eq!(
            collider.validate(),
            Err(LodSettingsError::ColliderIndexOutOfRange { index: 3, len: 3 })
        );

        let zero = LodSettings {
            detail_levels: vec![DetailLevel::new(lod(0), 0.0)],
            collider_lod_index: 0,
        };
        assert!(matches!(
            zero.validate(),
            Err(LodSettingsError::NonPositiveDistance { index: 0, .. })
        ));
    }
}
