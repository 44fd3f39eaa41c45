//! Keyframed response curve mapping normalised heights to mesh heights.

use serde::{Deserialize, Serialize};

/// A single curve keyframe.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Interpolation between neighbouring keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveInterpolation {
    #[default]
    Linear,
    /// Cubic Hermite with flat tangents at every key.
    Smooth,
}

/// Maps a normalised height in `[0, 1]` to a height response.
///
/// Typical use flattens the low band (water) and exaggerates peaks. Inputs
/// outside the key range are clamped to the first/last key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightCurve {
    keys: Vec<CurveKey>,
    #[serde(default)]
    interpolation: CurveInterpolation,
}

impl HeightCurve {
    /// Build a curve from keys in any order. An empty key list yields the identity curve.
    pub fn new(mut keys: Vec<CurveKey>, interpolation: CurveInterpolation) -> Self {
        if keys.is_empty() {
            return Self::linear();
        }
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            keys,
            interpolation,
        }
    }

    /// Identity over `[0, 1]`.
    pub fn linear() -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)],
            interpolation: CurveInterpolation::Linear,
        }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn interpolation(&self) -> CurveInterpolation {
        self.interpolation
    }

    /// Value of the curve at `t`, clamped to the first and last keys outside
    /// their range. NaN evaluates to the first key.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return t;
        };
        if t.is_nan() || t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; guaranteed to exist and be > 0.
        let upper = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let span = b.time - a.time;
        if span <= 0.0 {
            return b.value;
        }

        let s = (t - a.time) / span;
        let s = match self.interpolation {
            CurveInterpolation::Linear => s,
            CurveInterpolation::Smooth => s * s * (3.0 - 2.0 * s),
        };
        a.value + (b.value - a.value) * s
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}
