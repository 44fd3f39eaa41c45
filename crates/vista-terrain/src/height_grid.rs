//! Row-major 2D grid of height samples.

/// A 2D grid of `f32` samples stored row-major (`index = y * width + x`).
///
/// Terrain height grids are `(N + 2) x (N + 2)`: `N` rendered samples per line
/// plus a one-sample border that only feeds normal computation.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl HeightGrid {
    /// Create a grid filled with `fill`.
    pub fn new(width: usize, height: usize, fill: f32) -> Self {
        Self {
            width,
            height,
            values: vec![fill; width * height],
        }
    }

    /// Wrap existing row-major samples.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            width * height,
            "grid sample count must equal width * height"
        );
        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` for grids with equal width and height.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.values[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        debug_assert!(x < self.width && y < self.height);
        self.values[y * self.width + x] = value;
    }

    /// All samples in row-major order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Smallest and largest sample, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.values.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
