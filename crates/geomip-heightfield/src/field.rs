//! The height query capability and a dense row-major implementation.

use crate::error::HeightFieldError;

/// Height returned for any coordinate outside a field.
pub const DEFAULT_HEIGHT: f32 = 0.0;

/// Read-only height lookup by integer grid coordinate.
///
/// Implementations must return [`DEFAULT_HEIGHT`] for coordinates outside
/// the field instead of failing, so mesh builders can sample one vertex past
/// the last row without special cases.
pub trait HeightField {
    /// Height at grid coordinate `(x, y)`.
    fn height(&self, x: i64, y: i64) -> f32;
}

impl<F> HeightField for F
where
    F: Fn(i64, i64) -> f32,
{
    fn height(&self, x: i64, y: i64) -> f32 {
        self(x, y)
    }
}

/// A dense height field stored as row-major `f32` samples.
///
/// `x` runs along a row (`0..width`), `y` selects the row (`0..length`).
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    width: u32,
    length: u32,
    samples: Vec<f32>,
}

impl HeightGrid {
    /// Create a field of the given dimensions with every sample at zero.
    pub fn new(width: u32, length: u32) -> Result<Self, HeightFieldError> {
        Self::filled(width, length, 0.0)
    }

    /// Create a square field of side `size` with every sample set to `height`.
    pub fn flat(size: u32, height: f32) -> Result<Self, HeightFieldError> {
        Self::filled(size, size, height)
    }

    fn filled(width: u32, length: u32, height: f32) -> Result<Self, HeightFieldError> {
        if width == 0 || length == 0 {
            return Err(HeightFieldError::EmptyField { width, length });
        }
        Ok(Self {
            width,
            length,
            samples: vec![height; width as usize * length as usize],
        })
    }

    /// Wrap an existing row-major sample buffer.
    pub fn from_samples(
        width: u32,
        length: u32,
        samples: Vec<f32>,
    ) -> Result<Self, HeightFieldError> {
        if width == 0 || length == 0 {
            return Err(HeightFieldError::EmptyField { width, length });
        }
        let expected = width as usize * length as usize;
        if samples.len() != expected {
            return Err(HeightFieldError::SampleCount {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            length,
            samples,
        })
    }

    /// Build a field by evaluating `f(x, y)` at every sample.
    pub fn from_fn(
        width: u32,
        length: u32,
        mut f: impl FnMut(u32, u32) -> f32,
    ) -> Result<Self, HeightFieldError> {
        let mut grid = Self::new(width, length)?;
        for y in 0..length {
            for x in 0..width {
                let idx = grid.index(x, y);
                grid.samples[idx] = f(x, y);
            }
        }
        Ok(grid)
    }

    /// Number of samples along a row.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Row-major sample slice.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Mutable row-major sample slice.
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Sample at `(x, y)`, or `None` when outside the field.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.length {
            Some(self.samples[self.index(x, y)])
        } else {
            None
        }
    }

    /// Overwrite the sample at `(x, y)`. Returns `false` when outside the field.
    pub fn set(&mut self, x: u32, y: u32, height: f32) -> bool {
        if x < self.width && y < self.length {
            let idx = self.index(x, y);
            self.samples[idx] = height;
            true
        } else {
            false
        }
    }

    /// Smallest and largest sample.
    pub fn min_max(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }

    /// Rescale all samples linearly into `[0, 1]`.
    ///
    /// A field with no height range (all samples equal) is left untouched.
    pub fn normalize(&mut self) {
        let (lo, hi) = self.min_max();
        if hi <= lo {
            return;
        }
        let range = hi - lo;
        for h in &mut self.samples {
            *h = (*h - lo) / range;
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl HeightField for HeightGrid {
    fn height(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 {
            return DEFAULT_HEIGHT;
        }
        match (u32::try_from(x), u32::try_from(y)) {
            (Ok(x), Ok(y)) => self.get(x, y).unwrap_or(DEFAULT_HEIGHT),
            _ => DEFAULT_HEIGHT,
        }
    }
}
