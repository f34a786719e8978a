//! Fault-formation terrain generation.
//!
//! Each iteration cuts the field along a random line and raises every sample
//! on one side of it. The raise amount shrinks linearly from `max_delta` to
//! `min_delta` over the run, so early faults shape continents and late faults
//! add detail. After every pass a FIR erosion filter sweeps the field in all
//! four directions; the finished field is normalized to `[0, 1]`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::HeightFieldError;
use crate::field::HeightGrid;

/// Parameters for [`generate`].
#[derive(Clone, Debug, PartialEq)]
pub struct FaultParams {
    /// Number of fault lines to apply.
    pub iterations: u32,
    /// Height raise of the last iteration.
    pub min_delta: f32,
    /// Height raise of the first iteration.
    pub max_delta: f32,
    /// Erosion strength in `[0, 1]`. 0 disables smoothing.
    pub filter: f32,
    /// RNG seed. The same seed and size always produce the same field.
    pub seed: u64,
}

impl Default for FaultParams {
    fn default() -> Self {
        Self {
            iterations: 64,
            min_delta: 0.0,
            max_delta: 255.0,
            filter: 0.3,
            seed: 42,
        }
    }
}

impl FaultParams {
    fn validate(&self, size: u32) -> Result<(), HeightFieldError> {
        if size < 2 {
            return Err(HeightFieldError::InvalidFault(format!(
                "size {size} leaves no room for two distinct fault points"
            )));
        }
        if !(0.0..=1.0).contains(&self.filter) {
            return Err(HeightFieldError::InvalidFault(format!(
                "filter {} is outside [0, 1]",
                self.filter
            )));
        }
        if self.min_delta > self.max_delta {
            return Err(HeightFieldError::InvalidFault(format!(
                "min_delta {} exceeds max_delta {}",
                self.min_delta, self.max_delta
            )));
        }
        Ok(())
    }

    /// Raise amount for the given iteration.
    fn delta_at(&self, iteration: u32) -> f32 {
        let t = iteration as f32 / self.iterations.max(1) as f32;
        self.max_delta - (self.max_delta - self.min_delta) * t
    }
}

/// Generate a `size x size` fault-formation height field in `[0, 1]`.
pub fn generate(size: u32, params: &FaultParams) -> Result<HeightGrid, HeightFieldError> {
    params.validate(size)?;

    let mut grid = HeightGrid::new(size, size)?;
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let side = size as i64;

    for iteration in 0..params.iterations {
        let delta = params.delta_at(iteration);

        let x1 = rng.random_range(0..side);
        let z1 = rng.random_range(0..side);
        let (x2, z2) = loop {
            let candidate = (rng.random_range(0..side), rng.random_range(0..side));
            if candidate != (x1, z1) {
                break candidate;
            }
        };

        // Direction of the fault line.
        let line_x = x2 - x1;
        let line_z = z2 - z1;

        let samples = grid.samples_mut();
        for z in 0..side {
            for x in 0..side {
                let to_x = x - x1;
                let to_z = z - z1;
                if to_x * line_z - line_x * to_z > 0 {
                    samples[(z * side + x) as usize] += delta;
                }
            }
        }

        filter_height_field(&mut grid, params.filter);
    }

    grid.normalize();
    tracing::debug!(
        size,
        iterations = params.iterations,
        seed = params.seed,
        "generated fault-formation height field"
    );
    Ok(grid)
}

/// Apply the erosion filter across the whole field: left to right, right to
/// left, top to bottom, then bottom to top.
pub fn filter_height_field(grid: &mut HeightGrid, filter: f32) {
    let width = grid.width() as usize;
    let length = grid.length() as usize;
    let row_stride = width as isize;
    let samples = grid.samples_mut();

    for row in 0..length {
        filter_band(samples, row * width, 1, width, filter);
    }
    for row in 0..length {
        filter_band(samples, row * width + width - 1, -1, width, filter);
    }
    for col in 0..width {
        filter_band(samples, col, row_stride, length, filter);
    }
    for col in 0..width {
        filter_band(samples, (length - 1) * width + col, -row_stride, length, filter);
    }
}

/// Run the FIR filter along `count` samples starting at `start`, advancing by
/// `stride`. Each sample blends toward its already-filtered predecessor.
pub fn filter_band(samples: &mut [f32], start: usize, stride: isize, count: usize, filter: f32) {
    if count < 2 {
        return;
    }
    let mut previous = samples[start];
    let mut idx = start as isize;
    for _ in 1..count {
        idx += stride;
        let slot = &mut samples[idx as usize];
        *slot = filter * previous + (1.0 - filter) * *slot;
        previous = *slot;
    }
}
