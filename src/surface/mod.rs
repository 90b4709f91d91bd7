//! Interpolation surface: final fit and evaluation over a lattice.
//!
//! The surface is produced in three steps that callers chain explicitly:
//!
//! 1. [`fit_final`]: fit the chosen degree on every observation
//! 2. [`build_grid`]: lay a regular lattice over the domain
//! 3. [`predict_over_grid`]: evaluate the model at every cell centre
//!
//! Extrapolated values are returned as-is. Clipping to a meaningful boundary
//! is the job of `spatial::boundary`.

pub mod grid;

pub use grid::*;

use rayon::prelude::*;

use crate::domain::{Observation, PredictionGrid};
use crate::error::ModelError;
use crate::models::{FittedModel, fit_model};

/// Fit `degree` on the full observation set (no held-out data).
pub fn fit_final(observations: &[Observation], degree: u32) -> Result<FittedModel, ModelError> {
    fit_model(degree, observations)
}

/// Populate every cell of `grid` with `model`'s prediction at the cell centre.
pub fn predict_over_grid(model: &FittedModel, mut grid: PredictionGrid) -> PredictionGrid {
    let geometry = grid.geometry;
    let cols = geometry.cols.max(1);
    let width = model.coefficients().len();

    grid.values
        .par_chunks_mut(cols)
        .enumerate()
        .for_each(|(row, out)| {
            let mut scratch = vec![0.0; width];
            for (col, v) in out.iter_mut().enumerate() {
                *v = model.predict_with(geometry.cell_center(row, col), &mut scratch);
            }
        });

    grid
}
