//! Fitted trend-surface models.
//!
//! The fitter and the predictor share the two primitives from `math::basis`:
//! - scale a coordinate with the training-set [`CoordScaling`]
//! - build a design row for the model's [`ModelSpec`]

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, ModelSpec, Observation};
use crate::error::ModelError;
use crate::math::{CoordScaling, fill_design_row, solve_least_squares};

/// A least-squares fit of one [`ModelSpec`] to a set of observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    spec: ModelSpec,
    scaling: CoordScaling,
    coefficients: Vec<f64>,
    n_train: usize,
}

impl FittedModel {
    pub fn spec(&self) -> ModelSpec {
        self.spec
    }

    /// Coefficients in basis-column order (see `math::basis`), for scaled coordinates.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn training_size(&self) -> usize {
        self.n_train
    }

    /// Predict the response at `coord`.
    pub fn predict(&self, coord: Coordinate) -> f64 {
        let mut row = vec![0.0; self.coefficients.len()];
        self.predict_with(coord, &mut row)
    }

    /// Predict using a caller-provided scratch row (avoids an allocation per call).
    pub fn predict_with(&self, coord: Coordinate, row: &mut [f64]) -> f64 {
        let (u, v) = self.scaling.apply(coord);
        fill_design_row(self.spec, u, v, row);
        row.iter().zip(&self.coefficients).map(|(x, b)| x * b).sum()
    }

    pub fn predict_many(&self, coords: impl IntoIterator<Item = Coordinate>) -> Vec<f64> {
        let mut row = vec![0.0; self.coefficients.len()];
        coords.into_iter().map(|c| self.predict_with(c, &mut row)).collect()
    }
}

/// Fit a polynomial trend surface of the given degree by ordinary least squares.
///
/// Fit failures carry `fold: None`; cross-validation attaches the fold label.
pub fn fit_model(degree: u32, training: &[Observation]) -> Result<FittedModel, ModelError> {
    let spec = ModelSpec::for_degree(degree)?;
    fit_spec(spec, training)
}

pub fn fit_spec(spec: ModelSpec, training: &[Observation]) -> Result<FittedModel, ModelError> {
    if training.is_empty() {
        return Err(ModelError::invalid("no observations to fit"));
    }
    if training
        .iter()
        .any(|o| !(o.coord.x.is_finite() && o.coord.y.is_finite() && o.value.is_finite()))
    {
        return Err(ModelError::invalid("observations must have finite coordinates and values"));
    }

    let n = training.len();
    let p = spec.param_count();
    let scaling = CoordScaling::fit(training);

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut y = DVector::<f64>::zeros(n);
    let mut row = vec![0.0; p];
    for (i, o) in training.iter().enumerate() {
        let (u, v) = scaling.apply(o.coord);
        fill_design_row(spec, u, v, &mut row);
        for (j, &val) in row.iter().enumerate() {
            x[(i, j)] = val;
        }
        y[i] = o.value;
    }

    let beta = solve_least_squares(&x, &y).map_err(|reason| ModelError::Fit {
        degree: spec.degree(),
        fold: None,
        reason,
    })?;

    Ok(FittedModel {
        spec,
        scaling,
        coefficients: beta.iter().copied().collect(),
        n_train: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FitFailure;

    fn plane(x: f64, y: f64) -> f64 {
        2.0 * x + 3.0 * y + 1.0
    }

    fn scattered(n: usize, f: impl Fn(f64, f64) -> f64) -> Vec<Observation> {
        // Deterministic, non-lattice layout so no axis has repeated values.
        (0..n)
            .map(|i| {
                let t = i as f64;
                let x = (t * 0.618_034).fract() * 10.0;
                let y = (t * 0.414_214 + 0.3).fract() * 10.0;
                Observation::new(x, y, f(x, y))
            })
            .collect()
    }

    #[test]
    fn linear_fit_recovers_plane() {
        let obs = scattered(12, plane);
        let m = fit_model(1, &obs).unwrap();
        assert_eq!(m.spec(), ModelSpec::Linear);
        let p = m.predict(Coordinate::new(4.0, 7.0));
        assert!((p - plane(4.0, 7.0)).abs() < 1e-9, "got {p}");
    }

    #[test]
    fn quadratic_fit_recovers_interaction_surface() {
        let f = |x: f64, y: f64| 1.0 + x - y + 0.5 * x * x + 0.25 * x * y;
        let obs = scattered(30, f);
        let m = fit_model(2, &obs).unwrap();
        for c in [Coordinate::new(1.0, 2.0), Coordinate::new(8.5, 0.5)] {
            assert!((m.predict(c) - f(c.x, c.y)).abs() < 1e-8);
        }
    }

    #[test]
    fn too_few_points_is_insufficient_data() {
        let obs = scattered(5, plane);
        let err = fit_model(3, &obs).unwrap_err();
        assert_eq!(
            err,
            ModelError::Fit {
                degree: 3,
                fold: None,
                reason: FitFailure::InsufficientData {
                    observations: 5,
                    parameters: 8
                }
            }
        );
    }

    #[test]
    fn collinear_coordinates_are_rank_deficient() {
        // All stations on one vertical line: the x column is constant.
        let obs: Vec<Observation> = (0..10).map(|i| Observation::new(3.0, i as f64, i as f64)).collect();
        let err = fit_model(1, &obs).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Fit {
                reason: FitFailure::RankDeficient { .. },
                ..
            }
        ));
    }

    #[test]
    fn empty_or_nonfinite_input_is_invalid() {
        assert!(matches!(fit_model(1, &[]), Err(ModelError::InvalidInput(_))));
        let obs = vec![
            Observation::new(0.0, 0.0, f64::NAN),
            Observation::new(1.0, 0.0, 1.0),
            Observation::new(0.0, 1.0, 1.0),
        ];
        assert!(matches!(fit_model(1, &obs), Err(ModelError::InvalidInput(_))));
    }
}
