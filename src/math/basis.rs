//! Polynomial trend-surface basis functions.
//!
//! Coordinates are first mapped to roughly `[-1, 1]` with a [`CoordScaling`]
//! derived from the training set. Raw projected coordinates are in metres
//! (hundreds of kilometres), so raising them to the 5th power directly would
//! wreck the conditioning of the design matrix.
//!
//! Column layout per [`ModelSpec`]:
//!
//! - `Linear`: `[1, u, v]`
//! - `PolynomialWithInteraction(d)`: `[1, u, u^2, .., u^d, v, v^2, .., v^d, u^(d-1) v^(d-1)]`

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, ModelSpec, Observation};

/// Affine map from working coordinates to the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordScaling {
    pub center_x: f64,
    pub center_y: f64,
    pub half_range_x: f64,
    pub half_range_y: f64,
}

impl CoordScaling {
    /// Midrange / half-range scaling of the given observations.
    ///
    /// A zero range (all coordinates equal on an axis) keeps a unit scale; the
    /// resulting constant column is then caught as rank deficiency by the solver.
    pub fn fit(observations: &[Observation]) -> Self {
        let (min_x, max_x) = min_max(observations.iter().map(|o| o.coord.x));
        let (min_y, max_y) = min_max(observations.iter().map(|o| o.coord.y));
        Self {
            center_x: 0.5 * (min_x + max_x),
            center_y: 0.5 * (min_y + max_y),
            half_range_x: half_range(min_x, max_x),
            half_range_y: half_range(min_y, max_y),
        }
    }

    pub fn apply(&self, c: Coordinate) -> (f64, f64) {
        (
            (c.x - self.center_x) / self.half_range_x,
            (c.y - self.center_y) / self.half_range_y,
        )
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

fn half_range(min: f64, max: f64) -> f64 {
    let h = 0.5 * (max - min);
    if h.is_finite() && h > 0.0 { h } else { 1.0 }
}

/// Fill a design row for the given spec at scaled coordinates `(u, v)`.
///
/// # Panics
/// Panics if `out` is shorter than `spec.param_count()`.
pub fn fill_design_row(spec: ModelSpec, u: f64, v: f64, out: &mut [f64]) {
    match spec {
        ModelSpec::Linear => {
            out[0] = 1.0;
            out[1] = u;
            out[2] = v;
        }
        ModelSpec::PolynomialWithInteraction(d) => {
            let d = d as usize;
            out[0] = 1.0;
            let mut pu = 1.0;
            let mut pv = 1.0;
            for k in 1..=d {
                pu *= u;
                pv *= v;
                out[k] = pu;
                out[d + k] = pv;
            }
            // u^(d-1) and v^(d-1) sit one slot before the top power of each axis.
            let (iu, iv) = if d >= 2 { (out[d - 1], out[2 * d - 1]) } else { (1.0, 1.0) };
            out[2 * d + 1] = iu * iv;
        }
    }
}
