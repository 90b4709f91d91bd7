//! Reporting utilities: station residuals, rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::Observation;
use crate::error::AppError;
use crate::models::FittedModel;

/// A station's departure from the fitted surface.
#[derive(Debug, Clone, PartialEq)]
pub struct StationResidual {
    pub observation: Observation,
    pub fitted: f64,
    /// `observed - fitted`; positive means wetter than the trend.
    pub residual: f64,
}

/// Stations furthest above / below the surface (top-N each side).
#[derive(Debug, Clone, Default)]
pub struct Rankings {
    pub wetter: Vec<StationResidual>,
    pub drier: Vec<StationResidual>,
}

/// Compute fitted values and residuals for each station.
pub fn compute_residuals(observations: &[Observation], model: &FittedModel) -> Result<Vec<StationResidual>, AppError> {
    let fitted = model.predict_many(observations.iter().map(|o| o.coord));
    let mut out = Vec::with_capacity(observations.len());
    for (o, f) in observations.iter().zip(fitted) {
        if !f.is_finite() {
            return Err(AppError::new(4, "Non-finite model prediction during residual computation."));
        }
        out.push(StationResidual {
            observation: *o,
            fitted: f,
            residual: o.value - f,
        });
    }
    Ok(out)
}

/// In-sample RMSE of the residuals (0 for an empty slice).
pub fn residual_rmse(residuals: &[StationResidual]) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    let sse: f64 = residuals.iter().map(|r| r.residual * r.residual).sum();
    (sse / residuals.len() as f64).sqrt()
}

/// Rank the top wetter-than-trend and drier-than-trend stations.
pub fn rank_residuals(residuals: &[StationResidual], top_n: usize) -> Rankings {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| b.residual.total_cmp(&a.residual));

    let wetter = sorted
        .iter()
        .take(top_n)
        .filter(|r| r.residual > 0.0)
        .cloned()
        .collect();
    let drier = sorted
        .iter()
        .rev()
        .take(top_n)
        .filter(|r| r.residual < 0.0)
        .cloned()
        .collect();

    Rankings { wetter, drier }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fit_model;

    fn stations() -> Vec<Observation> {
        vec![
            Observation::new(0.0, 0.0, 10.0),
            Observation::new(4.0, 1.0, 19.0),
            Observation::new(1.0, 5.0, 12.0),
            Observation::new(6.0, 6.0, 30.0),
            Observation::new(3.0, 2.5, 15.0),
        ]
    }

    #[test]
    fn residuals_sum_to_zero_for_least_squares_with_intercept() {
        let obs = stations();
        let model = fit_model(1, &obs).unwrap();
        let residuals = compute_residuals(&obs, &model).unwrap();
        assert_eq!(residuals.len(), 5);
        let total: f64 = residuals.iter().map(|r| r.residual).sum();
        assert!(total.abs() < 1e-9, "sum={total}");
        for r in &residuals {
            assert!((r.observation.value - r.fitted - r.residual).abs() < 1e-12);
        }
        assert!(residual_rmse(&residuals) > 0.0);
    }

    #[test]
    fn rank_residuals_splits_by_sign() {
        let r = |value: f64, residual: f64| StationResidual {
            observation: Observation::new(value, value, value),
            fitted: value - residual,
            residual,
        };
        let residuals = vec![r(1.0, 0.5), r(2.0, -3.0), r(3.0, 4.0), r(4.0, -0.1)];

        let rankings = rank_residuals(&residuals, 1);
        assert_eq!(rankings.wetter.len(), 1);
        assert_eq!(rankings.wetter[0].residual, 4.0);
        assert_eq!(rankings.drier.len(), 1);
        assert_eq!(rankings.drier[0].residual, -3.0);

        let all = rank_residuals(&residuals, 10);
        assert_eq!(all.wetter.len(), 2);
        assert_eq!(all.drier.len(), 2);
    }
}
