//! Polynomial degree selection by k-fold cross-validation.
//!
//! For each candidate degree:
//! - hold out each fold once, fit on the remaining folds, predict the held-out set
//! - score the fold by RMSE
//! - average the fold RMSEs
//!
//! All degrees are scored against one fold assignment drawn up front, so the
//! resulting curve compares like with like. Picking a degree from the curve
//! is left to the caller; [`CvResult::best_degree`] is a convenience.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{FailurePolicy, ModelSpec, Observation};
use crate::error::{FitFailure, ModelError};
use crate::fit::folds::{FoldAssignment, assign_folds};
use crate::math::{RmseSummary, null_rmse, rmse_summary};
use crate::models::fit_spec;

/// Out-of-sample score of one fold.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldScore {
    pub fold: usize,
    pub n_test: usize,
    pub rmse: f64,
    /// Held-out pairs left out of the RMSE because a value was missing.
    pub ignored: usize,
}

/// Cross-validated score of one degree.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeScore {
    pub degree: u32,
    pub param_count: usize,
    /// Arithmetic mean of the fold RMSEs.
    pub mean_rmse: f64,
    /// Folds that contributed to `mean_rmse`.
    pub folds: Vec<FoldScore>,
}

impl DegreeScore {
    pub fn ignored_pairs(&self) -> usize {
        self.folds.iter().map(|f| f.ignored).sum()
    }
}

/// Output of degree selection: the degree -> error curve plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct CvResult {
    pub k: usize,
    pub seed: u64,
    pub n_observations: usize,
    /// RMSE of predicting the mean everywhere (in-sample baseline).
    pub null_rmse: f64,
    pub scores: BTreeMap<u32, DegreeScore>,
    /// Fit failures that were skipped under the active [`FailurePolicy`].
    pub failures: Vec<ModelError>,
}

impl CvResult {
    pub fn rmse(&self, degree: u32) -> Option<f64> {
        self.scores.get(&degree).map(|s| s.mean_rmse)
    }

    /// `(degree, mean_rmse)` pairs in ascending degree order.
    pub fn curve(&self) -> Vec<(u32, f64)> {
        self.scores.values().map(|s| (s.degree, s.mean_rmse)).collect()
    }

    /// Degree with the smallest mean RMSE (ties go to the lower degree).
    pub fn best_degree(&self) -> Option<u32> {
        let mut best: Option<&DegreeScore> = None;
        for s in self.scores.values() {
            if best.is_none_or(|b| s.mean_rmse < b.mean_rmse) {
                best = Some(s);
            }
        }
        best.map(|s| s.degree)
    }
}

/// Mean held-out RMSE of `degree` over every fold of `folds`.
///
/// The first failing fold aborts with a fit error naming degree and fold.
pub fn cross_validate(
    observations: &[Observation],
    degree: u32,
    folds: &FoldAssignment,
) -> Result<f64, ModelError> {
    let scores = cross_validate_folds(observations, degree, folds)?;
    Ok(mean_rmse(&scores))
}

/// Per-fold scores of `degree`, in fold-label order.
pub fn cross_validate_folds(
    observations: &[Observation],
    degree: u32,
    folds: &FoldAssignment,
) -> Result<Vec<FoldScore>, ModelError> {
    validate_observations(observations)?;
    if folds.len() != observations.len() {
        return Err(ModelError::invalid(format!(
            "fold assignment covers {} observations but {} were given",
            folds.len(),
            observations.len()
        )));
    }
    let spec = ModelSpec::for_degree(degree)?;
    (1..=folds.k())
        .map(|label| evaluate_fold(observations, spec, folds, label))
        .collect()
}

/// Cross-validate every candidate degree against one seeded fold assignment.
///
/// A degree whose fits fail is left out of the curve and recorded in
/// [`CvResult::failures`].
pub fn select_degree(
    observations: &[Observation],
    candidate_degrees: &[u32],
    k: usize,
    seed: u64,
) -> Result<CvResult, ModelError> {
    select_degree_with(observations, candidate_degrees, k, seed, FailurePolicy::SkipDegree)
}

/// [`select_degree`] with an explicit policy for failing fold fits.
pub fn select_degree_with(
    observations: &[Observation],
    candidate_degrees: &[u32],
    k: usize,
    seed: u64,
    policy: FailurePolicy,
) -> Result<CvResult, ModelError> {
    validate_observations(observations)?;
    if candidate_degrees.is_empty() {
        return Err(ModelError::invalid("no candidate degrees given"));
    }

    let mut specs = candidate_degrees
        .iter()
        .map(|&d| ModelSpec::for_degree(d))
        .collect::<Result<Vec<_>, _>>()?;
    specs.sort_unstable_by_key(|s| s.degree());
    specs.dedup();

    let folds = assign_folds(observations.len(), k, seed)?;
    let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
    let null_rmse = null_rmse(&values)?;

    // Degrees are independent; the indexed collect keeps ascending order.
    let outcomes: Vec<(ModelSpec, Vec<Result<FoldScore, ModelError>>)> = specs
        .par_iter()
        .map(|&spec| {
            let per_fold = (1..=k)
                .map(|label| evaluate_fold(observations, spec, &folds, label))
                .collect();
            (spec, per_fold)
        })
        .collect();

    let mut scores = BTreeMap::new();
    let mut failures = Vec::new();

    for (spec, per_fold) in outcomes {
        let degree = spec.degree();
        let (ok, failed): (Vec<_>, Vec<_>) = per_fold.into_iter().partition(|r| r.is_ok());
        let ok: Vec<FoldScore> = ok.into_iter().filter_map(Result::ok).collect();
        let failed: Vec<ModelError> = failed.into_iter().filter_map(Result::err).collect();

        for err in &failed {
            warn!(degree, error = %err, "fold fit failed");
        }

        let keep = match policy {
            FailurePolicy::Abort => {
                if let Some(err) = failed.into_iter().next() {
                    return Err(err);
                }
                true
            }
            FailurePolicy::SkipDegree => {
                let keep = failed.is_empty();
                failures.extend(failed);
                keep
            }
            FailurePolicy::SkipFold => {
                failures.extend(failed);
                !ok.is_empty()
            }
        };
        if !keep {
            continue;
        }

        let score = DegreeScore {
            degree,
            param_count: spec.param_count(),
            mean_rmse: mean_rmse(&ok),
            folds: ok,
        };
        let ignored = score.ignored_pairs();
        if ignored > 0 {
            warn!(degree, ignored, "missing values left out of cross-validated RMSE");
        }
        info!(
            degree,
            params = score.param_count,
            folds = score.folds.len(),
            rmse = score.mean_rmse,
            "degree scored"
        );
        scores.insert(degree, score);
    }

    Ok(CvResult {
        k,
        seed,
        n_observations: observations.len(),
        null_rmse,
        scores,
        failures,
    })
}

fn evaluate_fold(
    observations: &[Observation],
    spec: ModelSpec,
    folds: &FoldAssignment,
    label: usize,
) -> Result<FoldScore, ModelError> {
    let mut train = Vec::with_capacity(observations.len());
    let mut test = Vec::new();
    for (i, o) in observations.iter().enumerate() {
        if folds.label(i) == label {
            test.push(o);
        } else {
            train.push(*o);
        }
    }

    let model = fit_spec(spec, &train).map_err(|e| e.in_fold(label))?;

    let observed: Vec<f64> = test.iter().map(|o| o.value).collect();
    let predicted = model.predict_many(test.iter().map(|o| o.coord));
    let summary = score_held_out(spec, label, &observed, &predicted)?;

    debug!(
        degree = spec.degree(),
        fold = label,
        n_train = train.len(),
        n_test = test.len(),
        rmse = summary.rmse,
        "fold evaluated"
    );

    Ok(FoldScore {
        fold: label,
        n_test: test.len(),
        rmse: summary.rmse,
        ignored: summary.ignored,
    })
}

/// RMSE of one held-out fold; a fold with nothing to score fails with its degree and label.
fn score_held_out(
    spec: ModelSpec,
    label: usize,
    observed: &[f64],
    predicted: &[f64],
) -> Result<RmseSummary, ModelError> {
    rmse_summary(observed, predicted).map_err(|_| ModelError::Fit {
        degree: spec.degree(),
        fold: Some(label),
        reason: FitFailure::NoUsablePredictions {
            held_out: observed.len(),
        },
    })
}

fn mean_rmse(scores: &[FoldScore]) -> f64 {
    scores.iter().map(|s| s.rmse).sum::<f64>() / scores.len() as f64
}

fn validate_observations(observations: &[Observation]) -> Result<(), ModelError> {
    if observations.is_empty() {
        return Err(ModelError::invalid("no observations given"));
    }
    if observations
        .iter()
        .any(|o| !(o.coord.x.is_finite() && o.coord.y.is_finite() && o.value.is_finite()))
    {
        return Err(ModelError::invalid("observations must have finite coordinates and values"));
    }
    Ok(())
}
