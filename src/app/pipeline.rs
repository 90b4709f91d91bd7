//! Shared pipeline logic behind the `cv` and `surface` commands.
//!
//! load (CSV or synthetic) -> reproject -> cross-validate degrees ->
//! final fit -> grid -> predict -> mask -> residuals
//!
//! The CLI front-end only prints and exports what this module returns.

use tracing::{info, warn};

use crate::data::{SampleData, generate_sample};
use crate::domain::{DatasetStats, Observation, PredictionGrid, Projection, RunConfig};
use crate::error::AppError;
use crate::fit::selection::{CvResult, select_degree_with};
use crate::io::boundary::load_boundary_ring;
use crate::io::ingest::{ColumnNames, RowError, load_observations};
use crate::logging::log_timed_operation;
use crate::models::FittedModel;
use crate::report::{Rankings, StationResidual, compute_residuals, rank_residuals};
use crate::spatial::{Boundary, Reprojector};
use crate::surface::{build_grid, fit_final, predict_over_grid};

/// Stations and boundary in working (projected) coordinates.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub observations: Vec<Observation>,
    pub boundary: Option<Boundary>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    /// Set when the stations are synthetic.
    pub sample: Option<SampleData>,
}

/// All computed outputs of a `psurf surface` run.
#[derive(Debug, Clone)]
pub struct SurfaceOutput {
    pub data: LoadedData,
    pub cv: CvResult,
    pub degree: u32,
    pub model: FittedModel,
    pub grid: PredictionGrid,
    pub residuals: Vec<StationResidual>,
    pub rankings: Rankings,
}

/// Load stations (and boundary, if any) and move them into working coordinates.
pub fn load_data(config: &RunConfig) -> Result<LoadedData, AppError> {
    let (raw, row_errors, default_ring, sample) = match &config.input {
        Some(path) => {
            let columns = ColumnNames {
                x: config.x_col.clone(),
                y: config.y_col.clone(),
                value: config.value_col.clone(),
            };
            let ingest = load_observations(path, &columns)?;
            (ingest.observations, ingest.row_errors, None, None)
        }
        None => {
            let sample = generate_sample(config.sample_count, config.sample_seed)?;
            info!(count = sample.observations.len(), seed = sample.seed, "generated synthetic stations");
            (sample.observations.clone(), Vec::new(), Some(sample.outline.clone()), Some(sample))
        }
    };

    if config.projection == Projection::Albers {
        ensure_lon_lat(&raw)?;
    }

    let ring = match &config.boundary {
        Some(path) => Some(load_boundary_ring(path)?),
        None => default_ring,
    };

    let reprojector = Reprojector::for_projection(config.projection);
    let observations = reprojector.observations(&raw);
    let boundary = ring
        .map(|r| Boundary::from_ring(&reprojector.ring(&r)))
        .transpose()?;

    let stats = DatasetStats::compute(&observations)
        .ok_or_else(|| AppError::new(3, "No valid observations after loading."))?;

    if let Some(b) = &boundary {
        info!(vertices = b.vertex_count(), "boundary ready");
        let outside = observations.iter().filter(|o| !b.contains(o.coord)).count();
        if outside > 0 {
            warn!(outside, "stations fall outside the boundary");
        }
    }

    Ok(LoadedData {
        observations,
        boundary,
        stats,
        row_errors,
        sample,
    })
}

/// Cross-validate the configured candidate degrees.
///
/// Fails with exit code 3 when no degree could be scored.
pub fn run_selection(config: &RunConfig, data: &LoadedData) -> Result<CvResult, AppError> {
    if config.min_degree == 0 || config.min_degree > config.max_degree {
        return Err(AppError::new(
            2,
            format!(
                "Invalid degree range {}..={} (need 1 <= min <= max).",
                config.min_degree, config.max_degree
            ),
        ));
    }

    let degrees = config.candidate_degrees();
    let cv = log_timed_operation("cross_validation", || {
        select_degree_with(
            &data.observations,
            &degrees,
            config.folds,
            config.seed,
            config.failure_policy,
        )
    })?;

    if cv.scores.is_empty() {
        let first = cv
            .failures
            .first()
            .map(|e| format!(" First failure: {e}."))
            .unwrap_or_default();
        return Err(AppError::new(
            3,
            format!("No candidate degree could be cross-validated.{first}"),
        ));
    }

    Ok(cv)
}

/// Execute the full surface pipeline and return the computed outputs.
pub fn run_surface(config: &RunConfig) -> Result<SurfaceOutput, AppError> {
    let data = load_data(config)?;
    let cv = run_selection(config, &data)?;

    let degree = match config.degree {
        Some(d) => d,
        None => cv
            .best_degree()
            .ok_or_else(|| AppError::new(3, "No degree available for the final surface."))?,
    };
    info!(degree, chosen_by_cv = config.degree.is_none(), "final degree");

    let model = fit_final(&data.observations, degree)?;

    let domain = data
        .boundary
        .as_ref()
        .and_then(Boundary::extent)
        .unwrap_or(data.stats.extent);
    let grid = build_grid(domain, config.target_cells)?;
    let grid = log_timed_operation("grid_prediction", || predict_over_grid(&model, grid));
    let grid = match &data.boundary {
        Some(b) => b.mask(grid),
        None => grid,
    };

    let residuals = compute_residuals(&data.observations, &model)?;
    let rankings = rank_residuals(&residuals, config.top_n);

    Ok(SurfaceOutput {
        data,
        cv,
        degree,
        model,
        grid,
        residuals,
        rankings,
    })
}

fn ensure_lon_lat(observations: &[Observation]) -> Result<(), AppError> {
    let bad = observations
        .iter()
        .position(|o| !((-180.0..=180.0).contains(&o.coord.x) && (-90.0..=90.0).contains(&o.coord.y)));
    match bad {
        Some(idx) => Err(AppError::new(
            2,
            format!(
                "Station {} has coordinates ({}, {}) outside lon/lat range; use `--projection identity` for projected input.",
                idx + 1,
                observations[idx].coord.x,
                observations[idx].coord.y
            ),
        )),
        None => Ok(()),
    }
}
