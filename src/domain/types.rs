//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during cross-validation and fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A point in the working (projected) coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single station measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub coord: Coordinate,
    /// Accumulated precipitation (units are whatever the input used).
    pub value: f64,
}

impl Observation {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self {
            coord: Coordinate::new(x, y),
            value,
        }
    }
}

/// Axis-aligned bounding box in the working coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounding box of a set of observations (`None` if empty).
    pub fn from_observations(observations: &[Observation]) -> Option<Self> {
        Self::from_coords(observations.iter().map(|o| o.coord))
    }

    pub fn from_coords(coords: impl IntoIterator<Item = Coordinate>) -> Option<Self> {
        let mut ext = Extent::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for c in coords {
            ext.min_x = ext.min_x.min(c.x);
            ext.min_y = ext.min_y.min(c.y);
            ext.max_x = ext.max_x.max(c.x);
            ext.max_y = ext.max_y.max(c.y);
        }
        if ext.is_finite() { Some(ext) } else { None }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite() && self.min_y.is_finite() && self.max_x.is_finite() && self.max_y.is_finite()
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        c.x >= self.min_x && c.x <= self.max_x && c.y >= self.min_y && c.y <= self.max_y
    }
}

/// Regression basis family for a polynomial degree.
///
/// - `Linear`: intercept, `x`, `y`.
/// - `PolynomialWithInteraction(d)` (`d >= 2`): intercept, `x..x^d`, `y..y^d`
///   and a single interaction term `x^(d-1) * y^(d-1)`.
///
/// Construct through [`ModelSpec::for_degree`] so the `d >= 2` invariant holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "degree", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear,
    PolynomialWithInteraction(u32),
}

impl ModelSpec {
    pub fn for_degree(degree: u32) -> Result<Self, ModelError> {
        match degree {
            0 => Err(ModelError::invalid("polynomial degree must be >= 1")),
            1 => Ok(ModelSpec::Linear),
            d => Ok(ModelSpec::PolynomialWithInteraction(d)),
        }
    }

    pub fn degree(self) -> u32 {
        match self {
            ModelSpec::Linear => 1,
            ModelSpec::PolynomialWithInteraction(d) => d,
        }
    }

    /// Number of regression coefficients (including the intercept).
    pub fn param_count(self) -> usize {
        match self {
            ModelSpec::Linear => 3,
            ModelSpec::PolynomialWithInteraction(d) => 2 * d as usize + 2,
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> String {
        match self {
            ModelSpec::Linear => "linear".to_string(),
            ModelSpec::PolynomialWithInteraction(d) => format!("poly{d}+xy{}", d - 1),
        }
    }
}

/// Coordinate system of the input coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Projection {
    /// Input is WGS84 lon/lat; project to California Albers (EPSG:3310).
    Albers,
    /// Input is already in a projected system; use as-is.
    Identity,
}

/// What to do when a fold fit fails during degree selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Drop the whole degree from the error curve.
    #[default]
    SkipDegree,
    /// Drop only the failing fold; the degree keeps the mean over the others.
    SkipFold,
    /// Return the first failure as an error.
    Abort,
}

/// Summary stats about the observations actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_points: usize,
    pub extent: Extent,
    pub value_min: f64,
    pub value_max: f64,
    pub value_mean: f64,
}

impl DatasetStats {
    pub fn compute(observations: &[Observation]) -> Option<Self> {
        let extent = Extent::from_observations(observations)?;
        let mut value_min = f64::INFINITY;
        let mut value_max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for o in observations {
            value_min = value_min.min(o.value);
            value_max = value_max.max(o.value);
            sum += o.value;
        }
        if !(value_min.is_finite() && value_max.is_finite()) {
            return None;
        }
        Some(Self {
            n_points: observations.len(),
            extent,
            value_min,
            value_max,
            value_mean: sum / observations.len() as f64,
        })
    }
}

/// Geometry of a north-up prediction lattice.
///
/// Row 0 is the northern-most row; cell `(row, col)` has its centre at
/// `(min_x + (col + 0.5) * cell_width, max_y - (row + 0.5) * cell_height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub min_x: f64,
    pub max_y: f64,
    pub cell_width: f64,
    pub cell_height: f64,
    pub cols: usize,
    pub rows: usize,
}

impl GridGeometry {
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn cell_center(&self, row: usize, col: usize) -> Coordinate {
        Coordinate::new(
            self.min_x + (col as f64 + 0.5) * self.cell_width,
            self.max_y - (row as f64 + 0.5) * self.cell_height,
        )
    }

    /// Centre of the cell at row-major index `idx`.
    pub fn center_at(&self, idx: usize) -> Coordinate {
        self.cell_center(idx / self.cols, idx % self.cols)
    }

    /// Outer bounds of the lattice (cell edges, not centres).
    pub fn extent(&self) -> Extent {
        Extent::new(
            self.min_x,
            self.max_y - self.rows as f64 * self.cell_height,
            self.min_x + self.cols as f64 * self.cell_width,
            self.max_y,
        )
    }
}

/// A regular lattice of cell centres with one value per cell (`NaN` = no value).
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionGrid {
    pub geometry: GridGeometry,
    /// Row-major values, `rows * cols` long.
    pub values: Vec<f64>,
}

impl PredictionGrid {
    /// A grid with every cell unpopulated.
    pub fn empty(geometry: GridGeometry) -> Self {
        Self {
            values: vec![f64::NAN; geometry.cell_count()],
            geometry,
        }
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.geometry.cols + col]
    }

    pub fn centers(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.values.len()).map(|i| self.geometry.center_at(i))
    }

    /// Min/max over populated cells.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in self.values.iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        if min.is_finite() && max.is_finite() { Some((min, max)) } else { None }
    }

    pub fn populated_cells(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }
}

/// A saved prediction grid (JSON).
///
/// Masked or unpopulated cells are stored as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub model: ModelSpec,
    pub projection: Projection,
    pub geometry: GridGeometry,
    pub values: Vec<Option<f64>>,
}

impl GridFile {
    pub fn new(grid: &PredictionGrid, model: ModelSpec, projection: Projection) -> Self {
        Self {
            tool: "psurf".to_string(),
            generated_at: Utc::now(),
            model,
            projection,
            geometry: grid.geometry,
            values: grid
                .values
                .iter()
                .map(|v| if v.is_finite() { Some(*v) } else { None })
                .collect(),
        }
    }

    /// Back to an in-memory grid; fails if the value count does not match the geometry.
    pub fn to_grid(&self) -> Result<PredictionGrid, ModelError> {
        if self.geometry.cols == 0 || self.geometry.rows == 0 {
            return Err(ModelError::invalid("grid file has an empty geometry"));
        }
        if self.values.len() != self.geometry.cell_count() {
            return Err(ModelError::invalid(format!(
                "grid file has {} values for {} cells",
                self.values.len(),
                self.geometry.cell_count()
            )));
        }
        Ok(PredictionGrid {
            geometry: self.geometry,
            values: self.values.iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
        })
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus env fallbacks and defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Station CSV; `None` means "generate a synthetic sample".
    pub input: Option<PathBuf>,
    pub x_col: String,
    pub y_col: String,
    pub value_col: String,
    pub projection: Projection,

    pub sample_count: usize,
    pub sample_seed: u64,

    pub min_degree: u32,
    pub max_degree: u32,
    pub folds: usize,
    pub seed: u64,
    pub failure_policy: FailurePolicy,

    /// Degree for the final surface; `None` picks the minimal-RMSE degree.
    pub degree: Option<u32>,
    pub target_cells: usize,
    pub boundary: Option<PathBuf>,

    /// Stations listed on each side of the residual ranking.
    pub top_n: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_cv: Option<PathBuf>,
    pub export_grid: Option<PathBuf>,
}

impl RunConfig {
    /// Candidate degrees `min_degree..=max_degree`.
    pub fn candidate_degrees(&self) -> Vec<u32> {
        (self.min_degree..=self.max_degree).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_spec_variants_and_counts() {
        assert!(ModelSpec::for_degree(0).is_err());
        assert_eq!(ModelSpec::for_degree(1).unwrap(), ModelSpec::Linear);
        assert_eq!(
            ModelSpec::for_degree(3).unwrap(),
            ModelSpec::PolynomialWithInteraction(3)
        );
        assert_eq!(ModelSpec::Linear.param_count(), 3);
        assert_eq!(ModelSpec::PolynomialWithInteraction(2).param_count(), 6);
        assert_eq!(ModelSpec::PolynomialWithInteraction(5).param_count(), 12);
        assert_eq!(ModelSpec::PolynomialWithInteraction(4).degree(), 4);
    }

    #[test]
    fn grid_geometry_centers_are_north_up() {
        let g = GridGeometry {
            min_x: 0.0,
            max_y: 10.0,
            cell_width: 2.0,
            cell_height: 5.0,
            cols: 5,
            rows: 2,
        };
        assert_eq!(g.cell_center(0, 0), Coordinate::new(1.0, 7.5));
        assert_eq!(g.center_at(9), Coordinate::new(9.0, 2.5));
        assert_eq!(g.extent(), Extent::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn stats_cover_values_and_extent() {
        let obs = vec![
            Observation::new(0.0, 1.0, 10.0),
            Observation::new(2.0, -1.0, 30.0),
        ];
        let stats = DatasetStats::compute(&obs).unwrap();
        assert_eq!(stats.n_points, 2);
        assert_eq!(stats.extent, Extent::new(0.0, -1.0, 2.0, 1.0));
        assert_eq!(stats.value_mean, 20.0);
        assert!(DatasetStats::compute(&[]).is_none());
    }
}
