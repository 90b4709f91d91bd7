//! Result exports.
//!
//! - the cross-validation curve as CSV, easy to consume in spreadsheets
//! - the prediction grid as JSON, which `psurf plot` can read back

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::domain::{GridFile, ModelSpec, Observation};
use crate::error::AppError;
use crate::fit::selection::CvResult;
use crate::io::ingest::ColumnNames;

/// Write the degree -> RMSE curve to a CSV file.
pub fn write_cv_csv(path: &Path, cv: &CvResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CV CSV '{}': {e}", path.display())))?;
    write_cv_csv_to(file, cv)
}

pub fn write_cv_csv_to<W: Write>(sink: W, cv: &CvResult) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);

    writer
        .write_record(["degree", "parameters", "mean_rmse", "folds_used", "ignored_pairs"])
        .map_err(|e| AppError::new(2, format!("Failed to write CV CSV header: {e}")))?;

    for s in cv.scores.values() {
        writer
            .write_record([
                s.degree.to_string(),
                s.param_count.to_string(),
                format!("{:.10}", s.mean_rmse),
                s.folds.len().to_string(),
                s.ignored_pairs().to_string(),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write CV CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CV CSV: {e}")))?;
    Ok(())
}

/// Write stations as CSV in the layout `io::ingest` reads back.
pub fn write_observations_csv<W: Write>(
    sink: W,
    observations: &[Observation],
    columns: &ColumnNames,
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);

    writer
        .write_record([columns.x.as_str(), columns.y.as_str(), columns.value.as_str()])
        .map_err(|e| AppError::new(2, format!("Failed to write station CSV header: {e}")))?;

    for o in observations {
        writer
            .write_record([
                format!("{:.5}", o.coord.x),
                format!("{:.5}", o.coord.y),
                format!("{:.2}", o.value),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write station CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush station CSV: {e}")))?;
    Ok(())
}

/// Write a grid JSON file.
pub fn write_grid_json(path: &Path, grid: &GridFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create grid JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, grid)
        .map_err(|e| AppError::new(2, format!("Failed to write grid JSON: {e}")))?;
    Ok(())
}

/// Read a grid JSON file.
pub fn read_grid_json(path: &Path) -> Result<GridFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open grid JSON '{}': {e}", path.display())))?;
    read_grid_json_from(file)
}

pub fn read_grid_json_from<R: Read>(source: R) -> Result<GridFile, AppError> {
    let grid: GridFile =
        serde_json::from_reader(source).map_err(|e| AppError::new(2, format!("Invalid grid JSON: {e}")))?;
    if let ModelSpec::PolynomialWithInteraction(d) = grid.model {
        if d < 2 {
            return Err(AppError::new(2, format!("Invalid grid JSON: polynomial degree {d}")));
        }
    }
    // Validate the shape now so callers can rely on `to_grid`.
    grid.to_grid()?;
    Ok(grid)
}
