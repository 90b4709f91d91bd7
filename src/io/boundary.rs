//! Boundary ring files.
//!
//! A boundary file is a JSON array of `[x, y]` vertex pairs, in the same
//! coordinate system as the station CSV. The ring may be open or closed.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::AppError;

/// Read a boundary ring from a JSON file.
pub fn load_boundary_ring(path: &Path) -> Result<Vec<(f64, f64)>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open boundary JSON '{}': {e}", path.display())))?;
    read_boundary_ring(file)
}

pub fn read_boundary_ring<R: Read>(source: R) -> Result<Vec<(f64, f64)>, AppError> {
    let vertices: Vec<[f64; 2]> =
        serde_json::from_reader(source).map_err(|e| AppError::new(2, format!("Invalid boundary JSON: {e}")))?;
    if vertices.len() < 3 {
        return Err(AppError::new(
            2,
            format!("Boundary needs at least 3 vertices (got {}).", vertices.len()),
        ));
    }
    Ok(vertices.into_iter().map(|[x, y]| (x, y)).collect())
}
