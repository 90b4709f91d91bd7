//! Regular prediction lattices.

use crate::domain::{Extent, GridGeometry, PredictionGrid};
use crate::error::ModelError;

/// Build a north-up lattice over `domain` with about `target_cells` cells.
///
/// Columns and rows follow the domain's aspect ratio:
/// `cols = round(sqrt(target * w / h))`, `rows = round(target / cols)`,
/// each clamped to `1..=target`.
/// Cells tile the domain exactly, so every cell centre lies inside it.
pub fn build_grid(domain: Extent, target_cells: usize) -> Result<PredictionGrid, ModelError> {
    if target_cells == 0 {
        return Err(ModelError::invalid("target cell count must be > 0"));
    }
    let w = domain.width();
    let h = domain.height();
    if !(domain.is_finite() && w > 0.0 && h > 0.0) {
        return Err(ModelError::invalid(format!(
            "grid domain must be finite with positive width and height (w={w}, h={h})"
        )));
    }

    let target = target_cells as f64;
    let cols = ((target * w / h).sqrt().round() as usize).clamp(1, target_cells);
    let rows = ((target / cols as f64).round() as usize).clamp(1, target_cells);

    Ok(PredictionGrid::empty(GridGeometry {
        min_x: domain.min_x,
        max_y: domain.max_y,
        cell_width: w / cols as f64,
        cell_height: h / rows as f64,
        cols,
        rows,
    }))
}
