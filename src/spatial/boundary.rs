//! Boundary polygon and grid masking.

use geo::{BoundingRect, Contains, Coord, LineString, Polygon};

use crate::domain::{Coordinate, Extent, PredictionGrid};
use crate::error::ModelError;

/// A single-ring study-area boundary in working coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    polygon: Polygon<f64>,
}

impl Boundary {
    /// Build from an exterior ring; the ring is closed automatically.
    pub fn from_ring(ring: &[(f64, f64)]) -> Result<Self, ModelError> {
        if ring.len() < 3 {
            return Err(ModelError::invalid(format!(
                "boundary ring needs at least 3 vertices (got {})",
                ring.len()
            )));
        }
        if ring.iter().any(|(x, y)| !(x.is_finite() && y.is_finite())) {
            return Err(ModelError::invalid("boundary ring has non-finite vertices"));
        }
        Ok(Self {
            polygon: Polygon::new(LineString::from(ring.to_vec()), vec![]),
        })
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        self.polygon.contains(&Coord { x: c.x, y: c.y })
    }

    pub fn extent(&self) -> Option<Extent> {
        self.polygon
            .bounding_rect()
            .map(|r| Extent::new(r.min().x, r.min().y, r.max().x, r.max().y))
    }

    pub fn vertex_count(&self) -> usize {
        self.polygon.exterior().0.len()
    }

    /// Blank out (set to `NaN`) every cell whose centre falls outside the boundary.
    pub fn mask(&self, mut grid: PredictionGrid) -> PredictionGrid {
        let geometry = grid.geometry;
        for (idx, v) in grid.values.iter_mut().enumerate() {
            if !self.contains(geometry.center_at(idx)) {
                *v = f64::NAN;
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GridGeometry;

    fn triangle() -> Boundary {
        Boundary::from_ring(&[(0.0, 0.0), (12.0, 0.0), (0.0, 12.0)]).unwrap()
    }

    #[test]
    fn contains_and_extent() {
        let b = triangle();
        assert!(b.contains(Coordinate::new(2.0, 2.0)));
        assert!(!b.contains(Coordinate::new(8.0, 8.0)));
        assert_eq!(b.extent().unwrap(), Extent::new(0.0, 0.0, 12.0, 12.0));
        // Closed automatically: 3 vertices + closing vertex.
        assert_eq!(b.vertex_count(), 4);
    }

    #[test]
    fn mask_blanks_cells_outside() {
        let geometry = GridGeometry {
            min_x: 0.0,
            max_y: 10.0,
            cell_width: 5.0,
            cell_height: 5.0,
            cols: 2,
            rows: 2,
        };
        let grid = PredictionGrid {
            geometry,
            values: vec![1.0, 2.0, 3.0, 4.0],
        };
        let masked = triangle().mask(grid);
        // Centres: (2.5,7.5) in, (7.5,7.5) out, (2.5,2.5) in, (7.5,2.5) in.
        assert_eq!(masked.value(0, 0), 1.0);
        assert!(masked.value(0, 1).is_nan());
        assert_eq!(masked.value(1, 0), 3.0);
        assert_eq!(masked.value(1, 1), 4.0);
    }

    #[test]
    fn degenerate_rings_are_rejected() {
        assert!(Boundary::from_ring(&[(0.0, 0.0), (1.0, 1.0)]).is_err());
        assert!(Boundary::from_ring(&[(0.0, 0.0), (1.0, f64::NAN), (2.0, 0.0)]).is_err());
    }
}
