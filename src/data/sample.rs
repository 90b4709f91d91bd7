//! Synthetic station sample inside a coarse California outline.
//!
//! Used when no station CSV is given, and by tests. Stations are drawn
//! uniformly inside the outline (rejection sampling over its bounding box)
//! and given a seasonal precipitation total with the familiar pattern: wet in
//! the north-west, dry in the south-east, plus Gaussian station noise.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Coordinate, Observation};
use crate::error::AppError;
use crate::spatial::Boundary;

/// Coarse California outline as `(lon, lat)` in degrees (WGS84).
pub const CALIFORNIA_OUTLINE: &[(f64, f64)] = &[
    (-124.21, 41.99),
    (-120.00, 41.99),
    (-120.00, 39.00),
    (-114.63, 35.00),
    (-114.13, 34.27),
    (-114.72, 32.72),
    (-117.12, 32.53),
    (-117.25, 32.87),
    (-118.52, 34.03),
    (-120.62, 34.57),
    (-120.64, 35.14),
    (-121.89, 36.31),
    (-122.00, 36.96),
    (-122.51, 37.78),
    (-123.00, 38.00),
    (-123.73, 38.95),
    (-123.83, 39.80),
    (-124.35, 40.44),
];

/// Standard deviation of the station noise (mm).
const NOISE_SD_MM: f64 = 60.0;

/// Give up after this many rejected draws per requested station.
const MAX_DRAWS_PER_STATION: usize = 1_000;

#[derive(Debug, Clone)]
pub struct SampleData {
    /// Stations in lon/lat degrees.
    pub observations: Vec<Observation>,
    /// Outline in lon/lat degrees.
    pub outline: Vec<(f64, f64)>,
    pub seed: u64,
}

/// Noise-free seasonal total (mm) at `(lon, lat)`.
pub fn precipitation_trend(lon: f64, lat: f64) -> f64 {
    let north = lat - 32.5;
    let west = -114.0 - lon;
    (150.0 + 95.0 * north + 40.0 * west + 6.0 * north * west).max(0.0)
}

pub fn generate_sample(count: usize, seed: u64) -> Result<SampleData, AppError> {
    if count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, NOISE_SD_MM)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let outline = Boundary::from_ring(CALIFORNIA_OUTLINE)?;
    let bounds = outline
        .extent()
        .ok_or_else(|| AppError::new(4, "Outline has no extent."))?;

    let mut observations = Vec::with_capacity(count);
    let mut draws = 0usize;
    while observations.len() < count {
        draws += 1;
        if draws > count * MAX_DRAWS_PER_STATION {
            return Err(AppError::new(4, "Failed to place synthetic stations inside the outline."));
        }

        let lon = rng.gen_range(bounds.min_x..=bounds.max_x);
        let lat = rng.gen_range(bounds.min_y..=bounds.max_y);
        if !outline.contains(Coordinate::new(lon, lat)) {
            continue;
        }

        let value = (precipitation_trend(lon, lat) + normal.sample(&mut rng)).max(0.0);
        observations.push(Observation::new(lon, lat, value));
    }

    Ok(SampleData {
        observations,
        outline: CALIFORNIA_OUTLINE.to_vec(),
        seed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_reproducible_and_inside_outline() {
        let a = generate_sample(120, 7).unwrap();
        let b = generate_sample(120, 7).unwrap();
        assert_eq!(a.observations, b.observations);
        assert_eq!(a.observations.len(), 120);
        let outline = Boundary::from_ring(CALIFORNIA_OUTLINE).unwrap();
        for o in &a.observations {
            assert!(outline.contains(o.coord));
            assert!(o.value >= 0.0);
        }
    }

    #[test]
    fn trend_is_wetter_in_the_north_west() {
        let eureka = precipitation_trend(-124.16, 40.80);
        let el_centro = precipitation_trend(-115.56, 32.79);
        assert!(eureka > 3.0 * el_centro, "eureka={eureka} el_centro={el_centro}");
    }

    #[test]
    fn zero_count_is_rejected() {
        assert_eq!(generate_sample(0, 1).unwrap_err().exit_code(), 2);
    }
}
