//! Pure-Rust WGS84 lon/lat → California Albers (EPSG:3310).
//!
//! Albers equal-area conic on the GRS80 ellipsoid (Snyder 1987, USGS Prof.
//! Paper 1395, pp. 98-103). EPSG:3310 parameters: standard parallels 34°N and
//! 40.5°N, latitude of origin 0°, central meridian 120°W, false easting 0,
//! false northing -4 000 000 m. The WGS84/GRS80 difference is far below the
//! resolution that matters for a precipitation trend surface.

use crate::domain::{Coordinate, Observation, Projection};

// ── GRS80 ellipsoid ──────────────────────────────────────────────────────

const A: f64 = 6_378_137.0;
const F: f64 = 1.0 / 298.257_222_101;

/// Forward Albers equal-area conic projection with precomputed constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersEqualArea {
    e: f64,
    e2: f64,
    n: f64,
    c: f64,
    rho0: f64,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl AlbersEqualArea {
    /// EPSG:3310 "NAD83 / California Albers".
    pub fn california() -> Self {
        Self::new(34.0, 40.5, 0.0, -120.0, 0.0, -4_000_000.0)
    }

    /// Build a projection from standard parallels, origin and false offsets (degrees / metres).
    pub fn new(lat1: f64, lat2: f64, lat0: f64, lon0: f64, false_easting: f64, false_northing: f64) -> Self {
        let e2 = 2.0 * F - F * F;
        let e = e2.sqrt();

        let (phi1, phi2, phi0) = (lat1.to_radians(), lat2.to_radians(), lat0.to_radians());
        let m1 = m(phi1, e2);
        let m2 = m(phi2, e2);
        let q1 = q(phi1, e, e2);
        let q2 = q(phi2, e, e2);
        let q0 = q(phi0, e, e2);

        // Snyder eqs. 14-14, 14-13, 14-3a.
        let n = (m1 * m1 - m2 * m2) / (q2 - q1);
        let c = m1 * m1 + n * q1;
        let rho0 = A * (c - n * q0).sqrt() / n;

        Self {
            e,
            e2,
            n,
            c,
            rho0,
            lon0: lon0.to_radians(),
            false_easting,
            false_northing,
        }
    }

    /// Project `(lon, lat)` in degrees to `(x, y)` in metres.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let q = q(lat_deg.to_radians(), self.e, self.e2);
        let rho = A * (self.c - self.n * q).sqrt() / self.n;
        let theta = self.n * (lon_deg.to_radians() - self.lon0);

        (
            self.false_easting + rho * theta.sin(),
            self.false_northing + self.rho0 - rho * theta.cos(),
        )
    }
}

/// Snyder eq. 14-15.
fn m(phi: f64, e2: f64) -> f64 {
    let s = phi.sin();
    phi.cos() / (1.0 - e2 * s * s).sqrt()
}

/// Snyder eq. 3-12.
fn q(phi: f64, e: f64, e2: f64) -> f64 {
    let s = phi.sin();
    (1.0 - e2) * (s / (1.0 - e2 * s * s) - (1.0 / (2.0 * e)) * ((1.0 - e * s) / (1.0 + e * s)).ln())
}

/// Coordinate transform applied consistently to stations and boundary.
#[derive(Debug, Clone, Copy)]
pub enum Reprojector {
    Albers(AlbersEqualArea),
    Identity,
}

impl Reprojector {
    pub fn for_projection(projection: Projection) -> Self {
        match projection {
            Projection::Albers => Reprojector::Albers(AlbersEqualArea::california()),
            Projection::Identity => Reprojector::Identity,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> Coordinate {
        match self {
            Reprojector::Albers(p) => {
                let (px, py) = p.forward(x, y);
                Coordinate::new(px, py)
            }
            Reprojector::Identity => Coordinate::new(x, y),
        }
    }

    pub fn observations(&self, observations: &[Observation]) -> Vec<Observation> {
        observations
            .iter()
            .map(|o| Observation {
                coord: self.apply(o.coord.x, o.coord.y),
                value: o.value,
            })
            .collect()
    }

    pub fn ring(&self, ring: &[(f64, f64)]) -> Vec<(f64, f64)> {
        ring.iter()
            .map(|&(x, y)| {
                let c = self.apply(x, y);
                (c.x, c.y)
            })
            .collect()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
