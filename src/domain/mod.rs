//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - station observations and coordinates (`Observation`, `Coordinate`, `Extent`)
//! - the regression basis family (`ModelSpec`)
//! - prediction lattices (`GridGeometry`, `PredictionGrid`)
//! - run configuration (`RunConfig`, `Projection`, `FailurePolicy`)

pub mod types;

pub use types::*;
