//! `precip-surface` library crate.
//!
//! Polynomial trend-surface interpolation of station precipitation, with the
//! polynomial degree chosen by k-fold cross-validation.
//!
//! The binary (`psurf`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the modeling core (`fit`, `models`, `surface`) is usable on its own

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod spatial;
pub mod surface;
