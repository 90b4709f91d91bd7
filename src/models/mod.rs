//! Polynomial trend-surface models.
//!
//! A fitted model is a small value type (spec + scaling + coefficients) so
//! cross-validation can create and drop one per fold cheaply.

pub mod model;

pub use model::*;
