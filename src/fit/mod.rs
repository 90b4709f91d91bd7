//! Model-order selection.
//!
//! Responsibilities:
//!
//! - partition observations into seeded folds
//! - cross-validate each candidate degree (parallel across degrees)
//! - collect the degree -> RMSE curve and any fit failures

pub mod folds;
pub mod selection;

pub use folds::*;
pub use selection::*;
