//! Mathematical utilities: polynomial bases, least squares and error metrics.

pub mod basis;
pub mod metrics;
pub mod ols;

pub use basis::*;
pub use metrics::*;
pub use ols::*;
