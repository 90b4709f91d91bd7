//! Input/output helpers.
//!
//! - station CSV ingest + validation (`ingest`)
//! - boundary ring JSON (`boundary`)
//! - CV curve CSV and grid JSON (`export`)

pub mod boundary;
pub mod export;
pub mod ingest;

pub use boundary::*;
pub use export::*;
pub use ingest::*;
