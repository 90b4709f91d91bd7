//! Spatial collaborators of the modeling core: reprojection and boundary masking.

pub mod boundary;
pub mod projection;

pub use boundary::*;
pub use projection::*;
