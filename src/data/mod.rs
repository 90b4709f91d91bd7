//! Built-in station data.

pub mod sample;

pub use sample::{CALIFORNIA_OUTLINE, SampleData, generate_sample, precipitation_trend};
