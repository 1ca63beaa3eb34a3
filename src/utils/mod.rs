//! Utility modules shared across pipeline stages
//!
//! - Numeric: rounding, clipping, evenly spaced ranges, summary statistics
//! - Logging: tracing subscriber setup for the binaries

pub mod numeric;
pub mod logging;

pub use numeric::{clip, linspace, mean, round_to, std_dev};
pub use logging::init_tracing;
