//! Utility functions module
//!
//! Human-readable formatting for diagnostic output.

pub mod units;

pub use units::{calculate_iops, calculate_throughput_mbps, format_bytes, format_elapsed};
