//! Data models module
//!
//! Timestamps taken around the timed loop and the result of a run.

pub mod result;

pub use result::{BenchmarkResult, Elapsed, Timestamp};
