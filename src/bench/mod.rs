//! Benchmark engine module
//!
//! Contains the timed append + fdatasync loop and the staging around it.

pub mod append;

pub use append::AppendBenchmark;

use crate::config::BenchmarkConfig;
use crate::models::BenchmarkResult;
use crate::Result;

/// Run one benchmark against the real filesystem.
pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkResult> {
    AppendBenchmark::new(config)?.run()
}
