//! Timing and benchmark result types

use std::fmt;
use std::io;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{BenchmarkConfig, OutputFormat};
use crate::{Result, SyncBenchError};

pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// A reading of the monotonic clock, split like a `timespec`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub secs: i64,
    pub nanos: u32,
}

impl Timestamp {
    pub fn new(secs: i64, nanos: u32) -> Self {
        debug_assert!(nanos < NANOS_PER_SEC);
        Self { secs, nanos }
    }

    /// Read CLOCK_MONOTONIC.
    pub fn now() -> io::Result<Self> {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: ts is a valid, writable timespec.
        if unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self::new(ts.tv_sec as i64, ts.tv_nsec as u32))
    }

    /// Time from `start` to `self`, borrowing a second when the
    /// sub-second part of `self` is the smaller one.
    ///
    /// Saturates to zero if `self` is earlier than `start`.
    pub fn elapsed_since(&self, start: &Timestamp) -> Elapsed {
        if self < start {
            return Elapsed::ZERO;
        }

        let secs = self.secs.abs_diff(start.secs);
        if self.nanos >= start.nanos {
            Elapsed {
                secs,
                nanos: self.nanos - start.nanos,
            }
        } else {
            Elapsed {
                secs: secs - 1,
                nanos: NANOS_PER_SEC + self.nanos - start.nanos,
            }
        }
    }
}

/// Non-negative span of time with nanoseconds in `0..1_000_000_000`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Elapsed {
    pub secs: u64,
    pub nanos: u32,
}

impl Elapsed {
    pub const ZERO: Elapsed = Elapsed { secs: 0, nanos: 0 };

    pub fn as_duration(&self) -> Duration {
        Duration::new(self.secs, self.nanos)
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nanos)
    }
}

impl From<Elapsed> for Duration {
    fn from(elapsed: Elapsed) -> Self {
        elapsed.as_duration()
    }
}

/// Outcome of one complete run
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub config: BenchmarkConfig,
    /// Bytes appended by the timed loop
    pub bytes_written: u64,
    /// Time spent in the loop, all iterations together
    pub elapsed: Elapsed,
    pub finished_at: DateTime<Utc>,
}

impl BenchmarkResult {
    pub fn new(config: BenchmarkConfig, bytes_written: u64, elapsed: Elapsed) -> Self {
        Self {
            config,
            bytes_written,
            elapsed,
            finished_at: Utc::now(),
        }
    }

    /// The single report line or object printed on success.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_string()),
            OutputFormat::Json => serde_json::to_string(self).map_err(SyncBenchError::from),
        }
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total: {} seconds", self.elapsed)
    }
}
