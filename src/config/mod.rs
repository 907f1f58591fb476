//! Benchmark configuration
//!
//! The configuration is resolved once from the command line and then passed
//! by reference into every phase of a run.

use std::path::PathBuf;

use serde::Serialize;

use crate::{Result, SyncBenchError, DEFAULT_FILE};

pub mod cli;

pub use cli::{parse_args, Cli};

/// How the final result is rendered on standard output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `Total: <seconds>.<nanoseconds> seconds`
    #[default]
    Text,
    /// One JSON object describing the run
    Json,
}

/// Parameters of a single benchmark run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchmarkConfig {
    /// Number of write + fdatasync iterations
    pub count: u64,
    /// Open the target file with O_DIRECT
    pub direct: bool,
    /// File that is created, written, and deleted
    pub file: PathBuf,
    /// Bytes skipped at the start of the file before the first append
    pub offset: u64,
    /// Bytes written per iteration
    pub size: u64,
    #[serde(skip)]
    pub format: OutputFormat,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            direct: false,
            file: PathBuf::from(DEFAULT_FILE),
            offset: 0,
            size: 1,
            format: OutputFormat::Text,
        }
    }
}

impl BenchmarkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn with_direct(mut self, direct: bool) -> Self {
        self.direct = direct;
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = file.into();
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Bytes appended by the timed loop (`size * count`).
    pub fn bytes_to_write(&self) -> Result<u64> {
        self.size.checked_mul(self.count).ok_or_else(|| {
            SyncBenchError::Config(format!(
                "--size={} times --count={} overflows a 64-bit byte count",
                self.size, self.count
            ))
        })
    }

    /// Length handed to the preallocation call (`offset + size * count`).
    pub fn preallocation_len(&self) -> Result<u64> {
        let len = self
            .bytes_to_write()?
            .checked_add(self.offset)
            .ok_or_else(|| {
                SyncBenchError::Config(format!(
                    "--offset={} plus the appended bytes overflows a 64-bit file length",
                    self.offset
                ))
            })?;

        // off_t is signed
        if len > i64::MAX as u64 {
            return Err(SyncBenchError::Config(format!(
                "file length {} exceeds the largest supported offset",
                len
            )));
        }
        Ok(len)
    }

    /// Check that the numbers describe a file the kernel can address.
    pub fn validate(&self) -> Result<()> {
        self.preallocation_len()?;
        if usize::try_from(self.size).is_err() {
            return Err(SyncBenchError::Config(format!(
                "--size={} does not fit in memory on this platform",
                self.size
            )));
        }
        Ok(())
    }
}
