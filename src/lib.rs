//! syncbench - append + fdatasync latency benchmark
//!
//! Times how long it takes to append fixed-size blocks to a file when every
//! append is forced to stable storage before the next one starts.

pub mod bench;
pub mod config;
pub mod io;
pub mod models;
pub mod util;

/// Errors that abort a benchmark run.
///
/// Every variant is fatal. The display form is the single diagnostic line
/// printed by the binary: the failed operation followed by its cause.
#[derive(Debug, thiserror::Error)]
pub enum SyncBenchError {
    /// Unrecognized, malformed, or unusable command-line input
    #[error("{0}")]
    Config(String),
    /// Failed to acquire the payload buffer, entropy source, or target file
    #[error("{op} failed: {source}")]
    Acquire {
        op: String,
        #[source]
        source: std::io::Error,
    },
    /// Preallocation, metadata flush, or cursor positioning failed
    #[error("{op} failed: {source}")]
    Prepare {
        op: String,
        #[source]
        source: std::io::Error,
    },
    /// A write or data flush inside the timed loop failed
    #[error("{op} failed: {source}")]
    Append {
        op: String,
        #[source]
        source: std::io::Error,
    },
    /// Closing, deleting, or releasing a resource after timing failed
    #[error("{op} failed: {source}")]
    Cleanup {
        op: String,
        #[source]
        source: std::io::Error,
    },
    /// The result could not be rendered
    #[error("encoding result failed: {0}")]
    Report(#[from] serde_json::Error),
}

impl SyncBenchError {
    pub fn acquire(op: impl Into<String>, source: std::io::Error) -> Self {
        Self::Acquire { op: op.into(), source }
    }

    pub fn prepare(op: impl Into<String>, source: std::io::Error) -> Self {
        Self::Prepare { op: op.into(), source }
    }

    pub fn append(op: impl Into<String>, source: std::io::Error) -> Self {
        Self::Append { op: op.into(), source }
    }

    pub fn cleanup(op: impl Into<String>, source: std::io::Error) -> Self {
        Self::Cleanup { op: op.into(), source }
    }

    /// Name of the operation that failed, if the error came from one.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Config(_) | Self::Report(_) => None,
            Self::Acquire { op, .. }
            | Self::Prepare { op, .. }
            | Self::Append { op, .. }
            | Self::Cleanup { op, .. } => Some(op.as_str()),
        }
    }
}

/// Result type alias for syncbench operations
pub type Result<T> = std::result::Result<T, SyncBenchError>;

pub const APP_NAME: &str = "syncbench";
pub const DEFAULT_FILE: &str = "bench.dat";
pub const ENTROPY_SOURCE: &str = "/dev/urandom";
