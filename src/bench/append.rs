//! Append + fdatasync benchmark
//!
//! Stages the target file outside the measured window, then times `count`
//! strictly sequential writes of the same payload, each followed by a data
//! flush. Any failure aborts the run on the spot; nothing is cleaned up on
//! the error path.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::config::BenchmarkConfig;
use crate::io::buffer::AlignedBuffer;
use crate::io::disk::{DiskIO, PlatformDiskIO, TargetFile};
use crate::models::{BenchmarkResult, Timestamp};
use crate::util::{calculate_iops, format_bytes, format_elapsed};
use crate::{Result, SyncBenchError, ENTROPY_SOURCE};

/// Append benchmark executor
pub struct AppendBenchmark<D: DiskIO = PlatformDiskIO> {
    config: BenchmarkConfig,
    disk_io: D,
    entropy_source: PathBuf,
}

impl AppendBenchmark<PlatformDiskIO> {
    /// Benchmark against the real filesystem
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        Self::with_disk_io(config, PlatformDiskIO::new())
    }
}

impl<D: DiskIO> AppendBenchmark<D> {
    pub fn with_disk_io(config: BenchmarkConfig, disk_io: D) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            disk_io,
            entropy_source: PathBuf::from(ENTROPY_SOURCE),
        })
    }

    /// Read the payload from `path` instead of the system entropy device
    pub fn with_entropy_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.entropy_source = path.into();
        self
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn disk_io(&self) -> &D {
        &self.disk_io
    }

    pub fn entropy_source(&self) -> &Path {
        &self.entropy_source
    }

    /// Execute the benchmark
    pub fn run(&self) -> Result<BenchmarkResult> {
        let payload = self.prepare_payload()?;
        let mut target = self.prepare_file()?;

        let start = Timestamp::now().map_err(|e| SyncBenchError::prepare("clock_gettime", e))?;
        let bytes_written = self.append_loop(target.as_mut(), &payload)?;
        let end = Timestamp::now().map_err(|e| SyncBenchError::append("clock_gettime", e))?;
        let elapsed = end.elapsed_since(&start);

        debug!(
            bytes = bytes_written,
            elapsed = %format_elapsed(elapsed.as_duration()),
            appends_per_sec = calculate_iops(self.config.count, elapsed.as_duration()),
            "append loop finished"
        );

        target
            .close()
            .map_err(|e| SyncBenchError::cleanup("close", e))?;
        self.disk_io
            .remove(&self.config.file)
            .map_err(|e| SyncBenchError::cleanup("unlink", e))?;
        payload.release();

        Ok(BenchmarkResult::new(self.config.clone(), bytes_written, elapsed))
    }

    fn prepare_payload(&self) -> Result<AlignedBuffer> {
        let size = usize::try_from(self.config.size).map_err(|_| {
            SyncBenchError::Config(format!("--size={} does not fit in memory", self.config.size))
        })?;

        let payload = AlignedBuffer::fill_from_entropy(size, &self.entropy_source)?;
        debug!(
            size = %format_bytes(self.config.size),
            align = payload.alignment(),
            source = %self.entropy_source.display(),
            "payload ready"
        );
        Ok(payload)
    }

    /// Open, preallocate, flush, and position the target file.
    fn prepare_file(&self) -> Result<Box<dyn TargetFile>> {
        let path = &self.config.file;
        let mut target = self
            .disk_io
            .open_target(path, self.config.direct)
            .map_err(|e| SyncBenchError::acquire(format!("open({})", path.display()), e))?;

        let len = self.config.preallocation_len()?;
        target
            .preallocate(len)
            .map_err(|e| SyncBenchError::prepare("fallocate", e))?;
        target
            .sync_all()
            .map_err(|e| SyncBenchError::prepare("fsync", e))?;

        let offset = self.config.offset;
        let at = target
            .seek_to(offset)
            .map_err(|e| SyncBenchError::prepare("lseek", e))?;
        if at != offset {
            return Err(SyncBenchError::prepare(
                "lseek",
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("cursor at {} instead of {}", at, offset),
                ),
            ));
        }

        debug!(
            file = %path.display(),
            direct = self.config.direct,
            preallocated = %format_bytes(len),
            offset,
            "target file ready"
        );
        Ok(target)
    }

    /// The measured section: write then fdatasync, `count` times.
    fn append_loop(&self, target: &mut dyn TargetFile, payload: &AlignedBuffer) -> Result<u64> {
        let block = payload.as_slice();
        let mut bytes_written = 0u64;

        for i in 0..self.config.count {
            let written = target
                .write_block(block)
                .map_err(|e| SyncBenchError::append("write", e))?;
            if written != block.len() {
                return Err(SyncBenchError::append(
                    "write",
                    io::Error::new(
                        io::ErrorKind::WriteZero,
                        format!(
                            "short write on iteration {}: {} of {} bytes",
                            i,
                            written,
                            block.len()
                        ),
                    ),
                ));
            }

            target
                .sync_data()
                .map_err(|e| SyncBenchError::append("fdatasync", e))?;

            bytes_written += written as u64;
            trace!(iteration = i, "append synced");
        }

        Ok(bytes_written)
    }
}
