//! I/O operations module
//!
//! Page-aligned payload buffers and the file operations the benchmark
//! times, behind a trait so tests can substitute the filesystem.

pub mod buffer;
pub mod disk;

pub use buffer::{page_size, AlignedBuffer};
pub use disk::{create_disk_io, DiskIO, PlatformDiskIO, TargetFile};
