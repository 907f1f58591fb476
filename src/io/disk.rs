use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, IntoRawFd};
use std::path::Path;

/// Filesystem operations needed to stage and tear down the benchmark file
pub trait DiskIO {
    /// Create or truncate `path` for writing, optionally with O_DIRECT
    fn open_target(&self, path: &Path, direct: bool) -> io::Result<Box<dyn TargetFile>>;

    /// Delete the benchmark file
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Open handle to the benchmark file
///
/// Each method maps onto one system call so the timed loop measures
/// exactly a write followed by a data flush.
pub trait TargetFile {
    /// Reserve `len` bytes starting at offset zero
    fn preallocate(&mut self, len: u64) -> io::Result<()>;

    /// Flush data and metadata to stable storage
    fn sync_all(&mut self) -> io::Result<()>;

    /// Move the cursor to `offset`, returning where it ended up
    fn seek_to(&mut self, offset: u64) -> io::Result<u64>;

    /// Issue a single write at the cursor, returning the bytes accepted
    fn write_block(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Flush written data (not necessarily metadata) to stable storage
    fn sync_data(&mut self) -> io::Result<()>;

    /// Close the handle, reporting any error from close(2)
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Close `file` and surface the error that dropping it would discard.
pub(crate) fn close_file(file: File) -> io::Result<()> {
    let fd = file.into_raw_fd();
    // SAFETY: fd came from into_raw_fd, so nothing else owns it.
    if unsafe { libc::close(fd) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// The real filesystem
#[derive(Debug, Clone, Default)]
pub struct PlatformDiskIO;

impl PlatformDiskIO {
    pub fn new() -> Self {
        Self
    }
}

pub struct UnixTargetFile {
    file: File,
}

impl UnixTargetFile {
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

impl TargetFile for UnixTargetFile {
    fn preallocate(&mut self, len: u64) -> io::Result<()> {
        // posix_fallocate rejects an empty range and there is nothing to reserve
        if len == 0 {
            return Ok(());
        }
        let len = libc::off_t::try_from(len)
            .map_err(|_| io::Error::from_raw_os_error(libc::EFBIG))?;

        // SAFETY: the descriptor is owned by self.file and stays open.
        let r = unsafe { libc::posix_fallocate(self.file.as_raw_fd(), 0, len) };
        if r != 0 {
            // posix_fallocate returns the error instead of setting errno
            return Err(io::Error::from_raw_os_error(r));
        }
        Ok(())
    }

    fn sync_all(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<u64> {
        self.file.seek(SeekFrom::Start(offset))
    }

    fn write_block(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn sync_data(&mut self) -> io::Result<()> {
        self.file.sync_data()
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        close_file(self.file)
    }
}

impl DiskIO for PlatformDiskIO {
    fn open_target(&self, path: &Path, direct: bool) -> io::Result<Box<dyn TargetFile>> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true).mode(0o666);
        if direct {
            options.custom_flags(libc::O_DIRECT);
        }
        let file = options.open(path)?;
        Ok(Box::new(UnixTargetFile::new(file)))
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Create a new platform-specific disk I/O instance
pub fn create_disk_io() -> impl DiskIO {
    PlatformDiskIO::new()
}
