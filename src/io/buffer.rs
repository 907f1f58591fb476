use std::alloc::{self, Layout};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::ptr::NonNull;

use crate::io::disk::close_file;
use crate::{Result, SyncBenchError};

/// System memory page size, used as the payload alignment.
pub fn page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        4096
    }
}

/// Heap block with a caller-chosen alignment, suitable for O_DIRECT writes.
///
/// The block is zeroed on allocation and released with the same layout it
/// was allocated with.
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: the buffer owns its allocation exclusively.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocate a zeroed, page-aligned buffer of `size` bytes.
    pub fn new(size: usize) -> Result<Self> {
        Self::with_alignment(size, page_size())
    }

    /// Allocate a zeroed buffer of `size` bytes aligned to `align`.
    pub fn with_alignment(size: usize, align: usize) -> Result<Self> {
        if size == 0 {
            return Err(SyncBenchError::acquire(
                "allocate payload",
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "payload size must be at least one byte",
                ),
            ));
        }

        let layout = Layout::from_size_align(size, align).map_err(|e| {
            SyncBenchError::acquire(
                "allocate payload",
                io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
            )
        })?;

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or_else(|| {
            SyncBenchError::acquire(
                "allocate payload",
                io::Error::from(io::ErrorKind::OutOfMemory),
            )
        })?;

        Ok(Self { ptr, layout })
    }

    /// Allocate a page-aligned buffer and fill it with `size` bytes read
    /// from `source` in a single read. A short read is an error.
    pub fn fill_from_entropy(size: usize, source: &Path) -> Result<Self> {
        let mut buffer = Self::new(size)?;

        let mut file = File::open(source).map_err(|e| {
            SyncBenchError::acquire(format!("open({})", source.display()), e)
        })?;

        let read = file
            .read(buffer.as_mut_slice())
            .map_err(|e| SyncBenchError::acquire("read", e))?;
        if read != size {
            return Err(SyncBenchError::acquire(
                "read",
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("short read: got {} of {} bytes", read, size),
                ),
            ));
        }

        close_file(file).map_err(|e| SyncBenchError::acquire("close", e))?;
        Ok(buffer)
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for layout.size() initialized bytes.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: ptr is valid and uniquely borrowed through &mut self.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.layout.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    pub fn is_aligned_to(&self, align: usize) -> bool {
        align != 0 && (self.ptr.as_ptr() as usize) % align == 0
    }

    /// Give the memory back to the allocator.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: allocated in with_alignment with this exact layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

impl std::fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len())
            .field("align", &self.alignment())
            .finish()
    }
}
