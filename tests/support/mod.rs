//! In-memory stand-in for the filesystem that records every call and
//! enforces O_DIRECT alignment rules.

#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use syncbench::io::{DiskIO, TargetFile};

/// Alignment the double demands of buffers, lengths and offsets in direct mode
pub const DIRECT_ALIGN: usize = 512;

#[derive(Debug, Default)]
pub struct Journal {
    pub opened: Vec<(PathBuf, bool)>,
    pub preallocated: Vec<u64>,
    pub full_syncs: usize,
    pub data_syncs: usize,
    /// (cursor before the write, bytes accepted)
    pub writes: Vec<(u64, Vec<u8>)>,
    pub closed: bool,
    pub removed: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub fail_preallocate: bool,
    pub seek_lands_at: Option<u64>,
    /// Iteration whose write accepts one byte less than asked
    pub short_write_at: Option<usize>,
    /// Iteration whose fdatasync fails
    pub fail_data_sync_at: Option<usize>,
    pub fail_close: bool,
    pub fail_remove: bool,
}

#[derive(Clone, Default)]
pub struct MemoryDiskIO {
    journal: Arc<Mutex<Journal>>,
    faults: Faults,
}

impl MemoryDiskIO {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faults(faults: Faults) -> Self {
        Self {
            journal: Arc::default(),
            faults,
        }
    }

    pub fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap()
    }
}

struct MemoryTarget {
    journal: Arc<Mutex<Journal>>,
    faults: Faults,
    direct: bool,
    cursor: u64,
    writes: usize,
    data_syncs: usize,
}

fn injected(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, msg.to_string())
}

impl TargetFile for MemoryTarget {
    fn preallocate(&mut self, len: u64) -> io::Result<()> {
        if self.faults.fail_preallocate {
            return Err(injected("no space left on device"));
        }
        self.journal.lock().unwrap().preallocated.push(len);
        Ok(())
    }

    fn sync_all(&mut self) -> io::Result<()> {
        self.journal.lock().unwrap().full_syncs += 1;
        Ok(())
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<u64> {
        self.cursor = self.faults.seek_lands_at.unwrap_or(offset);
        Ok(self.cursor)
    }

    fn write_block(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.direct
            && (buf.as_ptr() as usize % DIRECT_ALIGN != 0
                || buf.len() % DIRECT_ALIGN != 0
                || self.cursor % DIRECT_ALIGN as u64 != 0)
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "misaligned direct write",
            ));
        }

        let accepted = if self.faults.short_write_at == Some(self.writes) {
            buf.len().saturating_sub(1)
        } else {
            buf.len()
        };
        self.journal
            .lock()
            .unwrap()
            .writes
            .push((self.cursor, buf[..accepted].to_vec()));
        self.cursor += accepted as u64;
        self.writes += 1;
        Ok(accepted)
    }

    fn sync_data(&mut self) -> io::Result<()> {
        if self.faults.fail_data_sync_at == Some(self.data_syncs) {
            return Err(injected("input/output error"));
        }
        self.data_syncs += 1;
        self.journal.lock().unwrap().data_syncs += 1;
        Ok(())
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        if self.faults.fail_close {
            return Err(injected("bad file descriptor"));
        }
        self.journal.lock().unwrap().closed = true;
        Ok(())
    }
}

impl DiskIO for MemoryDiskIO {
    fn open_target(&self, path: &Path, direct: bool) -> io::Result<Box<dyn TargetFile>> {
        self.journal
            .lock()
            .unwrap()
            .opened
            .push((path.to_path_buf(), direct));
        Ok(Box::new(MemoryTarget {
            journal: Arc::clone(&self.journal),
            faults: self.faults.clone(),
            direct,
            cursor: 0,
            writes: 0,
            data_syncs: 0,
        }))
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        if self.faults.fail_remove {
            return Err(injected("no such file or directory"));
        }
        self.journal.lock().unwrap().removed.push(path.to_path_buf());
        Ok(())
    }
}
