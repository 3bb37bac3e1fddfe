//! In-memory descriptor.
//!
//! Backs the buffering engine with a shared byte vector instead of a kernel
//! file, so the read/write/line algorithms can be exercised without touching
//! the filesystem. Knobs reproduce what real descriptors do under pressure:
//! short transfers, a small reported block size, a disk that fills up, and
//! one-off read failures such as a signal interrupting the call.

use std::cell::RefCell;
use std::rc::Rc;

use crate::descriptor::{Descriptor, FileStat, SeekMode};
use crate::error::{Error, Result};

/// Shared handle to the bytes behind a [`MemDescriptor`].
pub type MemStore = Rc<RefCell<Vec<u8>>>;

#[derive(Debug, Default)]
pub struct MemDescriptor {
    store: MemStore,
    pos: u64,
    block_size: u64,
    /// Upper bound on bytes moved by a single read or write call.
    max_io: Option<usize>,
    /// Total bytes this descriptor may write before `ENOSPC`.
    write_quota: Option<usize>,
    written: usize,
    append: bool,
    /// Read calls made so far, counting failed ones.
    reads: usize,
    /// `(call, error)`: the read call with that index fails once.
    read_failures: Vec<(usize, Error)>,
}

impl MemDescriptor {
    /// A descriptor positioned at the start of `data`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            store: Rc::new(RefCell::new(data.into())),
            ..Self::default()
        }
    }

    /// A descriptor over an existing store, e.g. to reopen what a previous
    /// descriptor wrote.
    pub fn with_store(store: MemStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    /// Block size reported by `stat` (`0` = not reported).
    #[must_use]
    pub fn block_size(mut self, block_size: u64) -> Self {
        self.block_size = block_size;
        self
    }

    /// Cap every read and write call at `max` bytes.
    #[must_use]
    pub fn max_io(mut self, max: usize) -> Self {
        self.max_io = Some(max.max(1));
        self
    }

    /// Fail writes with [`Error::NoSpaceLeft`] once `quota` bytes were written.
    #[must_use]
    pub fn write_quota(mut self, quota: usize) -> Self {
        self.write_quota = Some(quota);
        self
    }

    /// Fail the read call with index `call` (0-based) with `err`, without
    /// moving the position. Later calls proceed normally.
    #[must_use]
    pub fn fail_read(mut self, call: usize, err: Error) -> Self {
        self.read_failures.push((call, err));
        self
    }

    /// Position every write at the current end of the data.
    #[must_use]
    pub fn appending(mut self) -> Self {
        self.append = true;
        self
    }

    pub fn store(&self) -> MemStore {
        Rc::clone(&self.store)
    }

    pub fn contents(&self) -> Vec<u8> {
        self.store.borrow().clone()
    }

    fn clamp(&self, len: usize) -> usize {
        self.max_io.map_or(len, |max| len.min(max))
    }
}

impl Descriptor for MemDescriptor {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let call = self.reads;
        self.reads += 1;
        if let Some(&(_, err)) = self.read_failures.iter().find(|(c, _)| *c == call) {
            return Err(err);
        }
        let data = self.store.borrow();
        let start = usize::try_from(self.pos).unwrap_or(usize::MAX);
        if start >= data.len() {
            return Ok(0);
        }
        let n = self.clamp(buf.len()).min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        drop(data);
        self.pos += n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut n = self.clamp(buf.len());
        if let Some(quota) = self.write_quota {
            let room = quota.saturating_sub(self.written);
            if room == 0 && n > 0 {
                return Err(Error::NoSpaceLeft);
            }
            n = n.min(room);
        }

        let mut data = self.store.borrow_mut();
        if self.append {
            self.pos = data.len() as u64;
        }
        let start = usize::try_from(self.pos).map_err(|_| Error::InvalidArgument)?;
        let end = start + n;
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(&buf[..n]);
        drop(data);

        self.pos = end as u64;
        self.written += n;
        Ok(n)
    }

    fn seek(&mut self, offset: i64, mode: SeekMode) -> Result<u64> {
        let base = match mode {
            SeekMode::Set => 0,
            SeekMode::Cur => i128::from(self.pos),
            SeekMode::End => self.store.borrow().len() as i128,
        };
        let target = base + i128::from(offset);
        self.pos = u64::try_from(target).map_err(|_| Error::InvalidArgument)?;
        Ok(self.pos)
    }

    fn stat(&self) -> Result<FileStat> {
        Ok(FileStat {
            size: self.store.borrow().len() as u64,
            block_size: self.block_size,
        })
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}
