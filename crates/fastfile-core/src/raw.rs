//! Unbuffered descriptor layer.
//!
//! `RawFile` owns one [`Descriptor`] exclusively and maps every call onto a
//! single OS request. It caches the byte size and block size observed at
//! open time. A closed `RawFile` holds no descriptor and zeroed caches;
//! every operation on it other than `close` fails with
//! [`Error::BadDescriptor`].

use std::path::Path;

use crate::config;
use crate::descriptor::{Descriptor, OpenDescriptor, OpenMode, SeekMode};
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct RawFile<D: Descriptor> {
    /// Underlying descriptor (`None` once closed).
    fd: Option<D>,
    mode: OpenMode,
    /// Byte size captured at open time.
    size: u64,
    /// Effective block size captured at open time.
    block_size: u64,
}

impl<D: Descriptor> Default for RawFile<D> {
    /// The closed sentinel.
    fn default() -> Self {
        Self {
            fd: None,
            mode: OpenMode::Read,
            size: 0,
            block_size: 0,
        }
    }
}

impl<D: OpenDescriptor> RawFile<D> {
    /// Open `path` and stat it.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let fd = D::open(path.as_ref(), mode)?;
        Self::from_descriptor(fd, mode)
    }
}

impl<D: Descriptor> RawFile<D> {
    /// Take ownership of an already-open descriptor.
    ///
    /// If `stat` fails the descriptor is closed before the error returns.
    pub fn from_descriptor(fd: D, mode: OpenMode) -> Result<Self> {
        let st = match fd.stat() {
            Ok(st) => st,
            Err(err) => {
                let _ = fd.close();
                return Err(err);
            }
        };
        Ok(Self {
            fd: Some(fd),
            mode,
            size: st.size,
            block_size: config::effective_block_size(st.block_size),
        })
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn is_closed(&self) -> bool {
        self.fd.is_none()
    }

    pub fn can_read(&self) -> bool {
        !self.is_closed() && self.mode.is_read()
    }

    pub fn can_write(&self) -> bool {
        !self.is_closed() && self.mode.is_write()
    }

    /// Byte size at open time (`0` when closed).
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Block size at open time (`0` when closed).
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// The descriptor, if still open.
    pub fn descriptor(&self) -> Option<&D> {
        self.fd.as_ref()
    }

    fn open_fd(&mut self) -> Result<&mut D> {
        self.fd.as_mut().ok_or(Error::BadDescriptor)
    }

    /// One read call; `Ok(0)` at end-of-file.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.can_read() {
            return Err(Error::BadDescriptor);
        }
        self.open_fd()?.read(buf)
    }

    /// One write call; may be short.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if !self.can_write() {
            return Err(Error::BadDescriptor);
        }
        self.open_fd()?.write(buf)
    }

    pub fn seek(&mut self, offset: i64, mode: SeekMode) -> Result<u64> {
        self.open_fd()?.seek(offset, mode)
    }

    /// Physical offset of the descriptor.
    pub fn tell(&mut self) -> Result<u64> {
        self.seek(0, SeekMode::Cur)
    }

    /// Flush OS write caches to storage. Write/append handles only.
    pub fn sync(&mut self) -> Result<()> {
        if !self.can_write() {
            return Err(Error::BadDescriptor);
        }
        self.open_fd()?.sync()
    }

    /// Release the descriptor. Closing a closed file is a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.size = 0;
        self.block_size = 0;
        match self.fd.take() {
            Some(fd) => fd.close(),
            None => Ok(()),
        }
    }

    /// Move the descriptor out, leaving `self` closed.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl<D: Descriptor> Drop for RawFile<D> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
