//! The narrow seam between the buffering engine and the operating system.
//!
//! A [`Descriptor`] performs exactly one OS call per method and never loops
//! or retries; short reads, short writes and `EINTR` surface unchanged to
//! the caller. `fastfile-sys` provides the POSIX and Windows backends;
//! [`MemDescriptor`](crate::MemDescriptor) provides an in-memory one.

use std::io::SeekFrom;
use std::path::Path;

use crate::error::Result;

/// How a file is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Existing file, read-only.
    #[default]
    Read,
    /// Created or truncated, write-only.
    Write,
    /// Created if missing, write-only, every write lands at the end.
    Append,
}

impl OpenMode {
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Read)
    }

    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write | Self::Append)
    }
}

/// Origin for a seek (`SEEK_SET`, `SEEK_CUR`, `SEEK_END`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekMode {
    Set,
    Cur,
    End,
}

impl SeekMode {
    /// Split a `std::io::SeekFrom` into an offset and an origin.
    ///
    /// `SeekFrom::Start` offsets above `i64::MAX` are rejected.
    pub fn from_seek_from(pos: SeekFrom) -> Result<(i64, Self)> {
        match pos {
            SeekFrom::Start(off) => i64::try_from(off)
                .map(|off| (off, Self::Set))
                .map_err(|_| crate::Error::InvalidArgument),
            SeekFrom::Current(off) => Ok((off, Self::Cur)),
            SeekFrom::End(off) => Ok((off, Self::End)),
        }
    }
}

/// The part of `fstat` the file layers care about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    /// Byte size of the file.
    pub size: u64,
    /// Preferred I/O block size; `0` when the platform does not report one.
    pub block_size: u64,
}

/// An exclusively owned, open OS file handle.
pub trait Descriptor {
    /// One read call. `Ok(0)` means end-of-file.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// One write call. May accept fewer bytes than offered.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Reposition; returns the new absolute offset.
    fn seek(&mut self, offset: i64, mode: SeekMode) -> Result<u64>;

    fn stat(&self) -> Result<FileStat>;

    /// Push OS write caches to storage.
    fn sync(&mut self) -> Result<()>;

    /// Release the handle. The descriptor is gone whatever the result.
    fn close(self) -> Result<()>;
}

/// A [`Descriptor`] that can be opened by path.
pub trait OpenDescriptor: Descriptor + Sized {
    fn open(path: &Path, mode: OpenMode) -> Result<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_direction() {
        assert!(OpenMode::Read.is_read());
        assert!(!OpenMode::Read.is_write());
        assert!(OpenMode::Write.is_write());
        assert!(OpenMode::Append.is_write());
        assert!(!OpenMode::Append.is_read());
    }

    #[test]
    fn seek_from_conversion() {
        assert_eq!(
            SeekMode::from_seek_from(SeekFrom::Start(5)),
            Ok((5, SeekMode::Set))
        );
        assert_eq!(
            SeekMode::from_seek_from(SeekFrom::Current(-2)),
            Ok((-2, SeekMode::Cur))
        );
        assert_eq!(
            SeekMode::from_seek_from(SeekFrom::End(0)),
            Ok((0, SeekMode::End))
        );
        assert_eq!(
            SeekMode::from_seek_from(SeekFrom::Start(u64::MAX)),
            Err(crate::Error::InvalidArgument)
        );
    }
}
