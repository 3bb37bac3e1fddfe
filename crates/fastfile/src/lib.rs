//! # fastfile
//!
//! Buffered file I/O directly on OS file descriptors.
//!
//! [`File`] keeps one block-sized buffer per handle and talks to the kernel
//! through single `read`/`write`/`lseek` calls. Every fallible operation
//! returns [`Result`]; precondition failures (wrong direction, closed
//! handle) are [`Error::BadDescriptor`].
//!
//! ```no_run
//! # fn main() -> fastfile::Result<()> {
//! let mut f = fastfile::open("test.txt")?;
//! for line in f.lines() {
//!     println!("{}", line?);
//! }
//!
//! let mut out = fastfile::open_with("out.txt", fastfile::OpenMode::Write)?;
//! out.write_str("Hello World\n")?;
//! out.close()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use std::path::Path;

pub use fastfile_core::config;
pub use fastfile_core::{
    Descriptor, Errno, Error, FileStat, MemDescriptor, OpenDescriptor, OpenMode, Result, SeekMode,
};
pub use fastfile_sys::OsFd;

/// Buffered file over an OS descriptor.
pub type File = fastfile_core::BufferedFile<OsFd>;

/// Unbuffered file over an OS descriptor.
pub type RawFile = fastfile_core::RawFile<OsFd>;

/// Line sequence of a [`File`].
pub type Lines<'a> = fastfile_core::Lines<'a, OsFd>;

/// Open `path` for reading.
pub fn open(path: impl AsRef<Path>) -> Result<File> {
    File::open(path, OpenMode::Read)
}

/// Open `path` in `mode`.
pub fn open_with(path: impl AsRef<Path>, mode: OpenMode) -> Result<File> {
    File::open(path, mode)
}

/// Open `path` in `mode` without a buffer.
pub fn open_raw(path: impl AsRef<Path>, mode: OpenMode) -> Result<RawFile> {
    RawFile::open(path, mode)
}
