//! # fastfile-sys
//!
//! Operating-system backends for the `fastfile` descriptor seam.
//!
//! Exactly one backend is compiled in, selected by target family:
//! - `unix`: raw POSIX calls through `libc` (`open`, `read`, `write`,
//!   `lseek`, `fstat`, `fsync`, `close`), one call per operation, no retry.
//! - `windows`: the same contract over `std::fs::File`. Windows reports no
//!   preferred block size, so buffers use the default size.
//!
//! Both export the backend as [`OsFd`].

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use crate::unix::OsFd;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use crate::windows::OsFd;
