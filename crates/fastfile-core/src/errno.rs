//! Error number definitions and classification.
//!
//! The constants below are the POSIX values shared by Linux, the BSDs,
//! macOS and the Windows CRT. Only the numbers the classifier inspects are
//! listed.

use crate::error::Error;

pub const EPERM: i32 = 1;
pub const ENOENT: i32 = 2;
pub const EINTR: i32 = 4;
pub const EIO: i32 = 5;
pub const EBADF: i32 = 9;
pub const ENOMEM: i32 = 12;
pub const EACCES: i32 = 13;
pub const EEXIST: i32 = 17;
pub const EINVAL: i32 = 22;
pub const ENFILE: i32 = 23;
pub const EMFILE: i32 = 24;
pub const ENOSPC: i32 = 28;

/// A raw OS error number, as left in `errno` by a failed syscall.
///
/// This is the narrow error type the OS backends produce. It promotes into
/// the general [`Error`] through `From`, so `?` classifies it on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Errno(pub i32);

impl Errno {
    /// Classify this error number into the closed [`Error`] taxonomy.
    #[must_use]
    pub const fn classify(self) -> Error {
        match self.0 {
            EACCES | EPERM => Error::AccessDenied,
            EBADF => Error::BadDescriptor,
            ENOENT => Error::NotFound,
            EEXIST => Error::AlreadyExists,
            EMFILE | ENFILE => Error::TooManyOpenFiles,
            EINTR => Error::Interrupted,
            EINVAL => Error::InvalidArgument,
            EIO => Error::Io,
            ENOMEM => Error::OutOfMemory,
            ENOSPC => Error::NoSpaceLeft,
            _ => Error::Unknown,
        }
    }
}

impl From<Errno> for Error {
    fn from(errno: Errno) -> Self {
        errno.classify()
    }
}
