//! Closed error taxonomy shared by every layer.
//!
//! Every fallible operation returns [`Result`]; nothing in this workspace
//! panics or unwinds on an expected failure path. Errors are produced by
//! classifying the OS error at the point of failure, or by a precondition
//! check (wrong open mode, closed handle) which always reports
//! [`Error::BadDescriptor`].

use std::io;

use crate::errno;
#[cfg(not(windows))]
use crate::errno::Errno;

/// Alias of the standard result type with [`Error`] as the default failure.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Category of a failed file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    #[error("unknown error")]
    Unknown,
    #[error("access denied")]
    AccessDenied,
    #[error("bad file descriptor")]
    BadDescriptor,
    #[error("no such file or directory")]
    NotFound,
    #[error("file already exists")]
    AlreadyExists,
    #[error("too many open files")]
    TooManyOpenFiles,
    #[error("interrupted system call")]
    Interrupted,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("input/output error")]
    Io,
    #[error("out of memory")]
    OutOfMemory,
    #[error("no space left on device")]
    NoSpaceLeft,
}

impl Error {
    /// Representative errno for this category (`0` for [`Error::Unknown`]).
    #[must_use]
    pub const fn errno(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::AccessDenied => errno::EACCES,
            Self::BadDescriptor => errno::EBADF,
            Self::NotFound => errno::ENOENT,
            Self::AlreadyExists => errno::EEXIST,
            Self::TooManyOpenFiles => errno::EMFILE,
            Self::Interrupted => errno::EINTR,
            Self::InvalidArgument => errno::EINVAL,
            Self::Io => errno::EIO,
            Self::OutOfMemory => errno::ENOMEM,
            Self::NoSpaceLeft => errno::ENOSPC,
        }
    }

    /// Matching `std::io::ErrorKind`.
    #[must_use]
    pub const fn kind(self) -> io::ErrorKind {
        match self {
            Self::Unknown | Self::Io => io::ErrorKind::Other,
            Self::AccessDenied => io::ErrorKind::PermissionDenied,
            Self::BadDescriptor | Self::InvalidArgument => io::ErrorKind::InvalidInput,
            Self::NotFound => io::ErrorKind::NotFound,
            Self::AlreadyExists => io::ErrorKind::AlreadyExists,
            Self::TooManyOpenFiles => io::ErrorKind::Other,
            Self::Interrupted => io::ErrorKind::Interrupted,
            Self::OutOfMemory => io::ErrorKind::OutOfMemory,
            Self::NoSpaceLeft => io::ErrorKind::StorageFull,
        }
    }
}

/// Windows system error codes that have a direct category.
#[cfg(windows)]
fn classify_os_code(code: i32) -> Error {
    match code {
        2 | 3 => Error::NotFound,
        4 => Error::TooManyOpenFiles,
        5 => Error::AccessDenied,
        6 => Error::BadDescriptor,
        8 | 14 => Error::OutOfMemory,
        39 | 112 => Error::NoSpaceLeft,
        80 | 183 => Error::AlreadyExists,
        87 => Error::InvalidArgument,
        _ => Error::Unknown,
    }
}

#[cfg(not(windows))]
fn classify_os_code(code: i32) -> Error {
    Errno(code).classify()
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if let Some(inner) = err.get_ref().and_then(|e| e.downcast_ref::<Error>()) {
            return *inner;
        }
        if let Some(code) = err.raw_os_error() {
            return classify_os_code(code);
        }
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::AccessDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            io::ErrorKind::Interrupted => Self::Interrupted,
            io::ErrorKind::InvalidInput => Self::InvalidArgument,
            io::ErrorKind::OutOfMemory => Self::OutOfMemory,
            io::ErrorKind::StorageFull => Self::NoSpaceLeft,
            io::ErrorKind::UnexpectedEof | io::ErrorKind::WriteZero => Self::Io,
            _ => Self::Unknown,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(err.kind(), err)
    }
}
