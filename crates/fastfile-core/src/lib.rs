//! # fastfile-core
//!
//! Safe Rust buffering engine for descriptor-level file I/O.
//!
//! This crate holds everything that does not need to talk to the kernel:
//! the error taxonomy and errno classification, the [`Descriptor`] seam the
//! OS backends implement, the unbuffered [`RawFile`] layer, the
//! block-sized [`BufferedFile`] layer and its [`Lines`] sequence. No
//! `unsafe` code is permitted at the crate level; the syscalls live in
//! `fastfile-sys`.

#![deny(unsafe_code)]

pub mod buffered;
pub mod config;
pub mod descriptor;
pub mod errno;
pub mod error;
pub mod lines;
pub mod mem;
pub mod raw;

pub use buffered::BufferedFile;
pub use descriptor::{Descriptor, FileStat, OpenDescriptor, OpenMode, SeekMode};
pub use errno::Errno;
pub use error::{Error, Result};
pub use lines::Lines;
pub use mem::MemDescriptor;
pub use raw::RawFile;
