//! POSIX descriptor backend.

use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;

use libc::c_int;

use fastfile_core::errno::EIO;
use fastfile_core::{Descriptor, Errno, FileStat, OpenDescriptor, OpenMode, Result, SeekMode};

/// Permission bits for files created by `Write`/`Append` opens (0644).
const CREATE_MODE: libc::mode_t = libc::S_IRUSR | libc::S_IWUSR | libc::S_IRGRP | libc::S_IROTH;

#[inline]
fn last_host_errno() -> Errno {
    Errno(
        std::io::Error::last_os_error()
            .raw_os_error()
            .unwrap_or(EIO),
    )
}

/// Map a `-1`-on-failure return into a classified result.
#[inline]
fn check<T: PartialOrd + Default>(ret: T) -> Result<T> {
    if ret < T::default() {
        Err(last_host_errno().into())
    } else {
        Ok(ret)
    }
}

fn open_flags(mode: OpenMode) -> c_int {
    let flags = match mode {
        OpenMode::Read => libc::O_RDONLY,
        OpenMode::Write => libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
        OpenMode::Append => libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND,
    };
    flags | libc::O_CLOEXEC
}

fn whence(mode: SeekMode) -> c_int {
    match mode {
        SeekMode::Set => libc::SEEK_SET,
        SeekMode::Cur => libc::SEEK_CUR,
        SeekMode::End => libc::SEEK_END,
    }
}

/// An owned POSIX file descriptor (`-1` once closed).
#[derive(Debug)]
pub struct OsFd {
    fd: RawFd,
}

impl AsRawFd for OsFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl OpenDescriptor for OsFd {
    fn open(path: &Path, mode: OpenMode) -> Result<Self> {
        let cpath = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| fastfile_core::Error::InvalidArgument)?;
        // SAFETY: cpath is a valid NUL-terminated string for the duration of
        // the call; the mode argument is read only when O_CREAT is set.
        let fd = check(unsafe {
            libc::open(cpath.as_ptr(), open_flags(mode), libc::c_uint::from(CREATE_MODE))
        })?;
        log::trace!("open({}, {mode:?}) = {fd}", path.display());
        Ok(Self { fd })
    }
}

impl Descriptor for OsFd {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        // SAFETY: buf is a live, writable region of exactly buf.len() bytes.
        let n = check(unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) })?;
        Ok(n as usize)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        // SAFETY: buf is a live, readable region of exactly buf.len() bytes.
        let n = check(unsafe { libc::write(self.fd, buf.as_ptr().cast(), buf.len()) })?;
        Ok(n as usize)
    }

    fn seek(&mut self, offset: i64, mode: SeekMode) -> Result<u64> {
        let offset = libc::off_t::try_from(offset)
            .map_err(|_| fastfile_core::Error::InvalidArgument)?;
        // SAFETY: lseek takes no pointers; a bad fd yields EBADF.
        let pos = check(unsafe { libc::lseek(self.fd, offset, whence(mode)) })?;
        Ok(pos as u64)
    }

    fn stat(&self) -> Result<FileStat> {
        let mut st = MaybeUninit::<libc::stat>::uninit();
        // SAFETY: st points to writable storage for one `struct stat`.
        check(unsafe { libc::fstat(self.fd, st.as_mut_ptr()) })?;
        // SAFETY: fstat succeeded, so the kernel filled the struct.
        let st = unsafe { st.assume_init() };
        Ok(FileStat {
            size: (st.st_size as i64).max(0) as u64,
            block_size: (st.st_blksize as i64).max(0) as u64,
        })
    }

    fn sync(&mut self) -> Result<()> {
        // SAFETY: fsync takes no pointers; a bad fd yields EBADF.
        check(unsafe { libc::fsync(self.fd) })?;
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        let fd = std::mem::replace(&mut self.fd, -1);
        log::trace!("close({fd})");
        // SAFETY: fd was owned by this value and is released exactly once;
        // Drop sees -1 afterwards.
        check(unsafe { libc::close(fd) })?;
        Ok(())
    }
}

impl Drop for OsFd {
    fn drop(&mut self) {
        if self.fd >= 0 {
            // SAFETY: fd is still owned by this value.
            unsafe { libc::close(self.fd) };
        }
    }
}
