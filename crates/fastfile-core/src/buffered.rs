//! Block-buffered file layer.
//!
//! `BufferedFile` owns a [`RawFile`] and one heap buffer whose capacity is
//! fixed at open time (the block size, see [`config`]). The same buffer
//! serves whichever direction the file was opened for:
//!
//! - read mode: `buf[buf_i..buf_size]` is data fetched from the OS but not
//!   yet handed to the caller. A refill is a single raw read of up to the
//!   full capacity, so `buf_size < capacity` only near end-of-file.
//! - write/append mode: `buf[..buf_i]` is staged data not yet written.
//!
//! Invariants: `buf_i <= buf_size <= capacity` while reading and
//! `buf_size == 0` while writing.
//!
//! A failed refill never loses data. A read that already delivered bytes
//! reports them and leaves the error to the next call. A line read that
//! fails keeps what it collected in `carry`, which is served before the
//! buffer by every later read.
//!
//! Offsets: [`tell`](BufferedFile::tell) reports the descriptor's physical
//! offset, which runs ahead of what the caller consumed by up to one buffer
//! in read mode and behind what the caller wrote by the staged bytes in
//! write mode. [`position`](BufferedFile::position) reports the logical
//! offset. `seek` positions the descriptor (relative seeks are relative to
//! the physical offset) and then discards the buffer.

use std::io;
use std::path::Path;

use crate::config;
use crate::descriptor::{Descriptor, OpenDescriptor, OpenMode, SeekMode};
use crate::error::{Error, Result};
use crate::lines::Lines;
use crate::raw::RawFile;

#[derive(Debug)]
pub struct BufferedFile<D: Descriptor> {
    raw: RawFile<D>,
    /// Fixed-capacity I/O buffer (empty once closed).
    buf: Box<[u8]>,
    /// Valid bytes in `buf` (read mode only).
    buf_size: usize,
    /// Read cursor, or count of staged bytes in write mode.
    buf_i: usize,
    /// Bytes of an unfinished line handed back by a failed `read_line`.
    carry: Vec<u8>,
}

impl<D: Descriptor> Default for BufferedFile<D> {
    /// A closed file with no buffer.
    fn default() -> Self {
        Self {
            raw: RawFile::default(),
            buf: Box::default(),
            buf_size: 0,
            buf_i: 0,
            carry: Vec::new(),
        }
    }
}

fn alloc_buffer(capacity: usize) -> Result<Box<[u8]>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|_| Error::OutOfMemory)?;
    buf.resize(capacity, 0);
    Ok(buf.into_boxed_slice())
}

impl<D: OpenDescriptor> BufferedFile<D> {
    /// Open `path` with a buffer sized to its block size.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        let raw = RawFile::open(path, mode)?;
        log::trace!(
            "open {} ({mode:?}): size={} block_size={}",
            path.display(),
            raw.size(),
            raw.block_size()
        );
        Self::from_raw(raw)
    }
}

impl<D: Descriptor> BufferedFile<D> {
    /// Wrap an open raw file, sizing the buffer from its block size.
    pub fn from_raw(raw: RawFile<D>) -> Result<Self> {
        let capacity = config::buffer_capacity(raw.block_size());
        Self::from_raw_with_capacity(raw, capacity)
    }

    /// Wrap an open raw file with an explicit buffer capacity (at least 1).
    pub fn from_raw_with_capacity(raw: RawFile<D>, capacity: usize) -> Result<Self> {
        if raw.is_closed() {
            return Err(Error::BadDescriptor);
        }
        let buf = alloc_buffer(capacity.max(1))?;
        Ok(Self {
            raw,
            buf,
            buf_size: 0,
            buf_i: 0,
            carry: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Buffer capacity (`0` once closed).
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn raw(&self) -> &RawFile<D> {
        &self.raw
    }

    pub fn mode(&self) -> OpenMode {
        self.raw.mode()
    }

    pub fn size(&self) -> u64 {
        self.raw.size()
    }

    pub fn block_size(&self) -> u64 {
        self.raw.block_size()
    }

    pub fn is_closed(&self) -> bool {
        self.raw.is_closed()
    }

    pub fn can_read(&self) -> bool {
        self.raw.can_read()
    }

    pub fn can_write(&self) -> bool {
        self.raw.can_write()
    }

    /// Bytes fetched from the OS but not yet consumed (`0` unless reading).
    pub fn buffered(&self) -> usize {
        if self.raw.can_read() {
            self.carry.len() + (self.buf_size - self.buf_i)
        } else {
            0
        }
    }

    /// Bytes accepted by `write` but not yet flushed.
    pub fn staged(&self) -> usize {
        if self.raw.can_write() { self.buf_i } else { 0 }
    }

    fn ensure_readable(&self) -> Result<()> {
        if self.raw.can_read() {
            Ok(())
        } else {
            Err(Error::BadDescriptor)
        }
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.raw.can_write() {
            Ok(())
        } else {
            Err(Error::BadDescriptor)
        }
    }

    // -----------------------------------------------------------------------
    // Read operations
    // -----------------------------------------------------------------------

    /// Replace the buffer contents with one raw read. Returns the new fill.
    fn refill(&mut self) -> Result<usize> {
        let n = self.raw.read(&mut self.buf)?;
        log::trace!("refill: {n} of {} bytes", self.buf.len());
        self.buf_size = n;
        self.buf_i = 0;
        Ok(n)
    }

    /// Hand up to `want` bytes to `sink`, refilling as the buffer drains.
    ///
    /// Stops early at end-of-file, or when a refill fails after something
    /// was delivered; the error is then left for the next call. Returns the
    /// bytes delivered.
    fn pump(&mut self, want: usize, mut sink: impl FnMut(&[u8])) -> Result<usize> {
        let mut delivered = 0;
        if !self.carry.is_empty() {
            let n = want.min(self.carry.len());
            sink(&self.carry[..n]);
            self.carry.drain(..n);
            delivered = n;
        }
        while delivered < want {
            if self.buf_i == self.buf_size {
                match self.refill() {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(err) if delivered > 0 => {
                        log::debug!("refill failed after {delivered} bytes: {err}");
                        break;
                    }
                    Err(err) => return Err(err),
                }
            }
            let n = (want - delivered).min(self.buf_size - self.buf_i);
            sink(&self.buf[self.buf_i..self.buf_i + n]);
            self.buf_i += n;
            delivered += n;
        }
        Ok(delivered)
    }

    /// Fill `out` from the file.
    ///
    /// Returns fewer bytes at end-of-file or when a refill fails part way;
    /// an error means nothing was read.
    pub fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        self.ensure_readable()?;
        let mut at = 0;
        self.pump(out.len(), |chunk| {
            out[at..at + chunk.len()].copy_from_slice(chunk);
            at += chunk.len();
        })
    }

    /// Bytes left between the logical position and the size seen at open.
    ///
    /// The descriptor has already read past the logical position by the
    /// unconsumed part of the buffer, so that part is added back.
    pub fn remaining(&mut self) -> Result<usize> {
        self.ensure_readable()?;
        let size = i128::from(self.raw.size());
        let offset = i128::from(self.raw.tell()?);
        let remaining = size - offset + self.buffered() as i128;
        if remaining < 0 {
            return Err(Error::Io);
        }
        usize::try_from(remaining).map_err(|_| Error::OutOfMemory)
    }

    /// Read `count` bytes, or everything up to the size seen at open when
    /// `count` is `None`. The result is shorter at end-of-file, or when a
    /// refill fails after some bytes were read (the next call reports it).
    pub fn read_bytes(&mut self, count: Option<usize>) -> Result<Vec<u8>> {
        self.ensure_readable()?;
        let target = match count {
            Some(n) => n,
            None => self.remaining()?,
        };
        let mut out = Vec::new();
        out.try_reserve_exact(target)
            .map_err(|_| Error::OutOfMemory)?;
        self.pump(target, |chunk| out.extend_from_slice(chunk))?;
        Ok(out)
    }

    /// [`read_bytes`](Self::read_bytes) as UTF-8 text.
    ///
    /// Invalid UTF-8 is reported as [`Error::InvalidArgument`]; the bytes
    /// are consumed either way.
    pub fn read_text(&mut self, count: Option<usize>) -> Result<String> {
        let bytes = self.read_bytes(count)?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidArgument)
    }

    /// Append to `out` without growing it: at most its spare capacity.
    ///
    /// Returns `0` once `out` is full, until the caller makes room.
    pub fn read_into_capacity(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        self.ensure_readable()?;
        let spare = out.capacity() - out.len();
        self.pump(spare, |chunk| out.extend_from_slice(chunk))
    }

    /// Read one line into `line`, without its `\n` and without a `\r`
    /// directly before the `\n`.
    ///
    /// Returns `false` only at end-of-file with nothing collected. A final
    /// line without a terminating `\n` is returned as is (a lone trailing
    /// `\r` is kept).
    ///
    /// The `\r` check looks at the accumulated line rather than at the
    /// buffer, so a `\r\n` pair split across two refills is still stripped.
    ///
    /// If a refill fails mid-line, `line` is left empty and the collected
    /// bytes go back to the stream: a retry returns the whole line.
    pub fn read_line(&mut self, line: &mut Vec<u8>) -> Result<bool> {
        self.ensure_readable()?;
        line.clear();
        line.append(&mut self.carry);
        loop {
            if self.buf_i == self.buf_size {
                match self.refill() {
                    Ok(0) => return Ok(!line.is_empty()),
                    Ok(_) => {}
                    Err(err) => {
                        self.carry.append(line);
                        return Err(err);
                    }
                }
            }
            let avail = &self.buf[self.buf_i..self.buf_size];
            match avail.iter().position(|&b| b == b'\n') {
                Some(nl) => {
                    line.extend_from_slice(&avail[..nl]);
                    self.buf_i += nl + 1;
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    return Ok(true);
                }
                None => {
                    line.extend_from_slice(avail);
                    self.buf_i = self.buf_size;
                }
            }
        }
    }

    /// [`read_line`](Self::read_line) into a `String`.
    ///
    /// Invalid UTF-8 is reported as [`Error::InvalidArgument`] and leaves
    /// `line` empty.
    pub fn read_line_string(&mut self, line: &mut String) -> Result<bool> {
        let mut bytes = std::mem::take(line).into_bytes();
        let found = self.read_line(&mut bytes);
        match String::from_utf8(bytes) {
            Ok(text) => *line = text,
            Err(_) => return Err(Error::InvalidArgument),
        }
        found
    }

    /// Lazy, forward-only sequence of lines.
    pub fn lines(&mut self) -> Lines<'_, D> {
        Lines::new(self)
    }

    // -----------------------------------------------------------------------
    // Write operations
    // -----------------------------------------------------------------------

    /// Stage `data`, flushing each time the buffer fills.
    ///
    /// Returns `data.len()` or the first error; bytes flushed before the
    /// error stay written.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.ensure_writable()?;
        let mut rest = data;
        while !rest.is_empty() {
            let n = (self.buf.len() - self.buf_i).min(rest.len());
            self.buf[self.buf_i..self.buf_i + n].copy_from_slice(&rest[..n]);
            self.buf_i += n;
            rest = &rest[n..];
            if self.buf_i == self.buf.len() {
                self.flush()?;
            }
        }
        Ok(data.len())
    }

    pub fn write_str(&mut self, s: &str) -> Result<usize> {
        self.write(s.as_bytes())
    }

    /// Write every staged byte to the descriptor.
    ///
    /// Short raw writes are continued. On error the bytes already written
    /// are dropped from the buffer and the rest stays staged, so a retry
    /// (e.g. after [`Error::Interrupted`]) resumes where this one stopped.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_writable()?;
        let mut done = 0;
        while done < self.buf_i {
            match self.raw.write(&self.buf[done..self.buf_i]) {
                Ok(0) => {
                    self.drop_flushed(done);
                    return Err(Error::Io);
                }
                Ok(n) => done += n,
                Err(err) => {
                    self.drop_flushed(done);
                    return Err(err);
                }
            }
        }
        log::trace!("flush: {done} bytes");
        self.buf_i = 0;
        Ok(())
    }

    fn drop_flushed(&mut self, n: usize) {
        self.buf.copy_within(n..self.buf_i, 0);
        self.buf_i -= n;
    }

    /// Flush, then push OS write caches to storage.
    pub fn sync(&mut self) -> Result<()> {
        self.flush()?;
        self.raw.sync()
    }

    // -----------------------------------------------------------------------
    // Positioning
    // -----------------------------------------------------------------------

    /// Reposition the descriptor, then discard the buffer.
    ///
    /// Staged writes are discarded too: flush before seeking a file opened
    /// for writing. If the raw seek fails the buffer is left untouched.
    pub fn seek(&mut self, offset: i64, mode: SeekMode) -> Result<u64> {
        let pos = self.raw.seek(offset, mode)?;
        if self.staged() > 0 {
            log::warn!("seek discarded {} staged bytes", self.buf_i);
        }
        self.buf_size = 0;
        self.buf_i = 0;
        self.carry.clear();
        Ok(pos)
    }

    /// Physical offset of the descriptor.
    pub fn tell(&mut self) -> Result<u64> {
        self.raw.tell()
    }

    /// Logical offset: what the caller has consumed or written so far.
    pub fn position(&mut self) -> Result<u64> {
        let physical = self.raw.tell()?;
        if self.raw.can_write() {
            Ok(physical + self.buf_i as u64)
        } else {
            Ok(physical.saturating_sub(self.buffered() as u64))
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Flush (best effort), close the descriptor and release the buffer.
    ///
    /// A failed flush is logged, not returned: the staged bytes are lost.
    /// Call [`flush`](Self::flush) first to observe that failure. Closing a
    /// closed file is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.staged() > 0 {
            if let Err(err) = self.flush() {
                log::warn!("close: dropping {} unflushed bytes: {err}", self.buf_i);
            }
        }
        self.buf = Box::default();
        self.buf_size = 0;
        self.buf_i = 0;
        self.carry = Vec::new();
        self.raw.close()
    }

    /// Move the file out, leaving `self` closed with no buffer.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl<D: Descriptor> Drop for BufferedFile<D> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("drop: close failed: {err}");
        }
    }
}

// ---------------------------------------------------------------------------
// std::io interop
// ---------------------------------------------------------------------------

impl<D: Descriptor> io::Read for BufferedFile<D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(BufferedFile::read(self, buf)?)
    }
}

impl<D: Descriptor> io::Write for BufferedFile<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(BufferedFile::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(BufferedFile::flush(self)?)
    }
}

impl<D: Descriptor> io::Seek for BufferedFile<D> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, mode) = SeekMode::from_seek_from(pos)?;
        Ok(BufferedFile::seek(self, offset, mode)?)
    }
}
