//! Windows descriptor backend over `std::fs::File`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use fastfile_core::{Descriptor, Error, FileStat, OpenDescriptor, OpenMode, Result, SeekMode};

/// An owned Windows file handle.
#[derive(Debug)]
pub struct OsFd {
    file: File,
}

impl OpenDescriptor for OsFd {
    fn open(path: &Path, mode: OpenMode) -> Result<Self> {
        let mut opts = OpenOptions::new();
        match mode {
            OpenMode::Read => opts.read(true),
            OpenMode::Write => opts.write(true).create(true).truncate(true),
            OpenMode::Append => opts.append(true).create(true),
        };
        let file = opts.open(path)?;
        log::trace!("open({}, {mode:?})", path.display());
        Ok(Self { file })
    }
}

impl Descriptor for OsFd {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.file.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Ok(self.file.write(buf)?)
    }

    fn seek(&mut self, offset: i64, mode: SeekMode) -> Result<u64> {
        let pos = match mode {
            SeekMode::Set => {
                let start = u64::try_from(offset).map_err(|_| Error::InvalidArgument)?;
                SeekFrom::Start(start)
            }
            SeekMode::Cur => SeekFrom::Current(offset),
            SeekMode::End => SeekFrom::End(offset),
        };
        Ok(self.file.seek(pos)?)
    }

    fn stat(&self) -> Result<FileStat> {
        let meta = self.file.metadata()?;
        Ok(FileStat {
            size: meta.len(),
            block_size: 0,
        })
    }

    fn sync(&mut self) -> Result<()> {
        Ok(self.file.sync_all()?)
    }

    fn close(self) -> Result<()> {
        drop(self.file);
        Ok(())
    }
}
