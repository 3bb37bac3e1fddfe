//! Lazy line sequence over a [`BufferedFile`].
//!
//! `Lines` is single-pass and cannot be restarted: every step is one
//! [`BufferedFile::read_line`] into a reused buffer, and the sequence ends
//! the first time a step collects no bytes. It shares the file's buffer and
//! cursor, so interleaving other reads or seeks on the same file changes
//! what the next step sees.

use crate::buffered::BufferedFile;
use crate::descriptor::Descriptor;
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct Lines<'a, D: Descriptor> {
    file: &'a mut BufferedFile<D>,
    line: Vec<u8>,
    done: bool,
}

impl<'a, D: Descriptor> Lines<'a, D> {
    pub(crate) fn new(file: &'a mut BufferedFile<D>) -> Self {
        Self {
            file,
            line: Vec::new(),
            done: false,
        }
    }

    /// Next line as a view into the reused buffer, `None` at end-of-stream.
    ///
    /// An error ends the sequence.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        if self.done {
            return Ok(None);
        }
        match self.file.read_line(&mut self.line) {
            Ok(true) => Ok(Some(&self.line)),
            Ok(false) => {
                self.done = true;
                Ok(None)
            }
            Err(err) => {
                self.done = true;
                Err(err)
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl<D: Descriptor> Iterator for Lines<'_, D> {
    /// Owned UTF-8 line; invalid UTF-8 is [`Error::InvalidArgument`].
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_line() {
            Ok(Some(bytes)) => Some(
                std::str::from_utf8(bytes)
                    .map(str::to_owned)
                    .map_err(|_| Error::InvalidArgument),
            ),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl<D: Descriptor> std::iter::FusedIterator for Lines<'_, D> {}
