//! Literate source filter.
//!
//! A literate document interleaves prose with code. A line is code when its
//! first byte is the marker (`>` by default); the marker is dropped and the
//! rest of the line, terminator included, is passed through. Every other line
//! is discarded. This is the bird-track convention of Haskell `.lhs` files.
//!
//! [`LiterateReader`] sits in front of any [`std::io::Read`]. It reads the
//! source into a scratch buffer and hands out filtered bytes either through
//! [`LiterateReader::pull`] or through its own `Read` implementation. Once the
//! source reports end-of-stream or fails, the reader keeps reporting that
//! same condition and never reads from the source again.

use alloc::vec::Vec;
use std::{
    io::{self, Read},
    path::Path,
};

use bstr::BString;

use crate::{LiterateOptions, error::SourceError};

/// Why a [`LiterateReader`] stopped producing bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The source returned zero bytes.
    EndOfStream,
    /// The source failed; the failure is reported on every later read.
    Failed(SourceError),
}

/// Result of one [`LiterateReader::pull`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pull {
    /// Filtered bytes, at most the requested length.
    pub bytes: BString,
    /// `false` once the reader will never produce another byte. May already
    /// be `false` on the pull that returns the final bytes.
    pub more: bool,
}

/// Filters a literate document down to its code lines.
///
/// # Examples
///
/// ```rust
/// use std::io::Read;
///
/// use gelstage::LiterateReader;
///
/// let doc = "Some prose.\n>puts hello\nMore prose.\n>puts bye\n";
/// let mut code = String::new();
/// LiterateReader::new(doc.as_bytes())
///     .read_to_string(&mut code)
///     .unwrap();
/// assert_eq!(code, "puts hello\nputs bye\n");
/// ```
#[derive(Debug)]
pub struct LiterateReader<R> {
    source: R,
    marker: u8,
    /// Bytes read from the source; `scratch[start..]` are not yet consumed.
    scratch: Vec<u8>,
    start: usize,
    /// How many bytes the next refill asks the source for.
    capacity: usize,
    /// `capacity` outside of an oversized request.
    base_capacity: usize,
    at_line_start: bool,
    copying: bool,
    terminal: Option<Termination>,
}

impl<R: Read> LiterateReader<R> {
    /// Wraps `source` with the default options.
    pub fn new(source: R) -> Self {
        Self::with_options(source, LiterateOptions::default())
    }

    /// Wraps `source` with explicit options.
    pub fn with_options(source: R, options: LiterateOptions) -> Self {
        let capacity = options.scratch_capacity.max(1);
        Self {
            source,
            marker: options.marker,
            scratch: Vec::with_capacity(capacity),
            start: 0,
            capacity,
            base_capacity: capacity,
            at_line_start: true,
            copying: false,
            terminal: None,
        }
    }

    /// Returns up to `max_len` filtered bytes.
    ///
    /// Reads from the source as often as needed to fill the request. Bytes
    /// left in the scratch buffer when the request is full are kept for the
    /// next call.
    pub fn pull(&mut self, max_len: usize) -> Pull {
        self.grow(max_len);
        let mut bytes = Vec::with_capacity(max_len.min(self.capacity));
        self.fill(max_len, |byte| bytes.push(byte));
        self.settle();
        Pull {
            bytes: BString::from(bytes),
            more: self.terminal.is_none(),
        }
    }

    /// How the source ended, once it has.
    #[must_use]
    pub fn termination(&self) -> Option<&Termination> {
        self.terminal.as_ref()
    }

    /// Whether the reader will never produce another byte.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.terminal.is_some()
    }

    /// Unwraps the reader, returning the source. Buffered bytes are lost.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn grow(&mut self, len: usize) {
        if len > self.capacity {
            tracing::debug!(from = self.capacity, to = len, "growing literate scratch");
            self.capacity = len;
            self.scratch.reserve(len - self.scratch.len());
        }
    }

    /// Drops back to the configured scratch size once an oversized request
    /// has been served and nothing is left buffered.
    fn settle(&mut self) {
        if self.capacity > self.base_capacity && self.start == self.scratch.len() {
            tracing::debug!(from = self.capacity, to = self.base_capacity, "shrinking literate scratch");
            self.capacity = self.base_capacity;
            self.scratch = Vec::with_capacity(self.capacity);
            self.start = 0;
        }
    }

    /// Hands filtered bytes to `emit` until `max_len` have been produced or
    /// the source is done.
    fn fill(&mut self, max_len: usize, mut emit: impl FnMut(u8)) {
        let mut written = 0;
        while written < max_len {
            if self.start == self.scratch.len() && !self.refill() {
                break;
            }

            let byte = self.scratch[self.start];
            self.start += 1;

            if self.at_line_start {
                self.copying = byte == self.marker;
            } else if self.copying {
                emit(byte);
                written += 1;
            }
            self.at_line_start = byte == b'\n';
        }
    }

    /// Replaces the drained scratch with fresh source bytes. Returns `false`
    /// once the source is done.
    fn refill(&mut self) -> bool {
        if self.terminal.is_some() {
            return false;
        }

        self.scratch.resize(self.capacity, 0);
        self.start = 0;
        loop {
            match self.source.read(&mut self.scratch) {
                Ok(0) => {
                    tracing::debug!("literate source exhausted");
                    self.terminate(Termination::EndOfStream);
                    return false;
                }
                Ok(n) => {
                    self.scratch.truncate(n);
                    return true;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    tracing::warn!(error = %err, "literate source failed");
                    self.terminate(Termination::Failed(err.into()));
                    return false;
                }
            }
        }
    }

    fn terminate(&mut self, termination: Termination) {
        self.scratch = Vec::new();
        self.start = 0;
        self.terminal = Some(termination);
    }
}

impl<R: Read> Read for LiterateReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.grow(buf.len());
        let mut written = 0;
        self.fill(buf.len(), |byte| {
            buf[written] = byte;
            written += 1;
        });
        self.settle();
        match &self.terminal {
            Some(Termination::Failed(err)) if written == 0 && !buf.is_empty() => {
                Err(err.to_io_error())
            }
            _ => Ok(written),
        }
    }
}

/// Whether `path` names a literate source file (extension `.lit`).
#[must_use]
pub fn has_literate_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "lit")
}
