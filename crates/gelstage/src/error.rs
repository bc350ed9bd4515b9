use alloc::vec::Vec;
use core::fmt;

use bstr::BString;
use thiserror::Error;

/// What was still open when input ended inside a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unclosed {
    /// A `"` string literal was never closed.
    String,
    /// A `\*` continuation was still absorbing whitespace.
    Continuation,
    /// The brace counter was non-zero (negative for stray `}`).
    Braces(i64),
    /// The bracket counter was non-zero (negative for stray `]`).
    Brackets(i64),
}

impl fmt::Display for Unclosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unclosed::String => f.write_str("unclosed string literal"),
            Unclosed::Continuation => f.write_str("unfinished line continuation"),
            Unclosed::Braces(n) if *n < 0 => write!(f, "{} unmatched '}}'", n.unsigned_abs()),
            Unclosed::Braces(n) => write!(f, "{n} unclosed '{{'"),
            Unclosed::Brackets(n) if *n < 0 => write!(f, "{} unmatched ']'", n.unsigned_abs()),
            Unclosed::Brackets(n) => write!(f, "{n} unclosed '['"),
        }
    }
}

/// Input ended while the scanner still held part of a statement.
///
/// Returned by [`Scanner::finish`](crate::Scanner::finish). The statements
/// that did complete before the end of input are handed back alongside the
/// leftover bytes so the caller can still run or record them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("input ended inside a statement: {unclosed}")]
pub struct UnterminatedStatement {
    /// The construct that was left open.
    pub unclosed: Unclosed,
    /// Bytes of the incomplete statement.
    pub pending: BString,
    /// Statements completed before input ended.
    pub completed: Vec<BString>,
}

#[cfg(feature = "std")]
pub use self::source::SourceError;

#[cfg(feature = "std")]
mod source {
    use alloc::string::{String, ToString};
    use std::io;

    use thiserror::Error;

    /// A read failure reported by the source under a
    /// [`LiterateReader`](crate::LiterateReader).
    ///
    /// `io::Error` cannot be cloned, so the reader keeps this record instead
    /// and hands out the same failure on every pull after the first.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    #[error("literate source failed: {message}")]
    pub struct SourceError {
        kind: io::ErrorKind,
        message: String,
    }

    impl SourceError {
        /// The `io::ErrorKind` of the original failure.
        #[must_use]
        pub fn kind(&self) -> io::ErrorKind {
            self.kind
        }

        /// Rebuilds an `io::Error` carrying the same kind and message.
        #[must_use]
        pub fn to_io_error(&self) -> io::Error {
            io::Error::new(self.kind, self.clone())
        }
    }

    impl From<io::Error> for SourceError {
        fn from(err: io::Error) -> Self {
            Self {
                kind: err.kind(),
                message: err.to_string(),
            }
        }
    }
}

/// Errors from [`History`](crate::History) index arithmetic.
#[cfg(feature = "history")]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// The index does not name an entry.
    #[error("invalid index {index}: history holds {len} entries")]
    InvalidIndex {
        /// Requested index.
        index: usize,
        /// Number of entries at the time of the request.
        len: usize,
    },
    /// The end of a span comes before its start.
    #[error("invalid interval, {from} >= {to}")]
    InvalidInterval {
        /// First index of the span.
        from: usize,
        /// One past the last index of the span.
        to: usize,
    },
}
