//! History session: the statements a front end has accepted, in order.
//!
//! A front end owns one [`History`] per interactive session and passes it by
//! reference to whatever needs it (listing, searching, replaying, saving).

use alloc::vec::Vec;
use core::ops::Range;
use std::io::{self, Read, Write};

use bstr::{BStr, BString, ByteSlice};
use regex::bytes::Regex;

use crate::{Scanner, error::HistoryError};

/// Byte offset past which [`foreshorten`] truncates.
const BRIEF_WIDTH: usize = 70;

/// Which entries a history command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every entry.
    All,
    /// Entries `from` through `to`, both inclusive. `to` defaults to `from`.
    Span {
        /// First selected index.
        from: usize,
        /// Last selected index.
        to: Option<usize>,
    },
}

impl Selection {
    /// Selects the single entry at `index`.
    #[must_use]
    pub fn one(index: usize) -> Self {
        Selection::Span {
            from: index,
            to: None,
        }
    }

    /// Selects `from` through `to`, inclusive.
    #[must_use]
    pub fn span(from: usize, to: usize) -> Self {
        Selection::Span { from, to: Some(to) }
    }
}

/// Ordered record of accepted statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<BString>,
}

impl History {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[BString] {
        &self.entries
    }

    /// The most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&BStr> {
        self.entries.last().map(|s| s.as_bstr())
    }

    /// Records one statement.
    pub fn push(&mut self, statement: impl Into<BString>) {
        self.entries.push(statement.into());
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops the most recent entry, if any.
    pub fn pop(&mut self) -> Option<BString> {
        self.entries.pop()
    }

    /// Drops the `count` most recent entries.
    ///
    /// # Errors
    ///
    /// `count` must be a valid index other than zero; use
    /// [`clear`](Self::clear) to drop everything.
    pub fn rewind(&mut self, count: usize) -> Result<(), HistoryError> {
        if count == 0 {
            return Err(self.invalid_index(count));
        }
        self.check_index(count)?;
        self.entries.truncate(self.entries.len() - count);
        Ok(())
    }

    /// The entries named by `selection`.
    ///
    /// # Errors
    ///
    /// Fails when an index is out of range or the span runs backwards.
    pub fn select(&self, selection: Selection) -> Result<&[BString], HistoryError> {
        let range = self.range(selection)?;
        Ok(&self.entries[range])
    }

    /// Removes and returns the entries named by `selection`.
    ///
    /// # Errors
    ///
    /// Fails when an index is out of range or the span runs backwards.
    pub fn cut(&mut self, selection: Selection) -> Result<Vec<BString>, HistoryError> {
        let range = self.range(selection)?;
        Ok(self.entries.drain(range).collect())
    }

    /// Numbered entries matching `pattern`.
    #[must_use]
    pub fn search<'a>(&'a self, pattern: &Regex) -> Vec<(usize, &'a BStr)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| pattern.is_match(entry))
            .map(|(i, entry)| (i, entry.as_bstr()))
            .collect()
    }

    /// Numbered, one-line rendering of every entry.
    pub fn brief(&self) -> impl Iterator<Item = (usize, BString)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, foreshorten(entry)))
    }

    /// Writes every entry back to back. Entries keep their terminators, so
    /// the output can be loaded again.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn save<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for entry in &self.entries {
            writer.write_all(entry)?;
        }
        writer.flush()
    }

    /// Splits everything `reader` yields into statements and records them.
    ///
    /// Input left open at the end (an unclosed brace, say) is ignored.
    /// Returns the number of statements recorded.
    ///
    /// # Errors
    ///
    /// Propagates read failures; statements completed before the failure are
    /// not recorded.
    pub fn load<R: Read>(&mut self, mut reader: R) -> io::Result<usize> {
        let mut scanner = Scanner::new();
        io::copy(&mut reader, &mut scanner)?;
        if !scanner.pending().is_empty() {
            tracing::debug!(len = scanner.pending().len(), "ignoring unfinished statement at end of input");
        }
        let loaded = scanner.take_completed();
        let count = loaded.len();
        self.entries.extend(loaded);
        Ok(count)
    }

    fn range(&self, selection: Selection) -> Result<Range<usize>, HistoryError> {
        match selection {
            Selection::All => Ok(0..self.entries.len()),
            Selection::Span { from, to } => {
                self.check_index(from)?;
                let to = match to {
                    Some(to) => self.check_index(to)?,
                    None => from,
                } + 1;
                if from >= to {
                    return Err(HistoryError::InvalidInterval { from, to });
                }
                Ok(from..to)
            }
        }
    }

    fn check_index(&self, index: usize) -> Result<usize, HistoryError> {
        if index < self.entries.len() {
            Ok(index)
        } else {
            Err(self.invalid_index(index))
        }
    }

    fn invalid_index(&self, index: usize) -> HistoryError {
        HistoryError::InvalidIndex {
            index,
            len: self.entries.len(),
        }
    }
}

impl Extend<BString> for History {
    fn extend<I: IntoIterator<Item = BString>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

/// One-line summary of a statement.
///
/// Keeps the first line and drops a trailing newline. When the statement
/// runs onto further lines or past 70 bytes, the kept text is cut on a
/// character boundary, stripped of trailing whitespace and suffixed with
/// `...`.
#[must_use]
pub fn foreshorten(statement: &[u8]) -> BString {
    for (start, _, ch) in statement.char_indices() {
        let last = start + 1 == statement.len();
        if (ch == '\n' && !last) || start > BRIEF_WIDTH {
            let mut out = BString::from(statement[..start].trim_end_with(char::is_whitespace));
            out.extend_from_slice(b"...");
            return out;
        }
        if ch == '\n' {
            return BString::from(&statement[..start]);
        }
    }
    BString::from(statement)
}
