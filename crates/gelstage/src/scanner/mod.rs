//! Scanner: splits a chunked byte stream into complete statements.
//!
//! What it does
//! - Consumes input through [`Scanner::feed`] in chunks of any size and keeps
//!   its quoting, comment, escape and nesting state across calls, so the
//!   result never depends on where the chunks were cut.
//! - Accumulates the bytes of the statement in flight and moves it to the
//!   completed list when a newline or `;` arrives while nothing is open.
//! - Reports through [`Scanner::is_complete`] whether the input seen so far
//!   can be handed to the interpreter or whether the caller should keep
//!   reading (the interactive `..` prompt).
//!
//! Punctuation
//! - `{ }` and `[ ]` nest. Braces also nest inside comments, which lets a
//!   comment span several lines.
//! - `"` opens and closes a string. Nothing inside a string is special, not
//!   even a backslash.
//! - `#` starts a comment only when it is the first non-blank byte of the
//!   statement. The comment ends at a newline with no open braces.
//! - `\` makes the next byte literal. `\*` outside braces starts a
//!   continuation that swallows all following whitespace, newlines included.
//!
//! State
//! - The lexical mode is a single [`State`]; the nesting counters live in
//!   [`Depth`]. [`State::advance`] is the whole transition table.
//! - Positions are absolute offsets into the stream, not into the current
//!   chunk.

use alloc::vec::Vec;
use core::mem;

use bstr::{BStr, BString, ByteSlice};

use crate::error::{Unclosed, UnterminatedStatement};

const NEWLINE: u8 = b'\n';
const SEPARATOR: u8 = b';';

/// Blank for the purpose of finding the first byte of a statement.
///
/// A newline is deliberately not blank here: an empty line has its newline
/// as its first byte, which is how blank lines are recognised and dropped.
#[inline]
fn is_blank(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\x0c' | b'\r')
}

/// Whitespace absorbed by a continuation.
#[inline]
fn is_space(byte: u8) -> bool {
    is_blank(byte) || byte == NEWLINE
}

#[inline]
fn is_terminator(byte: u8) -> bool {
    byte == NEWLINE || byte == SEPARATOR
}

/// Where an escape returns once the escaped byte has been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// The escape was written in code.
    Code,
    /// The escape was written inside a comment.
    Comment,
}

/// Lexical mode of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Ordinary statement text.
    #[default]
    Code,
    /// Inside a `"` string literal.
    Quoted,
    /// Inside a `#` comment.
    Comment,
    /// After `\*`: whitespace is absorbed until the next non-blank byte.
    Continuation,
    /// The previous byte was an unconsumed `\`.
    Escape(Resume),
}

/// Nesting counters. Signed because stray closers drive them negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Depth {
    /// `{` minus `}` seen so far, comments included.
    pub braces: i64,
    /// `[` minus `]` seen so far, outside strings and comments.
    pub brackets: i64,
}

impl Depth {
    /// Both counters are zero.
    #[must_use]
    pub fn is_balanced(self) -> bool {
        self.braces == 0 && self.brackets == 0
    }
}

/// Outcome of feeding one byte to [`State::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The byte was whitespace swallowed by a continuation. It still belongs
    /// to the statement but can never end it.
    Absorb,
    /// The scanner moves to this state; the byte may end the statement.
    Enter(State),
}

impl State {
    /// Classifies one byte.
    ///
    /// `at_line_start` is true when `byte` is the first non-blank byte of
    /// the current statement. Counter updates are applied to `depth`.
    #[must_use]
    pub fn advance(self, byte: u8, at_line_start: bool, depth: &mut Depth) -> Transition {
        let next = match self {
            State::Comment => match byte {
                b'{' => {
                    depth.braces += 1;
                    State::Comment
                }
                b'}' => {
                    depth.braces -= 1;
                    State::Comment
                }
                b'\\' => State::Escape(Resume::Comment),
                NEWLINE if depth.braces == 0 => State::Code,
                _ => State::Comment,
            },
            State::Escape(Resume::Comment) => State::Comment,
            State::Continuation if is_space(byte) => return Transition::Absorb,
            // The byte that ends a continuation is taken as-is: a `{` or `"`
            // here opens nothing.
            State::Continuation => State::Code,
            State::Code => match byte {
                b'{' => {
                    depth.braces += 1;
                    State::Code
                }
                b'}' => {
                    depth.braces -= 1;
                    State::Code
                }
                b'[' => {
                    depth.brackets += 1;
                    State::Code
                }
                b']' => {
                    depth.brackets -= 1;
                    State::Code
                }
                b'"' => State::Quoted,
                b'#' if at_line_start => State::Comment,
                b'\\' => State::Escape(Resume::Code),
                _ => State::Code,
            },
            State::Quoted if byte == b'"' => State::Code,
            State::Quoted => State::Quoted,
            State::Escape(Resume::Code) if byte == b'*' && depth.braces == 0 => {
                State::Continuation
            }
            State::Escape(Resume::Code) => State::Code,
        };
        Transition::Enter(next)
    }
}

/// Incremental statement splitter.
///
/// # Examples
///
/// ```rust
/// use gelstage::Scanner;
///
/// let mut scanner = Scanner::new();
/// scanner.feed("puts {a\n");
/// assert!(!scanner.is_complete());
/// scanner.feed("b}\nputs c; puts d\n");
/// assert!(scanner.is_complete());
/// assert_eq!(
///     scanner.take_completed(),
///     ["puts {a\nb}\n", "puts c;", " puts d\n"]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    state: State,
    depth: Depth,
    /// Absolute offset of the next byte.
    position: usize,
    /// Offset of the first non-blank byte since the last boundary.
    line_start: Option<usize>,
    pending: Vec<u8>,
    completed: Vec<BString>,
}

impl Scanner {
    /// Creates a scanner at the start of a session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a chunk of input.
    ///
    /// Every statement the chunk completes is appended to the completed
    /// list. Never fails: malformed input only keeps the scanner from ever
    /// reporting a complete statement.
    pub fn feed(&mut self, chunk: impl AsRef<[u8]>) {
        for &byte in chunk.as_ref() {
            self.step(byte);
        }
    }

    fn step(&mut self, byte: u8) {
        let position = self.position;
        self.position += 1;

        if self.line_start.is_none() && !is_blank(byte) {
            self.line_start = Some(position);
        }
        let at_line_start = self.line_start == Some(position);

        let transition = self.state.advance(byte, at_line_start, &mut self.depth);
        self.pending.push(byte);
        let Transition::Enter(state) = transition else {
            return;
        };
        self.state = state;

        // an escaped terminator has already left `Escape` by now, so it ends
        // the statement like any other
        if is_terminator(byte) && self.is_complete() {
            if byte == NEWLINE && at_line_start {
                self.pending.clear();
            } else {
                let statement = BString::from(mem::take(&mut self.pending));
                tracing::trace!(len = statement.len(), "statement completed");
                self.completed.push(statement);
            }
            self.line_start = None;
        }
    }

    /// Whether the input fed so far leaves nothing open.
    ///
    /// True when not inside a string or continuation and all braces and
    /// brackets are balanced. A caller reading interactively keeps asking
    /// for more lines while this is false.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !matches!(self.state, State::Quoted | State::Continuation) && self.depth.is_balanced()
    }

    /// Statements completed and not yet taken, oldest first.
    #[must_use]
    pub fn completed(&self) -> &[BString] {
        &self.completed
    }

    /// Removes and returns the completed statements, oldest first.
    pub fn take_completed(&mut self) -> Vec<BString> {
        mem::take(&mut self.completed)
    }

    /// Bytes of the statement currently being accumulated.
    #[must_use]
    pub fn pending(&self) -> &BStr {
        self.pending.as_bstr()
    }

    /// Current lexical mode.
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Current nesting counters.
    #[must_use]
    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Returns the scanner to the state of a fresh session, discarding
    /// pending input and completed statements.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Ends the input and applies the end-of-input policy.
    ///
    /// Leftover blank input is dropped. Leftover input that leaves nothing
    /// open becomes one last statement without a terminator.
    ///
    /// # Errors
    ///
    /// Returns [`UnterminatedStatement`] when the input ends inside a
    /// string, a continuation, or unbalanced braces or brackets.
    pub fn finish(mut self) -> Result<Vec<BString>, UnterminatedStatement> {
        if self.pending.iter().all(|&b| is_space(b)) {
            return Ok(self.completed);
        }

        let unclosed = match self.state {
            State::Quoted => Some(Unclosed::String),
            State::Continuation => Some(Unclosed::Continuation),
            _ if self.depth.braces != 0 => Some(Unclosed::Braces(self.depth.braces)),
            _ if self.depth.brackets != 0 => Some(Unclosed::Brackets(self.depth.brackets)),
            _ => None,
        };

        match unclosed {
            None => {
                self.completed.push(BString::from(self.pending));
                Ok(self.completed)
            }
            Some(unclosed) => {
                tracing::debug!(%unclosed, len = self.pending.len(), "input ended inside a statement");
                Err(UnterminatedStatement {
                    unclosed,
                    pending: BString::from(self.pending),
                    completed: self.completed,
                })
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::io::Write for Scanner {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.feed(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
