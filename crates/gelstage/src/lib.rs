//! Input staging for an interpreter front end.
//!
//! - [`Scanner`] splits bytes arriving in arbitrary chunks into complete
//!   statements, tracking braces, brackets, strings, comments and escapes
//!   across chunk boundaries.
//! - [`LiterateReader`] filters a literate document down to its code lines.
//! - [`History`] records accepted statements for listing, search, replay and
//!   saving.
//!
//! The scanner only needs `alloc`; the literate filter and history need the
//! `std` and `history` features, both on by default.

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod chunk_utils;
mod error;
#[cfg(feature = "history")]
mod history;
#[cfg(feature = "std")]
mod literate;
mod options;
mod scanner;


#[doc(hidden)]
pub use chunk_utils::{produce_chunks, split_at_seeds};
#[cfg(feature = "history")]
pub use error::HistoryError;
#[cfg(feature = "std")]
pub use error::SourceError;
pub use error::{Unclosed, UnterminatedStatement};
#[cfg(feature = "history")]
pub use history::{History, Selection, foreshorten};
#[cfg(feature = "std")]
pub use literate::{LiterateReader, Pull, Termination, has_literate_extension};
pub use options::LiterateOptions;
pub use scanner::{Depth, Resume, Scanner, State, Transition};

pub use bstr::{BStr, BString};
