//! Error interfaces for this crate.
//!
//! Every error type the assembler half of this crate produces implements
//! the [`Error`] trait, which exposes the source span(s) the error points at
//! and an optional help message. The simulator half has no error types:
//! machine-level faults vector through the interrupt vector table instead
//! (see [`crate::sim`]).

use std::borrow::Cow;
use std::ops::Range;

pub use crate::asm::{AsmErr, AsmErrKind, Diagnostic};
pub use crate::ast::OffsetNewErr;
pub use crate::parse::lex::LexErr;
pub use crate::parse::ParseErr;

/// Unified error interface for all errors in this crate.
///
/// The [`Display`] implementation holds the brief message,
/// whereas [`Error::help`] holds any clarifying message.
///
/// [`Display`]: std::fmt::Display
pub trait Error: std::error::Error {
    /// The range(s) where this error occurs in source.
    ///
    /// If this is not known, this can be set to `None`.
    fn span(&self) -> Option<ErrSpan> {
        None
    }

    /// A clarifying message describing how to fix the error.
    ///
    /// If there is none to add, this can be set to `None`.
    fn help(&self) -> Option<Cow<str>>;
}

/// The source span(s) an error points at.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrSpan {
    /// The error points at one contiguous range.
    One(Range<usize>),
    /// The error points at two ranges (e.g., a label and its redefinition).
    Two([Range<usize>; 2]),
    /// The error points at three or more ranges.
    Many(Vec<Range<usize>>)
}
impl ErrSpan {
    /// The first (earliest-starting) range of this span.
    pub fn first(&self) -> Range<usize> {
        match self {
            ErrSpan::One(r)       => r.clone(),
            ErrSpan::Two([r, _])  => r.clone(),
            ErrSpan::Many(rs)     => {
                rs.iter()
                    .min_by_key(|r| r.start)
                    .cloned()
                    .unwrap_or(0..0)
            },
        }
    }
}
impl From<Range<usize>> for ErrSpan {
    fn from(value: Range<usize>) -> Self {
        ErrSpan::One(value)
    }
}
impl From<[Range<usize>; 2]> for ErrSpan {
    fn from(value: [Range<usize>; 2]) -> Self {
        ErrSpan::Two(value)
    }
}
impl From<Vec<Range<usize>>> for ErrSpan {
    fn from(mut value: Vec<Range<usize>>) -> Self {
        match value.len() {
            1 => ErrSpan::One(value.swap_remove(0)),
            2 => {
                let b = value.swap_remove(1);
                let a = value.swap_remove(0);
                ErrSpan::Two([a, b])
            },
            _ => ErrSpan::Many(value)
        }
    }
}
