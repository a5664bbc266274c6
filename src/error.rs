//! Domain error types.
//!
//! Exactly two failure families exist in the core: [`DataFormatError`]
//! (malformed or incomplete source data, fatal at startup) and
//! [`UnknownViewStateError`] (a view-state token outside the enumerated
//! vocabulary, surfaced to the caller and never silently defaulted).

use thiserror::Error;

/// Raised while turning raw Aids2 rows into cleaned records.
///
/// Unmapped codes are an error, not a pass-through: a code present in the
/// data but absent from its lookup table means the source is not the dataset
/// this crate understands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataFormatError {
    #[error("required column '{0}' is missing from the input header")]
    MissingColumn(&'static str),
    #[error("row {row}: {field} code '{code}' has no entry in its lookup table")]
    UnmappedCode {
        row: usize,
        field: &'static str,
        code: String,
    },
    #[error("row {row}: failed to parse {field} value '{value}' as an integer")]
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
    },
    #[error("row {row}: expected at least {expected} fields, found {found}")]
    ShortRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Raised when a figure request carries a token outside the fixed view-state
/// vocabulary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnknownViewStateError {
    #[error("unknown chart category '{0}'")]
    Category(String),
    #[error("unknown region filter '{0}'")]
    RegionFilter(String),
}
