//! Error types for the cellgrid engine.
//!
//! Errors never abort a table. They are stored in the failing cell and
//! rendered between `#` markers, so the `Display` text is the user-facing
//! cause.

use thiserror::Error;

/// Errors raised while scanning or parsing cell text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected char '{0}'")]
    UnexpectedChar(char),

    #[error("Malformed number '{0}'")]
    MalformedNumber(String),

    #[error("Malformed cell reference '{0}'")]
    MalformedReference(String),

    #[error("Malformed offset '{0}'")]
    MalformedOffset(String),

    #[error("Unexpected {found}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },

    #[error("Expected value, got nothing instead")]
    MissingValue,

    #[error("Expected ',' or ')' in call to {name}, got {found}")]
    MissingComma { name: String, found: String },

    #[error("Ranges can only be used in functions")]
    RangeOutsideFunction,

    #[error("Function calls nested deeper than {0}")]
    NestedTooDeep(usize),

    #[error("Pinned references cannot be ranges")]
    PinnedRange,

    #[error("No clone direction")]
    NoCloneDirection,

    #[error("Invalid clone direction '{0}'")]
    InvalidCloneDirection(String),

    #[error("Invalid clone offset '{0}'")]
    InvalidCloneOffset(String),
}

/// The cause carried by an `Error` cell.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Loop!")]
    Cycle,

    #[error("Cell outside table")]
    OutsideTable,

    #[error("Cannot operate on text")]
    Text,

    #[error("Value is not a number")]
    NotANumber,

    #[error("Ranges can only be used in functions")]
    RangeOutsideFunction,

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{name} expects {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{name} expects a range as argument {position}")]
    ExpectedRange { name: &'static str, position: usize },

    #[error("{name} expects a value as argument {position}")]
    ExpectedScalar { name: &'static str, position: usize },

    #[error("Square root of negative number")]
    NegativeSqrt,

    #[error("Empty range")]
    EmptyRange,

    #[error("Cannot duplicate above the table")]
    DuplicateAboveTable,

    #[error("Dependency chain too deep")]
    TooDeep,

    #[error("Result is not a finite number")]
    NotFinite,
}
