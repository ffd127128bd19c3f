//! Error types for cellgrid core.

use thiserror::Error;

/// Errors that stop a grid from loading or being written.
///
/// Problems inside a single cell never show up here; they become error
/// cells in the table instead.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, GridError>;
