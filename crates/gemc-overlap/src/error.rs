//! Errors raised while scanning run logs.

use thiserror::Error;

/// Errors from log scanning.
#[derive(Error, Debug)]
pub enum OverlapError {
    /// The log file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A diagnostic line matched but its numbers do not parse.
    #[error("malformed diagnostic at line {line}: {message}")]
    Malformed {
        /// One-based line number in the log.
        line: usize,
        /// What failed to parse.
        message: String,
    },
}
