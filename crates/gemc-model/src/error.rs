//! Error types for geometry-table operations.

use thiserror::Error;

/// Errors that can occur while parsing, validating, or storing geometry
/// records.
#[derive(Error, Debug)]
pub enum ModelError {
    /// I/O error reading or writing a geometry table.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A unit symbol that is not in the conversion tables.
    #[error("unknown unit: '{0}'")]
    UnknownUnit(String),

    /// A conversion between units of different kinds (for example cm to deg).
    #[error("cannot convert between units of different kinds: '{from}' to '{to}'")]
    MixedUnits {
        /// Source unit symbol.
        from: String,
        /// Target unit symbol.
        to: String,
    },

    /// A field of a geometry record that could not be parsed.
    #[error("parse error in field '{field}': {message}")]
    Parse {
        /// Name of the offending field.
        field: &'static str,
        /// What went wrong.
        message: String,
    },

    /// A color string that is not 6 hex digits plus an optional
    /// transparency digit.
    #[error("malformed color string: '{0}'")]
    Color(String),

    /// An attempt to add a record whose name is already in the store.
    #[error("duplicate volume name: '{0}'")]
    DuplicateName(String),
}

impl ModelError {
    /// Create a field parse error.
    pub fn parse(field: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            field,
            message: message.into(),
        }
    }
}
