//! Errors raised while resolving transforms and building hierarchies.

use thiserror::Error;

use gemc_model::ModelError;

/// Errors from transform resolution and hierarchy building.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A record field failed to parse or convert.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A rotation order string that is not one of the six permutations.
    #[error("unknown rotation order: '{0}'")]
    UnknownRotationOrder(String),

    /// A dimensions list with the wrong number of entries for its shape.
    #[error("wrong dimension count for {shape}: expected {expected}, got {got}")]
    Dimensions {
        /// The shape kind being built.
        shape: String,
        /// How many entries the shape needs.
        expected: String,
        /// How many entries the record carried.
        got: usize,
    },

    /// A shape type the builder cannot construct.
    #[error("volume '{name}' has unsupported shape type '{shape}'")]
    UnsupportedShape {
        /// Name of the record.
        name: String,
        /// The offending type string.
        shape: String,
    },

    /// A boolean operand or copy source that cannot be resolved to a
    /// built solid.
    #[error("operation '{operation}' references '{operand}', which has no built shape")]
    UnresolvedOperand {
        /// Name of the record holding the operation.
        operation: String,
        /// The operand that could not be resolved.
        operand: String,
    },

    /// Operand resolution re-entered a record that is still being built.
    #[error("cyclic geometry detected at '{0}'")]
    CyclicGeometry(String),

    /// A record whose mother volume was never placed.
    #[error("mother volume '{mother}' is not placed, cannot build '{volume}'")]
    MissingMother {
        /// The record that could not be placed.
        volume: String,
        /// Its missing mother.
        mother: String,
    },

    /// A requested build root that is neither the world nor in the store.
    #[error("cannot start the hierarchy at '{0}': no such volume in the store")]
    MissingWorld(String),

    /// An error reported by the modeling toolkit.
    #[error("toolkit error: {0}")]
    Toolkit(String),
}
