//! Error types for schema extraction, condition building and value conversion.

use thiserror::Error;

/// Errors raised while describing tables or building conditions.
///
/// Every variant signals a caller-side contract violation detected before
/// any statement reaches the storage engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A declared field type is not one of `INTEGER`, `REAL`, `TEXT`, `BLOB`.
    #[error("unsupported type '{type_name}' for field '{field}'")]
    UnsupportedType {
        /// Field carrying the bad declaration.
        field: String,
        /// Type name as declared.
        type_name: String,
    },

    /// A table, field or condition key is not a plain SQL identifier.
    #[error("invalid identifier '{0}': must be ASCII alphanumerics and underscores, not starting with a digit")]
    InvalidIdentifier(String),

    /// Two fields of one model share a name.
    #[error("duplicate field '{field}' in model '{model}'")]
    DuplicateField {
        /// Model declaring the duplicate.
        model: String,
        /// Repeated field name.
        field: String,
    },

    /// A model declares no fields at all.
    #[error("model '{0}' declares no fields")]
    EmptyModel(String),

    /// Parallel key/value lists differ in length.
    #[error("condition arity mismatch: {keys} keys but {values} values")]
    ConditionArity {
        /// Number of keys supplied.
        keys: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// A stored value could not be converted into the requested Rust type.
    #[error("cannot convert {found} value of field '{field}' into {expected}")]
    Conversion {
        /// Field being decoded.
        field: String,
        /// Storage class that was found.
        found: &'static str,
        /// Rust type that was requested.
        expected: &'static str,
    },

    /// A typed decode needed a field the entry does not carry.
    #[error("entry has no value for field '{0}'")]
    MissingValue(String),
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
