//! Error types for engine and table gateway operations.
//!
//! Storage failures from SQLite are passed through unchanged in
//! [`OrmError::StorageError`]; every other variant is a contract violation
//! detected before the statement is executed.

use coldorm_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while opening an engine or running table operations.
#[derive(Debug, Error)]
pub enum OrmError {
    /// SQLite rejected or failed a statement.
    #[error("storage error: {0}")]
    StorageError(#[from] rusqlite::Error),

    /// Schema extraction, identifier or condition failure.
    #[error("schema error: {0}")]
    SchemaError(#[from] SchemaError),

    /// No gateway is registered under the requested name.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Two models resolve to the same table name.
    #[error("duplicate table: {0}")]
    DuplicateTable(String),

    /// A field name does not belong to the table it was used with.
    #[error("unknown field '{field}' for table '{table}'")]
    UnknownField { table: String, field: String },

    /// An unqualified join field exists in both joined tables.
    #[error("field '{0}' is ambiguous in join; qualify it as table.field")]
    AmbiguousField(String),

    /// A field selection names no fields.
    #[error("field selection for table '{0}' is empty")]
    EmptySelection(String),

    /// A field selection names the same field twice.
    #[error("field '{field}' is selected more than once from table '{table}'")]
    DuplicateSelection { table: String, field: String },

    /// A cross join names the same table on both sides.
    #[error("cannot cross join table '{0}' with itself")]
    SelfJoin(String),

    /// A join was requested with the wildcard selection.
    #[error("cross join between '{0}' and '{1}' requires an explicit field list")]
    WildcardJoin(String, String),

    /// An insert entry lacks a field that is not auto-incremented.
    #[error("entry for table '{table}' has no value for field '{field}'")]
    MissingField { table: String, field: String },

    /// An update entry has no present fields.
    #[error("update on table '{0}' has no fields to set")]
    EmptyUpdate(String),

    /// The connection mutex was poisoned by a panicking holder.
    #[error("storage connection lock poisoned")]
    LockPoisoned,

    /// Configuration or model file I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML configuration or model file failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON model file failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Convenience alias for results with [`OrmError`].
pub type Result<T> = std::result::Result<T, OrmError>;
