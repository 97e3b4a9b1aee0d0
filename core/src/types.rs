//! Field and table descriptors.
//!
//! A [`ModelDescription`] is what callers write: a model name, an optional
//! table-name override and an ordered list of [`FieldDeclaration`]s. It is
//! plain data, so it can be built in code or deserialized from a model file.
//! Extraction (see [`TableSchema::extract`](crate::TableSchema::extract))
//! validates it and produces the immutable [`TableSchema`] every statement is
//! rendered from.

use serde::{Deserialize, Serialize};

/// Abstract column type, independent of any Rust type.
///
/// # Examples
///
/// ```
/// use coldorm_core::LogicalType;
///
/// assert_eq!(LogicalType::parse("integer"), Some(LogicalType::Integer));
/// assert_eq!(LogicalType::Real.as_sql(), "REAL");
/// assert_eq!(LogicalType::parse("VARCHAR"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalType {
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit floating point.
    Real,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Blob,
}

impl LogicalType {
    /// All recognized logical types, in declaration order.
    pub const ALL: [LogicalType; 4] = [
        LogicalType::Integer,
        LogicalType::Real,
        LogicalType::Text,
        LogicalType::Blob,
    ];

    /// Parses a declared type name, ignoring ASCII case.
    ///
    /// Returns `None` for anything other than the four recognized names.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_sql().eq_ignore_ascii_case(name.trim()))
    }

    /// Returns the storage-engine-native type token.
    pub fn as_sql(self) -> &'static str {
        match self {
            LogicalType::Integer => "INTEGER",
            LogicalType::Real => "REAL",
            LogicalType::Text => "TEXT",
            LogicalType::Blob => "BLOB",
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One declared field of a model, as written by the caller.
///
/// The type is kept as the declared name so that model files can be
/// deserialized without a second pass; it is checked during extraction.
///
/// # Examples
///
/// ```
/// use coldorm_core::{FieldDeclaration, LogicalType};
///
/// let id = FieldDeclaration::new("id", LogicalType::Integer)
///     .primary_key()
///     .auto_increment();
/// assert!(id.primary_key && id.auto_increment);
/// assert_eq!(id.type_name, "INTEGER");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    /// Column name.
    pub name: String,
    /// Declared logical type name (`INTEGER`, `REAL`, `TEXT` or `BLOB`).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Whether the column is the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Whether the column auto-increments.
    #[serde(default)]
    pub auto_increment: bool,
}

impl FieldDeclaration {
    /// Declares a plain field of the given logical type.
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self::with_type_name(name, logical_type.as_sql())
    }

    /// Declares a field by type name; the name is validated at extraction.
    pub fn with_type_name(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            primary_key: false,
            auto_increment: false,
        }
    }

    /// Marks the field as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the field as auto-incrementing.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// Declarative description of one model.
///
/// Field order is the order of [`field`](Self::field) calls (or of the list
/// in a model file) and becomes the column order of the table.
///
/// # Examples
///
/// ```
/// use coldorm_core::{FieldDeclaration, LogicalType, ModelDescription};
///
/// let model = ModelDescription::new("ExampleTable")
///     .field(FieldDeclaration::new("id", LogicalType::Integer).primary_key().auto_increment())
///     .field(FieldDeclaration::new("name", LogicalType::Text))
///     .field(FieldDeclaration::new("value", LogicalType::Real));
///
/// assert_eq!(model.table_name(), "ExampleTable");
/// assert_eq!(model.with_table("examples").table_name(), "examples");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescription {
    /// Model name; the table name unless overridden.
    pub name: String,
    /// Explicit table-name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Ordered field declarations.
    pub fields: Vec<FieldDeclaration>,
}

impl ModelDescription {
    /// Starts a description with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            fields: Vec::new(),
        }
    }

    /// Overrides the table name derived from the model name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Appends a field declaration.
    pub fn field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the logical table name: the override if set, else the model name.
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or(&self.name)
    }
}

/// Validated metadata for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Column name.
    pub name: String,
    /// Logical column type.
    pub logical_type: LogicalType,
    /// Whether the column is the primary key.
    pub primary_key: bool,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
}

/// Validated, ordered table schema.
///
/// Produced once by extraction and never mutated afterwards. `fields` is the
/// single canonical column order: statements list columns from it and row
/// packing reads result columns back in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl TableSchema {
    /// Looks up a field by exact name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if the schema has a field called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Iterates over column names in schema order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the primary-key field, if one is declared.
    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.primary_key)
    }
}
