//! Schema extraction and identifier validation.
//!
//! Turns a [`ModelDescription`] into a [`TableSchema`], rejecting anything
//! that would produce a malformed or unsafe statement later on: bad
//! identifiers, duplicate fields, empty models and unknown type names.
//! All checks run before any SQL is rendered.
//!
//! # Examples
//!
//! ```
//! use coldorm_core::*;
//!
//! let model = ModelDescription::new("ExampleTable")
//!     .field(FieldDeclaration::new("id", LogicalType::Integer).primary_key().auto_increment())
//!     .field(FieldDeclaration::new("name", LogicalType::Text));
//! let schema = TableSchema::extract(&model).unwrap();
//! assert_eq!(schema.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
//!
//! // Unknown type name
//! let bad = ModelDescription::new("Bad")
//!     .field(FieldDeclaration::with_type_name("when", "DATETIME"));
//! assert!(matches!(
//!     TableSchema::extract(&bad),
//!     Err(SchemaError::UnsupportedType { .. })
//! ));
//! ```

use std::collections::HashSet;

use crate::error::{Result, SchemaError};
use crate::types::{FieldDescriptor, LogicalType, ModelDescription, TableSchema};

/// Validates that `name` is a plain SQL identifier.
///
/// Identifiers are interpolated into statement text (values never are), so
/// they are restricted to ASCII alphanumerics and underscores and may not
/// start with a digit.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid {
        return Err(SchemaError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

impl TableSchema {
    /// Extracts a validated schema from a model description.
    ///
    /// Field order is taken verbatim from the description. The table name is
    /// the description's override when present, otherwise the model name.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::InvalidIdentifier`] for a bad table or field name
    /// - [`SchemaError::EmptyModel`] when no fields are declared
    /// - [`SchemaError::DuplicateField`] when a field name repeats
    /// - [`SchemaError::UnsupportedType`] for an unrecognized type name
    pub fn extract(model: &ModelDescription) -> Result<Self> {
        let table = model.table_name();
        validate_identifier(table)?;

        if model.fields.is_empty() {
            return Err(SchemaError::EmptyModel(model.name.clone()));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut fields = Vec::with_capacity(model.fields.len());

        for declaration in &model.fields {
            let name = declaration.name.as_str();
            validate_identifier(name)?;

            if !seen.insert(name) {
                return Err(SchemaError::DuplicateField {
                    model: model.name.clone(),
                    field: name.to_string(),
                });
            }

            let logical_type = LogicalType::parse(&declaration.type_name).ok_or_else(|| {
                SchemaError::UnsupportedType {
                    field: name.to_string(),
                    type_name: declaration.type_name.clone(),
                }
            })?;

            fields.push(FieldDescriptor {
                name: name.to_string(),
                logical_type,
                primary_key: declaration.primary_key,
                auto_increment: declaration.auto_increment,
            });
        }

        Ok(Self {
            name: table.to_string(),
            fields,
        })
    }
}
