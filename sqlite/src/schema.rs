//! Data-definition statements.
//!
//! Renders a [`TableSchema`] into the `CREATE TABLE` statement executed in
//! migration mode:
//!
//! ```text
//! CREATE TABLE <name>(<col> <TYPE>[ PRIMARY KEY][ AUTOINCREMENT], ...)
//! ```
//!
//! Only the logical type and the key flags are expressed. Foreign keys,
//! uniqueness, defaults and nullability are not generated. The statement uses
//! plain `CREATE TABLE`, so running it against an existing table fails.

use coldorm_core::{TableSchema, validate_identifier};

use crate::error::Result;

/// Catalog query listing every table in the database file.
pub(crate) const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master WHERE type='table'";

/// Prefix of SQLite's own bookkeeping tables (e.g. `sqlite_sequence`).
pub(crate) const INTERNAL_TABLE_PREFIX: &str = "sqlite_";

/// Generates the `CREATE TABLE` statement for a schema.
///
/// Columns appear in schema order.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidIdentifier`](coldorm_core::SchemaError::InvalidIdentifier)
/// if the table or a column name is not a plain identifier. Schemas produced
/// by extraction always pass.
pub fn create_table_sql(schema: &TableSchema) -> Result<String> {
    validate_identifier(&schema.name)?;

    let mut columns = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        validate_identifier(&field.name)?;
        let mut column = format!("{} {}", field.name, field.logical_type.as_sql());
        if field.primary_key {
            column.push_str(" PRIMARY KEY");
        }
        if field.auto_increment {
            column.push_str(" AUTOINCREMENT");
        }
        columns.push(column);
    }

    Ok(format!("CREATE TABLE {}({})", schema.name, columns.join(", ")))
}

/// Generates the `DROP TABLE` statement for a schema.
pub fn drop_table_sql(schema: &TableSchema) -> Result<String> {
    validate_identifier(&schema.name)?;
    Ok(format!("DROP TABLE {}", schema.name))
}
