//! Conversion between [`Value`] and SQLite values.
//!
//! Parameters are bound through the `Bind` wrapper so that text and blobs
//! are borrowed instead of copied. Result columns are read with
//! `value_from_ref`, which maps each storage class back to the matching
//! [`Value`] variant.

use coldorm_core::{Entry, Value};
use rusqlite::Row;
use rusqlite::types::{ToSql, ToSqlOutput, Type, Value as SqlValue, ValueRef};

/// Borrowing adapter binding a [`Value`] as a statement parameter.
#[derive(Debug)]
pub(crate) struct Bind<'a>(pub &'a Value);

impl ToSql for Bind<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Value::Real(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            Value::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Value::Blob(v) => ToSqlOutput::Borrowed(ValueRef::Blob(v)),
        })
    }
}

/// Wraps a parameter list for binding, preserving order.
pub(crate) fn bind_all(params: &[Value]) -> Vec<Bind<'_>> {
    params.iter().map(Bind).collect()
}

/// Converts a borrowed column value into an owned [`Value`].
///
/// # Errors
///
/// Returns [`rusqlite::Error::FromSqlConversionFailure`] if the text column at
/// `index` holds invalid UTF-8.
pub(crate) fn value_from_ref(index: usize, value: ValueRef<'_>) -> rusqlite::Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::Text(text.to_string()),
            Err(e) => {
                return Err(rusqlite::Error::FromSqlConversionFailure(
                    index,
                    Type::Text,
                    Box::new(e),
                ));
            }
        },
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    })
}

/// Reads the first `width` columns of a row, in column order.
pub(crate) fn read_row(row: &Row<'_>, width: usize) -> rusqlite::Result<Vec<Value>> {
    (0..width)
        .map(|index| value_from_ref(index, row.get_ref(index)?))
        .collect()
}

/// Packs a positional row into an entry keyed by `names`.
///
/// `names` and `values` must come from the same column list; the caller
/// renders the statement from `names` and reads exactly that many columns.
pub(crate) fn pack_entry(names: &[String], values: Vec<Value>) -> Entry {
    names.iter().cloned().zip(values).collect()
}
