//! Column values and entries.
//!
//! [`Value`] mirrors the storage classes of the engine plus null. An
//! [`Entry`] maps field names to values, in insertion order. A field that is
//! not in the entry is *absent* and left out of the operation entirely; a
//! field mapped to [`Value::Null`] is an explicit null.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// A single column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// Integer storage class.
    Integer(i64),
    /// Floating-point storage class.
    Real(f64),
    /// Text storage class.
    Text(String),
    /// Blob storage class.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns the storage class name, used in conversion errors.
    pub fn storage_class(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a float; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Fallible conversion out of a stored [`Value`].
///
/// `field` is only used to label the error.
pub trait FromValue: Sized {
    fn from_value(field: &str, value: &Value) -> Result<Self>;
}

fn mismatch(field: &str, value: &Value, expected: &'static str) -> SchemaError {
    SchemaError::Conversion {
        field: field.to_string(),
        found: value.storage_class(),
        expected,
    }
}

impl FromValue for Value {
    fn from_value(_field: &str, value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(field: &str, value: &Value) -> Result<Self> {
        value.as_i64().ok_or_else(|| mismatch(field, value, "i64"))
    }
}

impl FromValue for i32 {
    fn from_value(field: &str, value: &Value) -> Result<Self> {
        value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| mismatch(field, value, "i32"))
    }
}

impl FromValue for bool {
    fn from_value(field: &str, value: &Value) -> Result<Self> {
        value
            .as_i64()
            .map(|v| v != 0)
            .ok_or_else(|| mismatch(field, value, "bool"))
    }
}

impl FromValue for f64 {
    fn from_value(field: &str, value: &Value) -> Result<Self> {
        value.as_f64().ok_or_else(|| mismatch(field, value, "f64"))
    }
}

impl FromValue for String {
    fn from_value(field: &str, value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(field, value, "String"))
    }
}

impl FromValue for Vec<u8> {
    fn from_value(field: &str, value: &Value) -> Result<Self> {
        value
            .as_blob()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| mismatch(field, value, "Vec<u8>"))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(field, other).map(Some),
        }
    }
}

/// Per-call map of field name to value.
///
/// Keys keep insertion order, so an entry built from a result row lists
/// fields in the order they were selected.
///
/// # Examples
///
/// ```
/// use coldorm_core::{Entry, Value};
///
/// let entry = Entry::new()
///     .with("name", "NAME1")
///     .with("value", 1.0)
///     .with("note", Value::Null);
///
/// assert_eq!(entry.get("name"), Some(&Value::Text("NAME1".into())));
/// assert!(entry.get("id").is_none()); // absent
/// assert!(entry.get("note").unwrap().is_null()); // explicit null
/// assert_eq!(entry.decode::<f64>("value").unwrap(), 1.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry {
    values: IndexMap<String, Value>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a field, returning the entry for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Adds or replaces a field in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Makes a field absent again, returning its previous value.
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    /// Returns the value of a present field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns `true` if the field is present (possibly as an explicit null).
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Decodes a present field into a Rust type.
    ///
    /// # Errors
    ///
    /// [`SchemaError::MissingValue`] if the field is absent,
    /// [`SchemaError::Conversion`] if its storage class does not fit `T`.
    pub fn decode<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| SchemaError::MissingValue(name.to_string()))?;
        T::from_value(name, value)
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Entry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Entry {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
