//! Typed records.
//!
//! [`Model`] ties a Rust struct to its [`ModelDescription`] and to the
//! [`Entry`] form used by the table gateway. Implementations are written by
//! hand; the description is the single place field order is declared.
//!
//! # Examples
//!
//! ```
//! use coldorm_core::*;
//!
//! struct ExampleTable {
//!     id: Option<i64>,
//!     name: String,
//!     value: f64,
//! }
//!
//! impl Model for ExampleTable {
//!     fn description() -> ModelDescription {
//!         ModelDescription::new("ExampleTable")
//!             .field(FieldDeclaration::new("id", LogicalType::Integer).primary_key().auto_increment())
//!             .field(FieldDeclaration::new("name", LogicalType::Text))
//!             .field(FieldDeclaration::new("value", LogicalType::Real))
//!     }
//!
//!     fn to_entry(&self) -> Entry {
//!         let mut entry = Entry::new().with("name", self.name.as_str()).with("value", self.value);
//!         if let Some(id) = self.id {
//!             entry.set("id", id);
//!         }
//!         entry
//!     }
//!
//!     fn from_entry(entry: &Entry) -> Result<Self> {
//!         Ok(Self {
//!             id: entry.decode("id")?,
//!             name: entry.decode("name")?,
//!             value: entry.decode("value")?,
//!         })
//!     }
//! }
//!
//! let record = ExampleTable { id: None, name: "NAME1".into(), value: 1.0 };
//! let entry = record.to_entry();
//! assert!(!entry.contains("id"));
//! assert_eq!(entry.keys().collect::<Vec<_>>(), vec!["name", "value"]);
//! ```

use crate::error::Result;
use crate::types::ModelDescription;
use crate::value::Entry;

/// A Rust type stored as rows of one table.
pub trait Model: Sized {
    /// Returns the ordered description the table schema is extracted from.
    fn description() -> ModelDescription;

    /// Converts the record into an entry.
    ///
    /// Fields the storage engine assigns (auto-increment keys) should be left
    /// absent when they have no value yet.
    fn to_entry(&self) -> Entry;

    /// Rebuilds a record from a full-width entry.
    fn from_entry(entry: &Entry) -> Result<Self>;

    /// Table name the description resolves to.
    fn table_name() -> String {
        Self::description().table_name().to_string()
    }
}
