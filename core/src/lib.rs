//! Core types for the coldorm mapping layer.
//!
//! This crate holds everything that does not touch the storage engine:
//!
//! - [`ModelDescription`] / [`FieldDeclaration`]: what callers declare.
//! - [`TableSchema`] / [`FieldDescriptor`]: the validated, ordered schema
//!   extracted from a description ([`TableSchema::extract`]).
//! - [`Value`] / [`Entry`]: column values and per-call value carriers.
//! - [`Where`] / [`Correlation`]: condition chains rendered to bound
//!   predicates, and column-to-column join correlations.
//! - [`Model`]: typed records convertible to and from entries.
//!
//! Statement rendering and execution live in `coldorm-sqlite`.
//!
//! # Example
//!
//! ```
//! use coldorm_core::*;
//!
//! let model = ModelDescription::new("ExampleTable")
//!     .field(FieldDeclaration::new("id", LogicalType::Integer).primary_key().auto_increment())
//!     .field(FieldDeclaration::new("name", LogicalType::Text))
//!     .field(FieldDeclaration::new("value", LogicalType::Real));
//!
//! let schema = TableSchema::extract(&model).unwrap();
//! assert_eq!(schema.fields.len(), 3);
//!
//! let filter = Where::new("name", "NAME2").and("value", 2.0);
//! assert_eq!(filter.render().unwrap().sql, "name = ? AND value = ?");
//! ```

mod condition;
mod error;
mod extract;
mod model;
mod types;
mod value;

pub use condition::{ColumnPair, Condition, Connector, Correlation, Predicate, Where};
pub use error::{Result, SchemaError};
pub use extract::validate_identifier;
pub use model::Model;
pub use types::*;
pub use value::{Entry, FromValue, Value};
