//! SQLite engine for coldorm models.
//!
//! This crate turns [`ModelDescription`](coldorm_core::ModelDescription)s into
//! SQLite tables and exposes one [`Table`] gateway per model for filtered
//! reads, cross joins, inserts, updates and deletes. Every value reaches the
//! database as a bound parameter.
//!
//! # Architecture
//!
//! - **`schema`**: `CREATE TABLE` / `DROP TABLE` rendering
//! - **`statement`**: select, join, insert, update and delete rendering
//! - **`storage`**: the shared connection and the commit discipline
//! - **`table`**: the per-table gateway
//! - **`engine`**: connection owner, migration and gateway registry
//! - **`config`**: engine settings and model files
//!
//! # Quick start
//!
//! ```
//! use coldorm_core::*;
//! use coldorm_sqlite::{Engine, EngineConfig, Fields};
//!
//! let model = ModelDescription::new("ExampleTable")
//!     .field(FieldDeclaration::new("id", LogicalType::Integer).primary_key().auto_increment())
//!     .field(FieldDeclaration::new("name", LogicalType::Text))
//!     .field(FieldDeclaration::new("value", LogicalType::Real));
//!
//! let engine = Engine::open_in_memory(EngineConfig::new("test").with_migration(true), &[model]).unwrap();
//! let table = engine.table("ExampleTable").unwrap();
//!
//! for (name, value) in [("NAME1", 1.0), ("NAME2", 2.0), ("NAME3", 3.0)] {
//!     table.add(&Entry::new().with("name", name).with("value", value)).unwrap();
//! }
//! engine.commit().unwrap();
//!
//! let filter = Where::new("name", "NAME1").or("name", "NAME3");
//! let rows = table.get(&filter, &Fields::All).unwrap();
//! assert_eq!(rows.len(), 2);
//! ```
//!
//! # Commit discipline
//!
//! Nothing is committed implicitly. Call [`Engine::commit`] to make writes
//! durable; [`Engine::rollback`] or dropping the engine discards them.
//!
//! # Statement logging
//!
//! Statements and their parameters are emitted through `tracing`: at `info`
//! when [`EngineConfig::log_statements`] is set (or `ORMLOG=1` with
//! [`EngineConfig::with_env_overrides`]), at `trace` otherwise.

mod config;
mod convert;
mod engine;
mod error;
mod schema;
mod statement;
mod storage;
mod table;

pub use config::{EngineConfig, LOG_ENV_VAR, ModelFile, log_enabled_from_env};
pub use engine::Engine;
pub use error::{OrmError, Result};
pub use schema::{create_table_sql, drop_table_sql};
pub use statement::{Fields, Statement};
pub use table::Table;
