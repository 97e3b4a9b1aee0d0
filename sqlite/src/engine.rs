//! Engine: connection owner and gateway registry.
//!
//! [`Engine`] opens the storage file, extracts one [`TableSchema`] per model,
//! optionally creates the tables, and hands out [`Table`] gateways that share
//! its connection.
//!
//! # Example
//!
//! ```no_run
//! use coldorm_core::*;
//! use coldorm_sqlite::{Engine, EngineConfig, Fields};
//!
//! let model = ModelDescription::new("ExampleTable")
//!     .field(FieldDeclaration::new("id", LogicalType::Integer).primary_key().auto_increment())
//!     .field(FieldDeclaration::new("name", LogicalType::Text));
//!
//! let config = EngineConfig::new("test").with_migration(true).with_env_overrides();
//! let engine = Engine::open(config, &[model]).unwrap();
//!
//! let table = engine.table("ExampleTable").unwrap();
//! table.add(&Entry::new().with("name", "NAME1")).unwrap();
//! engine.commit().unwrap();
//!
//! println!("{:?}", table.get_all(&Fields::All).unwrap());
//! ```

use std::sync::Arc;

use coldorm_core::{Model, ModelDescription, TableSchema};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{OrmError, Result};
use crate::schema::{create_table_sql, drop_table_sql};
use crate::statement::Statement;
use crate::storage::Storage;
use crate::table::Table;

/// Owns the storage connection and the registered table gateways.
///
/// Writes made through any gateway stay pending until [`commit`](Self::commit).
/// Dropping the engine with pending writes discards them.
pub struct Engine {
    config: EngineConfig,
    storage: Arc<Storage>,
    tables: Vec<Table>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("tables", &self.tables)
            .finish()
    }
}

impl Engine {
    /// Opens `<directory>/<name>.db` and registers `models`.
    ///
    /// With `config.migration` set, a `CREATE TABLE` statement is executed for
    /// every model in order. Tables that already exist make this fail.
    ///
    /// # Errors
    ///
    /// Schema errors from extraction, [`OrmError::DuplicateTable`] when two
    /// models resolve to the same table name, or a storage error from opening
    /// the file or creating a table.
    pub fn open(config: EngineConfig, models: &[ModelDescription]) -> Result<Self> {
        let path = config.db_path();
        let storage = Storage::open(&path, config.log_statements)?;
        Self::with_storage(config, storage, models)
    }

    /// Like [`open`](Self::open), against a private in-memory database.
    pub fn open_in_memory(config: EngineConfig, models: &[ModelDescription]) -> Result<Self> {
        let storage = Storage::open_in_memory(config.log_statements)?;
        Self::with_storage(config, storage, models)
    }

    fn with_storage(
        config: EngineConfig,
        storage: Storage,
        models: &[ModelDescription],
    ) -> Result<Self> {
        let schemas = extract_all(models)?;
        let storage = Arc::new(storage);

        if config.migration {
            for schema in &schemas {
                let sql = create_table_sql(schema)?;
                debug!(table = %schema.name, "Creating table");
                storage.execute_ddl(&sql)?;
            }
            info!(engine = %config.name, count = schemas.len(), "Migration complete");
        }

        let tables = schemas
            .into_iter()
            .map(|schema| Table::new(schema, Arc::clone(&storage)))
            .collect();

        Ok(Self {
            config,
            storage,
            tables,
        })
    }

    /// Storage identifier from the configuration.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the gateway registered under exactly `name`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::TableNotFound`] if no model resolved to `name`.
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .iter()
            .find(|table| table.name() == name)
            .ok_or_else(|| OrmError::TableNotFound(name.to_string()))
    }

    /// Returns the gateway for a typed model.
    pub fn table_for<M: Model>(&self) -> Result<&Table> {
        self.table(&M::table_name())
    }

    /// Registered gateways, in registration order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Lists the tables present in the storage file.
    ///
    /// Reads the catalog directly, so tables created outside this engine are
    /// included and registered tables that were never created are not.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.storage.list_tables()
    }

    /// Drops a registered table from storage. The gateway stays registered.
    ///
    /// Like any write, the drop is pending until [`commit`](Self::commit) and
    /// is undone by [`rollback`](Self::rollback).
    pub fn drop_table(&self, name: &str) -> Result<()> {
        let sql = drop_table_sql(self.table(name)?.schema())?;
        debug!(table = %name, "Dropping table");
        self.storage.execute(&Statement {
            sql,
            params: Vec::new(),
        })?;
        Ok(())
    }

    /// Makes every pending write durable.
    pub fn commit(&self) -> Result<()> {
        self.storage.commit()
    }

    /// Discards every pending write.
    pub fn rollback(&self) -> Result<()> {
        self.storage.rollback()
    }

    /// Returns `true` if writes are waiting for [`commit`](Self::commit).
    pub fn has_pending_writes(&self) -> Result<bool> {
        self.storage.has_pending_writes()
    }
}

/// Extracts every schema, rejecting table names that collide.
fn extract_all(models: &[ModelDescription]) -> Result<Vec<TableSchema>> {
    let mut schemas: Vec<TableSchema> = Vec::with_capacity(models.len());
    for model in models {
        let schema = TableSchema::extract(model)?;
        if schemas.iter().any(|s| s.name == schema.name) {
            return Err(OrmError::DuplicateTable(schema.name));
        }
        debug!(table = %schema.name, fields = schema.fields.len(), "Registered model");
        schemas.push(schema);
    }
    Ok(schemas)
}

#[cfg(test)]
mod tests {
    use coldorm_core::{Entry, FieldDeclaration, LogicalType, SchemaError, Value, Where};

    use super::*;
    use crate::statement::Fields;

    fn example() -> ModelDescription {
        ModelDescription::new("ExampleTable")
            .field(
                FieldDeclaration::new("id", LogicalType::Integer)
                    .primary_key()
                    .auto_increment(),
            )
            .field(FieldDeclaration::new("name", LogicalType::Text))
            .field(FieldDeclaration::new("value", LogicalType::Real))
    }

    fn engine(models: &[ModelDescription]) -> Engine {
        Engine::open_in_memory(EngineConfig::new("test").with_migration(true), models).unwrap()
    }

    #[test]
    fn test_table_lookup() {
        let engine = engine(&[example()]);
        assert_eq!(engine.table("ExampleTable").unwrap().name(), "ExampleTable");
        assert!(matches!(
            engine.table("exampletable"),
            Err(OrmError::TableNotFound(name)) if name == "exampletable"
        ));
    }

    #[test]
    fn test_tables_in_registration_order() {
        let other = ModelDescription::new("Alpha")
            .field(FieldDeclaration::new("x", LogicalType::Integer));
        let engine = engine(&[example(), other]);
        let names: Vec<_> = engine.tables().iter().map(Table::name).collect();
        assert_eq!(names, vec!["ExampleTable", "Alpha"]);
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let renamed = ModelDescription::new("Other")
            .with_table("ExampleTable")
            .field(FieldDeclaration::new("x", LogicalType::Integer));
        let result = Engine::open_in_memory(EngineConfig::new("test"), &[example(), renamed]);
        assert!(matches!(result, Err(OrmError::DuplicateTable(name)) if name == "ExampleTable"));
    }

    #[test]
    fn test_unsupported_type_fails_before_migration() {
        let bad = ModelDescription::new("Bad")
            .field(FieldDeclaration::with_type_name("created", "DATETIME"));
        let result = Engine::open_in_memory(
            EngineConfig::new("test").with_migration(true),
            &[example(), bad],
        );
        assert!(matches!(
            result,
            Err(OrmError::SchemaError(SchemaError::UnsupportedType { .. }))
        ));
    }

    #[test]
    fn test_without_migration_tables_are_not_created() {
        let engine = Engine::open_in_memory(EngineConfig::new("test"), &[example()]).unwrap();
        assert!(engine.list_tables().unwrap().is_empty());
        assert!(matches!(
            engine.table("ExampleTable").unwrap().get_all(&Fields::All),
            Err(OrmError::StorageError(_))
        ));
    }

    #[test]
    fn test_list_tables_hides_internal_tables() {
        let engine = engine(&[example()]);
        engine
            .table("ExampleTable")
            .unwrap()
            .add(&Entry::new().with("name", "a").with("value", 1.0))
            .unwrap();
        assert_eq!(engine.list_tables().unwrap(), vec!["ExampleTable"]);
    }

    #[test]
    fn test_commit_and_rollback_state() {
        let engine = engine(&[example()]);
        let table = engine.table("ExampleTable").unwrap();
        assert!(!engine.has_pending_writes().unwrap());

        table
            .add(&Entry::new().with("name", "kept").with("value", 1.0))
            .unwrap();
        assert!(engine.has_pending_writes().unwrap());
        engine.commit().unwrap();
        assert!(!engine.has_pending_writes().unwrap());

        table
            .add(&Entry::new().with("name", "discarded").with("value", 2.0))
            .unwrap();
        engine.rollback().unwrap();

        let names: Vec<Value> = table
            .get_all(&Fields::only(["name"]))
            .unwrap()
            .into_iter()
            .filter_map(|entry| entry.get("name").cloned())
            .collect();
        assert_eq!(names, vec![Value::from("kept")]);

        // no-ops with nothing pending
        engine.commit().unwrap();
        engine.rollback().unwrap();
    }

    #[test]
    fn test_drop_table() {
        let engine = engine(&[example()]);
        engine.drop_table("ExampleTable").unwrap();
        assert!(engine.has_pending_writes().unwrap());
        assert!(engine.list_tables().unwrap().is_empty());
        engine.commit().unwrap();
        assert!(engine.list_tables().unwrap().is_empty());
        assert!(engine.drop_table("Missing").is_err());
    }

    #[test]
    fn test_drop_table_is_undone_by_rollback() {
        let engine = engine(&[example()]);
        engine.drop_table("ExampleTable").unwrap();
        engine.rollback().unwrap();
        assert_eq!(engine.list_tables().unwrap(), vec!["ExampleTable"]);

        // same outcome with row writes already pending
        let table = engine.table("ExampleTable").unwrap();
        table
            .add(&Entry::new().with("name", "a").with("value", 1.0))
            .unwrap();
        engine.drop_table("ExampleTable").unwrap();
        engine.rollback().unwrap();
        assert_eq!(engine.list_tables().unwrap(), vec!["ExampleTable"]);
        assert_eq!(table.count(None).unwrap(), 0);
    }

    #[test]
    fn test_gateways_share_one_connection() {
        let other = ModelDescription::new("Other")
            .field(FieldDeclaration::new("id", LogicalType::Integer).primary_key())
            .field(FieldDeclaration::new("label", LogicalType::Text));
        let engine = engine(&[example(), other]);

        engine
            .table("ExampleTable")
            .unwrap()
            .add(&Entry::new().with("name", "n").with("value", 1.0))
            .unwrap();
        engine
            .table("Other")
            .unwrap()
            .add(&Entry::new().with("id", 7).with("label", "x"))
            .unwrap();
        engine.rollback().unwrap();

        assert_eq!(engine.table("ExampleTable").unwrap().count(None).unwrap(), 0);
        assert_eq!(
            engine
                .table("Other")
                .unwrap()
                .count(Some(&Where::new("id", 7)))
                .unwrap(),
            0
        );
    }
}
