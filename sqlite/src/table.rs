//! Table gateway: the CRUD surface for one table.
//!
//! A [`Table`] binds one [`TableSchema`] to the engine's shared storage
//! handle. Each call renders one statement, binds every value as a
//! parameter, executes it and, for reads, packs the rows into [`Entry`]
//! values keyed by the selected field names.
//!
//! Mutations are not committed here; see [`Engine::commit`](crate::Engine::commit).
//!
//! # Example
//!
//! ```
//! use coldorm_core::*;
//! use coldorm_sqlite::{Engine, EngineConfig, Fields};
//!
//! let model = ModelDescription::new("ExampleTable")
//!     .field(FieldDeclaration::new("id", LogicalType::Integer).primary_key().auto_increment())
//!     .field(FieldDeclaration::new("name", LogicalType::Text))
//!     .field(FieldDeclaration::new("value", LogicalType::Real));
//! let engine = Engine::open_in_memory(EngineConfig::new("doc").with_migration(true), &[model]).unwrap();
//! let table = engine.table("ExampleTable").unwrap();
//!
//! table.add(&Entry::new().with("name", "NAME1").with("value", 1.0)).unwrap();
//! table.add(&Entry::new().with("name", "NAME2").with("value", 2.0)).unwrap();
//!
//! let rows = table.get(&Where::new("name", "NAME2"), &Fields::only(["id", "name"])).unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].decode::<i64>("id").unwrap(), 2);
//! ```

use std::sync::Arc;

use coldorm_core::{
    Correlation, Entry, FromValue, Model, SchemaError, TableSchema, Value, Where,
};
use tracing::debug;

use crate::convert::pack_entry;
use crate::error::{OrmError, Result};
use crate::schema::create_table_sql;
use crate::statement::{self, Fields, Statement};
use crate::storage::Storage;

/// Gateway for one table, sharing the engine's connection.
pub struct Table {
    schema: TableSchema,
    storage: Arc<Storage>,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table").field("schema", &self.schema).finish()
    }
}

impl Table {
    pub(crate) fn new(schema: TableSchema, storage: Arc<Storage>) -> Self {
        Self { schema, storage }
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// Schema this gateway was registered with.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// The `CREATE TABLE` statement for this table.
    pub fn create_sql(&self) -> Result<String> {
        create_table_sql(&self.schema)
    }

    /// Returns rows matching `filter`, with the selected fields.
    ///
    /// Rows come back in storage order; nothing is sorted. Each entry's keys
    /// are the selected field names, in selection order.
    ///
    /// # Errors
    ///
    /// [`UnknownField`](crate::OrmError::UnknownField) or
    /// [`EmptySelection`](crate::OrmError::EmptySelection) for a bad
    /// selection, a schema error for a bad condition key, or any storage
    /// error.
    pub fn get(&self, filter: &Where, fields: &Fields) -> Result<Vec<Entry>> {
        self.select(Some(filter), fields)
    }

    /// Returns every row, with the selected fields.
    pub fn get_all(&self, fields: &Fields) -> Result<Vec<Entry>> {
        self.select(None, fields)
    }

    fn select(&self, filter: Option<&Where>, fields: &Fields) -> Result<Vec<Entry>> {
        let columns = statement::resolve_fields(&self.schema, fields)?;
        let statement = statement::select(&self.schema, &columns, filter)?;
        self.fetch(&statement, &columns)
    }

    fn fetch(&self, statement: &Statement, keys: &[String]) -> Result<Vec<Entry>> {
        let rows = self.storage.query(statement, keys.len())?;
        Ok(rows
            .into_iter()
            .map(|values| pack_entry(keys, values))
            .collect())
    }

    /// Counts rows, optionally restricted by `filter`.
    pub fn count(&self, filter: Option<&Where>) -> Result<usize> {
        let statement = statement::count(&self.schema, filter)?;
        count_from_rows(self.storage.query(&statement, 1)?)
    }

    /// Cross-joins this table with `other`.
    ///
    /// `filter` applies to this table's columns; `correlation` pairs a
    /// column of this table (left) with a column of `other` (right). The two
    /// are combined with `AND`. `fields` must list columns explicitly: use
    /// `table.field` or a bare name that exists in only one of the tables.
    /// Entry keys are the names exactly as requested.
    ///
    /// # Errors
    ///
    /// [`WildcardJoin`](crate::OrmError::WildcardJoin) for [`Fields::All`]
    /// or an empty list, [`AmbiguousField`](crate::OrmError::AmbiguousField)
    /// and [`UnknownField`](crate::OrmError::UnknownField) for unresolvable
    /// names, including correlation columns on the wrong side.
    pub fn cross_join(
        &self,
        other: &Table,
        filter: &Where,
        correlation: &Correlation,
        fields: &Fields,
    ) -> Result<Vec<Entry>> {
        let columns = statement::resolve_join_fields(&self.schema, &other.schema, fields)?;
        let statement =
            statement::cross_join(&self.schema, &other.schema, &columns, filter, correlation)?;
        let keys: Vec<String> = columns.into_iter().map(|c| c.key).collect();
        self.fetch(&statement, &keys)
    }

    /// Inserts one entry and returns the new row id.
    ///
    /// Absent fields are left out of the statement (auto-increment keys are
    /// assigned by the engine); [`Value::Null`] is inserted as `NULL`.
    ///
    /// # Errors
    ///
    /// [`MissingField`](crate::OrmError::MissingField) if a field that is not
    /// auto-incremented is absent, [`UnknownField`](crate::OrmError::UnknownField)
    /// for keys outside the schema, or any storage error such as a constraint
    /// violation.
    pub fn add(&self, entry: &Entry) -> Result<i64> {
        let statement = statement::insert(&self.schema, entry)?;
        let (_, row_id) = self.storage.execute(&statement)?;
        Ok(row_id)
    }

    /// Inserts entries one by one, returning their row ids.
    ///
    /// Stops at the first failure. Entries inserted before it stay pending;
    /// nothing is rolled back.
    pub fn add_all<'a, I>(&self, entries: I) -> Result<Vec<i64>>
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        let mut ids = Vec::new();
        for entry in entries {
            ids.push(self.add(entry)?);
        }
        debug!(table = %self.schema.name, count = ids.len(), "Inserted entries");
        Ok(ids)
    }

    /// Sets the entry's present fields on every row matching `filter`.
    ///
    /// Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// [`EmptyUpdate`](crate::OrmError::EmptyUpdate) if the entry has no
    /// fields, [`UnknownField`](crate::OrmError::UnknownField) for keys
    /// outside the schema, or any storage error.
    pub fn update(&self, filter: &Where, entry: &Entry) -> Result<usize> {
        let statement = statement::update(&self.schema, filter, entry)?;
        let (changed, _) = self.storage.execute(&statement)?;
        Ok(changed)
    }

    /// Deletes every row matching `filter`, returning the number removed.
    pub fn remove(&self, filter: &Where) -> Result<usize> {
        let statement = statement::delete(&self.schema, filter)?;
        let (changed, _) = self.storage.execute(&statement)?;
        Ok(changed)
    }

    /// Like [`get`](Self::get) with all fields, decoded into `M`.
    pub fn get_as<M: Model>(&self, filter: &Where) -> Result<Vec<M>> {
        decode_all(self.get(filter, &Fields::All)?)
    }

    /// Like [`get_all`](Self::get_all) with all fields, decoded into `M`.
    pub fn get_all_as<M: Model>(&self) -> Result<Vec<M>> {
        decode_all(self.get_all(&Fields::All)?)
    }

    /// Inserts a typed record and returns the new row id.
    pub fn add_model<M: Model>(&self, record: &M) -> Result<i64> {
        self.add(&record.to_entry())
    }

    /// Inserts typed records one by one; stops at the first failure.
    pub fn add_models<'a, M, I>(&self, records: I) -> Result<Vec<i64>>
    where
        M: Model + 'a,
        I: IntoIterator<Item = &'a M>,
    {
        records
            .into_iter()
            .map(|record| self.add_model(record))
            .collect()
    }
}

const COUNT_COLUMN: &str = "COUNT(*)";

/// Reads the single `COUNT(*)` cell of a count query.
fn count_from_rows(rows: Vec<Vec<Value>>) -> Result<usize> {
    let value = rows
        .into_iter()
        .next()
        .and_then(|row| row.into_iter().next())
        .ok_or(OrmError::StorageError(rusqlite::Error::QueryReturnedNoRows))?;
    let count = i64::from_value(COUNT_COLUMN, &value)?;
    usize::try_from(count).map_err(|_| {
        OrmError::from(SchemaError::Conversion {
            field: COUNT_COLUMN.to_string(),
            found: value.storage_class(),
            expected: "usize",
        })
    })
}

fn decode_all<M: Model>(entries: Vec<Entry>) -> Result<Vec<M>> {
    entries
        .iter()
        .map(|entry| M::from_entry(entry).map_err(Into::into))
        .collect()
}
