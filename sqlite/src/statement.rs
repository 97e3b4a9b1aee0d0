//! Statement rendering for table gateway operations.
//!
//! Every function here turns a schema plus structured request data into a
//! [`Statement`]: SQL text with `?` placeholders and the values to bind, in
//! placeholder order. Values are always bound; only validated identifiers
//! are written into the text.
//!
//! Column lists are always taken from the schema's field order, including for
//! the wildcard selection, so the columns of a result row line up with the
//! schema no matter how the physical table was declared.

use coldorm_core::{Correlation, Entry, TableSchema, Value, Where};

use crate::error::{OrmError, Result};

/// Rendered SQL plus bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Field selection for reads.
///
/// # Examples
///
/// ```
/// use coldorm_sqlite::Fields;
///
/// let all = Fields::All;
/// let some = Fields::only(["id", "name"]);
/// assert!(all.is_all());
/// assert!(!some.is_all());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Fields {
    /// Every schema field, in schema order.
    #[default]
    All,
    /// The listed fields, in the listed order.
    Only(Vec<String>),
}

impl Fields {
    /// Selects the given field names in order.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Fields::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Fields::All)
    }
}

/// Resolves a single-table selection to column names.
///
/// The returned names are both the `SELECT` list and the keys of the packed
/// entries.
pub(crate) fn resolve_fields(schema: &TableSchema, fields: &Fields) -> Result<Vec<String>> {
    match fields {
        Fields::All => Ok(schema.column_names().map(str::to_string).collect()),
        Fields::Only(names) => {
            if names.is_empty() {
                return Err(OrmError::EmptySelection(schema.name.clone()));
            }
            for (index, name) in names.iter().enumerate() {
                ensure_field(schema, name)?;
                ensure_unique(&schema.name, &names[..index], name)?;
            }
            Ok(names.clone())
        }
    }
}

/// Columns of a join selection: the qualified SQL column and the entry key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JoinColumn {
    pub qualified: String,
    pub key: String,
}

/// Resolves a cross-join selection against both schemas.
///
/// `table.field` must name a field of that table; a bare `field` must exist
/// in exactly one of the two tables. The two tables must differ and no name
/// may repeat.
pub(crate) fn resolve_join_fields(
    left: &TableSchema,
    right: &TableSchema,
    fields: &Fields,
) -> Result<Vec<JoinColumn>> {
    if left.name == right.name {
        return Err(OrmError::SelfJoin(left.name.clone()));
    }
    let names = match fields {
        Fields::Only(names) if !names.is_empty() => names,
        _ => {
            return Err(OrmError::WildcardJoin(
                left.name.clone(),
                right.name.clone(),
            ));
        }
    };

    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            ensure_unique(&left.name, &names[..index], name)?;
            let qualified = match name.split_once('.') {
                Some((table, field)) => {
                    let schema = [left, right]
                        .into_iter()
                        .find(|s| s.name == table)
                        .ok_or_else(|| OrmError::TableNotFound(table.to_string()))?;
                    ensure_field(schema, field)?;
                    name.clone()
                }
                None => match (left.contains(name), right.contains(name)) {
                    (true, true) => return Err(OrmError::AmbiguousField(name.clone())),
                    (true, false) => format!("{}.{name}", left.name),
                    (false, true) => format!("{}.{name}", right.name),
                    (false, false) => {
                        return Err(OrmError::UnknownField {
                            table: left.name.clone(),
                            field: name.clone(),
                        });
                    }
                },
            };
            Ok(JoinColumn {
                qualified,
                key: name.clone(),
            })
        })
        .collect()
}

fn ensure_field(schema: &TableSchema, name: &str) -> Result<()> {
    if schema.contains(name) {
        Ok(())
    } else {
        Err(OrmError::UnknownField {
            table: schema.name.clone(),
            field: name.to_string(),
        })
    }
}

/// Rejects a selected name that already appears earlier in the selection.
fn ensure_unique(table: &str, earlier: &[String], name: &str) -> Result<()> {
    if earlier.iter().any(|n| n == name) {
        return Err(OrmError::DuplicateSelection {
            table: table.to_string(),
            field: name.to_string(),
        });
    }
    Ok(())
}

/// Rejects entry keys that are not schema fields.
fn ensure_entry_fields(schema: &TableSchema, entry: &Entry) -> Result<()> {
    for key in entry.keys() {
        ensure_field(schema, key)?;
    }
    Ok(())
}

/// `SELECT <cols> FROM <table> [WHERE <predicate>]`
pub(crate) fn select(
    schema: &TableSchema,
    columns: &[String],
    filter: Option<&Where>,
) -> Result<Statement> {
    let mut sql = format!("SELECT {} FROM {}", columns.join(", "), schema.name);
    let mut params = Vec::new();
    if let Some(filter) = filter {
        let predicate = filter.render()?;
        sql.push_str(" WHERE ");
        sql.push_str(&predicate.sql);
        params = predicate.params;
    }
    Ok(Statement { sql, params })
}

/// `SELECT COUNT(*) FROM <table> [WHERE <predicate>]`
pub(crate) fn count(schema: &TableSchema, filter: Option<&Where>) -> Result<Statement> {
    select(schema, &["COUNT(*)".to_string()], filter)
}

/// `SELECT <cols> FROM <left> CROSS JOIN <right> WHERE (<predicate>) AND (<correlation>)`
///
/// Filter keys are qualified with the left table. Both halves are
/// parenthesized so an `OR` inside either one cannot absorb the other.
pub(crate) fn cross_join(
    left: &TableSchema,
    right: &TableSchema,
    columns: &[JoinColumn],
    filter: &Where,
    correlation: &Correlation,
) -> Result<Statement> {
    for condition in filter.conditions() {
        ensure_field(left, &condition.key)?;
    }
    for pair in correlation.pairs() {
        ensure_field(left, &pair.left)?;
        ensure_field(right, &pair.right)?;
    }

    let predicate = filter.render_qualified(&left.name)?;
    let correlation = correlation.render(&left.name, &right.name)?;
    let select_list = columns
        .iter()
        .map(|c| c.qualified.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(Statement {
        sql: format!(
            "SELECT {select_list} FROM {} CROSS JOIN {} WHERE ({}) AND ({correlation})",
            left.name, right.name, predicate.sql
        ),
        params: predicate.params,
    })
}

/// `INSERT INTO <table> (<cols>) VALUES (?, ...)`
///
/// Walks the schema in order and keeps every field present in the entry.
/// Absent fields are skipped, which is how auto-increment keys are left to
/// the engine; every other field must be present (an explicit null counts).
pub(crate) fn insert(schema: &TableSchema, entry: &Entry) -> Result<Statement> {
    ensure_entry_fields(schema, entry)?;

    let mut columns = Vec::with_capacity(schema.fields.len());
    let mut params = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match entry.get(&field.name) {
            Some(value) => {
                columns.push(field.name.as_str());
                params.push(value.clone());
            }
            None if field.auto_increment => {}
            None => {
                return Err(OrmError::MissingField {
                    table: schema.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
    }

    let sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", schema.name)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema.name,
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        )
    };
    Ok(Statement { sql, params })
}

/// `UPDATE <table> SET <col> = ?, ... WHERE <predicate>`
///
/// Only fields present in the entry are set, in schema order. Parameters are
/// the set values followed by the predicate values.
pub(crate) fn update(schema: &TableSchema, filter: &Where, entry: &Entry) -> Result<Statement> {
    ensure_entry_fields(schema, entry)?;

    let mut assignments = Vec::new();
    let mut params = Vec::new();
    for field in &schema.fields {
        if let Some(value) = entry.get(&field.name) {
            assignments.push(format!("{} = ?", field.name));
            params.push(value.clone());
        }
    }
    if assignments.is_empty() {
        return Err(OrmError::EmptyUpdate(schema.name.clone()));
    }

    let predicate = filter.render()?;
    params.extend(predicate.params);
    Ok(Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE {}",
            schema.name,
            assignments.join(", "),
            predicate.sql
        ),
        params,
    })
}

/// `DELETE FROM <table> WHERE <predicate>`
pub(crate) fn delete(schema: &TableSchema, filter: &Where) -> Result<Statement> {
    let predicate = filter.render()?;
    Ok(Statement {
        sql: format!("DELETE FROM {} WHERE {}", schema.name, predicate.sql),
        params: predicate.params,
    })
}
