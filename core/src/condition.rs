//! Condition chains and join correlations.
//!
//! A [`Where`] is a flat, ordered chain of `key = value` comparisons joined by
//! `AND`/`OR`. It renders to a [`Predicate`]: statement text with one `?`
//! placeholder per comparison plus the values to bind, in placeholder order.
//! Values never appear in the statement text.
//!
//! Chains have no grouping. They are evaluated exactly as the flat boolean
//! expression they render to, so `a OR b AND c` means `a OR (b AND c)`.
//!
//! A [`Correlation`] compares columns of two tables instead of a column and a
//! value; it is only used by cross joins and renders without placeholders.
//!
//! # Examples
//!
//! ```
//! use coldorm_core::{Value, Where};
//!
//! let filter = Where::new("name", "NAME1").or("name", "NAME3");
//! let predicate = filter.render().unwrap();
//! assert_eq!(predicate.sql, "name = ? OR name = ?");
//! assert_eq!(
//!     predicate.params,
//!     vec![Value::Text("NAME1".into()), Value::Text("NAME3".into())]
//! );
//! ```

use crate::error::{Result, SchemaError};
use crate::extract::validate_identifier;
use crate::value::Value;

/// Logical connector placed before a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// First condition of a chain.
    None,
    And,
    Or,
}

impl Connector {
    /// Returns the SQL keyword, or `None` for the leading condition.
    pub fn as_sql(self) -> Option<&'static str> {
        match self {
            Connector::None => None,
            Connector::And => Some("AND"),
            Connector::Or => Some("OR"),
        }
    }
}

/// One `key = value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub key: String,
    pub value: Value,
    pub connector: Connector,
}

/// Rendered predicate text plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Predicate text with `?` placeholders.
    pub sql: String,
    /// Values for the placeholders, in order.
    pub params: Vec<Value>,
}

/// Ordered condition chain.
///
/// `and`/`or` consume and return the builder, so a chain is one value
/// threaded through the calls rather than a series of copies.
#[derive(Debug, Clone, PartialEq)]
pub struct Where {
    conditions: Vec<Condition>,
}

impl Where {
    /// Seeds a chain with a single comparison.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            conditions: vec![Condition {
                key: key.into(),
                value: value.into(),
                connector: Connector::None,
            }],
        }
    }

    /// Builds an `AND` chain from parallel key and value lists.
    ///
    /// # Errors
    ///
    /// [`SchemaError::ConditionArity`] if the lists differ in length or are
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use coldorm_core::{SchemaError, Value, Where};
    ///
    /// let filter = Where::from_pairs(&["name", "value"], vec![Value::from("a"), Value::from(1.0)]).unwrap();
    /// assert_eq!(filter.render().unwrap().sql, "name = ? AND value = ?");
    ///
    /// let err = Where::from_pairs(&["name"], vec![]).unwrap_err();
    /// assert_eq!(err, SchemaError::ConditionArity { keys: 1, values: 0 });
    /// ```
    pub fn from_pairs<K: AsRef<str>>(keys: &[K], values: Vec<Value>) -> Result<Self> {
        if keys.len() != values.len() || keys.is_empty() {
            return Err(SchemaError::ConditionArity {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let mut pairs = keys.iter().map(|k| k.as_ref()).zip(values);
        let Some((key, value)) = pairs.next() else {
            return Err(SchemaError::ConditionArity { keys: 0, values: 0 });
        };
        Ok(pairs.fold(Where::new(key, value), |chain, (key, value)| {
            chain.and(key, value)
        }))
    }

    /// Appends `AND key = value`.
    pub fn and(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(Connector::And, key.into(), value.into())
    }

    /// Appends `OR key = value`.
    pub fn or(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(Connector::Or, key.into(), value.into())
    }

    fn push(mut self, connector: Connector, key: String, value: Value) -> Self {
        self.conditions.push(Condition {
            key,
            value,
            connector,
        });
        self
    }

    /// Conditions in evaluation order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Renders the chain with bare column names.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidIdentifier`] if a key is not a plain identifier.
    pub fn render(&self) -> Result<Predicate> {
        self.render_with(None)
    }

    /// Renders the chain with every key qualified as `table.key`.
    pub fn render_qualified(&self, table: &str) -> Result<Predicate> {
        validate_identifier(table)?;
        self.render_with(Some(table))
    }

    fn render_with(&self, table: Option<&str>) -> Result<Predicate> {
        let mut sql = String::new();
        let mut params = Vec::with_capacity(self.conditions.len());

        for condition in &self.conditions {
            validate_identifier(&condition.key)?;
            if let Some(keyword) = condition.connector.as_sql() {
                sql.push(' ');
                sql.push_str(keyword);
                sql.push(' ');
            }
            if let Some(table) = table {
                sql.push_str(table);
                sql.push('.');
            }
            sql.push_str(&condition.key);
            sql.push_str(" = ?");
            params.push(condition.value.clone());
        }

        Ok(Predicate { sql, params })
    }
}

/// One column-to-column comparison of a correlation.
///
/// `left` always names a column of the table the join is issued from and
/// `right` a column of the other table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPair {
    pub left: String,
    pub right: String,
    pub connector: Connector,
}

/// Column-to-column predicate used to correlate two tables in a join.
///
/// # Examples
///
/// ```
/// use coldorm_core::Correlation;
///
/// let correlation = Correlation::new("id", "owner_id");
/// assert_eq!(
///     correlation.render("Users", "Pets").unwrap(),
///     "Users.id = Pets.owner_id"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pairs: Vec<ColumnPair>,
}

impl Correlation {
    /// Correlates `left` on this table with `right` on the other table.
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            pairs: vec![ColumnPair {
                left: left.into(),
                right: right.into(),
                connector: Connector::None,
            }],
        }
    }

    /// Builds an `AND` correlation from parallel column lists.
    ///
    /// # Errors
    ///
    /// [`SchemaError::ConditionArity`] if the lists differ in length or are
    /// empty.
    pub fn from_lists<L: AsRef<str>, R: AsRef<str>>(left: &[L], right: &[R]) -> Result<Self> {
        if left.len() != right.len() || left.is_empty() {
            return Err(SchemaError::ConditionArity {
                keys: left.len(),
                values: right.len(),
            });
        }

        let pairs = left
            .iter()
            .zip(right)
            .enumerate()
            .map(|(i, (l, r))| ColumnPair {
                left: l.as_ref().to_string(),
                right: r.as_ref().to_string(),
                connector: if i == 0 {
                    Connector::None
                } else {
                    Connector::And
                },
            })
            .collect();
        Ok(Self { pairs })
    }

    /// Appends `AND left = right`.
    pub fn and(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.pairs.push(ColumnPair {
            left: left.into(),
            right: right.into(),
            connector: Connector::And,
        });
        self
    }

    /// Appends `OR left = right`.
    pub fn or(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.pairs.push(ColumnPair {
            left: left.into(),
            right: right.into(),
            connector: Connector::Or,
        });
        self
    }

    pub fn pairs(&self) -> &[ColumnPair] {
        &self.pairs
    }

    /// Renders `left_table.left = right_table.right ...`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidIdentifier`] for any bad table or column name.
    pub fn render(&self, left_table: &str, right_table: &str) -> Result<String> {
        validate_identifier(left_table)?;
        validate_identifier(right_table)?;

        let mut sql = String::new();
        for pair in &self.pairs {
            validate_identifier(&pair.left)?;
            validate_identifier(&pair.right)?;
            if let Some(keyword) = pair.connector.as_sql() {
                sql.push(' ');
                sql.push_str(keyword);
                sql.push(' ');
            }
            sql.push_str(&format!(
                "{left_table}.{} = {right_table}.{}",
                pair.left, pair.right
            ));
        }
        Ok(sql)
    }
}
