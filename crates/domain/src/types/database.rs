//! Types exchanged with the database boundary
//!
//! A [`Row`] is one materialized result row: column names in select-list
//! order, each paired with its decoded [`FieldValue`]. Rows are consumed by a
//! handler within a single collection call and never retained.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StatsError};

/// Everything needed to open a session against one database.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub connect_timeout: Option<Duration>,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Raw value of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Borrow the value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Integer view of the value.
    ///
    /// `NULL` reads as zero: statistics functions return `NULL` for objects
    /// that have never been touched (e.g. `idx_scan` on a table without
    /// indexes). Floats truncate toward zero. Text must parse as a number.
    pub fn to_i64(&self) -> Result<i64> {
        match self {
            FieldValue::Null => Ok(0),
            FieldValue::Bool(value) => Ok(i64::from(*value)),
            FieldValue::Int(value) => Ok(*value),
            FieldValue::Float(value) => Ok(value.trunc() as i64),
            FieldValue::Text(text) => {
                let trimmed = text.trim();
                trimmed
                    .parse::<i64>()
                    .or_else(|_| trimmed.parse::<f64>().map(|v| v.trunc() as i64))
                    .map_err(|_| StatsError::Query(format!("value '{text}' is not numeric")))
            }
        }
    }

    /// Floating-point view of the value, with the same `NULL` rule as
    /// [`FieldValue::to_i64`].
    pub fn to_f64(&self) -> Result<f64> {
        match self {
            FieldValue::Null => Ok(0.0),
            FieldValue::Bool(value) => Ok(if *value { 1.0 } else { 0.0 }),
            FieldValue::Int(value) => Ok(*value as f64),
            FieldValue::Float(value) => Ok(*value),
            FieldValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| StatsError::Query(format!("value '{text}' is not numeric"))),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// One result row as an ordered mapping from column name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    fields: Vec<(String, FieldValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append, mostly useful for fixtures.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push((column.into(), value.into()));
    }

    /// Value of the first column named `column`.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(name, _)| name == column).map(|(_, value)| value)
    }

    /// Like [`Row::get`], but a missing column is a query error.
    pub fn require(&self, column: &str) -> Result<&FieldValue> {
        self.get(column)
            .ok_or_else(|| StatsError::Query(format!("result row has no column '{column}'")))
    }

    /// Column names in select-list order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}
