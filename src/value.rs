//! Dynamically-typed scalar values carried by a record's field set.
//!
//! A row cell is one of three things: a piece of text, a 64-bit integer, or
//! the explicit NULL marker used for absent nullable columns. The `Null`
//! variant is a real value, not `Option::None`, so a constructed record
//! always has an entry for every declared column.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field value.
///
/// Conversions from `&str`, `String`, `i32`, and `i64` are provided so call
/// sites can pass literals directly to [`Record::update`](crate::Record::update)
/// and friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A 64-bit integer.
    Int(i64),
    /// A text value (also used for varchar and timestamp columns).
    Text(String),
    /// The absence marker.
    Null,
}

impl Value {
    /// Returns `true` if this is the NULL marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text payload, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns `true` if the value is an integer or a numeric string.
    ///
    /// Numeric strings are accepted wherever an `int` column expects a value;
    /// they are canonicalized to [`Value::Int`] before being stored.
    pub fn is_numeric(&self) -> bool {
        match self {
            Value::Int(_) => true,
            Value::Text(s) => s.trim().parse::<i64>().is_ok(),
            Value::Null => false,
        }
    }

    /// Character length of the rendered value, as counted by varchar limits.
    ///
    /// Integers are measured by their decimal representation; NULL measures
    /// zero.
    pub fn char_len(&self) -> usize {
        match self {
            Value::Int(i) => i.to_string().chars().count(),
            Value::Text(s) => s.chars().count(),
            Value::Null => 0,
        }
    }

    /// Convert to the SQL builder's value type for statement generation.
    pub(crate) fn to_sql(&self) -> sea_query::Value {
        match self {
            Value::Int(i) => sea_query::Value::BigInt(Some(*i)),
            Value::Text(s) => sea_query::Value::String(Some(s.clone())),
            Value::Null => sea_query::Value::String(None),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
