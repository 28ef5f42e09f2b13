//! Model schema: declared column names, types, and constraints.
//!
//! A [`Schema`] is an explicit, ordered value passed into record
//! construction; record "shape" is fully decoupled from any Rust type.
//! Schemas carry
//! `serde` derives so a model declaration can be written as data:
//!
//! ```
//! use rowguard::{ColumnDef, Schema};
//!
//! let schema = Schema::new()
//!     .column("name", ColumnDef::varchar(10))
//!     .column("age", ColumnDef::int().nullable());
//! assert!(schema.validate().is_ok());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::RecordError;
use crate::value::Value;

/// The declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Varchar,
    Text,
    Int,
    Timestamp,
}

impl ColumnType {
    /// The lowercase SQL-ish name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Varchar => "varchar",
            ColumnType::Text => "text",
            ColumnType::Int => "int",
            ColumnType::Timestamp => "timestamp",
        }
    }

    /// String-like types carry quoted values in generated SQL.
    pub fn is_string_like(self) -> bool {
        matches!(self, ColumnType::Varchar | ColumnType::Text)
    }
}

/// Constraint descriptor for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    #[serde(rename = "type")]
    pub ty: ColumnType,
    /// Maximum character length; required for varchar columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Whether the column may hold the NULL marker and be absent at
    /// construction.
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnDef {
    /// A bare column of the given type, non-nullable, without a length.
    pub fn new(ty: ColumnType) -> Self {
        Self {
            ty,
            length: None,
            nullable: false,
        }
    }

    /// A varchar column with the given maximum length.
    pub fn varchar(length: u32) -> Self {
        Self {
            length: Some(length),
            ..Self::new(ColumnType::Varchar)
        }
    }

    /// An unbounded text column.
    pub fn text() -> Self {
        Self::new(ColumnType::Text)
    }

    /// An integer column.
    pub fn int() -> Self {
        Self::new(ColumnType::Int)
    }

    /// A timestamp column.
    pub fn timestamp() -> Self {
        Self::new(ColumnType::Timestamp)
    }

    /// Mark the column nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Field-value validation: does `value` conform to this constraint?
    ///
    /// - NULL is accepted iff the column is nullable.
    /// - `varchar`: character count must not exceed the declared length.
    /// - `text`, `timestamp`: always valid (intentionally permissive).
    /// - `int`: the value must be an integer or a numeric string.
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.nullable;
        }
        match self.ty {
            ColumnType::Varchar => match self.length {
                Some(max) => value.char_len() <= max as usize,
                // Unreachable past Schema::validate; reject to be safe.
                None => false,
            },
            ColumnType::Text | ColumnType::Timestamp => true,
            ColumnType::Int => value.is_numeric(),
        }
    }

    /// Canonical stored form of an accepted value.
    ///
    /// Numeric strings destined for an `int` column are stored as integers so
    /// generated SQL renders them unquoted. Everything else passes through.
    pub fn canonicalize(&self, value: Value) -> Value {
        if self.ty == ColumnType::Int {
            if let Value::Text(s) = &value {
                if let Ok(i) = s.trim().parse::<i64>() {
                    return Value::Int(i);
                }
            }
        }
        value
    }
}

/// Accessor normalization: lower-cased with underscores stripped.
///
/// Both `getUserName` and `get_user_name` resolve a column declared as
/// `user_name`.
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// An ordered mapping from column name to constraint descriptor.
///
/// Declaration order is preserved and drives both construction-time
/// validation order and generated INSERT column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: IndexMap<String, ColumnDef>,
}

impl Schema {
    /// An empty schema. An empty schema never validates; add columns with
    /// [`Schema::column`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a column, preserving declaration order. Redeclaring a name
    /// replaces the earlier descriptor.
    pub fn column(mut self, name: impl Into<String>, def: ColumnDef) -> Self {
        self.columns.insert(name.into(), def);
        self
    }

    /// Look up a column's constraint descriptor.
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.get(name)
    }

    /// Iterate columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnDef)> {
        self.columns.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Number of declared columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema declares no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Check the schema's own shape. Pure predicate, no side effects.
    ///
    /// Fails with [`RecordError::ModelConfiguration`] if the schema is empty,
    /// a varchar column is missing its length, or two column names collide
    /// under accessor normalization (such schemas are rejected outright
    /// rather than given a precedence rule).
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.columns.is_empty() {
            return Err(RecordError::ModelConfiguration(
                "model declares no columns".to_owned(),
            ));
        }
        let mut seen: HashMap<String, &str> = HashMap::new();
        for (name, def) in &self.columns {
            if def.ty == ColumnType::Varchar && def.length.is_none() {
                return Err(RecordError::ModelConfiguration(format!(
                    "varchar column {} is missing a length",
                    name
                )));
            }
            if let Some(earlier) = seen.insert(normalize_key(name), name.as_str()) {
                return Err(RecordError::ModelConfiguration(format!(
                    "columns {} and {} collide under accessor normalization",
                    earlier, name
                )));
            }
        }
        Ok(())
    }

    /// Build the accessible-name map: normalized name to canonical column
    /// name. Uniqueness is guaranteed by [`Schema::validate`].
    pub fn accessible_names(&self) -> HashMap<String, String> {
        self.columns
            .keys()
            .map(|name| (normalize_key(name), name.clone()))
            .collect()
    }
}
