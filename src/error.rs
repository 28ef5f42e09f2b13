//! Error types for record operations.
//!
//! Every failure surfaces as an explicit [`RecordError`] value; no operation
//! terminates the process. Validation errors at construction time abort
//! object creation entirely; a partially-valid record is never returned.

use crate::executor::ExecError;

/// Error type for record operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The model schema itself is invalid (empty, varchar without a length,
    /// or colliding accessor names).
    ModelConfiguration(String),
    /// One or more fields of the supplied row data violate the schema.
    /// Carries the names of every offending column.
    FieldValidation(Vec<String>),
    /// A single `update` call was rejected; the field set is unchanged.
    InvalidFieldUpdate {
        field: String,
        reason: String,
    },
    /// A dynamic accessor call could not be resolved to a column.
    InvalidAccessor(String),
    /// A database write or read failed.
    Persistence(String),
    /// A fetch found zero or more than one matching row.
    NotFound {
        table: String,
        id: i64,
    },
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::ModelConfiguration(msg) => {
                write!(f, "Model is not properly formed: {}", msg)
            }
            RecordError::FieldValidation(fields) => {
                write!(f, "Error in field configuration: {}", fields.join(", "))
            }
            RecordError::InvalidFieldUpdate { field, reason } => {
                write!(f, "Invalid update for field {}: {}", field, reason)
            }
            RecordError::InvalidAccessor(call) => {
                write!(f, "Invalid accessor call: {}", call)
            }
            RecordError::Persistence(msg) => {
                write!(f, "Persistence error: {}", msg)
            }
            RecordError::NotFound { table, id } => {
                write!(f, "No single row in {} with id {}", table, id)
            }
        }
    }
}

impl std::error::Error for RecordError {}

impl From<ExecError> for RecordError {
    fn from(err: ExecError) -> Self {
        RecordError::Persistence(err.to_string())
    }
}
