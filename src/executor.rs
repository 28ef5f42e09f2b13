//! Database executor abstraction.
//!
//! The raw connection/transport is an external collaborator. This module
//! defines the [`Executor`] trait the record core drives, plus the
//! process-wide default executor used by the schema-free static fetch path.
//!
//! The core issues complete SQL text; an implementation backed by a driver
//! that performs parameterized binding is free to do so behind this surface.

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// A raw row projection: ordered column name to value mapping.
pub type Row = IndexMap<String, Value>;

/// Executor error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The connection is unusable.
    Connection(String),
    /// Statement execution failed.
    Query(String),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Connection(msg) => write!(f, "Connection error: {msg}"),
            ExecError::Query(msg) => write!(f, "Query error: {msg}"),
        }
    }
}

impl std::error::Error for ExecError {}

/// Outcome of a successful write statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Rows affected by the statement.
    pub affected_rows: u64,
    /// Identity generated by an INSERT, when the backend reports one.
    pub last_insert_id: Option<i64>,
}

/// Trait for executing database statements.
///
/// Implementations are shared via `Arc<dyn Executor>`; every call blocks
/// until the backend answers. There is no retry, timeout, or cancellation:
/// failures propagate immediately.
pub trait Executor: Send + Sync {
    /// Execute a write statement (INSERT, UPDATE, DELETE).
    ///
    /// # Errors
    ///
    /// Returns `ExecError` if the statement fails.
    fn execute(&self, sql: &str) -> Result<ExecResult, ExecError>;

    /// Execute a read statement and return all matching rows.
    ///
    /// # Errors
    ///
    /// Returns `ExecError` if the statement fails.
    fn query(&self, sql: &str) -> Result<Vec<Row>, ExecError>;

    /// The most recent error reported by the backend, if any.
    fn last_error(&self) -> Option<String> {
        None
    }
}

static DEFAULT_EXECUTOR: OnceCell<Arc<dyn Executor>> = OnceCell::new();

/// Register the process-wide default executor used by
/// [`Record::fetch`](crate::Record::fetch).
///
/// Returns `false` if a default was already registered; the first
/// registration wins.
pub fn set_default_executor(executor: Arc<dyn Executor>) -> bool {
    DEFAULT_EXECUTOR.set(executor).is_ok()
}

/// The registered default executor, if any.
pub fn default_executor() -> Option<Arc<dyn Executor>> {
    DEFAULT_EXECUTOR.get().cloned()
}
