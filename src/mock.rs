//! A scripted mock executor for testing record behavior without a database.
//!
//! Results are appended up front and consumed in order, one per statement;
//! every statement the core issues is recorded in a transcript so tests can
//! assert on the generated SQL.
//!
//! ```
//! use std::sync::Arc;
//! use rowguard::{ExecResult, MockExecutor};
//!
//! let mock = Arc::new(
//!     MockExecutor::new().append_exec_results([ExecResult {
//!         affected_rows: 1,
//!         last_insert_id: Some(7),
//!     }]),
//! );
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::executor::{ExecError, ExecResult, Executor, Row};
use crate::value::Value;

#[derive(Debug, Default)]
struct Inner {
    exec_results: VecDeque<Result<ExecResult, ExecError>>,
    query_results: VecDeque<Result<Vec<Row>, ExecError>>,
    transcript: Vec<String>,
    last_error: Option<String>,
}

/// Mock [`Executor`] with scripted results and a statement transcript.
#[derive(Debug, Default)]
pub struct MockExecutor {
    inner: Mutex<Inner>,
}

impl MockExecutor {
    /// An empty mock. A mock with no scripted results fails every statement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script successful outcomes for upcoming `execute` calls, in order.
    pub fn append_exec_results(self, results: impl IntoIterator<Item = ExecResult>) -> Self {
        {
            let mut inner = self.inner.lock().expect("mock poisoned");
            inner.exec_results.extend(results.into_iter().map(Ok));
        }
        self
    }

    /// Script failures for upcoming `execute` calls, in order.
    pub fn append_exec_errors(self, errors: impl IntoIterator<Item = ExecError>) -> Self {
        {
            let mut inner = self.inner.lock().expect("mock poisoned");
            inner.exec_results.extend(errors.into_iter().map(Err));
        }
        self
    }

    /// Script result sets for upcoming `query` calls, in order.
    pub fn append_query_results(self, results: impl IntoIterator<Item = Vec<Row>>) -> Self {
        {
            let mut inner = self.inner.lock().expect("mock poisoned");
            inner.query_results.extend(results.into_iter().map(Ok));
        }
        self
    }

    /// Script failures for upcoming `query` calls, in order.
    pub fn append_query_errors(self, errors: impl IntoIterator<Item = ExecError>) -> Self {
        {
            let mut inner = self.inner.lock().expect("mock poisoned");
            inner.query_results.extend(errors.into_iter().map(Err));
        }
        self
    }

    /// Every statement executed so far, in order.
    pub fn transcript(&self) -> Vec<String> {
        self.inner.lock().expect("mock poisoned").transcript.clone()
    }
}

impl Executor for MockExecutor {
    fn execute(&self, sql: &str) -> Result<ExecResult, ExecError> {
        let mut inner = self.inner.lock().expect("mock poisoned");
        inner.transcript.push(sql.to_owned());
        let result = inner.exec_results.pop_front().unwrap_or_else(|| {
            Err(ExecError::Query(format!(
                "mock executor has no scripted result for: {sql}"
            )))
        });
        inner.last_error = result.as_ref().err().map(ToString::to_string);
        result
    }

    fn query(&self, sql: &str) -> Result<Vec<Row>, ExecError> {
        let mut inner = self.inner.lock().expect("mock poisoned");
        inner.transcript.push(sql.to_owned());
        let result = inner.query_results.pop_front().unwrap_or_else(|| {
            Err(ExecError::Query(format!(
                "mock executor has no scripted result for: {sql}"
            )))
        });
        inner.last_error = result.as_ref().err().map(ToString::to_string);
        result
    }

    fn last_error(&self) -> Option<String> {
        self.inner.lock().expect("mock poisoned").last_error.clone()
    }
}

/// Build a [`Row`] projection from column/value pairs.
pub fn row<K, V, I>(columns: I) -> Row
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    columns
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
