//! # Rowguard
//!
//! A minimal active-record micro-ORM core. One generic [`Record`] type binds
//! an in-memory field set to a single database row: construction validates
//! the field set against an explicit [`Schema`], mutation goes through
//! validated updates with diff tracking, and persistence generates the
//! single-table CRUD statements executed through an [`Executor`]
//! collaborator.
//!
//! Connection pooling, transactions, migrations, joins, and query building
//! beyond single-table CRUD are out of scope; the database transport itself
//! is an external collaborator behind the [`Executor`] trait.
//!
//! ```
//! use std::sync::Arc;
//! use rowguard::{ColumnDef, MockExecutor, Record, Schema, Value};
//!
//! let schema = Schema::new()
//!     .column("name", ColumnDef::varchar(10))
//!     .column("age", ColumnDef::int().nullable());
//!
//! let conn = Arc::new(MockExecutor::new());
//! let mut user = Record::new(
//!     "user",
//!     schema,
//!     rowguard::mock::row([("name", "Ada")]),
//!     conn,
//! )?;
//!
//! assert_eq!(user.get("age"), Some(&Value::Null));
//! user.update("age", 30)?;
//! assert!(user.update("name", "ExceedsTenChars!!").is_err());
//! # Ok::<(), rowguard::RecordError>(())
//! ```

pub mod error;
pub mod executor;
pub mod mock;
pub mod record;
pub mod schema;
pub mod sql;
pub mod value;

pub use error::RecordError;
pub use executor::{default_executor, set_default_executor, ExecError, ExecResult, Executor, Row};
pub use mock::MockExecutor;
pub use record::Record;
pub use schema::{ColumnDef, ColumnType, Schema};
pub use value::Value;
