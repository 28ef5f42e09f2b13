//! The active-record core.
//!
//! A [`Record`] binds an in-memory field set to a single database row: it is
//! constructed from a caller-supplied field set validated against an explicit
//! [`Schema`], accumulates a diff of pending changes while it has a known
//! identity, and generates the single-table CRUD statements needed to persist
//! or re-read itself through an [`Executor`].
//!
//! A record is synchronous and single-owner: every operation blocks on the
//! executor, and concurrent use of one record requires external
//! serialization.

use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::RecordError;
use crate::executor::{default_executor, Executor, Row};
use crate::schema::{normalize_key, Schema};
use crate::sql;
use crate::value::Value;

/// An active-record instance bound to one row of one table.
#[derive(Clone)]
pub struct Record {
    /// Primary key value; `None` until the row has been inserted.
    id: Option<i64>,
    table: String,
    schema: Schema,
    fields: IndexMap<String, Value>,
    /// Diff of field mutations not yet persisted. Tracked only while the
    /// identity is known; fresh records mutate `fields` directly and insert
    /// the row wholesale.
    changes: IndexMap<String, Value>,
    /// Accessor table: normalized name to canonical column name, built once
    /// at construction.
    accessors: HashMap<String, String>,
    conn: Arc<dyn Executor>,
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("table", &self.table)
            .field("id", &self.id)
            .field("fields", &self.fields)
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}

impl Record {
    /// Construct a record for a not-yet-persisted row.
    ///
    /// The schema is validated first; an invalid schema aborts construction
    /// with [`RecordError::ModelConfiguration`]. Every non-nullable column
    /// must then be present in `fields` and pass field-value validation;
    /// nullable columns absent from `fields` default to [`Value::Null`].
    /// Columns not declared in the schema are dropped. All failing columns
    /// are collected into a single [`RecordError::FieldValidation`]; no
    /// partial record is ever produced.
    ///
    /// # Errors
    ///
    /// Returns `ModelConfiguration` or `FieldValidation` as above.
    pub fn new(
        table: impl Into<String>,
        schema: Schema,
        fields: Row,
        conn: Arc<dyn Executor>,
    ) -> Result<Self, RecordError> {
        Self::build(table.into(), schema, fields, conn, None)
    }

    /// Construct a record for an already-persisted row with a known identity.
    ///
    /// The identity is adopted only when it matches the `id` column of the
    /// supplied field set; a mismatched caller-supplied identity is silently
    /// discarded and the record behaves as unsaved.
    ///
    /// # Errors
    ///
    /// Same as [`Record::new`].
    pub fn with_id(
        table: impl Into<String>,
        schema: Schema,
        fields: Row,
        conn: Arc<dyn Executor>,
        id: i64,
    ) -> Result<Self, RecordError> {
        Self::build(table.into(), schema, fields, conn, Some(id))
    }

    fn build(
        table: String,
        schema: Schema,
        supplied: Row,
        conn: Arc<dyn Executor>,
        known_id: Option<i64>,
    ) -> Result<Self, RecordError> {
        schema.validate()?;

        let mut fields = IndexMap::new();
        let mut failures = Vec::new();
        for (name, def) in schema.columns() {
            match supplied.get(name) {
                Some(value) => {
                    if def.accepts(value) {
                        fields.insert(name.to_owned(), def.canonicalize(value.clone()));
                    } else {
                        failures.push(name.to_owned());
                    }
                }
                None if def.nullable => {
                    fields.insert(name.to_owned(), Value::Null);
                }
                None => failures.push(name.to_owned()),
            }
        }
        if !failures.is_empty() {
            return Err(RecordError::FieldValidation(failures));
        }

        let accessors = schema.accessible_names();
        // Cross-check the caller-supplied identity against the field set.
        let id = known_id.filter(|want| match fields.get("id") {
            Some(Value::Int(have)) => have == want,
            Some(Value::Text(have)) => have.trim().parse::<i64>().ok() == Some(*want),
            _ => false,
        });

        Ok(Self {
            id,
            table,
            schema,
            fields,
            changes: IndexMap::new(),
            accessors,
            conn,
        })
    }

    /// The record's identity, once known.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// The table this record persists to.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The schema this record was constructed against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Current value of a field, by canonical column name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Snapshot of the current field set as a raw row projection.
    pub fn as_row(&self) -> Row {
        self.fields.clone()
    }

    /// The diff of field mutations not yet persisted.
    pub fn pending_changes(&self) -> &IndexMap<String, Value> {
        &self.changes
    }

    /// Update a single field to a new value.
    ///
    /// The value is validated against the field's schema entry. On success
    /// the live field set is always written; the change is additionally
    /// recorded in the pending diff when the record already has a known
    /// identity. On failure the field set is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidFieldUpdate`] for an undeclared column
    /// or a value that fails validation.
    pub fn update(&mut self, field: &str, value: impl Into<Value>) -> Result<(), RecordError> {
        let def = self
            .schema
            .get(field)
            .ok_or_else(|| RecordError::InvalidFieldUpdate {
                field: field.to_owned(),
                reason: "column is not declared by the model".to_owned(),
            })?;
        let value = value.into();
        if !def.accepts(&value) {
            return Err(RecordError::InvalidFieldUpdate {
                field: field.to_owned(),
                reason: format!("value does not satisfy the {} constraint", def.ty.as_str()),
            });
        }
        let value = def.canonicalize(value);
        if self.id.is_some() {
            self.changes.insert(field.to_owned(), value.clone());
        }
        self.fields.insert(field.to_owned(), value);
        Ok(())
    }

    /// Apply [`Record::update`] for each entry, in the given order.
    ///
    /// Not atomic: the first failure stops iteration and is returned, but
    /// earlier successful updates remain applied.
    ///
    /// # Errors
    ///
    /// Returns the first [`RecordError::InvalidFieldUpdate`] encountered.
    pub fn extend<I, K, V>(&mut self, props: I) -> Result<(), RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (field, value) in props {
            self.update(field.as_ref(), value)?;
        }
        Ok(())
    }

    /// Persist the record and refresh it from the freshly written row.
    ///
    /// Without an identity the whole field set is inserted and the
    /// executor-reported generated identity is adopted. With an identity,
    /// only the pending changes are written; an empty diff is a safe no-op
    /// and issues no UPDATE at all. Either way the row is then re-read by
    /// identity and the field set replaced with the fresh projection, and
    /// the pending diff cleared.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Persistence`] if a statement fails or an
    /// insert reports no generated identity, and [`RecordError::NotFound`]
    /// if the re-read does not find exactly one row. The write itself may
    /// still have committed in that case.
    pub fn save(&mut self) -> Result<(), RecordError> {
        match self.id {
            None => {
                let stmt = sql::insert(&self.table, &self.fields);
                debug!("executing: {stmt}");
                let result = self.conn.execute(&stmt)?;
                let id = result.last_insert_id.ok_or_else(|| {
                    RecordError::Persistence("insert reported no generated identity".to_owned())
                })?;
                self.id = Some(id);
            }
            Some(id) => {
                if self.changes.is_empty() {
                    debug!("save on {} id {id} with an empty change set", self.table);
                } else {
                    let stmt = sql::update(&self.table, &self.changes, id);
                    debug!("executing: {stmt}");
                    self.conn.execute(&stmt)?;
                }
            }
        }
        self.refresh()
    }

    /// Re-read the row by identity and replace the in-memory field set.
    fn refresh(&mut self) -> Result<(), RecordError> {
        let id = self
            .id
            .ok_or_else(|| RecordError::Persistence("record has no identity".to_owned()))?;
        let stmt = sql::select_by_id(&self.table, id);
        debug!("executing: {stmt}");
        let mut rows = self.conn.query(&stmt)?;
        match rows.pop() {
            Some(row) if rows.is_empty() => {
                self.fields = row;
                self.changes.clear();
                Ok(())
            }
            _ => {
                warn!(
                    "re-read after write on {} id {id} did not return a single row",
                    self.table
                );
                Err(RecordError::NotFound {
                    table: self.table.clone(),
                    id,
                })
            }
        }
    }

    /// Delete the persisted row and tear the record down.
    ///
    /// Success consumes the record. On failure the untouched record is
    /// handed back to the caller alongside the error.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Persistence`] when the record has no identity
    /// or the DELETE statement fails.
    pub fn delete(self) -> Result<(), (RecordError, Record)> {
        let Some(id) = self.id else {
            return Err((
                RecordError::Persistence("record has no identity to delete".to_owned()),
                self,
            ));
        };
        let stmt = sql::delete(&self.table, id);
        debug!("executing: {stmt}");
        match self.conn.execute(&stmt) {
            Ok(_) => Ok(()),
            Err(err) => Err((err.into(), self)),
        }
    }

    /// Schema-free static fetch through the process-wide default executor.
    ///
    /// The table name is the lower-cased model name with an appended plural
    /// marker; constructed records use their table name as given. The
    /// returned projection bypasses schema validation entirely.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Persistence`] when no default executor is
    /// registered or the query fails, and [`RecordError::NotFound`] unless
    /// exactly one row matches.
    pub fn fetch(model: &str, id: i64) -> Result<Row, RecordError> {
        let conn = default_executor().ok_or_else(|| {
            RecordError::Persistence("no default executor registered".to_owned())
        })?;
        Self::fetch_with(conn.as_ref(), model, id)
    }

    /// [`Record::fetch`] against an explicit executor.
    ///
    /// # Errors
    ///
    /// Same as [`Record::fetch`], minus the missing-default case.
    pub fn fetch_with(conn: &dyn Executor, model: &str, id: i64) -> Result<Row, RecordError> {
        let table = format!("{}s", model.to_lowercase());
        let stmt = sql::select_by_id(&table, id);
        debug!("executing: {stmt}");
        let mut rows = conn.query(&stmt)?;
        match rows.pop() {
            Some(row) if rows.is_empty() => Ok(row),
            _ => Err(RecordError::NotFound { table, id }),
        }
    }

    /// Dispatch a dynamic accessor call.
    ///
    /// Calls shaped `get<Field>` or `set<Field>` (prefix case-insensitive,
    /// field matched through accessor normalization) resolve to a field
    /// read (returns `Some(value)`) or a validated field write via
    /// [`Record::update`] (returns `None`).
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidAccessor`] for an unrecognized field, a
    /// `set` call without an argument, or any other call shape. A `set`
    /// whose value fails validation surfaces the underlying
    /// [`RecordError::InvalidFieldUpdate`].
    pub fn dispatch(
        &mut self,
        call: &str,
        arg: Option<Value>,
    ) -> Result<Option<Value>, RecordError> {
        let (Some(prefix), Some(rest)) = (call.get(..3), call.get(3..)) else {
            return Err(RecordError::InvalidAccessor(call.to_owned()));
        };
        let canonical = self
            .accessors
            .get(&normalize_key(rest))
            .cloned()
            .ok_or_else(|| RecordError::InvalidAccessor(call.to_owned()))?;

        if prefix.eq_ignore_ascii_case("get") {
            Ok(self.fields.get(&canonical).cloned())
        } else if prefix.eq_ignore_ascii_case("set") {
            let value = arg.ok_or_else(|| RecordError::InvalidAccessor(call.to_owned()))?;
            self.update(&canonical, value)?;
            Ok(None)
        } else {
            Err(RecordError::InvalidAccessor(call.to_owned()))
        }
    }

    /// Read a field through the accessor table, tolerating case and
    /// underscore differences from the canonical column name.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidAccessor`] for an unrecognized name.
    pub fn accessor_get(&self, name: &str) -> Result<&Value, RecordError> {
        let canonical = self
            .accessors
            .get(&normalize_key(name))
            .ok_or_else(|| RecordError::InvalidAccessor(name.to_owned()))?;
        self.fields
            .get(canonical)
            .ok_or_else(|| RecordError::InvalidAccessor(name.to_owned()))
    }

    /// Write a field through the accessor table; the value goes through
    /// [`Record::update`] validation.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidAccessor`] for an unrecognized name, or
    /// the underlying [`RecordError::InvalidFieldUpdate`].
    pub fn accessor_set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), RecordError> {
        let canonical = self
            .accessors
            .get(&normalize_key(name))
            .cloned()
            .ok_or_else(|| RecordError::InvalidAccessor(name.to_owned()))?;
        self.update(&canonical, value)
    }
}
