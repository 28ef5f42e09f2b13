//! Single-table CRUD statement generation.
//!
//! Statements are built with `sea-query` and rendered to complete SQL text
//! with values inlined by the builder. Each value's type decides its
//! rendering: text comes out quoted and escaped, integers come out bare,
//! NULL markers render as `NULL`.

use sea_query::{Asterisk, Expr, ExprTrait, Iden, PostgresQueryBuilder, Query};

use crate::value::Value;

/// Runtime table or column identifier.
struct Name(String);

impl Iden for Name {
    fn unquoted(&self) -> &str {
        &self.0
    }
}

/// `INSERT INTO <table> (<columns>) VALUES (<values>)` over a whole field
/// set, in field order.
pub fn insert<'a, I>(table: &str, fields: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    let mut columns = Vec::new();
    let mut values = Vec::new();
    for (name, value) in fields {
        columns.push(Name(name.clone()));
        values.push(Expr::value(value.to_sql()));
    }

    let mut query = Query::insert();
    query.into_table(Name(table.to_owned()));
    query.columns(columns);
    query.values_panic(values);
    query.to_string(PostgresQueryBuilder)
}

/// `UPDATE <table> SET <changes> WHERE id = <id>` over the pending change
/// set only, in change order.
pub fn update<'a, I>(table: &str, changes: I, id: i64) -> String
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    let mut query = Query::update();
    query.table(Name(table.to_owned()));
    for (name, value) in changes {
        query.value(Name(name.clone()), value.to_sql());
    }
    query.and_where(Expr::col(Name("id".to_owned())).eq(id));
    query.to_string(PostgresQueryBuilder)
}

/// `DELETE FROM <table> WHERE id = <id>`.
pub fn delete(table: &str, id: i64) -> String {
    let mut query = Query::delete();
    query.from_table(Name(table.to_owned()));
    query.and_where(Expr::col(Name("id".to_owned())).eq(id));
    query.to_string(PostgresQueryBuilder)
}

/// `SELECT * FROM <table> WHERE id = <id>`.
pub fn select_by_id(table: &str, id: i64) -> String {
    let mut query = Query::select();
    query.column(Asterisk);
    query.from(Name(table.to_owned()));
    query.and_where(Expr::col(Name("id".to_owned())).eq(id));
    query.to_string(PostgresQueryBuilder)
}
