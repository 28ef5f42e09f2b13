//! End-to-end record scenarios against the scripted mock executor.

use std::sync::Arc;

use rowguard::mock::row;
use rowguard::{
    set_default_executor, ColumnDef, ExecError, ExecResult, MockExecutor, Record, RecordError,
    Schema, Value,
};

fn user_schema() -> Schema {
    Schema::new()
        .column("id", ColumnDef::int().nullable())
        .column("name", ColumnDef::varchar(10))
        .column("age", ColumnDef::int().nullable())
}

fn inserted(id: i64) -> ExecResult {
    ExecResult {
        affected_rows: 1,
        last_insert_id: Some(id),
    }
}

fn updated() -> ExecResult {
    ExecResult {
        affected_rows: 1,
        last_insert_id: None,
    }
}

#[test]
fn insert_adopts_generated_identity_and_refreshes() {
    let mock = Arc::new(
        MockExecutor::new()
            .append_exec_results([inserted(7)])
            .append_query_results([vec![row([
                ("id", Value::Int(7)),
                ("name", Value::from("Ada")),
                ("age", Value::Null),
            ])]]),
    );

    let mut user = Record::new("user", user_schema(), row([("name", "Ada")]), mock.clone()).unwrap();
    assert_eq!(user.id(), None);

    user.save().unwrap();

    assert_eq!(user.id(), Some(7));
    assert_eq!(user.get("id"), Some(&Value::Int(7)));
    assert_eq!(
        mock.transcript(),
        vec![
            r#"INSERT INTO "user" ("id", "name", "age") VALUES (NULL, 'Ada', NULL)"#,
            r#"SELECT * FROM "user" WHERE "id" = 7"#,
        ]
    );
}

#[test]
fn insert_without_generated_identity_is_a_persistence_error() {
    let mock = Arc::new(MockExecutor::new().append_exec_results([updated()]));
    let mut user = Record::new("user", user_schema(), row([("name", "Ada")]), mock).unwrap();

    let err = user.save().unwrap_err();
    assert!(matches!(err, RecordError::Persistence(_)));
    assert_eq!(user.id(), None);
}

#[test]
fn update_statement_contains_exactly_the_changed_columns() {
    let mock = Arc::new(
        MockExecutor::new()
            .append_exec_results([updated()])
            .append_query_results([vec![row([
                ("id", Value::Int(7)),
                ("name", Value::from("Grace")),
                ("age", Value::Int(31)),
            ])]]),
    );

    let fields = row([("id", Value::Int(7)), ("name", Value::from("Ada"))]);
    let mut user = Record::with_id("user", user_schema(), fields, mock.clone(), 7).unwrap();

    user.update("name", "Grace").unwrap();
    user.update("age", 31).unwrap();
    user.save().unwrap();

    assert_eq!(
        mock.transcript()[0],
        r#"UPDATE "user" SET "name" = 'Grace', "age" = 31 WHERE "id" = 7"#
    );
    assert!(user.pending_changes().is_empty());
    assert_eq!(user.get("name"), Some(&Value::from("Grace")));
}

#[test]
fn save_with_empty_diff_skips_the_update_statement() {
    let mock = Arc::new(MockExecutor::new().append_query_results([vec![row([
        ("id", Value::Int(7)),
        ("name", Value::from("Ada")),
        ("age", Value::Null),
    ])]]));

    let fields = row([("id", Value::Int(7)), ("name", Value::from("Ada"))]);
    let mut user = Record::with_id("user", user_schema(), fields, mock.clone(), 7).unwrap();

    user.save().unwrap();

    // Only the re-read hits the executor.
    assert_eq!(
        mock.transcript(),
        vec![r#"SELECT * FROM "user" WHERE "id" = 7"#]
    );
}

#[test]
fn failed_reread_after_write_reports_not_found() {
    let mock = Arc::new(
        MockExecutor::new()
            .append_exec_results([inserted(9)])
            .append_query_results([Vec::new()]),
    );

    let mut user = Record::new("user", user_schema(), row([("name", "Ada")]), mock).unwrap();
    let err = user.save().unwrap_err();
    assert_eq!(
        err,
        RecordError::NotFound {
            table: "user".into(),
            id: 9
        }
    );
    // The write itself committed; the adopted identity stays.
    assert_eq!(user.id(), Some(9));
}

#[test]
fn delete_issues_where_id_and_consumes_the_record() {
    let mock = Arc::new(MockExecutor::new().append_exec_results([updated()]));

    let fields = row([("id", Value::Int(7)), ("name", Value::from("Ada"))]);
    let user = Record::with_id("user", user_schema(), fields, mock.clone(), 7).unwrap();

    user.delete().unwrap();
    assert_eq!(
        mock.transcript(),
        vec![r#"DELETE FROM "user" WHERE "id" = 7"#]
    );
}

#[test]
fn failed_delete_hands_the_record_back_unchanged() {
    let mock = Arc::new(
        MockExecutor::new().append_exec_errors([ExecError::Query("deadlock".into())]),
    );

    let fields = row([("id", Value::Int(7)), ("name", Value::from("Ada"))]);
    let user = Record::with_id("user", user_schema(), fields, mock, 7).unwrap();

    let (err, user) = user.delete().unwrap_err();
    assert!(matches!(err, RecordError::Persistence(ref msg) if msg.contains("deadlock")));
    assert_eq!(user.id(), Some(7));
    assert_eq!(user.get("name"), Some(&Value::from("Ada")));
}

#[test]
fn round_trip_preserves_the_field_set() {
    // Construct with F, save, fetch by the resulting identity: the fetched
    // projection equals F modulo the NULL default for the absent nullable
    // column.
    let stored = row([
        ("id", Value::Int(3)),
        ("name", Value::from("Ada")),
        ("age", Value::Null),
    ]);
    let mock = Arc::new(
        MockExecutor::new()
            .append_exec_results([inserted(3)])
            .append_query_results([vec![stored.clone()], vec![stored.clone()]]),
    );

    let mut user = Record::new("user", user_schema(), row([("name", "Ada")]), mock.clone()).unwrap();
    user.save().unwrap();

    let fetched = Record::fetch_with(mock.as_ref(), "user", user.id().unwrap()).unwrap();
    assert_eq!(fetched, stored);
    assert_eq!(fetched, user.as_row());
}

#[test]
fn static_fetch_pluralizes_the_model_name() {
    let mock = MockExecutor::new().append_query_results([vec![row([("id", Value::Int(3))])]]);

    let projection = Record::fetch_with(&mock, "User", 3).unwrap();
    assert_eq!(projection.get("id"), Some(&Value::Int(3)));
    assert_eq!(
        mock.transcript(),
        vec![r#"SELECT * FROM "users" WHERE "id" = 3"#]
    );
}

#[test]
fn static_fetch_rejects_zero_or_many_rows() {
    let mock = MockExecutor::new().append_query_results([
        Vec::new(),
        vec![row([("id", Value::Int(3))]), row([("id", Value::Int(3))])],
    ]);

    let err = Record::fetch_with(&mock, "user", 3).unwrap_err();
    assert!(matches!(err, RecordError::NotFound { .. }));
    let err = Record::fetch_with(&mock, "user", 3).unwrap_err();
    assert!(matches!(err, RecordError::NotFound { .. }));
}

#[test]
fn static_fetch_through_the_default_executor() {
    let mock = Arc::new(
        MockExecutor::new().append_query_results([vec![row([("id", Value::Int(5))])]]),
    );
    assert!(set_default_executor(mock.clone()));

    let projection = Record::fetch("user", 5).unwrap();
    assert_eq!(projection.get("id"), Some(&Value::Int(5)));
}

#[test]
fn worked_example_scenario() {
    // schema {name: varchar(10) not null, age: int nullable}
    let schema = Schema::new()
        .column("name", ColumnDef::varchar(10))
        .column("age", ColumnDef::int().nullable());
    let conn = Arc::new(MockExecutor::new());

    let mut record = Record::new("person", schema, row([("name", "Ada")]), conn).unwrap();
    assert_eq!(record.get("age"), Some(&Value::Null));

    record.update("age", 30).unwrap();
    assert_eq!(record.get("age"), Some(&Value::Int(30)));

    let err = record.update("name", "ExceedsTenChars!!").unwrap_err();
    assert!(matches!(err, RecordError::InvalidFieldUpdate { ref field, .. } if field == "name"));
    assert_eq!(record.get("name"), Some(&Value::from("Ada")));
}

#[test]
fn accessor_dispatch_tolerates_case_and_underscores() {
    let schema = Schema::new()
        .column("first_name", ColumnDef::varchar(10))
        .column("age", ColumnDef::int().nullable());
    let conn = Arc::new(MockExecutor::new());
    let mut record = Record::new("person", schema, row([("first_name", "Ada")]), conn).unwrap();

    assert_eq!(
        record.dispatch("getFirstName", None).unwrap(),
        Some(Value::from("Ada"))
    );
    assert_eq!(
        record.dispatch("GET_FIRST_NAME", None).unwrap(),
        Some(Value::from("Ada"))
    );

    record
        .dispatch("setfirstname", Some(Value::from("Grace")))
        .unwrap();
    assert_eq!(record.get("first_name"), Some(&Value::from("Grace")));

    let err = record.dispatch("getNickname", None).unwrap_err();
    assert!(matches!(err, RecordError::InvalidAccessor(_)));
}
