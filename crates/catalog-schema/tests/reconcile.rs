//! Reconciliation scenarios against an in-memory column set.

use std::cell::RefCell;
use std::collections::HashSet;
use std::io::Write;

use catalog_schema::prelude::*;

/// A fake store: a column set plus a log of issued statements.
struct FakeTable {
    columns: RefCell<HashSet<String>>,
    issued: RefCell<Vec<String>>,
    reject: Option<&'static str>,
}

impl FakeTable {
    fn new(columns: &[&str]) -> Self {
        Self {
            columns: RefCell::new(columns.iter().map(|c| (*c).to_string()).collect()),
            issued: RefCell::new(Vec::new()),
            reject: None,
        }
    }

    fn rejecting(mut self, column: &'static str) -> Self {
        self.reject = Some(column);
        self
    }

    fn reconcile(&self, table: &str, expected: &[ColumnSpec]) -> Result<SchemaDiff> {
        reconcile(
            table,
            expected,
            &SqliteDialect::new(),
            || Ok::<_, String>(self.columns.borrow().clone()),
            |stmt| {
                self.issued.borrow_mut().push(stmt.sql.clone());
                if self.reject == Some(stmt.column.as_str()) {
                    return Err(format!("cannot add column {}", stmt.column));
                }
                self.columns.borrow_mut().insert(stmt.column.clone());
                Ok(())
            },
        )
    }
}

#[test]
fn adds_missing_column() {
    let table = FakeTable::new(&["id", "name"]);
    let expected = [ColumnSpec::new("avatar_url", SqlType::Text)];

    let diff = table.reconcile("users", &expected).unwrap();

    assert_eq!(
        *table.issued.borrow(),
        ["ALTER TABLE \"users\" ADD COLUMN \"avatar_url\" TEXT"]
    );
    assert_eq!(diff.applied().collect::<Vec<_>>(), ["avatar_url"]);
    assert!(diff.is_complete());
}

#[test]
fn second_run_is_a_noop() {
    let table = FakeTable::new(&["id", "name"]);
    let expected = [
        ColumnSpec::new("avatar_url", SqlType::Text),
        ColumnSpec::new("bio", SqlType::Text),
    ];

    table.reconcile("users", &expected).unwrap();
    let issued_after_first = table.issued.borrow().len();
    let diff = table.reconcile("users", &expected).unwrap();

    assert_eq!(table.issued.borrow().len(), issued_after_first);
    assert!(diff.is_noop());
    assert_eq!(diff.skipped().collect::<Vec<_>>(), ["avatar_url", "bio"]);
}

#[test]
fn existing_columns_are_never_touched() {
    let table = FakeTable::new(&["id", "Email"]);
    let expected = [
        ColumnSpec::new("email", SqlType::Varchar(255)).not_null(),
        ColumnSpec::new("id", SqlType::BigInt),
    ];

    let diff = table.reconcile("users", &expected).unwrap();

    assert!(table.issued.borrow().is_empty());
    assert!(diff.is_noop());
}

#[test]
fn failure_on_one_column_does_not_stop_the_rest() {
    let table = FakeTable::new(&["id"]).rejecting("b");
    let expected = [
        ColumnSpec::new("a", SqlType::Text),
        ColumnSpec::new("b", SqlType::Text),
        ColumnSpec::new("c", SqlType::Text),
    ];

    let diff = table.reconcile("items", &expected).unwrap();

    assert_eq!(table.issued.borrow().len(), 3);
    assert_eq!(diff.applied().collect::<Vec<_>>(), ["a", "c"]);
    assert_eq!(
        diff.failed().collect::<Vec<_>>(),
        [("b", "cannot add column b")]
    );
    assert!(matches!(
        diff.ensure_complete(),
        Err(SchemaError::Incomplete { ref failed, .. }) if failed == &["b"]
    ));
}

#[test]
fn rerun_after_partial_failure_only_retries_missing() {
    let failing = FakeTable::new(&["id"]).rejecting("b");
    let expected = [
        ColumnSpec::new("a", SqlType::Text),
        ColumnSpec::new("b", SqlType::Text),
    ];
    failing.reconcile("items", &expected).unwrap();

    let healed = FakeTable::new(&[]);
    *healed.columns.borrow_mut() = failing.columns.borrow().clone();
    let diff = healed.reconcile("items", &expected).unwrap();

    assert_eq!(
        *healed.issued.borrow(),
        ["ALTER TABLE \"items\" ADD COLUMN \"b\" TEXT"]
    );
    assert_eq!(diff.skipped().collect::<Vec<_>>(), ["a"]);
    assert!(diff.is_complete());
}

#[test]
fn statements_follow_declared_order() {
    let table = FakeTable::new(&["id"]);
    let expected = [
        ColumnSpec::new("zeta", SqlType::Integer),
        ColumnSpec::new("alpha", SqlType::Integer),
        ColumnSpec::new("mid", SqlType::Integer),
    ];

    table.reconcile("t", &expected).unwrap();

    let issued = table.issued.borrow();
    let order: Vec<_> = issued
        .iter()
        .map(|sql| sql.split('"').nth(3).unwrap_or_default())
        .collect();
    assert_eq!(order, ["zeta", "alpha", "mid"]);
}

#[test]
fn manifest_file_drives_reconciliation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "tables": [
                {{"name": "users", "columns": [
                    {{"name": "avatar_url", "type": "text"}},
                    {{"name": "created_at", "type": "timestamp", "default": {{"expression": "CURRENT_TIMESTAMP"}}}}
                ]}}
            ]
        }}"#
    )
    .unwrap();

    let manifest = Manifest::load(file.path()).unwrap();
    let users = manifest.table("users").unwrap();
    let table = FakeTable::new(&["id"]);
    let diff = table.reconcile(&users.name, &users.columns).unwrap();

    assert_eq!(diff.applied().collect::<Vec<_>>(), ["avatar_url", "created_at"]);
    assert_eq!(
        table.issued.borrow()[1],
        "ALTER TABLE \"users\" ADD COLUMN \"created_at\" TEXT DEFAULT CURRENT_TIMESTAMP"
    );
}
