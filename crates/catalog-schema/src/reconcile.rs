//! Introspect-then-mutate reconciliation.
//!
//! Reconciling a table is three steps:
//!
//! 1. read the live column names once,
//! 2. diff them against the expected columns (pure, order preserving),
//! 3. issue one additive `ALTER TABLE` per missing column, sequentially.
//!
//! A failing ALTER is recorded for its column and the loop moves on, so a
//! re-run after a partial failure only acts on the columns still missing.
//! Existing columns are never altered or dropped.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::hash::BuildHasher;

use catalog_query::{is_valid_column_name, is_valid_identifier};
use tracing::{debug, info, warn};

use crate::column::{ColumnSpec, DefaultValue, Placement, SqlType};
use crate::dialect::ReconcileDialect;
use crate::diff::SchemaDiff;
use crate::error::{Result, SchemaError};

/// One additive DDL statement for one missing column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterStatement {
    /// Target table.
    pub table: String,
    /// Column being added.
    pub column: String,
    /// Rendered SQL.
    pub sql: String,
}

impl fmt::Display for AlterStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// One planned step, in declared column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// The column already exists.
    Present(String),
    /// The column is missing and will be added.
    Add(AlterStatement),
}

/// The statements a reconciliation would issue against a known column set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    table: String,
    steps: Vec<PlanStep>,
}

impl ReconcilePlan {
    /// Returns the target table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the steps in declared column order.
    #[must_use]
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Returns the ALTER statements to issue, in order.
    pub fn statements(&self) -> impl Iterator<Item = &AlterStatement> {
        self.steps.iter().filter_map(|step| match step {
            PlanStep::Add(stmt) => Some(stmt),
            PlanStep::Present(_) => None,
        })
    }

    /// Returns whether nothing needs to be issued.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.statements().next().is_none()
    }

    /// Issues every statement through `apply`, one at a time, recording
    /// each column's outcome.
    ///
    /// A failure never stops the remaining columns.
    #[must_use]
    pub fn execute<A, E>(self, mut apply: A) -> SchemaDiff
    where
        A: FnMut(&AlterStatement) -> std::result::Result<(), E>,
        E: fmt::Display,
    {
        let mut diff = SchemaDiff::new(self.table);
        for step in self.steps {
            match step {
                PlanStep::Present(column) => diff.record_skipped(column),
                PlanStep::Add(stmt) => {
                    debug!(sql = %stmt.sql, "Executing SQL");
                    let result = apply(&stmt);
                    record_attempt(&mut diff, stmt, result);
                }
            }
        }
        log_summary(&diff);
        diff
    }

    /// Same as [`execute`](Self::execute), for stores whose statements are
    /// issued asynchronously. Each statement is awaited before the next one
    /// is issued.
    pub async fn execute_async<A, F, E>(self, mut apply: A) -> SchemaDiff
    where
        A: FnMut(String) -> F + Send,
        F: Future<Output = std::result::Result<(), E>> + Send,
        E: fmt::Display + Send,
    {
        let mut diff = SchemaDiff::new(self.table);
        for step in self.steps {
            match step {
                PlanStep::Present(column) => diff.record_skipped(column),
                PlanStep::Add(stmt) => {
                    debug!(sql = %stmt.sql, "Executing SQL");
                    let result = apply(stmt.sql.clone()).await;
                    record_attempt(&mut diff, stmt, result);
                }
            }
        }
        log_summary(&diff);
        diff
    }
}

fn record_attempt<E: fmt::Display>(
    diff: &mut SchemaDiff,
    stmt: AlterStatement,
    result: std::result::Result<(), E>,
) {
    match result {
        Ok(()) => {
            info!(table = %stmt.table, column = %stmt.column, "Added column");
            diff.record_applied(stmt.column);
        }
        Err(err) => {
            warn!(
                table = %stmt.table,
                column = %stmt.column,
                error = %err,
                "Failed to add column, continuing"
            );
            diff.record_failed(stmt.column, err.to_string());
        }
    }
}

/// Logs the one-line outcome of a reconciliation.
pub fn log_summary(diff: &SchemaDiff) {
    info!(
        table = %diff.table(),
        applied = diff.applied().count(),
        skipped = diff.skipped().count(),
        failed = diff.failed().count(),
        "Reconciled table"
    );
}

/// Checks table and column declarations before any I/O happens.
///
/// Table names may be schema-qualified; column names and placement anchors
/// must be single identifiers.
///
/// # Errors
///
/// Returns an error for an invalid identifier, a duplicated column, an unsafe
/// custom type or default expression, or a non-finite float default.
pub fn validate(table: &str, expected: &[ColumnSpec]) -> Result<()> {
    check_identifier("table", table)?;

    let mut seen = HashSet::new();
    for column in expected {
        check_column_name("column", &column.name)?;
        if !seen.insert(column.name.to_ascii_lowercase()) {
            return Err(SchemaError::DuplicateColumn {
                table: table.to_string(),
                column: column.name.clone(),
            });
        }
        if let Some(Placement::After(anchor)) = &column.placement {
            check_column_name("placement", anchor)?;
        }
        if let SqlType::Custom(expr) = &column.sql_type {
            check_expression("type", &column.name, expr)?;
        }
        match &column.default {
            DefaultValue::Expression(expr) => check_expression("default", &column.name, expr)?,
            DefaultValue::Float(value) if !value.is_finite() => {
                return Err(SchemaError::NonFiniteDefault {
                    column: column.name.clone(),
                    value: *value,
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_identifier(kind: &'static str, ident: &str) -> Result<()> {
    if is_valid_identifier(ident) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier {
            kind,
            ident: ident.to_string(),
        })
    }
}

fn check_column_name(kind: &'static str, ident: &str) -> Result<()> {
    if is_valid_column_name(ident) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier {
            kind,
            ident: ident.to_string(),
        })
    }
}

fn check_expression(what: &'static str, column: &str, expr: &str) -> Result<()> {
    if expr.trim().is_empty() || expr.contains(';') || expr.contains("--") || expr.contains("/*")
    {
        return Err(SchemaError::UnsafeExpression {
            what,
            column: column.to_string(),
            expr: expr.to_string(),
        });
    }
    Ok(())
}

/// Returns the expected columns absent from `existing`, in declared order.
///
/// Column names compare case-insensitively.
#[must_use]
pub fn missing_columns<'a, S: BuildHasher>(
    expected: &'a [ColumnSpec],
    existing: &HashSet<String, S>,
) -> Vec<&'a ColumnSpec> {
    let existing = normalize(existing);
    expected
        .iter()
        .filter(|c| !existing.contains(&c.name.to_ascii_lowercase()))
        .collect()
}

fn normalize<S: BuildHasher>(existing: &HashSet<String, S>) -> HashSet<String> {
    existing.iter().map(|c| c.to_ascii_lowercase()).collect()
}

/// Plans the statements needed to bring `table` from `existing` to `expected`.
///
/// # Errors
///
/// Returns an error if the declarations fail [`validate`].
pub fn plan<S: BuildHasher>(
    table: &str,
    expected: &[ColumnSpec],
    existing: &HashSet<String, S>,
    dialect: &dyn ReconcileDialect,
) -> Result<ReconcilePlan> {
    validate(table, expected)?;

    let existing = normalize(existing);
    let steps = expected
        .iter()
        .map(|column| {
            if existing.contains(&column.name.to_ascii_lowercase()) {
                return PlanStep::Present(column.name.clone());
            }
            if column.placement.is_some() && !dialect.supports_placement() {
                debug!(
                    dialect = dialect.name(),
                    column = %column.name,
                    "Placement hint not supported, column will be appended"
                );
            }
            PlanStep::Add(AlterStatement {
                table: table.to_string(),
                column: column.name.clone(),
                sql: dialect.add_column_sql(table, column),
            })
        })
        .collect();

    Ok(ReconcilePlan {
        table: table.to_string(),
        steps,
    })
}

/// Reconciles `table` against `expected`.
///
/// Calls `introspect` exactly once, then `apply` once per missing column in
/// declared order. Returns the per-column outcomes; an `apply` failure is
/// recorded, not returned. Only invalid declarations and a failed
/// introspection are errors.
///
/// # Errors
///
/// Returns an error if the declarations fail [`validate`] or `introspect`
/// fails. Nothing is applied in either case.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use catalog_schema::{reconcile, ColumnSpec, SqliteDialect, SqlType};
///
/// let expected = [ColumnSpec::new("avatar_url", SqlType::Text)];
/// let mut live: HashSet<String> = ["id", "name"].iter().map(|c| c.to_string()).collect();
///
/// let diff = reconcile(
///     "users",
///     &expected,
///     &SqliteDialect::new(),
///     || Ok::<_, std::convert::Infallible>(live.clone()),
///     |_stmt| Ok(()),
/// )
/// .unwrap();
/// assert_eq!(diff.applied().collect::<Vec<_>>(), ["avatar_url"]);
///
/// live.insert("avatar_url".to_string());
/// let diff = reconcile(
///     "users",
///     &expected,
///     &SqliteDialect::new(),
///     || Ok::<_, std::convert::Infallible>(live.clone()),
///     |_stmt| Ok(()),
/// )
/// .unwrap();
/// assert!(diff.is_noop());
/// ```
pub fn reconcile<I, A, E>(
    table: &str,
    expected: &[ColumnSpec],
    dialect: &dyn ReconcileDialect,
    introspect: I,
    apply: A,
) -> Result<SchemaDiff>
where
    I: FnOnce() -> std::result::Result<HashSet<String>, E>,
    A: FnMut(&AlterStatement) -> std::result::Result<(), E>,
    E: fmt::Display,
{
    validate(table, expected)?;

    let existing = introspect().map_err(|err| SchemaError::Introspect {
        table: table.to_string(),
        reason: err.to_string(),
    })?;

    Ok(plan(table, expected, &existing, dialect)?.execute(apply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, SqliteDialect};

    fn set(cols: &[&str]) -> HashSet<String> {
        cols.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn test_missing_columns_preserves_declared_order() {
        let expected = vec![
            ColumnSpec::new("c", SqlType::Text),
            ColumnSpec::new("a", SqlType::Text),
            ColumnSpec::new("b", SqlType::Text),
        ];
        let missing = missing_columns(&expected, &set(&["A", "id"]));
        let names: Vec<&str> = missing.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["c", "b"]);
    }

    #[test]
    fn test_plan_renders_dependent_placements_in_order() {
        let expected = vec![
            ColumnSpec::new("first_name", SqlType::Varchar(100)).after("id"),
            ColumnSpec::new("last_name", SqlType::Varchar(100)).after("first_name"),
        ];
        let plan = plan("users", &expected, &set(&["id"]), &MySqlDialect::new()).unwrap();
        let sql: Vec<&str> = plan.statements().map(|s| s.sql.as_str()).collect();

        assert_eq!(
            sql,
            [
                "ALTER TABLE `users` ADD COLUMN `first_name` VARCHAR(100) AFTER `id`",
                "ALTER TABLE `users` ADD COLUMN `last_name` VARCHAR(100) AFTER `first_name`",
            ]
        );
    }

    #[test]
    fn test_validate_rejects_bad_declarations() {
        let dialect = SqliteDialect::new();
        let bad_table = plan("users; --", &[], &HashSet::new(), &dialect);
        assert!(matches!(
            bad_table,
            Err(SchemaError::InvalidIdentifier { kind: "table", .. })
        ));

        let dup = [
            ColumnSpec::new("Email", SqlType::Text),
            ColumnSpec::new("email", SqlType::Text),
        ];
        assert!(matches!(
            validate("users", &dup),
            Err(SchemaError::DuplicateColumn { .. })
        ));

        let stacked = [ColumnSpec::new("x", SqlType::Custom("INT; DROP TABLE users".into()))];
        assert!(matches!(
            validate("users", &stacked),
            Err(SchemaError::UnsafeExpression { what: "type", .. })
        ));

        let anchor = [ColumnSpec::new("x", SqlType::Text).after("a b")];
        assert!(matches!(
            validate("users", &anchor),
            Err(SchemaError::InvalidIdentifier {
                kind: "placement",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_qualified_column_names() {
        assert!(validate("main.users", &[ColumnSpec::new("email", SqlType::Text)]).is_ok());

        let dotted = [ColumnSpec::new("a.b", SqlType::Text)];
        match validate("users", &dotted) {
            Err(SchemaError::InvalidIdentifier { kind, ident }) => {
                assert_eq!(kind, "column");
                assert_eq!(ident, "a.b");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let anchor = [ColumnSpec::new("x", SqlType::Text).after("users.id")];
        assert!(matches!(
            validate("users", &anchor),
            Err(SchemaError::InvalidIdentifier {
                kind: "placement",
                ..
            })
        ));

        let plan = plan("users", &dotted, &set(&["id"]), &SqliteDialect::new());
        assert!(plan.is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_float_defaults() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let expected =
                [ColumnSpec::new("ratio", SqlType::Double).default(DefaultValue::Float(value))];
            assert!(matches!(
                validate("metrics", &expected),
                Err(SchemaError::NonFiniteDefault { ref column, .. }) if column == "ratio"
            ));
        }

        let finite =
            [ColumnSpec::new("ratio", SqlType::Double).default(DefaultValue::Float(0.5))];
        assert!(validate("metrics", &finite).is_ok());
    }

    #[test]
    fn test_execute_records_each_outcome() {
        let expected = [
            ColumnSpec::new("id", SqlType::Integer),
            ColumnSpec::new("a", SqlType::Text),
            ColumnSpec::new("b", SqlType::Text).not_null(),
            ColumnSpec::new("c", SqlType::Text),
        ];
        let plan = plan("items", &expected, &set(&["id"]), &SqliteDialect::new()).unwrap();

        let mut issued = Vec::new();
        let diff = plan.execute(|stmt| {
            issued.push(stmt.column.clone());
            if stmt.column == "b" {
                Err("Cannot add a NOT NULL column with default value NULL")
            } else {
                Ok(())
            }
        });

        assert_eq!(issued, ["a", "b", "c"]);
        assert_eq!(diff.skipped().collect::<Vec<_>>(), ["id"]);
        assert_eq!(diff.applied().collect::<Vec<_>>(), ["a", "c"]);
        assert_eq!(
            diff.failed().collect::<Vec<_>>(),
            [("b", "Cannot add a NOT NULL column with default value NULL")]
        );
    }

    #[test]
    fn test_invalid_declaration_skips_introspection() {
        let mut introspected = false;
        let result = reconcile(
            "bad table",
            &[],
            &SqliteDialect::new(),
            || {
                introspected = true;
                Ok::<_, String>(HashSet::new())
            },
            |_| Ok(()),
        );
        assert!(result.is_err());
        assert!(!introspected);
    }

    #[test]
    fn test_introspection_failure_aborts() {
        let mut applied = 0;
        let result = reconcile(
            "users",
            &[ColumnSpec::new("x", SqlType::Text)],
            &SqliteDialect::new(),
            || Err::<HashSet<String>, _>("connection lost"),
            |_| {
                applied += 1;
                Ok(())
            },
        );
        match result {
            Err(SchemaError::Introspect { table, reason }) => {
                assert_eq!(table, "users");
                assert_eq!(reason, "connection lost");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(applied, 0);
    }
}
