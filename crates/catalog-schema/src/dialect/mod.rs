//! Database dialect implementations.
//!
//! Each dialect knows how to render the additive DDL the reconciler issues:
//! one `ALTER TABLE ... ADD COLUMN ...` per missing column.

mod mysql;
mod sqlite;

pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use crate::column::{ColumnSpec, Placement, SqlType};

/// Trait for database-specific DDL generation.
pub trait ReconcileDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the SQL type name for the given type.
    fn type_name(&self, sql_type: &SqlType) -> String;

    /// Quotes a single identifier segment.
    fn quote_segment(&self, segment: &str) -> String {
        format!("\"{segment}\"")
    }

    /// Quotes a possibly dot-qualified identifier (table name, column name).
    fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|seg| self.quote_segment(seg))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Returns whether this dialect honors column placement hints.
    fn supports_placement(&self) -> bool;

    /// Renders a placement hint, or `None` when unsupported.
    fn placement_clause(&self, placement: &Placement) -> Option<String>;

    /// Generates column definition SQL.
    fn column_definition(&self, column: &ColumnSpec) -> String {
        let mut parts = vec![
            self.quote_identifier(&column.name),
            self.type_name(&column.sql_type),
        ];

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        if let Some(default_sql) = column.default.to_sql() {
            parts.push(format!("DEFAULT {default_sql}"));
        }

        parts.join(" ")
    }

    /// Generates SQL for adding a column.
    fn add_column_sql(&self, table: &str, column: &ColumnSpec) -> String {
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote_identifier(table),
            self.column_definition(column)
        );
        if let Some(clause) = column
            .placement
            .as_ref()
            .and_then(|p| self.placement_clause(p))
        {
            sql.push(' ');
            sql.push_str(&clause);
        }
        sql
    }
}

/// Looks up a dialect by name (`sqlite` or `mysql`).
#[must_use]
pub fn dialect_for(name: &str) -> Option<Box<dyn ReconcileDialect>> {
    match name.to_ascii_lowercase().as_str() {
        "sqlite" => Some(Box::new(SqliteDialect::new())),
        "mysql" | "mariadb" => Some(Box::new(MySqlDialect::new())),
        _ => None,
    }
}
