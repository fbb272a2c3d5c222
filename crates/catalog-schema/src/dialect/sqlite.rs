//! SQLite dialect.
//!
//! SQLite always appends added columns at the end of the table, so placement
//! hints are ignored. It also refuses `NOT NULL` columns without a non-NULL
//! default once the table has rows; such a column fails at apply time like
//! any other store error.

use crate::column::{Placement, SqlType};

use super::ReconcileDialect;

/// SQLite reconciliation dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ReconcileDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn type_name(&self, sql_type: &SqlType) -> String {
        sql_type.sqlite_name()
    }

    fn supports_placement(&self) -> bool {
        false
    }

    fn placement_clause(&self, _placement: &Placement) -> Option<String> {
        None
    }
}
