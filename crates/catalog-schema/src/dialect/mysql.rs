//! MySQL dialect.

use crate::column::{Placement, SqlType};

use super::ReconcileDialect;

/// MySQL reconciliation dialect (also covers MariaDB).
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ReconcileDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn type_name(&self, sql_type: &SqlType) -> String {
        sql_type.mysql_name()
    }

    fn quote_segment(&self, segment: &str) -> String {
        format!("`{segment}`")
    }

    fn supports_placement(&self) -> bool {
        true
    }

    fn placement_clause(&self, placement: &Placement) -> Option<String> {
        Some(match placement {
            Placement::First => "FIRST".to_string(),
            Placement::After(column) => format!("AFTER {}", self.quote_identifier(column)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnSpec, DefaultValue};

    #[test]
    fn test_add_column_after() {
        let dialect = MySqlDialect::new();
        let column = ColumnSpec::new("avatar_url", SqlType::Varchar(512))
            .not_null()
            .default(DefaultValue::String(String::new()))
            .after("name");

        assert_eq!(
            dialect.add_column_sql("users", &column),
            "ALTER TABLE `users` ADD COLUMN `avatar_url` VARCHAR(512) NOT NULL DEFAULT '' AFTER `name`"
        );
    }

    #[test]
    fn test_add_column_first() {
        let dialect = MySqlDialect::new();
        let column = ColumnSpec::new("tenant_id", SqlType::BigInt).first();

        assert_eq!(
            dialect.add_column_sql("orders", &column),
            "ALTER TABLE `orders` ADD COLUMN `tenant_id` BIGINT FIRST"
        );
    }
}
