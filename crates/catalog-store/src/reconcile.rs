//! Live schema reconciliation.

use std::collections::HashSet;

use catalog_schema::{
    plan, validate, ColumnSpec, ReconcileDialect, ReconcilePlan, SchemaDiff, SchemaError,
};

use crate::error::Result;
use crate::store::Store;

impl Store {
    async fn introspect(&self, table: &str) -> Result<HashSet<String>> {
        self.columns(table).await.map_err(|err| {
            SchemaError::Introspect {
                table: table.to_string(),
                reason: err.to_string(),
            }
            .into()
        })
    }

    /// Reads the live columns of `table` and plans the missing additions
    /// without issuing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the declarations are invalid or `table` cannot be
    /// introspected.
    pub async fn plan_table(
        &self,
        table: &str,
        columns: &[ColumnSpec],
        dialect: &dyn ReconcileDialect,
    ) -> Result<ReconcilePlan> {
        validate(table, columns)?;
        let existing = self.introspect(table).await?;
        Ok(plan(table, columns, &existing, dialect)?)
    }

    /// Adds every missing column of `table`, one ALTER at a time.
    ///
    /// Failed ALTERs are recorded in the returned diff; later columns are
    /// still attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if the declarations are invalid or `table` cannot be
    /// introspected. No ALTER is issued in either case.
    pub async fn reconcile_table(
        &self,
        table: &str,
        columns: &[ColumnSpec],
        dialect: &dyn ReconcileDialect,
    ) -> Result<SchemaDiff> {
        let plan = self.plan_table(table, columns, dialect).await?;
        Ok(plan
            .execute_async(|sql| async move { self.execute(&sql).await.map(drop) })
            .await)
    }
}
