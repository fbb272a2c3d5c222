//! Additive, idempotent schema reconciliation.
//!
//! `catalog-schema` brings a live table up to an expected column set without
//! ever removing or altering what is already there:
//! - the live column names are read once per table
//! - only missing columns get an `ALTER TABLE ... ADD COLUMN`, in declared order
//! - each ALTER succeeds or fails on its own; failures are recorded in the
//!   returned [`SchemaDiff`] and the remaining columns are still attempted
//!
//! Running it twice against an unchanged store issues nothing the second time.
//!
//! The reconciler itself does no I/O. Callers supply an `introspect` closure
//! and an `apply` closure; `catalog-store` wires them to a live `sqlx` pool.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashSet;
//! use catalog_schema::prelude::*;
//!
//! let expected = vec![
//!     ColumnSpec::new("avatar_url", SqlType::Text),
//!     ColumnSpec::new("locale", SqlType::Varchar(8))
//!         .not_null()
//!         .default(DefaultValue::String("en".into())),
//! ];
//! let live: HashSet<String> = ["id", "name"].iter().map(|c| c.to_string()).collect();
//!
//! let plan = plan("users", &expected, &live, &SqliteDialect::new()).unwrap();
//! let sql: Vec<_> = plan.statements().map(|s| s.sql.as_str()).collect();
//! assert_eq!(
//!     sql,
//!     [
//!         "ALTER TABLE \"users\" ADD COLUMN \"avatar_url\" TEXT",
//!         "ALTER TABLE \"users\" ADD COLUMN \"locale\" TEXT NOT NULL DEFAULT 'en'",
//!     ]
//! );
//! ```

pub mod column;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod manifest;
pub mod reconcile;

pub use column::{ColumnSpec, DefaultValue, Placement, SqlType, TableSpec};
pub use dialect::{dialect_for, MySqlDialect, ReconcileDialect, SqliteDialect};
pub use diff::{ColumnChange, ColumnOutcome, SchemaDiff};
pub use error::{Result, SchemaError};
pub use manifest::Manifest;
pub use reconcile::{
    log_summary, missing_columns, plan, reconcile, validate, AlterStatement, PlanStep,
    ReconcilePlan,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::column::{ColumnSpec, DefaultValue, Placement, SqlType, TableSpec};
    pub use crate::dialect::{dialect_for, MySqlDialect, ReconcileDialect, SqliteDialect};
    pub use crate::diff::{ColumnOutcome, SchemaDiff};
    pub use crate::error::{Result, SchemaError};
    pub use crate::manifest::Manifest;
    pub use crate::reconcile::{plan, reconcile, AlterStatement, ReconcilePlan};
}
