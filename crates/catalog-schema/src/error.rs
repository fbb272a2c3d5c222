//! Error types for schema reconciliation.

use std::path::PathBuf;

/// Errors that can occur while planning or running a reconciliation.
///
/// A single column failing to apply is *not* an error: it is recorded in the
/// [`SchemaDiff`](crate::SchemaDiff) and the remaining columns are still
/// attempted. Use [`SchemaDiff::ensure_complete`](crate::SchemaDiff::ensure_complete)
/// to turn such failures into [`SchemaError::Incomplete`].
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A table or column name is not a plain SQL identifier.
    #[error("invalid {kind} identifier: {ident:?}")]
    InvalidIdentifier {
        /// What the identifier names.
        kind: &'static str,
        /// The offending identifier.
        ident: String,
    },

    /// The same column was declared twice for one table.
    #[error("column '{column}' declared twice for table '{table}'")]
    DuplicateColumn {
        /// Table name.
        table: String,
        /// Duplicated column name.
        column: String,
    },

    /// The same table was declared twice in a manifest.
    #[error("table '{0}' declared twice")]
    DuplicateTable(String),

    /// A custom type or default expression would break out of the column definition.
    #[error("unsafe {what} for column '{column}': {expr:?}")]
    UnsafeExpression {
        /// Either "type" or "default".
        what: &'static str,
        /// Column name.
        column: String,
        /// The rejected expression.
        expr: String,
    },

    /// A float default that cannot be rendered as a SQL literal.
    #[error("default for column '{column}' is not a finite number: {value}")]
    NonFiniteDefault {
        /// Column name.
        column: String,
        /// The rejected value.
        value: f64,
    },

    /// Reading the live column set failed; nothing was diffed or applied.
    #[error("failed to introspect table '{table}': {reason}")]
    Introspect {
        /// Table name.
        table: String,
        /// Underlying store error.
        reason: String,
    },

    /// One or more columns could not be added.
    #[error("schema for '{table}' is incomplete, failed columns: {}", .failed.join(", "))]
    Incomplete {
        /// Table name.
        table: String,
        /// Columns whose ALTER failed.
        failed: Vec<String>,
    },

    /// IO error (reading manifest files).
    #[error("IO error reading '{path}': {source}")]
    Io {
        /// Manifest path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Manifest deserialization error.
    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
