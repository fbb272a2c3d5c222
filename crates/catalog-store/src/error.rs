//! Store errors and their classification.

use std::time::Duration;

use catalog_schema::SchemaError;
use thiserror::Error;

/// Message shown to external callers for any store failure.
pub const PUBLIC_UNAVAILABLE: &str = "service temporarily unavailable";

/// Errors raised by the store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the pool failed.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// A read statement failed.
    #[error("query failed: {source}")]
    QueryFailed {
        /// Statement text.
        sql: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// A write or DDL statement failed.
    #[error("statement failed: {source}")]
    ExecuteFailed {
        /// Statement text.
        sql: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// A result column could not be decoded.
    #[error("failed to decode column '{column}': {source}")]
    Decode {
        /// Column name.
        column: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// The call did not finish within the statement timeout.
    #[error("statement timed out after {0:?}")]
    Timeout(Duration),

    /// The table has no columns, i.e. it does not exist.
    #[error("table not found: {0}")]
    UnknownTable(String),

    /// Declaration or introspection error from the reconciler.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl StoreError {
    const fn driver(&self) -> Option<&sqlx::Error> {
        match self {
            Self::Connect(source)
            | Self::QueryFailed { source, .. }
            | Self::ExecuteFailed { source, .. }
            | Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns the statement that failed, if any.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::QueryFailed { sql, .. } | Self::ExecuteFailed { sql, .. } => Some(sql),
            _ => None,
        }
    }

    /// Returns whether the store refused the statement for lack of rights.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        let Some(sqlx::Error::Database(db)) = self.driver() else {
            return false;
        };
        // SQLITE_PERM, SQLITE_READONLY, SQLITE_AUTH
        if matches!(db.code().as_deref(), Some("3" | "8" | "23")) {
            return true;
        }
        let message = db.message().to_ascii_lowercase();
        ["permission denied", "access denied", "not authorized", "readonly database"]
            .iter()
            .any(|needle| message.contains(needle))
    }

    /// Returns whether the failure came from losing or exhausting connections.
    #[must_use]
    pub fn is_connection_lost(&self) -> bool {
        if matches!(self, Self::Timeout(_)) {
            return true;
        }
        matches!(
            self.driver(),
            Some(
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            )
        )
    }

    /// Returns text safe to show an external caller.
    ///
    /// Never includes SQL, table names or driver messages.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn public_message(&self) -> &'static str {
        PUBLIC_UNAVAILABLE
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
