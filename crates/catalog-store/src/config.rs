//! Store configuration.

use std::time::Duration;

/// Default database URL: a private in-memory SQLite database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default per-statement timeout.
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite connection string.
    pub database_url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Upper bound for any single store call.
    pub statement_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration for `database_url` with default limits.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Sets the pool size. Zero is raised to one.
    #[must_use]
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    /// Sets the per-statement timeout.
    #[must_use]
    pub const fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }
}
