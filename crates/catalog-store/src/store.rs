//! The SQLite store adapter.
//!
//! Every call goes through the pool and is bounded by the configured
//! statement timeout. Values are always bound, never interpolated.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use catalog_query::{BuiltQuery, SqlValue};
use sqlx::sqlite::{
    SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteQueryResult, SqliteRow,
};
use sqlx::{Row, Sqlite};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// A pooled SQLite store.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    timeout: Duration,
}

impl Store {
    /// Opens a pool for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened within the
    /// statement timeout.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        info!(
            max_connections = config.max_connections,
            timeout = ?config.statement_timeout,
            "Connecting to database"
        );
        let connect = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.statement_timeout)
            .connect(&config.database_url);
        let pool = tokio::time::timeout(config.statement_timeout, connect)
            .await
            .map_err(|_| StoreError::Timeout(config.statement_timeout))?
            .map_err(StoreError::Connect)?;
        Ok(Self::from_pool(pool, config.statement_timeout))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) async fn timed<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
        T: Send,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }

    /// Runs a read statement with bound parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails or times out.
    pub async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqliteRow>> {
        debug!(sql = %sql, params = params.len(), "Executing query");
        self.timed(async {
            bind_all(sqlx::query(sql), params)
                .fetch_all(&self.pool)
                .await
                .map_err(|source| StoreError::QueryFailed {
                    sql: sql.to_string(),
                    source,
                })
        })
        .await
    }

    /// Runs a statement without parameters and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails or times out.
    pub async fn execute(&self, sql: &str) -> Result<u64> {
        debug!(sql = %sql, "Executing SQL");
        self.timed(async {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map(|result: SqliteQueryResult| result.rows_affected())
                .map_err(|source| StoreError::ExecuteFailed {
                    sql: sql.to_string(),
                    source,
                })
        })
        .await
    }

    /// Counts the rows matching a built listing query.
    ///
    /// # Errors
    ///
    /// Returns an error if the count statement fails or times out.
    pub async fn count(&self, built: &BuiltQuery) -> Result<u64> {
        let sql = built.count_sql();
        let rows = self.query(&sql, built.params()).await?;
        let count: i64 = rows
            .first()
            .map(|row| row.try_get::<i64, _>(0))
            .transpose()
            .map_err(|source| StoreError::QueryFailed { sql, source })?
            .unwrap_or(0);
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Reads the live column names of `table`.
    ///
    /// `schema.table` names look the table up in the attached `schema`.
    /// The table name is bound, never interpolated.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownTable`] when `table` has no columns, or
    /// the query error when the lookup itself fails.
    pub async fn columns(&self, table: &str) -> Result<HashSet<String>> {
        let (sql, params) = table.split_once('.').map_or_else(
            || {
                (
                    "SELECT name FROM pragma_table_info(?)",
                    vec![SqlValue::from(table)],
                )
            },
            |(schema, name)| {
                (
                    "SELECT name FROM pragma_table_info(?, ?)",
                    vec![SqlValue::from(name), SqlValue::from(schema)],
                )
            },
        );
        let rows = self.query(sql, &params).await?;
        let columns = rows
            .iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<std::result::Result<HashSet<_>, _>>()
            .map_err(|source| StoreError::QueryFailed {
                sql: sql.to_string(),
                source,
            })?;
        if columns.is_empty() {
            return Err(StoreError::UnknownTable(table.to_string()));
        }
        Ok(columns)
    }
}

/// Binds one value.
pub(crate) fn bind_value<'q>(query: SqliteQuery<'q>, value: &SqlValue) -> SqliteQuery<'q> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Text(s) => query.bind(s.clone()),
    }
}

/// Binds every value in order.
pub(crate) fn bind_all<'q>(query: SqliteQuery<'q>, params: &[SqlValue]) -> SqliteQuery<'q> {
    params.iter().fold(query, bind_value)
}
