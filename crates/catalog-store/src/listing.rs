//! Paged listings.
//!
//! A page is two statements: the count, then the data query. Both are bound
//! with the same parameter list taken from the [`BuiltQuery`].

use catalog_query::{BuiltQuery, Page};
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;
use tracing::debug;

use crate::decode::{row_to_json, JsonRow};
use crate::error::{Result, StoreError};
use crate::store::Store;

impl Store {
    /// Fetches one page of typed rows.
    ///
    /// # Errors
    ///
    /// Returns an error if either statement fails or a row does not decode
    /// into `T`.
    pub async fn fetch_page<T>(&self, built: &BuiltQuery) -> Result<Page<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let (rows, total) = self.fetch_rows(built).await?;
        let items = rows
            .iter()
            .map(T::from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|source| StoreError::QueryFailed {
                sql: built.select_sql(),
                source,
            })?;
        Ok(built.page_of(items, total))
    }

    /// Fetches one page of rows decoded into JSON objects.
    ///
    /// # Errors
    ///
    /// Returns an error if either statement fails or a value does not decode.
    pub async fn fetch_json_page(&self, built: &BuiltQuery) -> Result<Page<JsonRow>> {
        let (rows, total) = self.fetch_rows(built).await?;
        let items = rows.iter().map(row_to_json).collect::<Result<Vec<_>>>()?;
        Ok(built.page_of(items, total))
    }

    async fn fetch_rows(&self, built: &BuiltQuery) -> Result<(Vec<SqliteRow>, u64)> {
        let total = self.count(built).await?;
        let rows = self.query(&built.select_sql(), built.params()).await?;
        debug!(
            table = %built.table(),
            total,
            page = built.page(),
            returned = rows.len(),
            "Fetched page"
        );
        Ok((rows, total))
    }
}
