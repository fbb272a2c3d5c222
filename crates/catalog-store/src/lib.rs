//! SQLite store adapter for `catalog-query` and `catalog-schema`.
//!
//! [`Store`] wraps an `sqlx` pool and runs:
//! - bound read statements and paged listings built by `catalog-query`
//! - column introspection and additive ALTERs for `catalog-schema`
//!
//! Every call is bounded by [`StoreConfig::statement_timeout`].
//!
//! ```rust,no_run
//! use catalog_query::{FieldSpec, FilterRequest, FilterSpec};
//! use catalog_schema::{ColumnSpec, SqliteDialect, SqlType};
//! use catalog_store::{Store, StoreConfig};
//!
//! # async fn run() -> catalog_store::Result<()> {
//! let store = Store::connect(&StoreConfig::new("sqlite:catalog.db")).await?;
//!
//! let diff = store
//!     .reconcile_table(
//!         "stores",
//!         &[ColumnSpec::new("address", SqlType::Text)],
//!         &SqliteDialect::new(),
//!     )
//!     .await?;
//! assert!(diff.is_complete());
//!
//! let spec = FilterSpec::builder("stores")
//!     .field(FieldSpec::equals("system"))
//!     .build()
//!     .unwrap();
//! let built = spec.build(&FilterRequest::from_pairs([("system", "ghn")]));
//! let page = store.fetch_json_page(&built).await?;
//! println!("{} of {}", page.items.len(), page.pagination.total);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod listing;
pub mod reconcile;
pub mod store;

pub use config::StoreConfig;
pub use decode::{row_to_json, JsonRow};
pub use error::{Result, StoreError};
pub use store::Store;
