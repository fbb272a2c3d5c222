//! # catalog-query
//!
//! Allow-listed filtering and offset pagination for listing endpoints.
//!
//! External parameters decide *which* predicates apply, never *how* the SQL is
//! assembled:
//! - every filterable key is declared up front in a [`FilterSpec`], mapped to a
//!   fixed column, operator and value coercion
//! - values are always bound behind `?` placeholders
//! - ordering is fixed by the spec, page size is clamped to its bounds
//!
//! Building a query is pure and never fails; malformed input degrades to
//! defaults or to "no filter on this field".
//!
//! ```rust
//! use catalog_query::{build, FieldSpec, FilterRequest, FilterSpec, SqlValue};
//!
//! let spec = FilterSpec::builder("stores")
//!     .field(FieldSpec::equals("system"))
//!     .field(FieldSpec::contains("city").column("address"))
//!     .max_limit(200)
//!     .build()
//!     .unwrap();
//!
//! let request = FilterRequest::from_pairs([
//!     ("system", "ghn"),
//!     ("city", "hanoi"),
//!     ("limit", "9999"),
//!     ("page", "0"),
//!     ("name'; DROP TABLE stores; --", "x"),
//! ]);
//! let built = build(&spec, &request);
//!
//! assert_eq!(built.fragments(), ["system = ?", "address LIKE ?"]);
//! assert_eq!(built.params(), [SqlValue::from("ghn"), SqlValue::from("%hanoi%")]);
//! assert_eq!((built.page(), built.limit(), built.offset()), (1, 200, 0));
//! assert_eq!(
//!     built.count_sql(),
//!     "SELECT COUNT(*) FROM stores WHERE system = ? AND address LIKE ?"
//! );
//! ```

pub mod build;
pub mod error;
pub mod ident;
pub mod page;
pub mod request;
pub mod spec;
pub mod value;

pub use build::{build, BuiltQuery};
pub use error::{Result, SpecError};
pub use ident::{is_valid_column_name, is_valid_identifier};
pub use page::{Page, Pagination};
pub use request::{FilterRequest, LIMIT_PARAM, PAGE_PARAM};
pub use spec::{
    Coercion, Comparison, FieldSpec, FilterSpec, FilterSpecBuilder, OrderBy, SortDirection,
    DEFAULT_LIMIT, MAX_LIMIT, MAX_VALUES_PER_FIELD,
};
pub use value::SqlValue;
