//! Turning a raw request into a parameterized, paginated query.

use tracing::debug;

use crate::page::{Page, Pagination};
use crate::request::FilterRequest;
use crate::spec::{Comparison, FieldSpec, FilterSpec, OrderBy};
use crate::value::SqlValue;

/// Largest offset the store can bind as a signed 64-bit integer.
const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// A ready-to-execute listing query.
///
/// Predicate fragments and their bound values are only ever appended together,
/// so `params()` is always in positional correspondence with the `?`
/// placeholders of `fragments()`. The count and data statements render the
/// same predicate and bind the same parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    table: String,
    projection: String,
    order_by: OrderBy,
    fragments: Vec<String>,
    params: Vec<SqlValue>,
    page: u64,
    limit: u32,
    offset: u64,
}

/// Builds the query for `request` against `spec`.
///
/// Never fails: unparseable page or limit values fall back to defaults and
/// filter values that do not coerce are ignored.
#[must_use]
pub fn build(spec: &FilterSpec, request: &FilterRequest) -> BuiltQuery {
    let page = resolve_page(request.raw_page());
    let limit = resolve_limit(request.raw_limit(), spec.default_limit(), spec.max_limit());
    let offset = (page - 1).saturating_mul(u64::from(limit)).min(MAX_OFFSET);

    let projection = if spec.columns().is_empty() {
        "*".to_string()
    } else {
        spec.columns().join(", ")
    };

    let mut query = BuiltQuery {
        table: spec.table().to_string(),
        projection,
        order_by: spec.order_by().clone(),
        fragments: Vec::new(),
        params: Vec::new(),
        page,
        limit,
        offset,
    };

    for field in spec.fields() {
        let raw = request.values(&field.param);
        if raw.is_empty() {
            continue;
        }
        let Some((fragment, values)) = predicate(field, raw, spec.max_values_per_field()) else {
            debug!(field = %field.param, "ignoring filter with no usable value");
            continue;
        };
        query.push(fragment, values);
    }

    for key in request.keys() {
        if spec.field(key).is_none() {
            debug!(field = %key, "ignoring filter that is not allow-listed");
        }
    }

    query
}

fn resolve_page(raw: Option<&str>) -> u64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .and_then(|p| u64::try_from(p).ok())
        .unwrap_or(1)
        .max(1)
}

fn resolve_limit(raw: Option<&str>, default_limit: u32, max_limit: u32) -> u32 {
    let requested = raw
        .and_then(|l| l.trim().parse::<i64>().ok())
        .unwrap_or_else(|| i64::from(default_limit));
    let clamped = requested.clamp(1, i64::from(max_limit));
    u32::try_from(clamped).unwrap_or(max_limit)
}

/// Generates the fragment and bound values for one field.
///
/// `equals` and `contains` use the first supplied value that coerces.
/// Returns `None` when none of the supplied values survive coercion.
fn predicate(field: &FieldSpec, raw: &[String], cap: usize) -> Option<(String, Vec<SqlValue>)> {
    let column = field.column_name();

    match field.comparison {
        Comparison::Equals => {
            let value = raw.iter().find_map(|v| field.coercion.coerce(v))?;
            Some((format!("{column} = ?"), vec![value]))
        }
        Comparison::Contains => {
            let value = raw.iter().find(|v| field.coercion.coerce(v).is_some())?;
            let pattern = format!("%{}%", value.trim());
            Some((format!("{column} LIKE ?"), vec![SqlValue::Text(pattern)]))
        }
        Comparison::OneOf => {
            let mut values: Vec<SqlValue> = Vec::new();
            for candidate in raw.iter().flat_map(|v| v.split(',')) {
                if values.len() == cap {
                    break;
                }
                if let Some(value) = field.coercion.coerce(candidate) {
                    if !values.contains(&value) {
                        values.push(value);
                    }
                }
            }
            if values.is_empty() {
                return None;
            }
            let placeholders = vec![SqlValue::placeholder(); values.len()].join(", ");
            Some((format!("{column} IN ({placeholders})"), values))
        }
    }
}

impl BuiltQuery {
    fn push(&mut self, fragment: String, values: Vec<SqlValue>) {
        self.fragments.push(fragment);
        self.params.extend(values);
    }

    /// Returns the predicate fragments, combined with `AND`.
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Returns the bound values in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Returns the resolved 1-based page.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Returns the resolved page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the number of rows skipped, `(page - 1) * limit`.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the listed table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns whether no filter applied (the listing matches every row).
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Returns the number of `?` placeholders across all fragments.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.fragments
            .iter()
            .map(|f| f.matches(SqlValue::placeholder()).count())
            .sum()
    }

    /// Returns the combined predicate, or `None` when unfiltered.
    #[must_use]
    pub fn where_clause(&self) -> Option<String> {
        if self.fragments.is_empty() {
            None
        } else {
            Some(self.fragments.join(" AND "))
        }
    }

    /// Renders the count statement.
    #[must_use]
    pub fn count_sql(&self) -> String {
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.table);
        self.push_where(&mut sql);
        sql
    }

    /// Renders the data statement: same predicate, fixed ordering, page window.
    #[must_use]
    pub fn select_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.projection, self.table);
        self.push_where(&mut sql);
        sql.push_str(" ORDER BY ");
        sql.push_str(&self.order_by.to_sql());
        sql.push_str(&format!(" LIMIT {} OFFSET {}", self.limit, self.offset));
        sql
    }

    fn push_where(&self, sql: &mut String) {
        if let Some(clause) = self.where_clause() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
    }

    /// Returns the pagination block for a listing that matched `total` rows.
    #[must_use]
    pub fn pagination(&self, total: u64) -> Pagination {
        Pagination::new(self.page, self.limit, total)
    }

    /// Wraps fetched rows into a [`Page`].
    #[must_use]
    pub fn page_of<T>(&self, items: Vec<T>, total: u64) -> Page<T> {
        Page::new(items, self.pagination(total))
    }
}
