//! Declarative filter specifications.
//!
//! A [`FilterSpec`] is defined once per listed resource. It is the allow-list
//! that decides which request parameters may influence a query, which column
//! and operator each one maps to, and how its raw value is coerced.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::build::{build, BuiltQuery};
use crate::error::{Result, SpecError};
use crate::ident;
use crate::request::{FilterRequest, LIMIT_PARAM, PAGE_PARAM};
use crate::value::SqlValue;

/// Page size used when the request does not supply a usable limit.
pub const DEFAULT_LIMIT: u32 = 50;

/// Upper bound on the page size.
pub const MAX_LIMIT: u32 = 200;

/// Upper bound on the number of values a single `oneOf` filter may bind.
pub const MAX_VALUES_PER_FIELD: usize = 100;

/// How a filter value is compared against its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Comparison {
    /// `column = ?`
    #[default]
    Equals,
    /// `column LIKE ?` with the value wrapped as `%value%`.
    Contains,
    /// `column IN (?, ?, ...)`, one placeholder per supplied value.
    ///
    /// Each raw value is also split on `,`, so a value or enum variant that
    /// itself contains a comma can never be matched.
    OneOf,
}

impl Comparison {
    /// Returns the comparison name as used in manifests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::OneOf => "oneOf",
        }
    }
}

/// How a raw request string is turned into a bound value.
///
/// A value that fails coercion is treated as if it had not been supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "variants", rename_all = "camelCase")]
pub enum Coercion {
    /// Any non-empty text.
    #[default]
    String,
    /// A base-10 64-bit integer.
    Int,
    /// `1/0`, `true/false`, `yes/no`, `on/off` (case-insensitive).
    Bool,
    /// One of a fixed set of variants (exact match).
    Enum(Vec<String>),
}

impl Coercion {
    /// Creates an enum coercion from its variants.
    #[must_use]
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(variants.into_iter().map(Into::into).collect())
    }

    /// Returns the coercion name as used in manifests.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Enum(_) => "enum",
        }
    }

    /// Coerces a raw value, returning `None` when it does not fit.
    #[must_use]
    pub fn coerce(&self, raw: &str) -> Option<SqlValue> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }

        match self {
            Self::String => Some(SqlValue::Text(value.to_string())),
            Self::Int => value.parse::<i64>().ok().map(SqlValue::Int),
            Self::Bool => match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(SqlValue::Bool(true)),
                "0" | "false" | "no" | "off" => Some(SqlValue::Bool(false)),
                _ => None,
            },
            Self::Enum(variants) => variants
                .iter()
                .find(|v| v.as_str() == value)
                .map(|v| SqlValue::Text(v.clone())),
        }
    }
}

/// One allow-listed filter field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// External request parameter name.
    pub param: String,
    /// Column the parameter filters on (defaults to `param`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Comparison operator.
    #[serde(default)]
    pub comparison: Comparison,
    /// Value coercion.
    #[serde(default)]
    pub coercion: Coercion,
}

impl FieldSpec {
    /// Creates a field with the given comparison and a string coercion.
    #[must_use]
    pub fn new(param: impl Into<String>, comparison: Comparison) -> Self {
        Self {
            param: param.into(),
            column: None,
            comparison,
            coercion: Coercion::String,
        }
    }

    /// Creates an `equals` field.
    #[must_use]
    pub fn equals(param: impl Into<String>) -> Self {
        Self::new(param, Comparison::Equals)
    }

    /// Creates a `contains` field.
    #[must_use]
    pub fn contains(param: impl Into<String>) -> Self {
        Self::new(param, Comparison::Contains)
    }

    /// Creates a `oneOf` field.
    #[must_use]
    pub fn one_of(param: impl Into<String>) -> Self {
        Self::new(param, Comparison::OneOf)
    }

    /// Maps the parameter onto a differently named column.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Sets the value coercion.
    #[must_use]
    pub fn coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = coercion;
        self
    }

    /// Coerces values as integers.
    #[must_use]
    pub fn int(self) -> Self {
        self.coercion(Coercion::Int)
    }

    /// Coerces values as booleans.
    #[must_use]
    pub fn boolean(self) -> Self {
        self.coercion(Coercion::Bool)
    }

    /// Restricts values to a fixed set of variants.
    #[must_use]
    pub fn enumeration<I, S>(self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.coercion(Coercion::enumeration(variants))
    }

    /// Returns the column this field filters on.
    #[must_use]
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.param)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (ASC)
    #[default]
    Asc,
    /// Descending order (DESC)
    Desc,
}

impl SortDirection {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// The fixed ordering of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    /// Column to order by.
    pub column: String,
    /// Order direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    /// Creates an ascending ordering.
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Creates a descending ordering.
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Returns the SQL representation.
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!("{} {}", self.column, self.direction.as_sql())
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::asc("id")
    }
}

/// Validated filter specification for one listed resource.
///
/// Construct with [`FilterSpec::builder`] or deserialize from a manifest;
/// both paths run the same validation.
///
/// # Example
///
/// ```
/// use catalog_query::{FieldSpec, FilterRequest, FilterSpec, OrderBy};
///
/// let spec = FilterSpec::builder("stores")
///     .field(FieldSpec::equals("system"))
///     .field(FieldSpec::contains("city").column("address"))
///     .order_by(OrderBy::desc("id"))
///     .build()
///     .unwrap();
///
/// let request = FilterRequest::new().value("system", "ghn").value("city", "hanoi");
/// let built = spec.build(&request);
///
/// assert_eq!(built.fragments(), ["system = ?", "address LIKE ?"]);
/// assert_eq!(
///     built.select_sql(),
///     "SELECT * FROM stores WHERE system = ? AND address LIKE ? ORDER BY id DESC LIMIT 50 OFFSET 0"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FilterSpecBuilder", into = "FilterSpecBuilder")]
pub struct FilterSpec {
    table: String,
    fields: Vec<FieldSpec>,
    columns: Vec<String>,
    order_by: OrderBy,
    default_limit: u32,
    max_limit: u32,
    max_values_per_field: usize,
}

impl FilterSpec {
    /// Starts building a specification for `table`.
    #[must_use]
    pub fn builder(table: impl Into<String>) -> FilterSpecBuilder {
        FilterSpecBuilder::new(table)
    }

    /// Builds the query for one request.
    #[must_use]
    pub fn build(&self, request: &FilterRequest) -> BuiltQuery {
        build(self, request)
    }

    /// Returns the listed table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the allow-listed fields in declared order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Returns the field declared for `param`, if any.
    #[must_use]
    pub fn field(&self, param: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.param == param)
    }

    /// Returns the projected columns (empty means `*`).
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the fixed ordering.
    #[must_use]
    pub fn order_by(&self) -> &OrderBy {
        &self.order_by
    }

    /// Returns the default page size.
    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Returns the maximum page size.
    #[must_use]
    pub const fn max_limit(&self) -> u32 {
        self.max_limit
    }

    /// Returns the cap on values bound by one `oneOf` filter.
    #[must_use]
    pub const fn max_values_per_field(&self) -> usize {
        self.max_values_per_field
    }
}

/// Builder (and manifest representation) for [`FilterSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpecBuilder {
    table: String,
    #[serde(default)]
    fields: Vec<FieldSpec>,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    order_by: OrderBy,
    #[serde(default = "default_limit")]
    default_limit: u32,
    #[serde(default = "max_limit")]
    max_limit: u32,
    #[serde(default = "max_values_per_field")]
    max_values_per_field: usize,
}

const fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

const fn max_limit() -> u32 {
    MAX_LIMIT
}

const fn max_values_per_field() -> usize {
    MAX_VALUES_PER_FIELD
}

impl FilterSpecBuilder {
    /// Creates a builder for `table` with the default limits and `id ASC` ordering.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            columns: Vec::new(),
            order_by: OrderBy::default(),
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            max_values_per_field: MAX_VALUES_PER_FIELD,
        }
    }

    /// Adds an allow-listed field.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Restricts the data query to these columns.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the fixed ordering.
    #[must_use]
    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    /// Sets the default page size.
    #[must_use]
    pub const fn default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// Sets the maximum page size.
    #[must_use]
    pub const fn max_limit(mut self, limit: u32) -> Self {
        self.max_limit = limit;
        self
    }

    /// Sets the cap on values bound by one `oneOf` filter.
    #[must_use]
    pub const fn max_values_per_field(mut self, cap: usize) -> Self {
        self.max_values_per_field = cap;
        self
    }

    /// Validates and builds the specification.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecError`] for an invalid identifier, inconsistent
    /// limits, a zero value cap, or an invalid or duplicated field.
    pub fn build(self) -> Result<FilterSpec> {
        ident::check("table", &self.table)?;
        ident::check("sort column", &self.order_by.column)?;
        for column in &self.columns {
            ident::check("column", column)?;
        }

        if self.default_limit == 0 || self.max_limit == 0 || self.default_limit > self.max_limit
        {
            return Err(SpecError::InvalidLimits {
                default_limit: self.default_limit,
                max_limit: self.max_limit,
            });
        }
        if self.max_values_per_field == 0 {
            return Err(SpecError::InvalidValueCap);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            let param = field.param.as_str();
            if param.trim().is_empty() || param == PAGE_PARAM || param == LIMIT_PARAM {
                return Err(SpecError::InvalidParam(field.param.clone()));
            }
            if !seen.insert(param) {
                return Err(SpecError::DuplicateParam(field.param.clone()));
            }
            ident::check("column", field.column_name())?;

            match &field.coercion {
                Coercion::Enum(variants) if variants.is_empty() => {
                    return Err(SpecError::EmptyEnum(field.param.clone()));
                }
                Coercion::Bool if field.comparison == Comparison::Contains => {
                    return Err(SpecError::IncompatibleCoercion {
                        param: field.param.clone(),
                        comparison: field.comparison.as_str(),
                        coercion: field.coercion.as_str(),
                    });
                }
                _ => {}
            }
        }

        Ok(FilterSpec {
            table: self.table,
            fields: self.fields,
            columns: self.columns,
            order_by: self.order_by,
            default_limit: self.default_limit,
            max_limit: self.max_limit,
            max_values_per_field: self.max_values_per_field,
        })
    }
}

impl TryFrom<FilterSpecBuilder> for FilterSpec {
    type Error = SpecError;

    fn try_from(builder: FilterSpecBuilder) -> Result<Self> {
        builder.build()
    }
}

impl From<FilterSpec> for FilterSpecBuilder {
    fn from(spec: FilterSpec) -> Self {
        Self {
            table: spec.table,
            fields: spec.fields,
            columns: spec.columns,
            order_by: spec.order_by,
            default_limit: spec.default_limit,
            max_limit: spec.max_limit,
            max_values_per_field: spec.max_values_per_field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let spec = FilterSpec::builder("stores").build().unwrap();
        assert_eq!(spec.table(), "stores");
        assert_eq!(spec.default_limit(), 50);
        assert_eq!(spec.max_limit(), 200);
        assert_eq!(spec.order_by().to_sql(), "id ASC");
        assert!(spec.fields().is_empty());
    }

    #[test]
    fn test_field_column_defaults_to_param() {
        let field = FieldSpec::equals("system");
        assert_eq!(field.column_name(), "system");

        let field = FieldSpec::contains("city").column("address");
        assert_eq!(field.column_name(), "address");
    }

    #[test]
    fn test_rejects_injected_column() {
        let err = FilterSpec::builder("stores")
            .field(FieldSpec::equals("name").column("name = 1 OR 1"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SpecError::InvalidIdentifier { kind: "column", .. }));
    }

    #[test]
    fn test_rejects_bad_sort_column() {
        let err = FilterSpec::builder("stores")
            .order_by(OrderBy::desc("id; DROP TABLE stores"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SpecError::InvalidIdentifier {
                kind: "sort column",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_reserved_and_duplicate_params() {
        let err = FilterSpec::builder("stores")
            .field(FieldSpec::equals("page"))
            .build()
            .unwrap_err();
        assert_eq!(err, SpecError::InvalidParam("page".to_string()));

        let err = FilterSpec::builder("stores")
            .field(FieldSpec::equals("system"))
            .field(FieldSpec::contains("system"))
            .build()
            .unwrap_err();
        assert_eq!(err, SpecError::DuplicateParam("system".to_string()));
    }

    #[test]
    fn test_rejects_inconsistent_limits() {
        let err = FilterSpec::builder("stores")
            .default_limit(500)
            .max_limit(200)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SpecError::InvalidLimits {
                default_limit: 500,
                max_limit: 200
            }
        );
        assert!(FilterSpec::builder("stores").max_limit(0).build().is_err());
        assert_eq!(
            FilterSpec::builder("stores")
                .max_values_per_field(0)
                .build()
                .unwrap_err(),
            SpecError::InvalidValueCap
        );
    }

    #[test]
    fn test_rejects_bool_contains_and_empty_enum() {
        let err = FilterSpec::builder("stores")
            .field(FieldSpec::contains("active").boolean())
            .build()
            .unwrap_err();
        assert!(matches!(err, SpecError::IncompatibleCoercion { .. }));

        let err = FilterSpec::builder("stores")
            .field(FieldSpec::one_of("status").enumeration(Vec::<String>::new()))
            .build()
            .unwrap_err();
        assert_eq!(err, SpecError::EmptyEnum("status".to_string()));
    }

    #[test]
    fn test_coercion() {
        assert_eq!(Coercion::String.coerce("  ghn "), Some(SqlValue::from("ghn")));
        assert_eq!(Coercion::String.coerce("   "), None);
        assert_eq!(Coercion::Int.coerce("42"), Some(SqlValue::Int(42)));
        assert_eq!(Coercion::Int.coerce("4x2"), None);
        assert_eq!(Coercion::Int.coerce("99999999999999999999"), None);
        assert_eq!(Coercion::Bool.coerce("Yes"), Some(SqlValue::Bool(true)));
        assert_eq!(Coercion::Bool.coerce("0"), Some(SqlValue::Bool(false)));
        assert_eq!(Coercion::Bool.coerce("maybe"), None);

        let status = Coercion::enumeration(["open", "closed"]);
        assert_eq!(status.coerce("open"), Some(SqlValue::from("open")));
        assert_eq!(status.coerce("OPEN"), None);
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let json = r#"{
            "table": "stores",
            "fields": [
                {"param": "system"},
                {"param": "city", "column": "address", "comparison": "contains"},
                {"param": "status", "comparison": "oneOf",
                 "coercion": {"type": "enum", "variants": ["open", "closed"]}},
                {"param": "region_id", "coercion": {"type": "int"}}
            ],
            "orderBy": {"column": "created_at", "direction": "desc"},
            "maxLimit": 100
        }"#;
        let spec: FilterSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.fields().len(), 4);
        assert_eq!(spec.field("city").unwrap().column_name(), "address");
        assert_eq!(spec.field("region_id").unwrap().coercion, Coercion::Int);
        assert_eq!(spec.order_by(), &OrderBy::desc("created_at"));
        assert_eq!(spec.default_limit(), 50);
        assert_eq!(spec.max_limit(), 100);

        let bad = r#"{"table": "stores", "fields": [{"param": "x", "column": "x y"}]}"#;
        assert!(serde_json::from_str::<FilterSpec>(bad).is_err());
    }
}
