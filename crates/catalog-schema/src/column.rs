//! Expected-column declarations.
//!
//! These types describe what the calling code expects a table to contain.
//! They are declared once (in code or in a manifest) and compared against the
//! live column set by the reconciler.

use serde::{Deserialize, Serialize};

/// SQL data types a column can be declared with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    BigInt,
    /// Small integer (16-bit).
    SmallInt,
    /// Unbounded text.
    Text,
    /// Variable-length character string.
    Varchar(usize),
    /// Fixed-length character string.
    Char(usize),
    /// Boolean.
    Boolean,
    /// Date and time.
    DateTime,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Timestamp.
    Timestamp,
    /// Floating point (single precision).
    Real,
    /// Floating point (double precision).
    Double,
    /// Decimal with precision and scale.
    Decimal(u8, u8),
    /// Binary large object.
    Blob,
    /// JSON data.
    Json,
    /// UUID.
    Uuid,
    /// Type expression passed through verbatim (e.g. `ENUM('a','b')`).
    Custom(String),
}

impl SqlType {
    /// Returns the SQL type name for SQLite.
    #[must_use]
    pub fn sqlite_name(&self) -> String {
        match self {
            Self::Integer | Self::BigInt | Self::SmallInt | Self::Boolean => "INTEGER".to_string(),
            Self::Text
            | Self::Varchar(_)
            | Self::Char(_)
            | Self::DateTime
            | Self::Date
            | Self::Time
            | Self::Timestamp
            | Self::Json
            | Self::Uuid => "TEXT".to_string(),
            Self::Real | Self::Double => "REAL".to_string(),
            Self::Decimal(_, _) => "NUMERIC".to_string(),
            Self::Blob => "BLOB".to_string(),
            Self::Custom(expr) => expr.clone(),
        }
    }

    /// Returns the SQL type name for MySQL.
    #[must_use]
    pub fn mysql_name(&self) -> String {
        match self {
            Self::Integer => "INT".to_string(),
            Self::BigInt => "BIGINT".to_string(),
            Self::SmallInt => "SMALLINT".to_string(),
            Self::Text => "TEXT".to_string(),
            Self::Varchar(len) => format!("VARCHAR({len})"),
            Self::Char(len) => format!("CHAR({len})"),
            Self::Boolean => "TINYINT(1)".to_string(),
            Self::DateTime => "DATETIME".to_string(),
            Self::Date => "DATE".to_string(),
            Self::Time => "TIME".to_string(),
            Self::Timestamp => "TIMESTAMP".to_string(),
            Self::Real => "FLOAT".to_string(),
            Self::Double => "DOUBLE".to_string(),
            Self::Decimal(p, s) => format!("DECIMAL({p}, {s})"),
            Self::Blob => "BLOB".to_string(),
            Self::Json => "JSON".to_string(),
            Self::Uuid => "CHAR(36)".to_string(),
            Self::Custom(expr) => expr.clone(),
        }
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultValue {
    /// No default value.
    #[default]
    None,
    /// NULL default.
    Null,
    /// Boolean default.
    Bool(bool),
    /// Integer default.
    Integer(i64),
    /// Float default. Must be finite.
    Float(f64),
    /// String default, rendered as an escaped literal.
    String(String),
    /// SQL expression (e.g. `CURRENT_TIMESTAMP`).
    Expression(String),
}

impl DefaultValue {
    /// Returns the SQL representation of this default value.
    #[must_use]
    pub fn to_sql(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Null => Some("NULL".to_string()),
            Self::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::String(s) => Some(format!("'{}'", s.replace('\'', "''"))),
            Self::Expression(expr) => Some(expr.clone()),
        }
    }

    /// Returns whether no default is declared.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Where a new column should be placed, for dialects that support it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Place the column first.
    First,
    /// Place the column right after another column.
    After(String),
}

/// One expected column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Declared SQL type.
    #[serde(rename = "type")]
    pub sql_type: SqlType,
    /// Whether the column allows NULL values.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Default value.
    #[serde(default, skip_serializing_if = "DefaultValue::is_none")]
    pub default: DefaultValue,
    /// Placement hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

const fn default_nullable() -> bool {
    true
}

impl ColumnSpec {
    /// Creates a nullable column with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: true,
            default: DefaultValue::None,
            placement: None,
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the column as nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default = value;
        self
    }

    /// Places the column after `column`.
    #[must_use]
    pub fn after(mut self, column: impl Into<String>) -> Self {
        self.placement = Some(Placement::After(column.into()));
        self
    }

    /// Places the column first.
    #[must_use]
    pub fn first(mut self) -> Self {
        self.placement = Some(Placement::First);
        self
    }
}

/// A table and the columns it is expected to have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name.
    pub name: String,
    /// Expected columns, in declared order.
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    /// Creates an empty table spec.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Adds an expected column.
    #[must_use]
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}
