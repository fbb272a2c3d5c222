//! Error types for filter specification construction.
//!
//! Request-time input is never an error: malformed page, limit or filter
//! values degrade to defaults. Only a badly declared [`FilterSpec`] fails.
//!
//! [`FilterSpec`]: crate::FilterSpec

use thiserror::Error;

/// Errors raised while building a [`FilterSpec`](crate::FilterSpec).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// A table, column or sort identifier is not a plain SQL identifier.
    #[error("invalid {kind} identifier: {ident:?}")]
    InvalidIdentifier {
        /// What the identifier names (table, column, sort column).
        kind: &'static str,
        /// The offending identifier.
        ident: String,
    },

    /// A filter parameter name is empty or collides with a reserved key.
    #[error("invalid filter parameter name: {0:?}")]
    InvalidParam(String),

    /// The same filter parameter was declared twice.
    #[error("filter parameter declared twice: {0}")]
    DuplicateParam(String),

    /// Page size bounds are inconsistent.
    #[error("invalid limits: default {default_limit}, max {max_limit}")]
    InvalidLimits {
        /// Declared default page size.
        default_limit: u32,
        /// Declared maximum page size.
        max_limit: u32,
    },

    /// `max_values_per_field` must allow at least one value.
    #[error("max values per field must be at least 1")]
    InvalidValueCap,

    /// An enum coercion was declared without any variants.
    #[error("enum coercion for '{0}' has no variants")]
    EmptyEnum(String),

    /// The comparison cannot be applied to the declared coercion.
    #[error("field '{param}' cannot use {comparison} with {coercion} values")]
    IncompatibleCoercion {
        /// The filter parameter.
        param: String,
        /// The comparison kind.
        comparison: &'static str,
        /// The coercion kind.
        coercion: &'static str,
    },
}

/// Result type alias for specification construction.
pub type Result<T> = std::result::Result<T, SpecError>;
