//! SQL identifier validation.
//!
//! Identifiers cannot be bound as parameters, so every table and column name
//! that reaches generated SQL text is checked against
//! `[A-Za-z_][A-Za-z0-9_]*`. Table names may be dot-qualified
//! (`schema.table`); column names may not.

use crate::error::{Result, SpecError};

/// Returns whether `ident` is a plain, optionally dot-qualified identifier.
#[must_use]
pub fn is_valid_identifier(ident: &str) -> bool {
    !ident.is_empty() && ident.split('.').all(is_valid_segment)
}

/// Returns whether `ident` is a single, unqualified identifier.
#[must_use]
pub fn is_valid_column_name(ident: &str) -> bool {
    is_valid_segment(ident)
}

fn is_valid_segment(seg: &str) -> bool {
    let mut chars = seg.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn check(kind: &'static str, ident: &str) -> Result<()> {
    if is_valid_identifier(ident) {
        Ok(())
    } else {
        Err(SpecError::InvalidIdentifier {
            kind,
            ident: ident.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(is_valid_identifier("stores"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("avatar_url2"));
        assert!(is_valid_identifier("main.stores"));
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1st"));
        assert!(!is_valid_identifier("name; DROP TABLE users"));
        assert!(!is_valid_identifier("a..b"));
        assert!(!is_valid_identifier("na-me"));
        assert!(!is_valid_identifier("\"quoted\""));
    }

    #[test]
    fn test_column_names_are_unqualified() {
        assert!(is_valid_column_name("avatar_url"));
        assert!(!is_valid_column_name("a.b"));
        assert!(!is_valid_column_name("main.stores"));
        assert!(!is_valid_column_name(""));
        assert!(!is_valid_column_name("9lives"));
    }

    #[test]
    fn test_check_reports_kind() {
        let err = check("column", "bad name").unwrap_err();
        assert_eq!(
            err,
            SpecError::InvalidIdentifier {
                kind: "column",
                ident: "bad name".to_string()
            }
        );
    }
}
