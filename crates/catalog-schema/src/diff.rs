//! Per-column reconciliation outcomes.

use serde::Serialize;

use crate::error::{Result, SchemaError};

/// What happened to one expected column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ColumnOutcome {
    /// The column was missing and has been added.
    Applied,
    /// The column was already present; nothing was issued.
    Skipped,
    /// The column was missing and adding it failed.
    Failed {
        /// Store error message.
        reason: String,
    },
}

/// Outcome for one expected column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnChange {
    /// Column name.
    pub column: String,
    /// What happened.
    #[serde(flatten)]
    pub outcome: ColumnOutcome,
}

/// The result of reconciling one table, in declared column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDiff {
    table: String,
    changes: Vec<ColumnChange>,
}

impl SchemaDiff {
    /// Creates an empty diff for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            changes: Vec::new(),
        }
    }

    /// Records an outcome.
    pub fn record(&mut self, column: impl Into<String>, outcome: ColumnOutcome) {
        self.changes.push(ColumnChange {
            column: column.into(),
            outcome,
        });
    }

    /// Records a column that was added.
    pub fn record_applied(&mut self, column: impl Into<String>) {
        self.record(column, ColumnOutcome::Applied);
    }

    /// Records a column that was already present.
    pub fn record_skipped(&mut self, column: impl Into<String>) {
        self.record(column, ColumnOutcome::Skipped);
    }

    /// Records a column whose ALTER failed.
    pub fn record_failed(&mut self, column: impl Into<String>, reason: impl Into<String>) {
        self.record(
            column,
            ColumnOutcome::Failed {
                reason: reason.into(),
            },
        );
    }

    /// Returns the reconciled table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns every recorded change.
    #[must_use]
    pub fn changes(&self) -> &[ColumnChange] {
        &self.changes
    }

    /// Returns the outcome recorded for `column`.
    #[must_use]
    pub fn outcome(&self, column: &str) -> Option<&ColumnOutcome> {
        self.changes
            .iter()
            .find(|c| c.column == column)
            .map(|c| &c.outcome)
    }

    /// Returns the columns that were added.
    pub fn applied(&self) -> impl Iterator<Item = &str> {
        self.columns_where(|o| matches!(o, ColumnOutcome::Applied))
    }

    /// Returns the columns that were already present.
    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.columns_where(|o| matches!(o, ColumnOutcome::Skipped))
    }

    /// Returns the columns that failed, with their reasons.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.changes.iter().filter_map(|c| match &c.outcome {
            ColumnOutcome::Failed { reason } => Some((c.column.as_str(), reason.as_str())),
            _ => None,
        })
    }

    fn columns_where(&self, pred: fn(&ColumnOutcome) -> bool) -> impl Iterator<Item = &str> {
        self.changes
            .iter()
            .filter(move |c| pred(&c.outcome))
            .map(|c| c.column.as_str())
    }

    /// Returns how many ALTER statements were attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| !matches!(c.outcome, ColumnOutcome::Skipped))
            .count()
    }

    /// Returns whether no ALTER statement was needed.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.attempted() == 0
    }

    /// Returns whether every expected column is now present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Fails with [`SchemaError::Incomplete`] if any column failed.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Incomplete`] listing every failed column.
    pub fn ensure_complete(self) -> Result<Self> {
        if self.is_complete() {
            return Ok(self);
        }
        Err(SchemaError::Incomplete {
            failed: self.failed().map(|(c, _)| c.to_string()).collect(),
            table: self.table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SchemaDiff {
        let mut diff = SchemaDiff::new("users");
        diff.record_skipped("id");
        diff.record_applied("avatar_url");
        diff.record_failed("bio", "permission denied");
        diff.record_applied("locale");
        diff
    }

    #[test]
    fn test_queries() {
        let diff = sample();
        assert_eq!(diff.applied().collect::<Vec<_>>(), ["avatar_url", "locale"]);
        assert_eq!(diff.skipped().collect::<Vec<_>>(), ["id"]);
        assert_eq!(
            diff.failed().collect::<Vec<_>>(),
            [("bio", "permission denied")]
        );
        assert_eq!(diff.attempted(), 3);
        assert!(!diff.is_noop());
        assert!(!diff.is_complete());
        assert_eq!(diff.outcome("locale"), Some(&ColumnOutcome::Applied));
    }

    #[test]
    fn test_ensure_complete() {
        let err = sample().ensure_complete().unwrap_err();
        match err {
            SchemaError::Incomplete { table, failed } => {
                assert_eq!(table, "users");
                assert_eq!(failed, vec!["bio"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let mut diff = SchemaDiff::new("users");
        diff.record_skipped("id");
        assert!(diff.ensure_complete().unwrap().is_noop());
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["table"], "users");
        assert_eq!(json["changes"][1]["column"], "avatar_url");
        assert_eq!(json["changes"][1]["status"], "applied");
        assert_eq!(json["changes"][2]["reason"], "permission denied");
    }
}
