//! Outcome of a run.

use serde::Serialize;

use crate::models::CleanedRow;

/// Which branch a run ended in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunStatus {
    /// Validation errors were collected; nothing was imported.
    Invalid,
    /// Validation passed and the import step succeeded.
    Imported,
    /// Validation passed but the import step reported a failure.
    ImportFailed { errors: Vec<String> },
}

/// Row counters of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    /// Data rows visited before the blank-row sentinel
    pub rows_checked: usize,
    pub rows_valid: usize,
    pub rows_invalid: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    /// Validation errors, in sheet order
    pub errors: Vec<String>,
    /// Cleaned rows that passed validation
    pub cleaned_data: Vec<CleanedRow>,
    pub stats: ValidationStats,
}

impl RunReport {
    /// Check if the rows were imported
    pub fn is_ok(&self) -> bool {
        self.status == RunStatus::Imported
    }

    pub fn summary(&self) -> String {
        format!(
            "Checked: {} rows, {} valid, {} invalid, {} errors",
            self.stats.rows_checked,
            self.stats.rows_valid,
            self.stats.rows_invalid,
            self.errors.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let report = RunReport {
            status: RunStatus::Invalid,
            errors: vec!["[Row 2] Name is not allowed to be blank.".into()],
            cleaned_data: Vec::new(),
            stats: ValidationStats {
                rows_checked: 3,
                rows_valid: 2,
                rows_invalid: 1,
            },
        };
        assert!(!report.is_ok());
        assert_eq!(report.summary(), "Checked: 3 rows, 2 valid, 1 invalid, 1 errors");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(RunStatus::ImportFailed {
            errors: vec!["duplicate".into()],
        })
        .unwrap();
        assert_eq!(json["kind"], "import_failed");
        assert_eq!(json["errors"][0], "duplicate");
    }
}
