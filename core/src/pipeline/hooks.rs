//! Extension points of a run.

use crate::error::{ImportError, ValidationError};
use crate::models::{CleanedRow, Value};

/// Where a cell sits, for building row-scoped messages from hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellContext<'a> {
    /// 1-based sheet row
    pub row_index: usize,
    pub field_name: &'a str,
    pub verbose_name: &'a str,
}

impl CellContext<'_> {
    /// `[Row {index}] {verbose name} {reason}`
    pub fn error(&self, reason: impl std::fmt::Display) -> ValidationError {
        ValidationError::at_row(self.row_index, self.verbose_name, reason)
    }
}

/// Extra per-field cleaning after the field's own validation.
///
/// `Ok(None)` keeps the cleaned value, `Ok(Some(v))` replaces it, an error is
/// recorded like any other validation failure.
pub type ExtraClean =
    dyn Fn(&Value, &CellContext<'_>) -> Result<Option<Value>, ValidationError> + Send + Sync;

/// Callbacks invoked by a run. Every method defaults to a no-op.
pub trait Hooks {
    /// Cross-field check for a row whose cells all validated.
    fn row_extra_validation(
        &mut self,
        _row_index: usize,
        _row: &CleanedRow,
    ) -> Result<(), ValidationError> {
        Ok(())
    }

    /// All rows are valid; called before the import.
    fn validated(&mut self) {}

    /// At least one error was collected; nothing is imported.
    fn invalid(&mut self, _errors: &[String]) {}

    /// Persist the cleaned rows.
    fn import_operation(&mut self, _rows: &[CleanedRow]) -> Result<(), ImportError> {
        Ok(())
    }

    fn operation_success(&mut self) {}

    /// The import reported [`ImportError::Failed`].
    fn operation_failed(&mut self, _errors: &[String]) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl Hooks for NoHooks {}

/// Unit of work around the import step.
pub trait TransactionScope {
    fn begin(&mut self) {}

    fn commit(&mut self) {}

    fn rollback(&mut self) {}

    /// Run `work`, committing on success and rolling back on any error.
    fn atomic(
        &mut self,
        work: &mut dyn FnMut() -> Result<(), ImportError>,
    ) -> Result<(), ImportError> {
        self.begin();
        match work() {
            Ok(()) => {
                self.commit();
                Ok(())
            }
            Err(err) => {
                self.rollback();
                Err(err)
            }
        }
    }
}

/// Scope without a backing store.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl TransactionScope for Passthrough {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<&'static str>,
    }

    impl TransactionScope for Recorder {
        fn begin(&mut self) {
            self.events.push("begin");
        }

        fn commit(&mut self) {
            self.events.push("commit");
        }

        fn rollback(&mut self) {
            self.events.push("rollback");
        }
    }

    #[test]
    fn test_atomic_commits() {
        let mut scope = Recorder::default();
        scope.atomic(&mut || Ok(())).unwrap();
        assert_eq!(scope.events, ["begin", "commit"]);
    }

    #[test]
    fn test_atomic_rolls_back() {
        let mut scope = Recorder::default();
        let result = scope.atomic(&mut || Err(ImportError::failed(["duplicate"])));
        assert!(matches!(result, Err(ImportError::Failed { .. })));
        assert_eq!(scope.events, ["begin", "rollback"]);
    }

    #[test]
    fn test_cell_context_message() {
        let context = CellContext {
            row_index: 4,
            field_name: "qty",
            verbose_name: "Quantity",
        };
        assert_eq!(
            context.error("must be even.").message(),
            "[Row 4] Quantity must be even."
        );
    }

    #[test]
    fn test_default_hooks_accept_everything() {
        let mut hooks = NoHooks;
        assert!(hooks.row_extra_validation(1, &CleanedRow::new()).is_ok());
        assert!(hooks.import_operation(&[]).is_ok());
    }
}
