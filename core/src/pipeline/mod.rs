//! Row pipeline: walks a grid, validates every declared cell and decides
//! whether the import step runs.
//!
//! # Run order
//!
//! 1. The populated header cells (row `start_index - 1`) must match the
//!    number of declared fields, otherwise the run ends with one structural
//!    error and no row is read.
//! 2. Rows from `start_index` on are validated until the first row that is
//!    blank across all declared columns.
//! 3. Each cell goes through its field, then its extra-clean hook; a row
//!    without cell errors goes through [`Hooks::row_extra_validation`].
//! 4. Any error ends the run in [`Hooks::invalid`]. Otherwise the rows are
//!    handed to [`Hooks::import_operation`], inside the transaction scope
//!    when the schema enables it.

mod hooks;
mod report;

pub use hooks::{CellContext, ExtraClean, Hooks, NoHooks, Passthrough, TransactionScope};
pub use report::{RunReport, RunStatus, ValidationStats};

use crate::error::{FieldError, ImportError, PipelineError, RunResult};
use crate::grid::Grid;
use crate::logs::{log_error, log_info, log_row_error, log_success, log_warning};
use crate::models::{CleanedRow, Value};
use crate::schema::Schema;
use crate::serializer::Column;

/// Errors shown in the log before the rest is summarized.
const LOGGED_ERRORS: usize = 5;

/// State of a single run over one grid.
///
/// Owns its copy of the fields, so a [`crate::Serializer`] can spawn any
/// number of pipelines. Consumed by [`RowPipeline::run`].
#[derive(Debug)]
pub struct RowPipeline<'g, G: Grid + ?Sized> {
    grid: &'g G,
    schema: Schema,
    columns: Vec<Column>,
    errors: Vec<String>,
    cleaned_data: Vec<CleanedRow>,
    stats: ValidationStats,
}

impl<'g, G: Grid + ?Sized> RowPipeline<'g, G> {
    pub(crate) fn new(grid: &'g G, schema: Schema, columns: Vec<Column>) -> Self {
        Self {
            grid,
            schema,
            columns,
            errors: Vec::new(),
            cleaned_data: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validate the grid, then import or report.
    ///
    /// Validation problems end up in the report; only configuration errors
    /// and [`ImportError::Fatal`] are returned as `Err`.
    pub fn run<H, T>(mut self, hooks: &mut H, scope: &mut T) -> RunResult<RunReport>
    where
        H: Hooks + ?Sized,
        T: TransactionScope + ?Sized,
    {
        log_info(format!(
            "Validating {} columns, data starts at row {}",
            self.columns.len(),
            self.schema.start_index() + 1
        ));

        if let Err(message) = self.check_columns() {
            log_error(message.clone());
            self.errors.push(message);
            return Ok(self.finish_invalid(hooks));
        }

        self.validate_rows(hooks)?;
        log_info(format!(
            "{} rows checked: {} valid, {} invalid",
            self.stats.rows_checked, self.stats.rows_valid, self.stats.rows_invalid
        ));

        if !self.errors.is_empty() {
            return Ok(self.finish_invalid(hooks));
        }

        log_success("All rows valid");
        hooks.validated();

        let status = match self.import(hooks, scope) {
            Ok(()) => {
                log_success(format!("Imported {} rows", self.cleaned_data.len()));
                hooks.operation_success();
                RunStatus::Imported
            }
            Err(ImportError::Failed { errors }) => {
                log_error(format!("Import failed with {} errors", errors.len()));
                hooks.operation_failed(&errors);
                RunStatus::ImportFailed { errors }
            }
            Err(err) => {
                log_error(format!("Import aborted: {}", err));
                return Err(PipelineError::Import(err));
            }
        };

        Ok(self.into_report(status))
    }

    /// Compare populated header cells with the declared fields.
    fn check_columns(&self) -> Result<(), String> {
        let header_row = self.schema.start_index() - 1;
        let populated = (0..self.grid.max_column())
            .filter(|&column| {
                self.grid
                    .cell(header_row, column)
                    .map_or(false, |value| !value.is_empty_cell())
            })
            .count();

        let required = self.columns.len();
        if populated == required {
            Ok(())
        } else {
            Err(format!(
                "Required {} columns, but the given sheet has {} columns. \
                 [Tip] You might have selected the wrong file format.",
                required, populated
            ))
        }
    }

    fn validate_rows<H: Hooks + ?Sized>(&mut self, hooks: &mut H) -> RunResult<()> {
        for row in self.schema.start_index()..self.grid.max_row() {
            if self.is_last_row(row) {
                break;
            }

            let index = row + 1;
            let errors_before = self.errors.len();
            let cleaned = self.clean_row(row, index)?;

            if self.errors.len() == errors_before {
                if let Err(err) = hooks.row_extra_validation(index, &cleaned) {
                    self.errors.push(err.into_message());
                }
            }

            self.stats.rows_checked += 1;
            if self.errors.len() == errors_before {
                self.stats.rows_valid += 1;
                self.cleaned_data.push(cleaned);
            } else {
                self.stats.rows_invalid += 1;
            }

            for column in &mut self.columns {
                column.field.reset();
            }
        }
        Ok(())
    }

    /// Validate every declared cell of `row`, collecting errors.
    fn clean_row(&mut self, row: usize, index: usize) -> RunResult<CleanedRow> {
        let mut cleaned = CleanedRow::new();

        for (position, column) in self.columns.iter_mut().enumerate() {
            let raw = self.grid.cell(row, position).cloned().unwrap_or_default();
            column.field.set_value(raw);

            match column.field.validate(index) {
                Ok(()) => {}
                Err(FieldError::Invalid(err)) => {
                    self.errors.push(err.into_message());
                    continue;
                }
                Err(FieldError::Config(err)) => return Err(err.into()),
            }

            let mut value = column.field.cleaned_value().cloned().unwrap_or_default();
            if let Some(extra_clean) = &column.extra_clean {
                let context = CellContext {
                    row_index: index,
                    field_name: &column.name,
                    verbose_name: column.field.verbose_name(),
                };
                match extra_clean(&value, &context) {
                    Ok(Some(replacement)) => value = replacement,
                    Ok(None) => {}
                    Err(err) => {
                        self.errors.push(err.into_message());
                        continue;
                    }
                }
            }

            cleaned.insert(column.name.clone(), value);
        }

        Ok(cleaned)
    }

    /// A row blank across every declared column ends the data.
    fn is_last_row(&self, row: usize) -> bool {
        (0..self.columns.len()).all(|column| {
            self.grid
                .cell(row, column)
                .map_or(true, Value::is_empty_cell)
        })
    }

    fn import<H, T>(&self, hooks: &mut H, scope: &mut T) -> Result<(), ImportError>
    where
        H: Hooks + ?Sized,
        T: TransactionScope + ?Sized,
    {
        let rows = &self.cleaned_data;
        if self.schema.enable_transaction() {
            scope.atomic(&mut || hooks.import_operation(rows))
        } else {
            hooks.import_operation(rows)
        }
    }

    fn finish_invalid<H: Hooks + ?Sized>(self, hooks: &mut H) -> RunReport {
        log_warning(format!("{} validation errors", self.errors.len()));
        for message in self.errors.iter().take(LOGGED_ERRORS) {
            log_row_error(message.clone());
        }
        if self.errors.len() > LOGGED_ERRORS {
            log_info(format!("... and {} more", self.errors.len() - LOGGED_ERRORS));
        }

        hooks.invalid(&self.errors);
        self.into_report(RunStatus::Invalid)
    }

    fn into_report(self, status: RunStatus) -> RunReport {
        RunReport {
            status,
            errors: self.errors,
            cleaned_data: self.cleaned_data,
            stats: self.stats,
        }
    }
}
