//! Error types for the sheetclean validation pipeline.
//!
//! The hierarchy mirrors the three failure classes a run can hit:
//!
//! - [`ConfigError`] - malformed serializer definitions, raised at construction
//! - [`ValidationError`] - a formatted per-cell or per-row message, collected
//! - [`ImportError`] - failures of the import step after validation succeeded
//!
//! plus [`FieldError`] for standalone field validation, [`CsvError`] for CSV
//! loading and [`PipelineError`] for everything that aborts a run.
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::fmt::Display;

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors in a serializer definition.
///
/// These are fatal: they are returned while building a [`crate::Schema`] or
/// [`crate::Serializer`] and never end up in a run's error list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No configuration object at all.
    #[error("Serializer configuration is required")]
    MissingConfig,

    /// `start_index` not given.
    #[error("start_index is required")]
    MissingStartIndex,

    /// `start_index` is zero, negative or not an integer.
    #[error("start_index must be a positive integer, got {0}")]
    InvalidStartIndex(String),

    /// `fields` not given.
    #[error("fields is required")]
    MissingFields,

    /// `fields` is not a list of names.
    #[error("fields must be a list of field names")]
    InvalidFields,

    /// `fields` is an empty list.
    #[error("fields must contain at least one field name")]
    EmptyFields,

    /// `enable_transaction` is present but not a boolean.
    #[error("enable_transaction must be a boolean, got {0}")]
    InvalidTransactionFlag(String),

    /// The configuration document failed JSON Schema validation.
    #[error("Invalid serializer configuration: {}", .0.join("; "))]
    Schema(Vec<String>),

    /// A declared field name has no registered field.
    #[error("{0} is not defined in the serializer fields")]
    FieldNotExist(String),

    /// An extra-clean hook targets a field that is not declared.
    #[error("extra clean hook registered for undeclared field {0}")]
    HookForUnknownField(String),

    /// The same choice appears twice in a field's choice set.
    #[error("Field '{field}' choice has duplication: {choice}")]
    DuplicateChoice { field: String, choice: String },

    /// Any other inconsistent field option.
    #[error("Field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// The definition document could not be decoded.
    #[error("Invalid definition: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single human-readable validation message.
///
/// Messages raised by fields are already formatted as
/// `[Row {index}] {verbose name} {reason}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Wrap an already formatted message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the standard row-scoped message.
    pub fn at_row(index: usize, verbose_name: &str, reason: impl Display) -> Self {
        Self::new(format!("[Row {}] {} {}", index, verbose_name, reason))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

/// What validating a standalone field can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The value is rejected.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The field itself is misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// =============================================================================
// Import Errors
// =============================================================================

/// Errors raised by the import step.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The designated "import failed" signal, routed to `operation_failed`.
    #[error("Import operation failed: {}", errors.join("; "))]
    Failed { errors: Vec<String> },

    /// Anything else; propagated out of the run.
    #[error("Import operation aborted: {0}")]
    Fatal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ImportError {
    pub fn failed<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ImportError::Failed {
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fatal(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ImportError::Fatal(err.into())
    }
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while loading a CSV file into a worksheet.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode content.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Delimiter is not a single-byte character.
    #[error("Unsupported delimiter: {0:?}")]
    InvalidDelimiter(char),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Errors that abort a pipeline run.
///
/// Validation problems are never reported through this type; they are
/// collected in [`crate::RunReport::errors`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error discovered while running.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The import step failed with something other than the failure signal.
    #[error("Import error: {0}")]
    Import(#[source] ImportError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for pipeline runs.
pub type RunResult<T> = Result<T, PipelineError>;
