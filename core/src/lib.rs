//! # Sheetclean - schema-driven validation for spreadsheet rows
//!
//! Sheetclean checks tabular data (spreadsheets, CSV exports) against a
//! declared schema of typed fields, collects every problem as a readable
//! message, and hands clean rows to an import step only when the whole sheet
//! is valid.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Grid     │────▶│ RowPipeline │────▶│   Fields    │────▶│    Hooks    │
//! │ (CSV / mem) │     │ (per run)   │     │  (coerce)   │     │  (import)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use sheetclean::{Field, NoHooks, Schema, Serializer, Value, Worksheet};
//!
//! let serializer = Serializer::builder(Schema::new(1, ["shop", "quantity"]).unwrap())
//!     .field("shop", Field::text("Shop Name", 10))
//!     .field("quantity", Field::integer("Quantity"))
//!     .build()
//!     .unwrap();
//!
//! let sheet = Worksheet::from_rows(vec![
//!     vec!["Shop Name", "Quantity"],
//!     vec!["Shop A", "100"],
//!     vec!["", "many"],
//! ]);
//!
//! let report = serializer.run(&sheet, &mut NoHooks).unwrap();
//! assert_eq!(
//!     report.errors,
//!     [
//!         "[Row 3] Shop Name is not allowed to be blank.",
//!         "[Row 3] Quantity cannot convert many to number.",
//!     ]
//! );
//! assert_eq!(report.cleaned_data[0]["quantity"], Value::Int(100));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Cell values and cleaned rows
//! - [`fields`] - Typed field descriptors
//! - [`schema`] - Row layout
//! - [`serializer`] - Field registration
//! - [`pipeline`] - Row iteration, hooks and run report
//! - [`grid`] - Grid trait, in-memory worksheet, CSV loading
//! - [`definition`] - JSON serializer definitions
//! - [`validation`] - JSON Schema checks for definitions
//! - [`logs`] - Run logging

// Core modules
pub mod error;
pub mod models;

// Fields and layout
pub mod fields;
pub mod schema;
pub mod serializer;

// Running
pub mod pipeline;

// Input
pub mod grid;

// Configuration
pub mod definition;
pub mod validation;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    ConfigResult,
    CsvError,
    CsvResult,
    FieldError,
    ImportError,
    PipelineError,
    RunResult,
    ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CleanedRow, Value};

// =============================================================================
// Re-exports - Fields and layout
// =============================================================================

pub use fields::{DatePattern, Field, FieldKind};
pub use schema::Schema;
pub use serializer::{Serializer, SerializerBuilder};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    CellContext,
    Hooks,
    NoHooks,
    Passthrough,
    RowPipeline,
    RunReport,
    RunStatus,
    TransactionScope,
    ValidationStats,
};

// =============================================================================
// Re-exports - Grid
// =============================================================================

pub use grid::csv::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    load_bytes,
    load_file,
    CsvSheet,
};
pub use grid::{Grid, Worksheet};

// =============================================================================
// Re-exports - Definitions
// =============================================================================

pub use definition::{example_definition, field_types_description, FieldSpec, SerializerDefinition};
pub use validation::{is_valid, is_valid_serializer_config, validate, validate_serializer_config};

// =============================================================================
// Re-exports - Logging
// =============================================================================

pub use logs::{LogEntry, LogLevel, LOG_BROADCASTER};
