//! JSON Schema validation for serializer configuration documents.
//!
//! Serializer definitions loaded from JSON are checked against an embedded
//! JSON Schema (Draft 7) before they are decoded, so structural mistakes are
//! reported all at once instead of one serde error at a time.
//!
//! The schema is embedded at compile time from
//! `schemas/serializer-config.json`.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use sheetclean::validation::{is_valid_serializer_config, validate_serializer_config};
//!
//! let config = json!({ "start_index": 1, "fields": ["shop_name", "quantity"] });
//! assert!(validate_serializer_config(&config).is_ok());
//!
//! let broken = json!({ "start_index": 0, "fields": [] });
//! assert!(!is_valid_serializer_config(&broken));
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static SERIALIZER_CONFIG_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/serializer-config.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON document against a JSON Schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick yes/no variant of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a serializer configuration document.
pub fn validate_serializer_config(data: &Value) -> Result<(), Vec<String>> {
    validate(&SERIALIZER_CONFIG_SCHEMA, data)
}

/// Quick check of a serializer configuration document.
pub fn is_valid_serializer_config(data: &Value) -> bool {
    is_valid(&SERIALIZER_CONFIG_SCHEMA, data)
}
