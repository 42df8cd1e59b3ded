//! Serializer layout: which fields, in which column order, starting at which row.
//!
//! A [`Schema`] is immutable once built. It can be constructed directly with
//! [`Schema::new`] or from a JSON configuration document with
//! [`Schema::from_json`]:
//!
//! ```json
//! {
//!     "start_index": 1,
//!     "fields": ["shop_name", "order_number", "quantity"],
//!     "enable_transaction": true
//! }
//! ```
//!
//! `start_index` is the 0-based index of the first data row, so `1` skips a
//! single header row. `enable_transaction` defaults to `true`.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{ConfigError, ConfigResult};
use crate::validation::validate_serializer_config;

/// Decoded configuration, before semantic checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchemaConfig {
    start_index: usize,
    fields: Vec<String>,
    #[serde(default = "default_enable_transaction")]
    enable_transaction: bool,
}

fn default_enable_transaction() -> bool {
    true
}

/// Validated serializer layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    start_index: usize,
    fields: Vec<String>,
    enable_transaction: bool,
}

impl Schema {
    /// Build a schema with transactions enabled.
    ///
    /// Fails when `start_index` is zero or `fields` is empty. Duplicate names
    /// are accepted.
    pub fn new<I, S>(start_index: usize, fields: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if start_index == 0 {
            return Err(ConfigError::InvalidStartIndex(start_index.to_string()));
        }
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(ConfigError::EmptyFields);
        }
        Ok(Self {
            start_index,
            fields,
            enable_transaction: true,
        })
    }

    /// Toggle the transactional import scope.
    pub fn with_transaction(mut self, enabled: bool) -> Self {
        self.enable_transaction = enabled;
        self
    }

    /// Build a schema from a JSON configuration document.
    ///
    /// Keys other than `start_index`, `fields` and `enable_transaction` are
    /// checked against the embedded configuration schema but otherwise
    /// ignored here.
    pub fn from_json(config: &JsonValue) -> ConfigResult<Self> {
        check_shape(config)?;
        validate_serializer_config(config).map_err(ConfigError::Schema)?;

        let decoded: SchemaConfig = serde_json::from_value(config.clone())?;
        Ok(Self::new(decoded.start_index, decoded.fields)?
            .with_transaction(decoded.enable_transaction))
    }

    /// Parse and build from JSON text.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: JsonValue = serde_json::from_str(json)?;
        Self::from_json(&config)
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn enable_transaction(&self) -> bool {
        self.enable_transaction
    }

    /// Number of declared columns.
    pub fn width(&self) -> usize {
        self.fields.len()
    }
}

/// Targeted checks for the common mistakes, so they get a precise error
/// rather than a list of schema violations.
fn check_shape(config: &JsonValue) -> ConfigResult<()> {
    let object = match config {
        JsonValue::Null => return Err(ConfigError::MissingConfig),
        JsonValue::Object(object) => object,
        other => {
            return Err(ConfigError::Schema(vec![format!(
                "configuration must be an object, got {}",
                other
            )]))
        }
    };

    match object.get("start_index") {
        None => return Err(ConfigError::MissingStartIndex),
        Some(value) if value.as_u64().map_or(true, |n| n == 0) => {
            return Err(ConfigError::InvalidStartIndex(value.to_string()));
        }
        Some(_) => {}
    }

    match object.get("fields") {
        None | Some(JsonValue::Null) => return Err(ConfigError::MissingFields),
        Some(JsonValue::Array(names)) if names.is_empty() => return Err(ConfigError::EmptyFields),
        Some(JsonValue::Array(names)) if names.iter().all(JsonValue::is_string) => {}
        Some(_) => return Err(ConfigError::InvalidFields),
    }

    if let Some(flag) = object.get("enable_transaction") {
        if !flag.is_boolean() {
            return Err(ConfigError::InvalidTransactionFlag(flag.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_config() {
        assert_eq!(Schema::from_json(&JsonValue::Null), Err(ConfigError::MissingConfig));
    }

    #[test]
    fn test_start_index_validation() {
        assert_eq!(
            Schema::from_json(&json!({})),
            Err(ConfigError::MissingStartIndex)
        );
        assert!(matches!(
            Schema::from_json(&json!({ "start_index": 0, "fields": ["a"] })),
            Err(ConfigError::InvalidStartIndex(_))
        ));
        assert!(matches!(
            Schema::from_json(&json!({ "start_index": "A", "fields": ["a"] })),
            Err(ConfigError::InvalidStartIndex(_))
        ));
        assert!(matches!(
            Schema::from_json(&json!({ "start_index": -1, "fields": ["a"] })),
            Err(ConfigError::InvalidStartIndex(_))
        ));
        assert!(matches!(
            Schema::from_json(&json!({ "start_index": 1.5, "fields": ["a"] })),
            Err(ConfigError::InvalidStartIndex(_))
        ));
    }

    #[test]
    fn test_fields_validation() {
        assert_eq!(
            Schema::from_json(&json!({ "start_index": 1 })),
            Err(ConfigError::MissingFields)
        );
        assert_eq!(
            Schema::from_json(&json!({ "start_index": 1, "fields": null })),
            Err(ConfigError::MissingFields)
        );
        assert_eq!(
            Schema::from_json(&json!({ "start_index": 1, "fields": 1 })),
            Err(ConfigError::InvalidFields)
        );
        assert_eq!(
            Schema::from_json(&json!({ "start_index": 1, "fields": [] })),
            Err(ConfigError::EmptyFields)
        );
    }

    #[test]
    fn test_enable_transaction_validation() {
        let config = json!({
            "start_index": 1,
            "fields": ["field1", "field2"],
            "enable_transaction": "A"
        });
        assert!(matches!(
            Schema::from_json(&config),
            Err(ConfigError::InvalidTransactionFlag(_))
        ));
    }

    #[test]
    fn test_validation_should_pass() {
        let schema = Schema::from_json(&json!({
            "start_index": 1,
            "fields": ["field1", "field2"]
        }))
        .unwrap();
        assert_eq!(schema.start_index(), 1);
        assert_eq!(schema.fields(), &["field1".to_string(), "field2".to_string()]);
        assert!(schema.enable_transaction());

        let schema = Schema::from_json_str(
            r#"{ "start_index": 1, "fields": ["field1", "field2"], "enable_transaction": false }"#,
        )
        .unwrap();
        assert!(!schema.enable_transaction());
    }

    #[test]
    fn test_schema_violations_are_collected() {
        let result = Schema::from_json(&json!({
            "start_index": 1,
            "fields": ["field1"],
            "unexpected": true
        }));
        assert!(matches!(result, Err(ConfigError::Schema(errors)) if !errors.is_empty()));
    }

    #[test]
    fn test_new_checks_arguments() {
        assert!(Schema::new(0, ["a"]).is_err());
        assert_eq!(Schema::new(1, Vec::<String>::new()), Err(ConfigError::EmptyFields));

        let schema = Schema::new(2, ["a", "a"]).unwrap().with_transaction(false);
        assert_eq!(schema.width(), 2);
        assert!(!schema.enable_transaction());
    }
}
