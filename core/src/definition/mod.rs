//! Serializer definitions as JSON documents.
//!
//! A definition couples the [`Schema`] layout with one [`FieldSpec`] per
//! declared column, so a serializer can be described without writing Rust:
//!
//! ```json
//! {
//!     "description": "Shop orders",
//!     "start_index": 1,
//!     "fields": ["shop_name", "quantity"],
//!     "definitions": {
//!         "shop_name": { "type": "text", "verbose_name": "Shop Name", "max_length": 50 },
//!         "quantity":  { "type": "integer", "verbose_name": "Quantity" }
//!     }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{ConfigError, ConfigResult};
use crate::fields::Field;
use crate::models::Value;
use crate::schema::Schema;
use crate::serializer::Serializer;

/// A complete serializer definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializerDefinition {
    /// Human-readable description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// 0-based index of the first data row
    pub start_index: usize,

    /// Field names in column order
    pub fields: Vec<String>,

    #[serde(default = "default_true")]
    pub enable_transaction: bool,

    /// Field specs keyed by field name
    #[serde(default)]
    pub definitions: BTreeMap<String, FieldSpec>,
}

/// Declaration of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum FieldSpec {
    /// Any non-blank value is true
    Boolean { verbose_name: String },

    /// Text of bounded length
    Text {
        verbose_name: String,
        max_length: usize,
        #[serde(default)]
        blank: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<String>,
        #[serde(default = "default_true")]
        case_sensitive: bool,
        #[serde(default = "default_true")]
        convert_number: bool,
    },

    /// Whole number
    Integer {
        verbose_name: String,
        #[serde(default)]
        blank: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<i64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<i64>,
    },

    /// Calendar date parsed with a strftime pattern
    Date {
        verbose_name: String,
        format: String,
        format_verbose: String,
        #[serde(default)]
        blank: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },

    /// Date and time parsed with a strftime pattern
    #[serde(rename = "datetime")]
    DateTime {
        verbose_name: String,
        format: String,
        format_verbose: String,
        #[serde(default)]
        blank: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
}

fn default_true() -> bool {
    true
}

impl SerializerDefinition {
    /// Parse a definition from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parse a definition from a JSON value.
    ///
    /// The layout part goes through the same checks as [`Schema::from_json`],
    /// so mistakes there get the same errors.
    pub fn from_value(value: &JsonValue) -> ConfigResult<Self> {
        Schema::from_json(value)?;
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The row layout of this definition.
    pub fn schema(&self) -> ConfigResult<Schema> {
        Ok(Schema::new(self.start_index, self.fields.iter().cloned())?
            .with_transaction(self.enable_transaction))
    }

    /// Build a ready-to-run serializer.
    ///
    /// Every declared field needs a spec. Specs for undeclared names are
    /// ignored.
    pub fn build(&self) -> ConfigResult<Serializer> {
        let mut builder = Serializer::builder(self.schema()?);
        for name in &self.fields {
            if let Some(spec) = self.definitions.get(name) {
                builder = builder.field(name.clone(), spec.to_field()?);
            }
        }
        builder.build()
    }
}

impl FieldSpec {
    pub fn verbose_name(&self) -> &str {
        match self {
            FieldSpec::Boolean { verbose_name }
            | FieldSpec::Text { verbose_name, .. }
            | FieldSpec::Integer { verbose_name, .. }
            | FieldSpec::Date { verbose_name, .. }
            | FieldSpec::DateTime { verbose_name, .. } => verbose_name,
        }
    }

    /// Turn the declaration into a [`Field`].
    pub fn to_field(&self) -> ConfigResult<Field> {
        let field = match self {
            FieldSpec::Boolean { verbose_name } => Field::boolean(verbose_name.as_str()),
            FieldSpec::Text {
                verbose_name,
                max_length,
                blank,
                default,
                choices,
                case_sensitive,
                convert_number,
            } => {
                let mut field = Field::text(verbose_name.as_str(), *max_length)
                    .blank(*blank)
                    .choices(choices.iter().map(String::as_str))
                    .case_sensitive(*case_sensitive)
                    .convert_number(*convert_number);
                if let Some(default) = default {
                    field = field.default(default.as_str());
                }
                field
            }
            FieldSpec::Integer {
                verbose_name,
                blank,
                default,
                choices,
            } => {
                let mut field = Field::integer(verbose_name.as_str())
                    .blank(*blank)
                    .choices(choices.iter().copied());
                if let Some(default) = default {
                    field = field.default(*default);
                }
                field
            }
            FieldSpec::Date {
                verbose_name,
                format,
                format_verbose,
                blank,
                default,
            } => with_temporal_default(
                Field::date(verbose_name.as_str(), format.as_str(), format_verbose.as_str())
                    .blank(*blank),
                default.as_deref(),
            )?,
            FieldSpec::DateTime {
                verbose_name,
                format,
                format_verbose,
                blank,
                default,
            } => with_temporal_default(
                Field::datetime(verbose_name.as_str(), format.as_str(), format_verbose.as_str())
                    .blank(*blank),
                default.as_deref(),
            )?,
        };
        field.check()?;
        Ok(field)
    }
}

/// Date defaults are written in the field's own pattern and parsed once here.
fn with_temporal_default(field: Field, default: Option<&str>) -> ConfigResult<Field> {
    let Some(text) = default else {
        return Ok(field);
    };
    field.check()?;
    let parsed = field
        .clean(&Value::from(text), 0)
        .map_err(|_| ConfigError::InvalidField {
            field: field.verbose_name().to_string(),
            message: format!("default {:?} does not match the field format", text),
        })?;
    Ok(field.default(parsed))
}

/// Example definition for documentation and `sheetclean example-definition`.
pub fn example_definition() -> SerializerDefinition {
    let mut definitions = BTreeMap::new();

    definitions.insert(
        "shop_name".to_string(),
        FieldSpec::Text {
            verbose_name: "Shop Name".to_string(),
            max_length: 50,
            blank: false,
            default: None,
            choices: Vec::new(),
            case_sensitive: true,
            convert_number: true,
        },
    );
    definitions.insert(
        "order_number".to_string(),
        FieldSpec::Text {
            verbose_name: "Order Number".to_string(),
            max_length: 20,
            blank: false,
            default: None,
            choices: Vec::new(),
            case_sensitive: true,
            convert_number: true,
        },
    );
    definitions.insert(
        "quantity".to_string(),
        FieldSpec::Integer {
            verbose_name: "Quantity".to_string(),
            blank: false,
            default: None,
            choices: Vec::new(),
        },
    );
    definitions.insert(
        "size".to_string(),
        FieldSpec::Text {
            verbose_name: "Size".to_string(),
            max_length: 2,
            blank: true,
            default: Some("M".to_string()),
            choices: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            case_sensitive: false,
            convert_number: false,
        },
    );
    definitions.insert(
        "order_date".to_string(),
        FieldSpec::Date {
            verbose_name: "Order Date".to_string(),
            format: "%Y-%m-%d".to_string(),
            format_verbose: "YYYY-MM-DD".to_string(),
            blank: false,
            default: None,
        },
    );
    definitions.insert(
        "gift".to_string(),
        FieldSpec::Boolean {
            verbose_name: "Gift Wrap".to_string(),
        },
    );

    SerializerDefinition {
        description: "Example definition for a shop order sheet".to_string(),
        start_index: 1,
        fields: vec![
            "shop_name".to_string(),
            "order_number".to_string(),
            "quantity".to_string(),
            "size".to_string(),
            "order_date".to_string(),
            "gift".to_string(),
        ],
        enable_transaction: true,
        definitions,
    }
}

/// Human-readable list of field types and their options.
pub fn field_types_description() -> &'static str {
    r#"Field types (the "type" key of a definition entry):

  boolean   Any non-blank value is true, blank is false.
            Options: verbose_name

  text      Text of at most max_length characters. Numbers are converted
            to text unless convert_number is false.
            Options: verbose_name, max_length, blank, default, choices,
                     case_sensitive (default true), convert_number (default true)

  integer   Whole number; text is parsed as a decimal integer.
            Options: verbose_name, blank, default, choices

  date      Calendar date parsed with a strftime pattern such as %Y-%m-%d.
            Options: verbose_name, format, format_verbose, blank, default

  datetime  Date and time parsed with a strftime pattern such as
            %Y-%m-%d %H:%M.
            Options: verbose_name, format, format_verbose, blank, default
"#
}
