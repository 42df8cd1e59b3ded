//! Typed field descriptors.
//!
//! A [`Field`] validates and converts the raw value of one column. The same
//! field instance is reused for every row of a run, so it carries per-row
//! state (`value`, `cleaned_value`) that is cleared by [`Field::reset`].
//!
//! ## Variants
//!
//! | Kind      | Cleaned value | Options                                        |
//! |-----------|---------------|------------------------------------------------|
//! | boolean   | `Bool`        | none, always blank-allowed, default `false`    |
//! | text      | `Text`        | max length, convert numbers, choices, case     |
//! | integer   | `Int`         | choices                                        |
//! | date      | `Date`        | strftime pattern + human-readable pattern      |
//! | datetime  | `DateTime`    | strftime pattern + human-readable pattern      |
//!
//! ## Validation order
//!
//! 1. Strip whitespace around text.
//! 2. Resolve blanks (`null`, `""`): reject, substitute the default, or keep.
//! 3. Coerce non-blank values according to the kind.
//!
//! ```
//! use sheetclean::{Field, Value};
//!
//! let mut quantity = Field::integer("Quantity");
//! quantity.set_value(" 1000 ");
//! quantity.validate(2).unwrap();
//! assert_eq!(quantity.cleaned_value(), Some(&Value::Int(1000)));
//! ```

mod choices;
mod coerce;

use chrono::format::{Item, StrftimeItems};

use crate::error::{ConfigError, FieldError, ValidationError};
use crate::models::Value;

/// Pattern used by date and date-time fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    /// strftime-style pattern, e.g. `%Y-%m-%d`.
    pub format: String,
    /// What users are told to type, e.g. `YYYY-MM-DD`.
    pub verbose: String,
}

/// Type-specific part of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Boolean,
    Text {
        max_length: usize,
        convert_number: bool,
        case_sensitive: bool,
    },
    Integer,
    Date(DatePattern),
    DateTime(DatePattern),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::Text { .. } => "text",
            FieldKind::Integer => "integer",
            FieldKind::Date(_) => "date",
            FieldKind::DateTime(_) => "datetime",
        }
    }
}

/// A column descriptor plus its per-row state.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    verbose_name: String,
    blank: bool,
    default: Option<Value>,
    choices: Option<Vec<Value>>,
    kind: FieldKind,
    value: Value,
    cleaned_value: Option<Value>,
}

impl Field {
    fn with_kind(verbose_name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            verbose_name: verbose_name.into(),
            blank: false,
            default: None,
            choices: None,
            kind,
            value: Value::Null,
            cleaned_value: None,
        }
    }

    /// Any non-blank value is `true`, blank is `false`.
    pub fn boolean(verbose_name: impl Into<String>) -> Self {
        let mut field = Self::with_kind(verbose_name, FieldKind::Boolean);
        field.blank = true;
        field.default = Some(Value::Bool(false));
        field
    }

    /// Text of at most `max_length` characters. Numbers are converted to text.
    pub fn text(verbose_name: impl Into<String>, max_length: usize) -> Self {
        Self::with_kind(
            verbose_name,
            FieldKind::Text {
                max_length,
                convert_number: true,
                case_sensitive: true,
            },
        )
    }

    pub fn integer(verbose_name: impl Into<String>) -> Self {
        Self::with_kind(verbose_name, FieldKind::Integer)
    }

    pub fn date(
        verbose_name: impl Into<String>,
        format: impl Into<String>,
        format_verbose: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            verbose_name,
            FieldKind::Date(DatePattern {
                format: format.into(),
                verbose: format_verbose.into(),
            }),
        )
    }

    pub fn datetime(
        verbose_name: impl Into<String>,
        format: impl Into<String>,
        format_verbose: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            verbose_name,
            FieldKind::DateTime(DatePattern {
                format: format.into(),
                verbose: format_verbose.into(),
            }),
        )
    }

    /// Allow blank input. Boolean fields always allow it.
    pub fn blank(mut self, allowed: bool) -> Self {
        if !matches!(self.kind, FieldKind::Boolean) {
            self.blank = allowed;
        }
        self
    }

    /// Value used when the input is blank and blanks are allowed.
    ///
    /// The default is trusted as-is and never validated against the kind.
    /// Boolean fields keep their `false` default.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        if !matches!(self.kind, FieldKind::Boolean) {
            self.default = Some(value.into());
        }
        self
    }

    /// Restrict accepted values. Text fields take text choices, integer
    /// fields take integers. An empty set means no restriction.
    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let choices: Vec<Value> = choices.into_iter().map(Into::into).collect();
        self.choices = if choices.is_empty() {
            None
        } else {
            Some(choices)
        };
        self
    }

    /// Compare text choices ignoring case. The cleaned value keeps its casing.
    pub fn case_sensitive(mut self, sensitive: bool) -> Self {
        if let FieldKind::Text { case_sensitive, .. } = &mut self.kind {
            *case_sensitive = sensitive;
        }
        self
    }

    /// Whether numbers are accepted by a text field and converted to text.
    pub fn convert_number(mut self, convert: bool) -> Self {
        if let FieldKind::Text { convert_number, .. } = &mut self.kind {
            *convert_number = convert;
        }
        self
    }

    pub fn verbose_name(&self) -> &str {
        &self.verbose_name
    }

    pub fn allows_blank(&self) -> bool {
        self.blank
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn choice_set(&self) -> Option<&[Value]> {
        self.choices.as_deref()
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Raw value assigned for the current row.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Result of the last successful [`Field::validate`] since the last reset.
    pub fn cleaned_value(&self) -> Option<&Value> {
        self.cleaned_value.as_ref()
    }

    pub fn set_value(&mut self, raw: impl Into<Value>) {
        self.value = raw.into();
        self.cleaned_value = None;
    }

    /// Forget everything about the current row.
    pub fn reset(&mut self) {
        self.value = Value::Null;
        self.cleaned_value = None;
    }

    /// Validate the assigned value for the 1-based sheet row `index`.
    ///
    /// On success the cleaned value is stored; on failure it stays unset.
    pub fn validate(&mut self, index: usize) -> Result<(), FieldError> {
        self.cleaned_value = None;
        let cleaned = self.clean(&self.value, index)?;
        self.cleaned_value = Some(cleaned);
        Ok(())
    }

    /// Validate `raw` without touching the field state.
    pub fn clean(&self, raw: &Value, index: usize) -> Result<Value, FieldError> {
        let value = raw.stripped();
        if value.is_blank() {
            return self.resolve_blank(value, index).map_err(FieldError::from);
        }
        self.coerce(value, index)
    }

    /// Check the options for inconsistencies. Needs no row data.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.check_choices()?;
        if let FieldKind::Date(pattern) | FieldKind::DateTime(pattern) = &self.kind {
            let malformed = pattern.format.trim().is_empty()
                || StrftimeItems::new(&pattern.format).any(|item| matches!(item, Item::Error));
            if malformed {
                return Err(ConfigError::InvalidField {
                    field: self.verbose_name.clone(),
                    message: format!("invalid date format {:?}", pattern.format),
                });
            }
        }
        Ok(())
    }

    fn resolve_blank(&self, blank: Value, index: usize) -> Result<Value, ValidationError> {
        if matches!(self.kind, FieldKind::Boolean) {
            return Ok(Value::Bool(false));
        }
        if !self.blank {
            return Err(self.error(index, "is not allowed to be blank."));
        }
        Ok(self.default.clone().unwrap_or(blank))
    }

    pub(crate) fn error(&self, index: usize, reason: impl std::fmt::Display) -> ValidationError {
        ValidationError::at_row(index, &self.verbose_name, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn invalid(result: Result<(), FieldError>) -> String {
        match result {
            Err(FieldError::Invalid(err)) => err.into_message(),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_boolean_empty_becomes_false() {
        let mut field = Field::boolean("Test");
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_boolean_value_inserted() {
        let mut field = Field::boolean("Test");
        field.set_value("Y");
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_boolean_cannot_be_made_required() {
        let mut field = Field::boolean("Test").blank(false).default("x");
        assert!(field.allows_blank());
        field.set_value("  ");
        field.validate(4).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_text_blank_not_allowed() {
        let mut field = Field::text("Field", 4);
        let message = invalid(field.validate(7));
        assert_eq!(message, "[Row 7] Field is not allowed to be blank.");
        assert!(field.cleaned_value().is_none());
    }

    #[test]
    fn test_whitespace_only_is_blank() {
        let mut field = Field::text("Field", 4);
        field.set_value("   ");
        assert!(matches!(field.validate(1), Err(FieldError::Invalid(_))));
    }

    #[test]
    fn test_blank_keeps_given_blank_value() {
        let mut field = Field::integer("field").blank(true);
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::Null));

        let mut field = Field::text("field", 10).blank(true);
        field.set_value("");
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::from("")));
    }

    #[test]
    fn test_default_only_for_blank_input() {
        let mut field = Field::text("field", 10).blank(true).default("hello");
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::from("hello")));

        field.set_value("world");
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::from("world")));
    }

    #[test]
    fn test_default_is_not_revalidated() {
        let mut field = Field::text("field", 2).blank(true).default("much too long");
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::from("much too long")));
    }

    #[test]
    fn test_default_ignored_when_blank_not_allowed() {
        let mut field = Field::integer("field").default(5);
        assert!(field.validate(0).is_err());
    }

    #[test]
    fn test_integer_default() {
        let mut field = Field::integer("field").blank(true).default(0);
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::Int(0)));

        field.set_value(100);
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::Int(100)));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut field = Field::text("field", 10);
        field.set_value("value");
        field.validate(1).unwrap();
        field.reset();
        assert_eq!(field.value(), &Value::Null);
        assert!(field.cleaned_value().is_none());
    }

    #[test]
    fn test_failed_validation_drops_previous_cleaned_value() {
        let mut field = Field::integer("field");
        field.set_value("12");
        field.validate(1).unwrap();
        field.set_value("twelve");
        assert!(field.validate(2).is_err());
        assert!(field.cleaned_value().is_none());
    }

    #[test]
    fn test_clean_does_not_touch_state() {
        let field = Field::date("field", "%Y-%m-%d", "YYYY-MM-DD");
        let cleaned = field.clean(&Value::from("2018-01-01"), 1).unwrap();
        assert_eq!(cleaned, Value::Date(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()));
        assert!(field.cleaned_value().is_none());
    }

    #[test]
    fn test_check_rejects_bad_date_format() {
        assert!(Field::date("field", "", "").check().is_err());
        assert!(Field::date("field", "%Y-%Q", "YYYY").check().is_err());
        assert!(Field::date("field", "%Y%m%d", "YYYYMMDD").check().is_ok());
    }

    #[test]
    fn test_options_ignored_on_other_kinds() {
        let field = Field::integer("field").case_sensitive(false).convert_number(false);
        assert_eq!(field.kind(), &FieldKind::Integer);
    }
}
