//! Domain values flowing through the pipeline.
//!
//! - [`Value`] - a raw cell value or a cleaned value
//! - [`CleanedRow`] - one accepted row, keyed by field name
//!
//! Spreadsheet cells are loosely typed: the same column can hold text in one
//! row and a number or a date in the next, so both the raw input and the
//! cleaned output share one dynamically typed value.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

// =============================================================================
// Value
// =============================================================================

/// A single cell value, before or after cleaning.
///
/// Serializes untagged: `null`, booleans, numbers and strings map to their
/// JSON counterparts, dates to `YYYY-MM-DD` and date-times to ISO 8601.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// An empty cell.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Value {
    /// Null or the empty string.
    ///
    /// This is the field-level notion of blank and is checked after text has
    /// been stripped.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Null or text made only of whitespace.
    ///
    /// Used to detect empty header cells and the end-of-data row. `0` and
    /// `false` are data, never blank.
    pub fn is_empty_cell(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Copy of the value with surrounding whitespace removed from text.
    pub fn stripped(&self) -> Value {
        match self {
            Value::Text(s) => Value::Text(s.trim().to_string()),
            other => other.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Integer view of whole numbers, including floats without a fraction.
    ///
    /// Spreadsheet readers commonly hand integral cells over as floats.
    pub fn as_whole_number(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f)
                if f.is_finite()
                    && f.fract() == 0.0
                    && *f >= i64::MIN as f64
                    && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    /// Short type name for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Cleaned Row
// =============================================================================

/// One accepted row: field name to cleaned value.
pub type CleanedRow = BTreeMap<String, Value>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(!Value::from("  ").is_blank());
        assert!(!Value::Int(0).is_blank());
        assert!(!Value::Bool(false).is_blank());
    }

    #[test]
    fn test_empty_cell_ignores_whitespace_but_not_zero() {
        assert!(Value::from("   ").is_empty_cell());
        assert!(Value::Null.is_empty_cell());
        assert!(!Value::Int(0).is_empty_cell());
        assert!(!Value::Float(0.0).is_empty_cell());
    }

    #[test]
    fn test_stripped_only_touches_text() {
        assert_eq!(Value::from("  Shop ").stripped(), Value::from("Shop"));
        assert_eq!(Value::Int(7).stripped(), Value::Int(7));
    }

    #[test]
    fn test_whole_number() {
        assert_eq!(Value::Float(20180101.0).as_whole_number(), Some(20180101));
        assert_eq!(Value::Float(1.5).as_whole_number(), None);
        assert_eq!(Value::from("12").as_whole_number(), None);
    }

    #[test]
    fn test_whole_number_out_of_range() {
        // i64::MAX as f64 rounds up to 2^63
        assert_eq!(Value::Float(9223372036854775808.0).as_whole_number(), None);
        assert_eq!(Value::Float(-9223372036854775808.0).as_whole_number(), Some(i64::MIN));
        assert_eq!(Value::Float(9.0e15).as_whole_number(), Some(9_000_000_000_000_000));
    }

    #[test]
    fn test_display() {
        let date = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2018-01-01");
        assert_eq!(Value::Int(1000).to_string(), "1000");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_serialization() {
        let mut row = CleanedRow::new();
        row.insert("quantity".into(), Value::Int(100));
        row.insert("address".into(), Value::Null);
        row.insert(
            "sale_date".into(),
            Value::Date(NaiveDate::from_ymd_opt(2017, 7, 7).unwrap()),
        );
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["quantity"], 100);
        assert!(json["address"].is_null());
        assert_eq!(json["sale_date"], "2017-07-07");
    }
}
