//! Type-specific coercion of non-blank values.

use chrono::format::{parse, ParseErrorKind, ParseResult, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::{DatePattern, Field, FieldKind};
use crate::error::FieldError;
use crate::models::Value;

impl Field {
    /// Coerce a stripped, non-blank value according to the field kind.
    pub(super) fn coerce(&self, value: Value, index: usize) -> Result<Value, FieldError> {
        match &self.kind {
            FieldKind::Boolean => Ok(self.coerce_boolean(&value)),
            FieldKind::Text {
                max_length,
                convert_number,
                case_sensitive,
            } => self.coerce_text(value, *max_length, *convert_number, *case_sensitive, index),
            FieldKind::Integer => self.coerce_integer(value, index),
            FieldKind::Date(pattern) => self.coerce_date(value, pattern, index),
            FieldKind::DateTime(pattern) => self.coerce_datetime(value, pattern, index),
        }
    }

    fn coerce_boolean(&self, value: &Value) -> Value {
        // Native booleans and zero keep their truthiness.
        let truthy = match value {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            other => !other.is_blank(),
        };
        Value::Bool(truthy)
    }

    fn coerce_text(
        &self,
        value: Value,
        max_length: usize,
        convert_number: bool,
        case_sensitive: bool,
        index: usize,
    ) -> Result<Value, FieldError> {
        let text = match &value {
            Value::Text(s) => s.clone(),
            Value::Int(_) | Value::Float(_) if convert_number => value.to_string(),
            _ => return Err(self.error(index, "must be text.").into()),
        };

        if text.chars().count() > max_length {
            return Err(self
                .error(index, format!("cannot be more than {} characters.", max_length))
                .into());
        }

        self.ensure_text_choice(&text, case_sensitive, index)?;
        Ok(Value::Text(text))
    }

    fn coerce_integer(&self, value: Value, index: usize) -> Result<Value, FieldError> {
        let number = match &value {
            Value::Text(s) => s.parse::<i64>().ok(),
            other => other.as_whole_number(),
        };
        let Some(number) = number else {
            return Err(self
                .error(index, format!("cannot convert {} to number.", value))
                .into());
        };

        self.ensure_integer_choice(number, index)?;
        Ok(Value::Int(number))
    }

    fn coerce_date(
        &self,
        value: Value,
        pattern: &DatePattern,
        index: usize,
    ) -> Result<Value, FieldError> {
        match value {
            Value::Date(d) => Ok(Value::Date(d)),
            Value::DateTime(dt) => Ok(Value::Date(dt.date())),
            other => self
                .parse_temporal(&other, pattern, index)
                .map(|dt| Value::Date(dt.date())),
        }
    }

    fn coerce_datetime(
        &self,
        value: Value,
        pattern: &DatePattern,
        index: usize,
    ) -> Result<Value, FieldError> {
        match value {
            Value::DateTime(dt) => Ok(Value::DateTime(dt)),
            Value::Date(d) => Ok(Value::DateTime(d.and_time(NaiveTime::default()))),
            other => self
                .parse_temporal(&other, pattern, index)
                .map(Value::DateTime),
        }
    }

    /// Parse a non-temporal value with the field pattern.
    ///
    /// Integers are read as their digits so `20180101` and `"20180101"` are
    /// the same input.
    fn parse_temporal(
        &self,
        value: &Value,
        pattern: &DatePattern,
        index: usize,
    ) -> Result<NaiveDateTime, FieldError> {
        let text = match value.as_whole_number() {
            Some(n) => n.to_string(),
            None => value.to_string(),
        };

        parse_with_pattern(&text, &pattern.format).map_err(|_| {
            self.error(
                index,
                format!(
                    "\"{}\" is incorrect format, it should be \"{}\".",
                    text, pattern.verbose
                ),
            )
            .into()
        })
    }
}

/// strptime-like parsing: components missing from the pattern default to
/// 1900-01-01 00:00:00.
pub(crate) fn parse_with_pattern(text: &str, format: &str) -> ParseResult<NaiveDateTime> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, text, StrftimeItems::new(format))?;
    let date = complete_date(&mut parsed)?;
    let time = complete_time(&mut parsed)?;
    Ok(date.and_time(time))
}

fn complete_date(parsed: &mut Parsed) -> ParseResult<NaiveDate> {
    // A setter fails when the component is already present, which is the
    // case we want to leave alone.
    let fallbacks: [fn(&mut Parsed) -> ParseResult<()>; 3] = [
        |p: &mut Parsed| p.set_day(1),
        |p: &mut Parsed| p.set_month(1),
        |p: &mut Parsed| p.set_year(1900),
    ];
    let mut result = parsed.to_naive_date();
    for fill in fallbacks {
        let incomplete = matches!(&result, Err(e) if e.kind() == ParseErrorKind::NotEnough);
        if !incomplete {
            break;
        }
        let _ = fill(parsed);
        result = parsed.to_naive_date();
    }
    result
}

fn complete_time(parsed: &mut Parsed) -> ParseResult<NaiveTime> {
    let fallbacks: [fn(&mut Parsed) -> ParseResult<()>; 3] = [
        |p: &mut Parsed| p.set_second(0),
        |p: &mut Parsed| p.set_minute(0),
        |p: &mut Parsed| p.set_hour(0),
    ];
    let mut result = parsed.to_naive_time();
    for fill in fallbacks {
        let incomplete = matches!(&result, Err(e) if e.kind() == ParseErrorKind::NotEnough);
        if !incomplete {
            break;
        }
        let _ = fill(parsed);
        result = parsed.to_naive_time();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn datetime(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_text_max_length() {
        let mut field = Field::text("Field", 4);
        field.set_value("Tester");
        assert!(field.validate(0).is_err());

        field.set_value("Test");
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::from("Test")));
    }

    #[test]
    fn test_text_length_counts_characters() {
        let mut field = Field::text("QR Scanned", 2);
        field.set_value("有無");
        field.validate(0).unwrap();
    }

    #[test]
    fn test_text_convert_number() {
        let mut field = Field::text("Field", 4);
        field.set_value(1000);
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::from("1000")));
    }

    #[test]
    fn test_text_without_number_conversion() {
        let mut field = Field::text("Field", 4).convert_number(false);
        field.set_value(1000);
        let err = field.validate(3).unwrap_err();
        assert_eq!(err.to_string(), "[Row 3] Field must be text.");
    }

    #[test]
    fn test_text_rejects_dates() {
        let mut field = Field::text("Field", 20);
        field.set_value(date(2018, 1, 1));
        assert!(field.validate(0).is_err());
    }

    #[test]
    fn test_integer_from_text() {
        let mut field = Field::integer("field");
        field.set_value("1000");
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::Int(1000)));
    }

    #[test]
    fn test_integer_failed_conversion() {
        let mut field = Field::integer("field");
        field.set_value("hello");
        let err = field.validate(5).unwrap_err();
        assert_eq!(err.to_string(), "[Row 5] field cannot convert hello to number.");
        assert!(field.cleaned_value().is_none());
    }

    #[test]
    fn test_integer_rejects_float_beyond_range() {
        let field = Field::integer("n");
        let err = field
            .clean(&Value::Float(9223372036854775808.0), 1)
            .unwrap_err();
        assert!(err.to_string().contains("cannot convert"), "{}", err);
        assert!(field.clean(&Value::Float(9.3e18), 1).is_err());
    }

    #[test]
    fn test_integer_from_whole_float_only() {
        let mut field = Field::integer("field");
        field.set_value(12.0);
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::Int(12)));

        field.set_value(12.5);
        assert!(field.validate(0).is_err());
        field.set_value("12.0");
        assert!(field.validate(0).is_err());
    }

    #[test]
    fn test_boolean_truthiness() {
        let field = Field::boolean("flag");
        assert_eq!(field.clean(&Value::Int(0), 1).unwrap(), Value::Bool(false));
        assert_eq!(field.clean(&Value::Bool(false), 1).unwrap(), Value::Bool(false));
        assert_eq!(field.clean(&Value::from("0"), 1).unwrap(), Value::Bool(true));
        assert_eq!(field.clean(&Value::from("AB"), 1).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_date_from_text() {
        let mut field = Field::date("field", "%Y-%m-%d", "YYYY-MM-DD");
        field.set_value("2018-01-01");
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::Date(date(2018, 1, 1))));
    }

    #[test]
    fn test_date_from_int() {
        let mut field = Field::date("field", "%Y%m%d", "YYYYMMDD");
        field.set_value(20180101);
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::Date(date(2018, 1, 1))));
    }

    #[test]
    fn test_date_without_day_defaults_to_first() {
        let mut field = Field::date("Expired Date", "%Y%m", "YYYYMM");
        field.set_value("201802");
        field.validate(0).unwrap();
        assert_eq!(field.cleaned_value(), Some(&Value::Date(date(2018, 2, 1))));
    }

    #[test]
    fn test_date_truncates_datetime() {
        let field = Field::date("field", "%Y-%m-%d", "YYYY-MM-DD");
        let cleaned = field.clean(&Value::DateTime(datetime(2017, 1, 1, 9)), 0).unwrap();
        assert_eq!(cleaned, Value::Date(date(2017, 1, 1)));

        let cleaned = field.clean(&Value::Date(date(2017, 1, 1)), 0).unwrap();
        assert_eq!(cleaned, Value::Date(date(2017, 1, 1)));
    }

    #[test]
    fn test_date_wrong_format() {
        let mut field = Field::date("Sale Date", "%Y-%m-%d", "YYYY-MM-DD");
        field.set_value("07/07/2017");
        let err = field.validate(2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Row 2] Sale Date \"07/07/2017\" is incorrect format, it should be \"YYYY-MM-DD\"."
        );
    }

    #[test]
    fn test_datetime_from_text() {
        let mut field = Field::datetime("field", "%Y-%m-%d %H:%M:%S", "YYYY-MM-DD hh:mm:ss");
        field.set_value("2018-01-01 09:00:00");
        field.validate(0).unwrap();
        assert_eq!(
            field.cleaned_value(),
            Some(&Value::DateTime(datetime(2018, 1, 1, 9)))
        );
    }

    #[test]
    fn test_datetime_from_int() {
        let mut field = Field::datetime("field", "%Y%m%d%H%M%S", "YYYYMMDDhhmmss");
        field.set_value(20180101090000_i64);
        field.validate(0).unwrap();
        assert_eq!(
            field.cleaned_value(),
            Some(&Value::DateTime(datetime(2018, 1, 1, 9)))
        );
    }

    #[test]
    fn test_datetime_date_only_pattern_is_midnight() {
        let field = Field::datetime("field", "%Y-%m-%d", "YYYY-MM-DD");
        let cleaned = field.clean(&Value::from("2018-01-01"), 0).unwrap();
        assert_eq!(cleaned, Value::DateTime(datetime(2018, 1, 1, 0)));

        let cleaned = field.clean(&Value::Date(date(2018, 1, 1)), 0).unwrap();
        assert_eq!(cleaned, Value::DateTime(datetime(2018, 1, 1, 0)));
    }

    #[test]
    fn test_parse_with_pattern_rejects_trailing_input() {
        assert!(parse_with_pattern("2018-01-01x", "%Y-%m-%d").is_err());
        assert!(parse_with_pattern("2018-13-01", "%Y-%m-%d").is_err());
    }
}
