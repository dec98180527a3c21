//! # Built-in Scalar Kinds
//!
//! The eight scalar kinds every registry starts with, and their conversion
//! functions. A conversion takes any [`Value`] and either produces a value of
//! the kind's target representation or reports a [`ConversionError`].
//!
//! Numeric kinds parse the leading numeric prefix of text, so `"2011-11-03"`
//! converts to the integer `2011` and `"1.1"` to `1`. Text with no numeric
//! prefix at all is a conversion failure, not zero.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::ConversionError;
use crate::temporal;
use crate::value::{Value, ValueKind};

/// A built-in scalar kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Integer,
    Float,
    Decimal,
    Bool,
    String,
    Date,
    DateTime,
    Time,
}

impl BuiltinKind {
    /// Every built-in kind, in registration order.
    pub const ALL: [BuiltinKind; 8] = [
        BuiltinKind::Integer,
        BuiltinKind::Float,
        BuiltinKind::Decimal,
        BuiltinKind::Bool,
        BuiltinKind::String,
        BuiltinKind::Date,
        BuiltinKind::DateTime,
        BuiltinKind::Time,
    ];

    /// Registry name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinKind::Integer => "integer",
            BuiltinKind::Float => "float",
            BuiltinKind::Decimal => "decimal",
            BuiltinKind::Bool => "bool",
            BuiltinKind::String => "string",
            BuiltinKind::Date => "date",
            BuiltinKind::DateTime => "datetime",
            BuiltinKind::Time => "time",
        }
    }

    /// The value representation this kind produces.
    pub fn target(&self) -> ValueKind {
        match self {
            BuiltinKind::Integer => ValueKind::Integer,
            BuiltinKind::Float => ValueKind::Float,
            BuiltinKind::Decimal => ValueKind::Decimal,
            BuiltinKind::Bool => ValueKind::Bool,
            BuiltinKind::String => ValueKind::String,
            BuiltinKind::Date => ValueKind::Date,
            BuiltinKind::DateTime => ValueKind::DateTime,
            BuiltinKind::Time => ValueKind::Time,
        }
    }

    /// Look up a kind by registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Convert `value` to this kind.
    pub fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match self {
            BuiltinKind::Integer => to_integer(value),
            BuiltinKind::Float => to_float(value),
            BuiltinKind::Decimal => to_decimal(value),
            BuiltinKind::Bool => to_bool(value),
            BuiltinKind::String => Ok(Value::String(to_text(value))),
            BuiltinKind::Date => to_date(value),
            BuiltinKind::DateTime => to_datetime(value),
            BuiltinKind::Time => to_time(value),
        }
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const TRUE_TOKENS: &[&str] = &["1", "t", "true", "True", "TRUE", "T"];
const FALSE_TOKENS: &[&str] = &["0", "f", "false", "False", "FALSE", "F"];

fn unsupported(kind: BuiltinKind, value: &Value) -> ConversionError {
    match value {
        Value::List(_) | Value::Map(_) => {
            ConversionError::new(kind.name(), value.kind(), "collections are not convertible")
        }
        _ => ConversionError::new(
            kind.name(),
            value,
            format!("{} values are not convertible", value.kind()),
        ),
    }
}

fn to_integer(value: &Value) -> Result<Value, ConversionError> {
    let kind = BuiltinKind::Integer;
    match value {
        Value::Integer(i) => Ok(Value::Integer(*i)),
        Value::Float(f) => float_to_i64(*f)
            .map(Value::Integer)
            .ok_or_else(|| ConversionError::new(kind.name(), value, "out of range")),
        Value::Decimal(d) => d
            .trunc()
            .to_i64()
            .map(Value::Integer)
            .ok_or_else(|| ConversionError::new(kind.name(), value, "out of range")),
        Value::String(s) => {
            let Some(prefix) = numeric_prefix(s, false) else {
                return Ok(Value::Integer(0));
            };
            let whole = prefix.split('.').next().unwrap_or(prefix);
            match whole.parse::<i64>() {
                Ok(i) => Ok(Value::Integer(i)),
                Err(_) => prefix
                    .parse::<f64>()
                    .ok()
                    .and_then(float_to_i64)
                    .map(Value::Integer)
                    .ok_or_else(|| ConversionError::new(kind.name(), value, "out of range")),
            }
        }
        _ => Err(unsupported(kind, value)),
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    let t = f.trunc();
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

fn to_float(value: &Value) -> Result<Value, ConversionError> {
    let kind = BuiltinKind::Float;
    match value {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Decimal(d) => d
            .to_f64()
            .map(Value::Float)
            .ok_or_else(|| ConversionError::new(kind.name(), value, "out of range")),
        Value::String(s) => match numeric_prefix(s, true) {
            None => Ok(Value::Float(0.0)),
            Some(prefix) => prefix
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| ConversionError::new(kind.name(), value, e.to_string())),
        },
        _ => Err(unsupported(kind, value)),
    }
}

fn to_decimal(value: &Value) -> Result<Value, ConversionError> {
    let kind = BuiltinKind::Decimal;
    match value {
        Value::Decimal(d) => Ok(Value::Decimal(*d)),
        Value::Integer(i) => Ok(Value::Decimal(Decimal::from(*i))),
        Value::Float(f) => Decimal::try_from(*f)
            .map(Value::Decimal)
            .map_err(|e| ConversionError::new(kind.name(), value, e.to_string())),
        Value::String(s) => {
            let Some(prefix) = numeric_prefix(s, true) else {
                return Ok(Value::Decimal(Decimal::ZERO));
            };
            let parsed = if prefix.contains(['e', 'E']) {
                Decimal::from_scientific(prefix)
            } else {
                Decimal::from_str(prefix)
            };
            parsed
                .map(Value::Decimal)
                .map_err(|e| ConversionError::new(kind.name(), value, e.to_string()))
        }
        _ => Err(unsupported(kind, value)),
    }
}

fn to_bool(value: &Value) -> Result<Value, ConversionError> {
    let token = match value {
        Value::Bool(b) => return Ok(Value::Bool(*b)),
        Value::String(s) => s.as_str().to_string(),
        Value::Integer(i) => i.to_string(),
        _ => return Err(unsupported(BuiltinKind::Bool, value)),
    };
    if TRUE_TOKENS.contains(&token.as_str()) {
        Ok(Value::Bool(true))
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Ok(Value::Bool(false))
    } else {
        Err(ConversionError::new("bool", value, "unrecognized boolean token"))
    }
}

/// Render any value as text, the way the `string` kind does.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Float(f) => format_float(*f),
        Value::List(_) | Value::Map(_) => value.to_json().to_string(),
        other => match other.to_json() {
            serde_json::Value::String(s) => s,
            json => json.to_string(),
        },
    }
}

/// Floats with an integral value keep one fractional digit (`2.0`).
pub fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn to_date(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Date(d) => Ok(Value::Date(*d)),
        Value::DateTime(dt) => Ok(Value::Date(dt.date_naive())),
        Value::String(s) => temporal::parse_date(s)
            .map(Value::Date)
            .ok_or_else(|| ConversionError::new("date", value, "unrecognized date")),
        _ => Err(unsupported(BuiltinKind::Date, value)),
    }
}

fn to_datetime(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
        Value::Date(d) => temporal::midnight_utc(*d)
            .map(Value::DateTime)
            .ok_or_else(|| ConversionError::new("datetime", value, "out of range")),
        Value::String(s) => temporal::parse_datetime(s)
            .map(Value::DateTime)
            .ok_or_else(|| ConversionError::new("datetime", value, "unrecognized date-time")),
        _ => Err(unsupported(BuiltinKind::DateTime, value)),
    }
}

fn to_time(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Time(t) => Ok(Value::Time(*t)),
        Value::DateTime(dt) => Ok(Value::Time(dt.time())),
        Value::String(s) => temporal::parse_time(s)
            .map(Value::Time)
            .ok_or_else(|| ConversionError::new("time", value, "unrecognized time")),
        _ => Err(unsupported(BuiltinKind::Time, value)),
    }
}

/// Longest leading numeric token of `text`, after leading whitespace.
///
/// Optional sign, digits, optional fraction, and (when `exponent` is set) an
/// optional exponent. Returns `None` when no digit is found.
fn numeric_prefix(text: &str, exponent: bool) -> Option<&str> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if exponent && end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    Some(&text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn test_integer_from_text_prefix() {
        let int = BuiltinKind::Integer;
        assert_eq!(int.convert(&s("42")), Ok(Value::Integer(42)));
        assert_eq!(int.convert(&s(" 42 ")), Ok(Value::Integer(42)));
        assert_eq!(int.convert(&s("1.1")), Ok(Value::Integer(1)));
        assert_eq!(int.convert(&s("-7.9")), Ok(Value::Integer(-7)));
        assert_eq!(int.convert(&s("2011-11-03")), Ok(Value::Integer(2011)));
        assert_eq!(int.convert(&s("33-03-2011")), Ok(Value::Integer(33)));
        assert_eq!(int.convert(&s(".5")), Ok(Value::Integer(0)));
    }

    #[test]
    fn test_text_without_numeric_prefix_reads_as_zero() {
        let int = BuiltinKind::Integer;
        assert_eq!(int.convert(&s("abc")), Ok(Value::Integer(0)));
        assert_eq!(int.convert(&s("")), Ok(Value::Integer(0)));
        assert_eq!(int.convert(&s("-")), Ok(Value::Integer(0)));
        assert_eq!(BuiltinKind::Float.convert(&s("")), Ok(Value::Float(0.0)));
        assert_eq!(BuiltinKind::Float.convert(&s("x1")), Ok(Value::Float(0.0)));
        assert_eq!(
            BuiltinKind::Decimal.convert(&s("ten")),
            Ok(Value::Decimal(Decimal::ZERO))
        );
    }

    #[test]
    fn test_integer_rejects_non_text_kinds() {
        let int = BuiltinKind::Integer;
        assert!(int.convert(&Value::Bool(true)).is_err());
        assert!(int.convert(&Value::List(vec![])).is_err());
        assert!(int.convert(&Value::Float(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_collection_input_error_names_kind_only() {
        let big = Value::List((0..10_000).map(Value::Integer).collect());
        let err = BuiltinKind::Integer.convert(&big).unwrap_err();
        assert_eq!(err.input, "list");
        let err = BuiltinKind::Date.convert(&Value::Map(Default::default())).unwrap_err();
        assert_eq!(err.input, "map");
    }

    #[test]
    fn test_integer_truncates_floats_and_decimals() {
        let int = BuiltinKind::Integer;
        assert_eq!(int.convert(&Value::Float(3.99)), Ok(Value::Integer(3)));
        assert_eq!(int.convert(&Value::Float(-3.99)), Ok(Value::Integer(-3)));
        let d: Decimal = "12.75".parse().unwrap();
        assert_eq!(int.convert(&Value::Decimal(d)), Ok(Value::Integer(12)));
    }

    #[test]
    fn test_float_accepts_exponent() {
        let float = BuiltinKind::Float;
        assert_eq!(float.convert(&s("1.5e3")), Ok(Value::Float(1500.0)));
        assert_eq!(float.convert(&s("2e")), Ok(Value::Float(2.0)));
        assert_eq!(float.convert(&Value::Integer(2)), Ok(Value::Float(2.0)));
    }

    #[test]
    fn test_decimal_is_exact() {
        let dec = BuiltinKind::Decimal;
        assert_eq!(
            dec.convert(&s("0.10")),
            Ok(Value::Decimal("0.10".parse().unwrap()))
        );
        assert_eq!(
            dec.convert(&s("1.5e2")),
            Ok(Value::Decimal(Decimal::from(150)))
        );
        assert_eq!(
            dec.convert(&Value::Integer(7)),
            Ok(Value::Decimal(Decimal::from(7)))
        );
    }

    #[test]
    fn test_bool_tokens() {
        let b = BuiltinKind::Bool;
        for t in ["1", "t", "true", "True", "TRUE", "T"] {
            assert_eq!(b.convert(&s(t)), Ok(Value::Bool(true)), "{t}");
        }
        for f in ["0", "f", "false", "False", "FALSE", "F"] {
            assert_eq!(b.convert(&s(f)), Ok(Value::Bool(false)), "{f}");
        }
        assert_eq!(b.convert(&Value::Integer(1)), Ok(Value::Bool(true)));
        assert_eq!(b.convert(&Value::Integer(0)), Ok(Value::Bool(false)));
        assert!(b.convert(&s("yes")).is_err());
        assert!(b.convert(&s("tRuE")).is_err());
        assert!(b.convert(&Value::Integer(2)).is_err());
    }

    #[test]
    fn test_string_is_total() {
        let st = BuiltinKind::String;
        assert_eq!(st.convert(&Value::Integer(5)), Ok(s("5")));
        assert_eq!(st.convert(&Value::Float(2.0)), Ok(s("2.0")));
        assert_eq!(st.convert(&Value::Float(2.5)), Ok(s("2.5")));
        assert_eq!(st.convert(&Value::Bool(false)), Ok(s("false")));
        assert_eq!(
            st.convert(&Value::from(serde_json::json!([1, "a"]))),
            Ok(s("[1,\"a\"]"))
        );
        let date = NaiveDate::from_ymd_opt(2018, 7, 13).unwrap();
        assert_eq!(st.convert(&Value::Date(date)), Ok(s("2018-07-13")));
    }

    #[test]
    fn test_temporal_kinds() {
        let date = NaiveDate::from_ymd_opt(2011, 11, 3).unwrap();
        assert_eq!(
            BuiltinKind::Date.convert(&s("2011-11-03 30:23:45")),
            Ok(Value::Date(date))
        );
        assert!(BuiltinKind::DateTime
            .convert(&s("2011-11-03 30:23:45"))
            .is_err());
        assert!(BuiltinKind::Time.convert(&s("2011-11-03 30:23:45")).is_err());
        assert!(BuiltinKind::Date.convert(&Value::Integer(20111103)).is_err());

        let widened = BuiltinKind::DateTime.convert(&Value::Date(date)).unwrap();
        assert_eq!(
            BuiltinKind::Date.convert(&widened),
            Ok(Value::Date(date))
        );
    }

    #[test]
    fn test_from_name_roundtrip() {
        for kind in BuiltinKind::ALL {
            assert_eq!(BuiltinKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(BuiltinKind::from_name("weight"), None);
    }

    #[test]
    fn test_numeric_prefix_edges() {
        assert_eq!(numeric_prefix("12abc", false), Some("12"));
        assert_eq!(numeric_prefix("12.", false), Some("12"));
        assert_eq!(numeric_prefix("+3.25x", false), Some("+3.25"));
        assert_eq!(numeric_prefix("1e5", false), Some("1"));
        assert_eq!(numeric_prefix("1e5", true), Some("1e5"));
        assert_eq!(numeric_prefix("1e+", true), Some("1"));
        assert_eq!(numeric_prefix("abc", true), None);
    }
}
