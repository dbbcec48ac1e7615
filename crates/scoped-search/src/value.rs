//! Declared value types, coerced literals and runtime record values.
//!
//! - [`ValueType`] is the type tag a schema reports for a column.
//! - [`Literal`] is a query value after coercion to a field's type.
//! - [`Value`] is what a record holds for a field when a compiled filter
//!   is evaluated in memory.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Declared type of a searchable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Short string (`VARCHAR`).
    #[serde(alias = "varchar", alias = "str")]
    String,
    /// Long text.
    Text,
    /// Integer of any width.
    #[serde(alias = "int", alias = "bigint")]
    Integer,
    /// Floating point number.
    #[serde(alias = "double")]
    Float,
    /// Fixed-point number, searched as a float.
    #[serde(alias = "numeric")]
    Decimal,
    /// Boolean flag.
    #[serde(alias = "bool")]
    Boolean,
    /// Calendar date.
    Date,
    /// Date with time of day.
    #[serde(alias = "timestamp")]
    DateTime,
    /// Time of day. Not searchable.
    Time,
    /// Raw bytes. Not searchable.
    #[serde(alias = "blob")]
    Binary,
}

impl ValueType {
    /// Returns `true` for string-like types that use substring matching.
    pub fn is_textual(self) -> bool {
        matches!(self, ValueType::String | ValueType::Text)
    }

    /// Returns the display name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Text => "text",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Decimal => "decimal",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::DateTime => "datetime",
            ValueType::Time => "time",
            ValueType::Binary => "binary",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime value of a record field, borrowed from the record.
///
/// # Example
///
/// ```
/// use scoped_search::{FieldRef, Number, Value};
///
/// struct Post {
///     title: String,
///     views: u32,
/// }
///
/// fn accessor<'a>(post: &'a Post, field: &FieldRef) -> Value<'a> {
///     match field.column.as_str() {
///         "title" => Value::String(&post.title),
///         "views" => Value::Number(Number::U64(post.views as u64)),
///         _ => Value::None,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Date or date-time value.
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
    /// Field not present or null.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Numeric value. Mixed-type comparisons go through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Parses an integer literal.
    ///
    /// Floats with no fractional part (`"30.0"`) are accepted as integers.
    pub fn parse_integer(raw: &str) -> Option<Number> {
        if let Ok(n) = raw.parse::<i64>() {
            return Some(Number::I64(n));
        }
        match Number::parse_float(raw)? {
            Number::F64(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Some(Number::I64(f as i64))
            }
            _ => None,
        }
    }

    /// Parses a finite floating point literal. `NaN` and infinities are rejected.
    pub fn parse_float(raw: &str) -> Option<Number> {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Number::F64)
    }

    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Point in time as milliseconds since the Unix epoch (UTC).
///
/// Dates are represented by their midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Timestamp of midnight at the start of `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Timestamp::from_datetime(date.and_time(chrono::NaiveTime::MIN))
    }

    /// Timestamp of a naive date-time, read as UTC.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Timestamp(datetime.and_utc().timestamp_millis())
    }

    /// Converts back to a naive UTC date-time.
    pub fn to_datetime(self) -> Option<NaiveDateTime> {
        DateTime::from_timestamp_millis(self.0).map(|dt| dt.naive_utc())
    }

    /// The same instant one calendar day later.
    pub fn next_day(self) -> Self {
        Timestamp(self.0.saturating_add(MILLIS_PER_DAY))
    }

    /// Parses a date-only literal (`2024-03-01` or `03/01/2024`).
    pub fn parse_date(raw: &str) -> Option<NaiveDate> {
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
    }

    /// Parses a literal carrying a time of day, including RFC 3339.
    pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Timestamp::from_date(date)
    }
}

/// Parses the boolean literal forms accepted by boolean fields.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Query value after coercion to a field's declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// String value.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Date or date-time value.
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<Number> for Literal {
    fn from(n: Number) -> Self {
        Literal::Number(n)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Number(Number::I64(n))
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(Number::F64(n))
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<Timestamp> for Literal {
    fn from(t: Timestamp) -> Self {
        Literal::Timestamp(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_strings_are_textual() {
        assert!(ValueType::String.is_textual());
        assert!(ValueType::Text.is_textual());
        assert!(!ValueType::Integer.is_textual());
        assert!(!ValueType::Binary.is_textual());
    }

    #[test]
    fn value_type_deserializes_aliases() {
        let ty: ValueType = serde_json::from_str("\"int\"").unwrap();
        assert_eq!(ty, ValueType::Integer);
        let ty: ValueType = serde_json::from_str("\"datetime\"").unwrap();
        assert_eq!(ty, ValueType::DateTime);
        let ty: ValueType = serde_json::from_str("\"varchar\"").unwrap();
        assert_eq!(ty, ValueType::String);
    }

    #[test]
    fn integer_parsing() {
        assert_eq!(Number::parse_integer("30"), Some(Number::I64(30)));
        assert_eq!(Number::parse_integer("-4"), Some(Number::I64(-4)));
        assert_eq!(Number::parse_integer("30.0"), Some(Number::I64(30)));
        assert_eq!(Number::parse_integer("30.5"), None);
        assert_eq!(Number::parse_integer("bob"), None);
    }

    #[test]
    fn float_parsing_rejects_non_finite() {
        assert_eq!(Number::parse_float("2.5"), Some(Number::F64(2.5)));
        assert_eq!(Number::parse_float("NaN"), None);
        assert_eq!(Number::parse_float("inf"), None);
        assert_eq!(Number::parse_float(""), None);
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
    }

    #[test]
    fn bool_forms() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn date_parsing() {
        let iso = Timestamp::parse_date("2024-03-01").unwrap();
        let us = Timestamp::parse_date("03/01/2024").unwrap();
        assert_eq!(iso, us);
        assert!(Timestamp::parse_date("yesterday").is_none());
    }

    #[test]
    fn datetime_parsing() {
        let plain = Timestamp::parse_datetime("2024-03-01 10:30:00").unwrap();
        let t_sep = Timestamp::parse_datetime("2024-03-01T10:30").unwrap();
        let rfc = Timestamp::parse_datetime("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(plain, t_sep);
        assert_eq!(plain, rfc);
        assert!(Timestamp::parse_datetime("2024-03-01").is_none());
    }

    #[test]
    fn timestamp_day_arithmetic() {
        let date = Timestamp::parse_date("2024-03-01").unwrap();
        let start = Timestamp::from_date(date);
        assert_eq!(start.as_millis(), 1_709_251_200_000);
        assert_eq!(start.next_day().as_millis() - start.as_millis(), MILLIS_PER_DAY);
        assert_eq!(start.to_datetime(), date.and_hms_opt(0, 0, 0));
    }
}
