//! Dynamic field value type.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dynamic field value.
///
/// This type represents the closed set of field shapes that synced records
/// carry. Keeping the set closed lets validators and transforms match
/// exhaustively instead of guessing at an open "any" type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (supports full i64 range).
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Text string (UTF-8).
    Text(String),
    /// Point in time (UTC).
    Timestamp(DateTime<Utc>),
    /// Array of values.
    Array(Vec<Value>),
    /// Nested mapping with string keys.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a float, if it is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Get this value as a string, if it is a text string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as a timestamp, if it is one.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Get this value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Interpret this value as a point in time.
    ///
    /// Accepts native timestamps, RFC 3339 text, naive
    /// `YYYY-MM-DDTHH:MM:SS[.fff]` or `YYYY-MM-DD HH:MM:SS[.fff]` text
    /// (treated as UTC), integer Unix epochs (values at or above
    /// 100_000_000_000 are milliseconds, smaller values seconds), and
    /// float fractional epoch seconds.
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            Value::Text(s) => parse_instant(s),
            Value::Integer(n) => {
                if n.unsigned_abs() >= 100_000_000_000 {
                    DateTime::from_timestamp_millis(*n)
                } else {
                    DateTime::from_timestamp(*n, 0)
                }
            }
            Value::Float(x) => {
                if x.is_finite() {
                    DateTime::from_timestamp_millis((x * 1000.0) as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// A short name for this value's shape, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    // Values lacking a timezone are UTC by contract.
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Value::Map(m)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn value_accessors() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(true).is_null());

        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(42).as_bool(), None);

        assert_eq!(Value::Integer(42).as_integer(), Some(42));
        assert_eq!(Value::Text("42".to_string()).as_integer(), None);

        assert_eq!(Value::Float(1.5).as_float(), Some(1.5));
        assert_eq!(Value::Text("hello".to_string()).as_text(), Some("hello"));
    }

    #[test]
    fn instant_from_timestamp() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(Value::Timestamp(t).as_instant(), Some(t));
    }

    #[test]
    fn instant_from_rfc3339_text() {
        let parsed = Value::Text("2026-03-01T12:00:00+02:00".to_string())
            .as_instant()
            .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn instant_from_naive_text_is_utc() {
        let parsed = Value::Text("2026-03-01T12:00:00".to_string())
            .as_instant()
            .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());

        let spaced = Value::Text("2026-03-01 12:00:00.250".to_string())
            .as_instant()
            .unwrap();
        assert_eq!(spaced.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn instant_from_epoch_integers() {
        // Seconds
        let secs = Value::Integer(1_767_225_600).as_instant().unwrap();
        assert_eq!(secs.timestamp(), 1_767_225_600);

        // Milliseconds
        let millis = Value::Integer(1_767_225_600_123).as_instant().unwrap();
        assert_eq!(millis.timestamp_millis(), 1_767_225_600_123);
    }

    #[test]
    fn instant_rejects_other_shapes() {
        assert_eq!(Value::Null.as_instant(), None);
        assert_eq!(Value::Bool(true).as_instant(), None);
        assert_eq!(Value::Text("not a date".to_string()).as_instant(), None);
        assert_eq!(Value::Float(f64::NAN).as_instant(), None);
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i64), Value::Integer(42));
        assert_eq!(Value::from(42i32), Value::Integer(42));
        assert_eq!(Value::from(1.5f64), Value::Float(1.5));
        assert_eq!(Value::from("hello"), Value::Text("hello".to_string()));
        assert_eq!(Value::from(()), Value::Null);
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(1i64)), Value::Integer(1));
        assert_eq!(
            Value::from(vec![1i64, 2]),
            Value::Array(vec![Value::Integer(1), Value::Integer(2)])
        );
    }

    #[test]
    fn serde_round_trip() {
        let value = Value::Array(vec![
            Value::Null,
            Value::Bool(false),
            Value::Integer(7),
            Value::Text("x".to_string()),
        ]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"[null,false,7,"x"]"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
