//! Record validation and field transforms.

use dealsync_record::{Record, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of validating a record against a set of required fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Required fields that were absent or null.
    pub missing: Vec<String>,
}

impl Validation {
    /// Returns true if every required field was present.
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// A field-level value transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Lowercase a text value.
    Lowercase,
    /// Uppercase a text value.
    Uppercase,
    /// Trim surrounding whitespace from a text value.
    Trim,
    /// Coerce to an integer.
    ToInt,
    /// Coerce to a float.
    ToFloat,
    /// Coerce to a boolean.
    ToBool,
    /// Render any value as its JSON text form.
    ToJson,
    /// Render a scalar as text.
    ToString,
}

impl Transform {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Transform::Lowercase => "lowercase",
            Transform::Uppercase => "uppercase",
            Transform::Trim => "trim",
            Transform::ToInt => "to_int",
            Transform::ToFloat => "to_float",
            Transform::ToBool => "to_bool",
            Transform::ToJson => "to_json",
            Transform::ToString => "to_string",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Transform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lowercase" => Ok(Transform::Lowercase),
            "uppercase" => Ok(Transform::Uppercase),
            "trim" => Ok(Transform::Trim),
            "to_int" => Ok(Transform::ToInt),
            "to_float" => Ok(Transform::ToFloat),
            "to_bool" => Ok(Transform::ToBool),
            "to_json" => Ok(Transform::ToJson),
            "to_string" => Ok(Transform::ToString),
            _ => Err(format!("Unknown transform: {s}")),
        }
    }
}

/// Validates records and applies field transforms.
///
/// Validation is pure. Transforms never fail a record: a transform that
/// does not apply to a value's shape, or whose parse fails, returns the
/// value unchanged along with a warning so the pipeline can keep going
/// and surface the problem downstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    /// Creates a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Checks a record for required fields.
    ///
    /// A field is missing when it is absent or null.
    pub fn validate(&self, record: &Record, required_fields: &[String]) -> Validation {
        let missing = required_fields
            .iter()
            .filter(|field| record.get(field).map_or(true, Value::is_null))
            .cloned()
            .collect();
        Validation { missing }
    }

    /// Applies a transform to a value.
    ///
    /// Returns the transformed value, or the original value unchanged
    /// plus a warning when the transform does not apply.
    pub fn transform(&self, value: &Value, transform: Transform) -> (Value, Option<String>) {
        match transform {
            Transform::Lowercase => match value {
                Value::Text(s) => (Value::Text(s.to_lowercase()), None),
                _ => unsupported(value, transform),
            },
            Transform::Uppercase => match value {
                Value::Text(s) => (Value::Text(s.to_uppercase()), None),
                _ => unsupported(value, transform),
            },
            Transform::Trim => match value {
                Value::Text(s) => (Value::Text(s.trim().to_string()), None),
                _ => unsupported(value, transform),
            },
            Transform::ToInt => match value {
                Value::Integer(_) => (value.clone(), None),
                Value::Float(x) if x.is_finite() => (Value::Integer(*x as i64), None),
                Value::Bool(b) => (Value::Integer(i64::from(*b)), None),
                Value::Text(s) => {
                    let trimmed = s.trim();
                    if let Ok(n) = trimmed.parse::<i64>() {
                        (Value::Integer(n), None)
                    } else if let Ok(x) = trimmed.parse::<f64>() {
                        (Value::Integer(x as i64), None)
                    } else {
                        unparseable(value, transform, s)
                    }
                }
                _ => unsupported(value, transform),
            },
            Transform::ToFloat => match value {
                Value::Float(_) => (value.clone(), None),
                Value::Integer(n) => (Value::Float(*n as f64), None),
                Value::Bool(b) => (Value::Float(if *b { 1.0 } else { 0.0 }), None),
                Value::Text(s) => match s.trim().parse::<f64>() {
                    Ok(x) => (Value::Float(x), None),
                    Err(_) => unparseable(value, transform, s),
                },
                _ => unsupported(value, transform),
            },
            Transform::ToBool => match value {
                Value::Bool(_) => (value.clone(), None),
                Value::Integer(n) => (Value::Bool(*n != 0), None),
                Value::Text(s) => match s.trim().to_lowercase().as_str() {
                    "true" | "yes" | "1" => (Value::Bool(true), None),
                    "false" | "no" | "0" | "" => (Value::Bool(false), None),
                    _ => unparseable(value, transform, s),
                },
                _ => unsupported(value, transform),
            },
            Transform::ToJson => match serde_json::to_string(value) {
                Ok(json) => (Value::Text(json), None),
                Err(e) => (
                    value.clone(),
                    Some(format!("transform to_json failed: {e}")),
                ),
            },
            Transform::ToString => match value {
                Value::Text(_) => (value.clone(), None),
                Value::Integer(n) => (Value::Text(n.to_string()), None),
                Value::Float(x) => (Value::Text(x.to_string()), None),
                Value::Bool(b) => (Value::Text(b.to_string()), None),
                Value::Timestamp(t) => (Value::Text(t.to_rfc3339()), None),
                _ => unsupported(value, transform),
            },
        }
    }
}

fn unsupported(value: &Value, transform: Transform) -> (Value, Option<String>) {
    (
        value.clone(),
        Some(format!(
            "transform {transform} does not apply to a {} value",
            value.type_name()
        )),
    )
}

fn unparseable(value: &Value, transform: Transform, text: &str) -> (Value, Option<String>) {
    (
        value.clone(),
        Some(format!("transform {transform} failed for '{text}'")),
    )
}
