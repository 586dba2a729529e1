//! Canonical byte rendering of values.
//!
//! A deterministic, JSON-like rendering used as the fingerprinting
//! substrate. It is not a wire format: nothing parses it back. Map keys
//! render in sorted order, floats use the shortest round-trip form, and
//! timestamps render as fixed-precision RFC 3339, so equal values always
//! produce equal bytes regardless of how they were built.

use crate::value::Value;
use chrono::SecondsFormat;

/// Renders a value to its canonical byte form.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    write_value(&mut buf, value);
    buf
}

pub(crate) fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Integer(n) => buf.extend_from_slice(n.to_string().as_bytes()),
        // Display for f64 is the shortest representation that round-trips;
        // NaN and infinities render as their (deterministic) Display forms.
        Value::Float(x) => buf.extend_from_slice(x.to_string().as_bytes()),
        Value::Text(s) => write_text(buf, s),
        Value::Timestamp(t) => {
            write_text(buf, &t.to_rfc3339_opts(SecondsFormat::Nanos, true));
        }
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_value(buf, item);
            }
            buf.push(b']');
        }
        Value::Map(map) => {
            buf.push(b'{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_text(buf, key);
                buf.push(b':');
                write_value(buf, item);
            }
            buf.push(b'}');
        }
    }
}

pub(crate) fn write_text(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for c in s.chars() {
        match c {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                buf.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut encoded = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut encoded).as_bytes());
            }
        }
    }
    buf.push(b'"');
}
