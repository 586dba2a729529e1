//! Record fingerprinting for change detection.

use crate::canonical;
use crate::record::Record;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Computes the fingerprint of a record over all of its fields.
///
/// The fingerprint is the SHA-256 digest of the record's canonical byte
/// form, hex-encoded. Two records with identical field values produce the
/// same fingerprint regardless of field insertion order.
pub fn fingerprint(record: &Record) -> String {
    digest(record, record.field_names())
}

/// Computes the fingerprint of a record over a subset of fields.
///
/// Fields are considered in sorted order with duplicates ignored, so the
/// order of `fields` does not matter. A named field that is absent from
/// the record contributes an explicit missing marker, distinct from a
/// field that is present but null or empty.
pub fn fingerprint_fields(record: &Record, fields: &[String]) -> String {
    let mut selected: Vec<&str> = fields.iter().map(String::as_str).collect();
    selected.sort_unstable();
    selected.dedup();
    digest(record, selected.into_iter())
}

fn digest<'a>(record: &Record, fields: impl Iterator<Item = &'a str>) -> String {
    let mut buf = Vec::new();
    for field in fields {
        canonical::write_text(&mut buf, field);
        match record.get(field) {
            Some(value) => {
                buf.push(b'=');
                canonical::write_value(&mut buf, value);
            }
            // Missing marker: no '=' separator can follow from a value
            // rendering, so absence cannot collide with any present value.
            None => buf.push(b'?'),
        }
        buf.push(b';');
    }
    to_hex(Sha256::digest(&buf).as_slice())
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use proptest::prelude::*;

    fn deal(id: &str, name: &str, amount: i64) -> Record {
        Record::new()
            .with("id", id)
            .with("name", name)
            .with("amount", amount)
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = Record::new()
            .with("id", "1")
            .with("name", "Acme")
            .with("amount", 5i64);
        let b = Record::new()
            .with("amount", 5i64)
            .with("id", "1")
            .with("name", "Acme");
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn value_change_changes_fingerprint() {
        let a = deal("1", "Acme", 5);
        let b = deal("1", "Acme", 6);
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn unhashed_field_change_does_not_matter() {
        let fields = vec!["id".to_string(), "name".to_string()];
        let a = deal("1", "Acme", 5);
        let b = deal("1", "Acme", 999);
        assert_eq!(
            fingerprint_fields(&a, &fields),
            fingerprint_fields(&b, &fields)
        );
        let c = deal("1", "Beta", 5);
        assert_ne!(
            fingerprint_fields(&a, &fields),
            fingerprint_fields(&c, &fields)
        );
    }

    #[test]
    fn field_list_order_does_not_matter() {
        let record = deal("1", "Acme", 5);
        let forward = vec!["id".to_string(), "name".to_string()];
        let reverse = vec!["name".to_string(), "id".to_string()];
        assert_eq!(
            fingerprint_fields(&record, &forward),
            fingerprint_fields(&record, &reverse)
        );
    }

    #[test]
    fn absent_null_and_empty_are_distinct() {
        let fields = vec!["id".to_string(), "note".to_string()];
        let absent = Record::new().with("id", "1");
        let null = Record::new().with("id", "1").with("note", ());
        let empty = Record::new().with("id", "1").with("note", "");

        let a = fingerprint_fields(&absent, &fields);
        let b = fingerprint_fields(&null, &fields);
        let c = fingerprint_fields(&empty, &fields);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn fingerprint_is_hex_sha256() {
        let digest = fingerprint(&deal("1", "Acme", 5));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    fn scalar_value_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::Text),
        ]
    }

    fn record_strategy() -> impl Strategy<Value = Vec<(String, Value)>> {
        // Unique keys, so a permuted insertion order describes the same record.
        prop::collection::btree_map("[a-z]{1,8}", scalar_value_strategy(), 1..8)
            .prop_map(|map| map.into_iter().collect())
    }

    proptest! {
        #[test]
        fn permuted_insertion_preserves_fingerprint(pairs in record_strategy(), seed in any::<u64>()) {
            let record: Record = pairs.iter().cloned().collect();

            // Deterministic shuffle of the insertion order.
            let mut permuted = pairs.clone();
            let len = permuted.len();
            for i in (1..len).rev() {
                let j = (seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(i as u64)
                    % (i as u64 + 1)) as usize;
                permuted.swap(i, j);
            }
            let shuffled: Record = permuted.into_iter().collect();

            prop_assert_eq!(fingerprint(&record), fingerprint(&shuffled));
        }

        #[test]
        fn changing_a_hashed_field_changes_fingerprint(pairs in record_strategy()) {
            let record: Record = pairs.iter().cloned().collect();
            let field = pairs[0].0.clone();
            let mut changed = record.clone();
            changed.set(field, "a value no generated record contains \u{1}");
            prop_assert_ne!(fingerprint(&record), fingerprint(&changed));
        }
    }
}
