//! Field vocabulary mapping.

use dealsync_record::Record;
use std::collections::BTreeMap;

/// Renames record fields from a source system's vocabulary to the
/// destination's.
///
/// Mapping happens before validation and conflict detection, so all
/// downstream logic operates on destination field names.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapper;

impl FieldMapper {
    /// Creates a new field mapper.
    pub fn new() -> Self {
        Self
    }

    /// Applies a rename table to a record.
    ///
    /// Every key present in `mapping` is renamed to its target; keys
    /// absent from the mapping pass through unchanged. The mapping is a
    /// partial overlay, not an allow-list. A rename that lands on a key
    /// that also exists in the record resolves by the record's canonical
    /// field order, last write wins.
    pub fn apply(&self, record: &Record, mapping: &BTreeMap<String, String>) -> Record {
        record
            .iter()
            .map(|(field, value)| {
                let name = mapping
                    .get(field)
                    .cloned()
                    .unwrap_or_else(|| field.to_string());
                (name, value.clone())
            })
            .collect()
    }
}
