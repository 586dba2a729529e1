//! Change classification against a caller-owned baseline.

use dealsync_record::{fingerprint, fingerprint_fields, Record};
use std::collections::BTreeMap;

/// Last-known fingerprints by record identity.
///
/// Supplied and persisted by the caller; the engine only reads it.
pub type Baseline = BTreeMap<String, String>;

/// A batch of current records classified against a baseline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    /// Records whose identity is not in the baseline.
    pub added: Vec<Record>,
    /// Records in the baseline whose fingerprint differs.
    pub modified: Vec<Record>,
    /// Records whose fingerprint matches the baseline.
    pub unchanged: Vec<Record>,
}

impl ChangeSet {
    /// Total records classified.
    pub fn total(&self) -> usize {
        self.added.len() + self.modified.len() + self.unchanged.len()
    }

    /// Returns true if nothing was added or modified.
    pub fn is_quiet(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty()
    }
}

/// Classifies current records as added, modified, or unchanged.
///
/// `fields` restricts the fingerprint to a subset of tracked fields; when
/// omitted, all fields count. Records without a usable identity cannot be
/// matched against the baseline and are classified as added.
pub fn classify(
    current: &[Record],
    baseline: &Baseline,
    id_field: &str,
    fields: Option<&[String]>,
) -> ChangeSet {
    let mut set = ChangeSet::default();
    for record in current {
        let digest = match fields {
            Some(fields) => fingerprint_fields(record, fields),
            None => fingerprint(record),
        };
        let known = record
            .identity(id_field)
            .and_then(|id| baseline.get(&id).cloned());
        match known {
            None => set.added.push(record.clone()),
            Some(previous) if previous == digest => set.unchanged.push(record.clone()),
            Some(_) => set.modified.push(record.clone()),
        }
    }
    set
}

/// Computes the baseline a caller should persist after a successful pass.
///
/// Records without a usable identity are omitted, matching how
/// [`classify`] treats them.
pub fn snapshot(records: &[Record], id_field: &str, fields: Option<&[String]>) -> Baseline {
    records
        .iter()
        .filter_map(|record| {
            record.identity(id_field).map(|id| {
                let digest = match fields {
                    Some(fields) => fingerprint_fields(record, fields),
                    None => fingerprint(record),
                };
                (id, digest)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(id: &str, name: &str) -> Record {
        Record::new().with("id", id).with("name", name)
    }

    #[test]
    fn classifies_added_modified_unchanged() {
        let previous = vec![deal("1", "Acme"), deal("2", "Beta")];
        let baseline = snapshot(&previous, "id", None);

        let current = vec![
            deal("1", "Acme"),         // unchanged
            deal("2", "Beta Holdings"), // modified
            deal("3", "Gamma"),        // added
        ];
        let set = classify(&current, &baseline, "id", None);

        assert_eq!(set.unchanged, vec![deal("1", "Acme")]);
        assert_eq!(set.modified, vec![deal("2", "Beta Holdings")]);
        assert_eq!(set.added, vec![deal("3", "Gamma")]);
        assert_eq!(set.total(), 3);
        assert!(!set.is_quiet());
    }

    #[test]
    fn tracked_field_subset_ignores_other_changes() {
        let fields = vec!["name".to_string()];
        let previous = vec![deal("1", "Acme").with("notes", "old")];
        let baseline = snapshot(&previous, "id", Some(&fields));

        let current = vec![deal("1", "Acme").with("notes", "new")];
        let set = classify(&current, &baseline, "id", Some(&fields));
        assert_eq!(set.unchanged.len(), 1);
        assert!(set.is_quiet());
    }

    #[test]
    fn record_without_identity_is_added() {
        let baseline = Baseline::new();
        let nameless = Record::new().with("name", "orphan");
        let set = classify(&[nameless.clone()], &baseline, "id", None);
        assert_eq!(set.added, vec![nameless]);

        // And omitted from snapshots.
        let snap = snapshot(&[Record::new().with("name", "orphan")], "id", None);
        assert!(snap.is_empty());
    }

    #[test]
    fn empty_batch_is_quiet() {
        let set = classify(&[], &Baseline::new(), "id", None);
        assert_eq!(set.total(), 0);
        assert!(set.is_quiet());
    }
}
