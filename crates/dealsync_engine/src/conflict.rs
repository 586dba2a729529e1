//! Conflict detection and resolution.

use dealsync_record::{Record, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy for reconciling a pair of same-identity records that disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    /// The source record wins unchanged.
    SourceWins,
    /// The destination record wins unchanged.
    DestinationWins,
    /// The side with the strictly later timestamp wins.
    NewestWins,
    /// Prefer destination values, backfill nulls from the source.
    Merge,
    /// Defer to a human; nothing is written.
    Manual,
}

impl ConflictResolution {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictResolution::SourceWins => "source_wins",
            ConflictResolution::DestinationWins => "destination_wins",
            ConflictResolution::NewestWins => "newest_wins",
            ConflictResolution::Merge => "merge",
            ConflictResolution::Manual => "manual",
        }
    }

    /// Returns true if this policy resolves conflicts without a human.
    #[must_use]
    pub fn auto_resolves(&self) -> bool {
        !matches!(self, ConflictResolution::Manual)
    }
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ConflictResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "source_wins" => Ok(ConflictResolution::SourceWins),
            "destination_wins" => Ok(ConflictResolution::DestinationWins),
            "newest_wins" => Ok(ConflictResolution::NewestWins),
            "merge" => Ok(ConflictResolution::Merge),
            "manual" => Ok(ConflictResolution::Manual),
            _ => Err(format!("Unknown conflict resolution: {s}")),
        }
    }
}

/// A same-identity record pair that needs a human decision.
///
/// Returned to the caller for routing to a review queue; the engine never
/// writes one to any store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Shared identity of the pair, when known.
    pub identity: Option<String>,
    /// The source-side record.
    pub source: Record,
    /// The destination-side record.
    pub destination: Record,
    /// Fields on which the two sides disagree.
    pub fields: Vec<String>,
}

/// Lists the fields on which two records disagree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetector;

impl ConflictDetector {
    /// Creates a new conflict detector.
    pub fn new() -> Self {
        Self
    }

    /// Returns the subset of `fields` whose source and destination values
    /// differ, preserving the order of `fields`.
    ///
    /// Ordinary equality, not hashing: callers need to know which fields
    /// differ. A field present on one side and absent on the other differs.
    pub fn differing_fields(
        &self,
        source: &Record,
        destination: &Record,
        fields: &[String],
    ) -> Vec<String> {
        fields
            .iter()
            .filter(|field| source.get(field) != destination.get(field))
            .cloned()
            .collect()
    }
}

/// Result of resolving a conflicting pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The pair resolved to a single record to write.
    Resolved(Record),
    /// The pair needs manual resolution; nothing may be written.
    Manual(ConflictRecord),
}

/// Applies a [`ConflictResolution`] policy to a conflicting record pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    /// Creates a new conflict resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolves a conflicting pair under the given policy.
    ///
    /// `timestamp_field` names the field compared by `NewestWins` and
    /// always-newest-merged by `Merge`. Timestamps that are missing or
    /// unparseable on either side fall back to the source record, the
    /// documented default; equal instants resolve the same way.
    pub fn resolve(
        &self,
        source: &Record,
        destination: &Record,
        resolution: ConflictResolution,
        timestamp_field: &str,
    ) -> Resolution {
        match resolution {
            ConflictResolution::SourceWins => Resolution::Resolved(source.clone()),
            ConflictResolution::DestinationWins => Resolution::Resolved(destination.clone()),
            ConflictResolution::NewestWins => {
                let source_at = source.get(timestamp_field).and_then(Value::as_instant);
                let destination_at = destination.get(timestamp_field).and_then(Value::as_instant);
                match (source_at, destination_at) {
                    (Some(s), Some(d)) if d > s => Resolution::Resolved(destination.clone()),
                    _ => Resolution::Resolved(source.clone()),
                }
            }
            ConflictResolution::Merge => {
                Resolution::Resolved(merge(source, destination, timestamp_field))
            }
            ConflictResolution::Manual => {
                let fields: Vec<String> = source
                    .field_names()
                    .filter(|field| source.get(field) != destination.get(field))
                    .map(str::to_string)
                    .collect();
                Resolution::Manual(ConflictRecord {
                    identity: None,
                    source: source.clone(),
                    destination: destination.clone(),
                    fields,
                })
            }
        }
    }
}

/// Merge policy: destination values are authoritative, null or absent
/// destination fields backfill from non-null source fields, and the
/// timestamp field always takes the later of the two sides.
fn merge(source: &Record, destination: &Record, timestamp_field: &str) -> Record {
    let mut merged = destination.clone();

    for (field, value) in source.iter() {
        if field == timestamp_field || value.is_null() {
            continue;
        }
        if destination.get(field).map_or(true, Value::is_null) {
            merged.set(field, value.clone());
        }
    }

    let source_at = source.get(timestamp_field).and_then(Value::as_instant);
    let destination_at = destination.get(timestamp_field).and_then(Value::as_instant);
    let source_is_newer = match (source_at, destination_at) {
        (Some(s), Some(d)) => s > d,
        (Some(_), None) => true,
        (None, _) => false,
    };
    if source_is_newer {
        if let Some(value) = source.get(timestamp_field) {
            merged.set(timestamp_field, value.clone());
        }
    }

    merged
}
