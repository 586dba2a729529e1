//! Configuration for a sync pass.

use crate::conflict::ConflictResolution;
use crate::validate::Transform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Strategy governing which records are considered and re-written during
/// a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStrategy {
    /// Process every source record.
    Full,
    /// Process a caller-filtered batch of changed records.
    Incremental,
    /// Process a caller-computed delta against a baseline.
    Delta,
    /// Make the destination mirror the source, trusting per-field
    /// comparison to skip unchanged records.
    Mirror,
}

impl SyncStrategy {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStrategy::Full => "full",
            SyncStrategy::Incremental => "incremental",
            SyncStrategy::Delta => "delta",
            SyncStrategy::Mirror => "mirror",
        }
    }
}

impl fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SyncStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(SyncStrategy::Full),
            "incremental" => Ok(SyncStrategy::Incremental),
            "delta" => Ok(SyncStrategy::Delta),
            "mirror" => Ok(SyncStrategy::Mirror),
            _ => Err(format!("Unknown sync strategy: {s}")),
        }
    }
}

/// Declared direction of a configured sync.
///
/// Documentation metadata only: actual directionality is expressed by
/// which side is passed as source and which as destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    /// External system into the platform.
    Inbound,
    /// Platform out to the external system.
    Outbound,
    /// Both directions.
    Bidirectional,
}

impl SyncDirection {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncDirection::Inbound => "inbound",
            SyncDirection::Outbound => "outbound",
            SyncDirection::Bidirectional => "bidirectional",
        }
    }
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SyncDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inbound" => Ok(SyncDirection::Inbound),
            "outbound" => Ok(SyncDirection::Outbound),
            "bidirectional" => Ok(SyncDirection::Bidirectional),
            _ => Err(format!("Unknown sync direction: {s}")),
        }
    }
}

/// Options for a sync pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Entity type being synced (e.g. `"deals"`, `"contacts"`).
    pub entity_type: String,
    /// Strategy for the pass.
    pub strategy: SyncStrategy,
    /// Policy for conflicting record pairs.
    pub resolution: ConflictResolution,
    /// Field carrying record identity.
    pub id_field: String,
    /// Field compared by newest-wins and merge resolution.
    pub timestamp_field: String,
    /// Fields a record must carry (non-null) to be written.
    pub required_fields: Vec<String>,
    /// Source-to-destination field renames, applied before everything else.
    pub field_mappings: BTreeMap<String, String>,
    /// Per-field transforms, applied after mapping and before validation.
    pub transforms: Vec<(String, Transform)>,
}

impl SyncOptions {
    /// Creates options with the default `id` / `updated_at` fields.
    pub fn new(
        entity_type: impl Into<String>,
        strategy: SyncStrategy,
        resolution: ConflictResolution,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            strategy,
            resolution,
            id_field: "id".to_string(),
            timestamp_field: "updated_at".to_string(),
            required_fields: Vec::new(),
            field_mappings: BTreeMap::new(),
            transforms: Vec::new(),
        }
    }

    /// Sets the identity field.
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Sets the timestamp field.
    pub fn with_timestamp_field(mut self, field: impl Into<String>) -> Self {
        self.timestamp_field = field.into();
        self
    }

    /// Sets the required fields.
    pub fn with_required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one field rename.
    pub fn with_field_mapping(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.field_mappings.insert(from.into(), to.into());
        self
    }

    /// Sets the whole rename table.
    pub fn with_field_mappings(mut self, mappings: BTreeMap<String, String>) -> Self {
        self.field_mappings = mappings;
        self
    }

    /// Adds one field transform.
    pub fn with_transform(mut self, field: impl Into<String>, transform: Transform) -> Self {
        self.transforms.push((field.into(), transform));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_builder() {
        let options = SyncOptions::new(
            "deals",
            SyncStrategy::Full,
            ConflictResolution::SourceWins,
        )
        .with_id_field("deal_id")
        .with_timestamp_field("modified_at")
        .with_required_fields(["deal_id", "name"])
        .with_field_mapping("dealname", "name")
        .with_transform("name", Transform::Trim);

        assert_eq!(options.entity_type, "deals");
        assert_eq!(options.id_field, "deal_id");
        assert_eq!(options.timestamp_field, "modified_at");
        assert_eq!(options.required_fields, vec!["deal_id", "name"]);
        assert_eq!(options.field_mappings.get("dealname"), Some(&"name".to_string()));
        assert_eq!(options.transforms, vec![("name".to_string(), Transform::Trim)]);
    }

    #[test]
    fn defaults() {
        let options = SyncOptions::new(
            "contacts",
            SyncStrategy::Mirror,
            ConflictResolution::Manual,
        );
        assert_eq!(options.id_field, "id");
        assert_eq!(options.timestamp_field, "updated_at");
        assert!(options.required_fields.is_empty());
        assert!(options.field_mappings.is_empty());
    }

    #[test]
    fn strategy_string_round_trip() {
        for strategy in [
            SyncStrategy::Full,
            SyncStrategy::Incremental,
            SyncStrategy::Delta,
            SyncStrategy::Mirror,
        ] {
            assert_eq!(strategy.as_str().parse::<SyncStrategy>().unwrap(), strategy);
        }
        // Unknown strategy strings fail at parse time, not mid-pass.
        assert!("sideways".parse::<SyncStrategy>().is_err());
    }

    #[test]
    fn direction_string_round_trip() {
        for direction in [
            SyncDirection::Inbound,
            SyncDirection::Outbound,
            SyncDirection::Bidirectional,
        ] {
            assert_eq!(
                direction.as_str().parse::<SyncDirection>().unwrap(),
                direction
            );
        }
    }
}
