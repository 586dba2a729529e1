//! Per-record outcomes and the pass report.

use crate::config::SyncStrategy;
use crate::conflict::ConflictRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal outcome of one source record within a pass.
///
/// Exactly one outcome is produced per source record; the variants are
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// The record did not exist at the destination and was created.
    Created,
    /// The record existed and was written (directly or after resolution).
    Updated,
    /// The record was already in sync; nothing was written.
    Skipped,
    /// The record failed validation or its write failed.
    Failed(String),
    /// The record pair needs manual resolution; nothing was written.
    Conflict(ConflictRecord),
}

/// Aggregated result of a one-directional sync pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// Unique identifier of this pass.
    pub run_id: Uuid,
    /// Entity type that was synced.
    pub entity_type: String,
    /// Strategy the pass ran under.
    pub strategy: SyncStrategy,
    /// Source records processed.
    pub records_processed: usize,
    /// Records created at the destination.
    pub created: usize,
    /// Records updated at the destination.
    pub updated: usize,
    /// Records that failed validation or writing.
    pub failed: usize,
    /// Records skipped as already in sync.
    pub skipped: usize,
    /// Record pairs deferred to manual resolution.
    pub conflicts: Vec<ConflictRecord>,
    /// Error messages for failed records and pass-level failures.
    pub errors: Vec<String>,
    /// Non-fatal warnings (e.g. transforms that did not apply).
    pub warnings: Vec<String>,
    /// True when nothing failed and nothing needs manual resolution.
    pub success: bool,
    /// When the pass finished.
    pub synced_at: DateTime<Utc>,
}

impl SyncReport {
    /// Creates an empty report for a pass that is starting.
    pub fn new(entity_type: impl Into<String>, strategy: SyncStrategy) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            entity_type: entity_type.into(),
            strategy,
            records_processed: 0,
            created: 0,
            updated: 0,
            failed: 0,
            skipped: 0,
            conflicts: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            success: false,
            synced_at: Utc::now(),
        }
    }

    /// Folds one record outcome into the counters.
    pub fn record(&mut self, outcome: RecordOutcome) {
        self.records_processed += 1;
        match outcome {
            RecordOutcome::Created => self.created += 1,
            RecordOutcome::Updated => self.updated += 1,
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::Failed(error) => {
                self.failed += 1;
                self.errors.push(error);
            }
            RecordOutcome::Conflict(conflict) => self.conflicts.push(conflict),
        }
    }

    /// Closes out the pass and computes the success flag.
    ///
    /// A pass with only conflicts still reports failure: "needs human
    /// input" is distinct from "broken", but neither is success.
    pub fn finalize(&mut self) {
        self.synced_at = Utc::now();
        self.success = self.failed == 0 && self.conflicts.is_empty();
    }

    /// Records the pass as aborted by an engine-level error.
    pub fn abort(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.synced_at = Utc::now();
        self.success = false;
    }

    /// Records actually written: created plus updated.
    pub fn records_synced(&self) -> usize {
        self.created + self.updated
    }
}
