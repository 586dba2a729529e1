//! Bidirectional synchronization.

use crate::config::SyncOptions;
use crate::destination::Destination;
use crate::orchestrator::SyncOrchestrator;
use crate::report::SyncReport;
use dealsync_record::Record;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Combined result of an A→B pass followed by a B→A pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidirectionalReport {
    /// Report for the first (A→B) pass.
    pub a_to_b: SyncReport,
    /// Report for the second (B→A) pass.
    pub b_to_a: SyncReport,
    /// Records written across both passes.
    pub total_records_synced: usize,
    /// True when both passes succeeded.
    pub success: bool,
}

/// Runs the two directions of a bidirectional sync over one entity type.
///
/// The directions run strictly one after the other, never concurrently:
/// interleaving would let the two directions resolve the same conflict
/// independently and diverge, and could read a record as unchanged while
/// the opposite direction is mid-write.
pub struct BidirectionalCoordinator {
    orchestrator: SyncOrchestrator,
}

impl BidirectionalCoordinator {
    /// Creates a coordinator with its own orchestrator.
    pub fn new() -> Self {
        Self::with_orchestrator(SyncOrchestrator::new())
    }

    /// Creates a coordinator around an existing orchestrator.
    pub fn with_orchestrator(orchestrator: SyncOrchestrator) -> Self {
        Self { orchestrator }
    }

    /// Syncs A's records into B, then B's records into A.
    pub fn sync<A, B>(
        &self,
        records_a: &[Record],
        records_b: &[Record],
        side_a: &A,
        side_b: &B,
        options: &SyncOptions,
    ) -> BidirectionalReport
    where
        A: Destination + ?Sized,
        B: Destination + ?Sized,
    {
        info!(entity_type = %options.entity_type, "starting bidirectional sync");

        let a_to_b = self.orchestrator.sync(records_a, side_b, options);
        let b_to_a = self.orchestrator.sync(records_b, side_a, options);

        let total_records_synced = a_to_b.records_synced() + b_to_a.records_synced();
        let success = a_to_b.success && b_to_a.success;
        info!(
            entity_type = %options.entity_type,
            total_records_synced,
            success,
            "bidirectional sync complete"
        );

        BidirectionalReport {
            a_to_b,
            b_to_a,
            total_records_synced,
            success,
        }
    }
}

impl Default for BidirectionalCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
