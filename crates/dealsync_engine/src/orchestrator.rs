//! One-directional synchronization pass.

use crate::config::{SyncOptions, SyncStrategy};
use crate::conflict::{ConflictDetector, ConflictResolver, Resolution};
use crate::destination::Destination;
use crate::error::{SyncError, SyncResult};
use crate::mapper::FieldMapper;
use crate::report::{RecordOutcome, SyncReport};
use crate::validate::Validator;
use chrono::{DateTime, Utc};
use dealsync_record::Record;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Cumulative statistics across passes.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Total passes completed (including aborted ones).
    pub passes_completed: u64,
    /// Total records created.
    pub records_created: u64,
    /// Total records updated.
    pub records_updated: u64,
    /// Total records failed.
    pub records_failed: u64,
    /// Total records skipped.
    pub records_skipped: u64,
    /// Total conflicts deferred to manual resolution.
    pub conflicts_detected: u64,
    /// Last error message, if any.
    pub last_error: Option<String>,
    /// When the last pass finished.
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Drives one-directional synchronization passes.
///
/// The orchestrator composes the stateless services (field mapping,
/// validation, conflict detection and resolution) and aggregates
/// per-record outcomes into a [`SyncReport`]. No record state survives a
/// pass; the only retained state is observational statistics.
pub struct SyncOrchestrator {
    mapper: FieldMapper,
    validator: Validator,
    detector: ConflictDetector,
    resolver: ConflictResolver,
    stats: RwLock<SyncStats>,
}

impl SyncOrchestrator {
    /// Creates a new orchestrator.
    pub fn new() -> Self {
        Self {
            mapper: FieldMapper::new(),
            validator: Validator::new(),
            detector: ConflictDetector::new(),
            resolver: ConflictResolver::new(),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Returns the cumulative statistics.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Runs one pass from `source_records` into `destination`.
    ///
    /// Record-level failures are isolated: a record that fails validation
    /// or writing is counted and the pass continues. Failure of the batch
    /// destination read aborts the pass; the partial report accumulated so
    /// far is still returned with `success == false`.
    pub fn sync<D>(
        &self,
        source_records: &[Record],
        destination: &D,
        options: &SyncOptions,
    ) -> SyncReport
    where
        D: Destination + ?Sized,
    {
        let mut report = SyncReport::new(&options.entity_type, options.strategy);
        info!(
            entity_type = %options.entity_type,
            strategy = %options.strategy,
            records = source_records.len(),
            "starting sync pass"
        );

        let existing = match destination.list() {
            Ok(records) => index_by_identity(records, &options.id_field),
            Err(e) => {
                error!(entity_type = %options.entity_type, error = %e, "sync pass aborted");
                report.abort(e.to_string());
                self.fold_stats(&report);
                return report;
            }
        };

        for record in source_records {
            let outcome = match self.process_record(
                record,
                &existing,
                destination,
                options,
                &mut report.warnings,
            ) {
                Ok(outcome) => outcome,
                Err(e) => RecordOutcome::Failed(e.to_string()),
            };
            if let RecordOutcome::Failed(message) = &outcome {
                warn!(entity_type = %options.entity_type, error = %message, "record failed");
            }
            report.record(outcome);
        }

        report.finalize();
        self.fold_stats(&report);
        info!(
            entity_type = %options.entity_type,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            conflicts = report.conflicts.len(),
            "sync pass complete"
        );
        report
    }

    /// Processes a single source record through the per-record state
    /// machine. Errors returned here are record-scoped by construction:
    /// the caller folds them into a `Failed` outcome.
    fn process_record<D>(
        &self,
        record: &Record,
        existing: &BTreeMap<String, Record>,
        destination: &D,
        options: &SyncOptions,
        warnings: &mut Vec<String>,
    ) -> SyncResult<RecordOutcome>
    where
        D: Destination + ?Sized,
    {
        // Mapping first: everything downstream speaks the destination's
        // field vocabulary.
        let mut candidate = if options.field_mappings.is_empty() {
            record.clone()
        } else {
            self.mapper.apply(record, &options.field_mappings)
        };

        for (field, transform) in &options.transforms {
            if let Some(value) = candidate.get(field) {
                let (transformed, warning) = self.validator.transform(value, *transform);
                if let Some(message) = warning {
                    warnings.push(format!("{field}: {message}"));
                }
                candidate.set(field.clone(), transformed);
            }
        }

        let validation = self.validator.validate(&candidate, &options.required_fields);
        if !validation.is_valid() {
            return Err(SyncError::MissingFields {
                missing: validation.missing,
            });
        }

        let identity = candidate
            .identity(&options.id_field)
            .ok_or_else(|| SyncError::MissingIdentity(options.id_field.clone()))?;

        let Some(current) = existing.get(&identity) else {
            destination.write(None, &candidate, false)?;
            return Ok(RecordOutcome::Created);
        };

        let fields: Vec<String> = candidate.field_names().map(str::to_string).collect();
        let differing = self.detector.differing_fields(&candidate, current, &fields);

        if differing.is_empty() {
            // Mirror trusts the per-field comparison; other strategies
            // re-write unless the records are field-for-field identical
            // (the destination may carry extra fields).
            if options.strategy == SyncStrategy::Mirror || candidate == *current {
                return Ok(RecordOutcome::Skipped);
            }
            destination.write(Some(&identity), &candidate, true)?;
            return Ok(RecordOutcome::Updated);
        }

        warn!(
            entity_type = %options.entity_type,
            identity = %identity,
            fields = ?differing,
            "conflicting fields detected"
        );

        match self.resolver.resolve(
            &candidate,
            current,
            options.resolution,
            &options.timestamp_field,
        ) {
            Resolution::Resolved(resolved) => {
                destination.write(Some(&identity), &resolved, true)?;
                Ok(RecordOutcome::Updated)
            }
            Resolution::Manual(mut conflict) => {
                conflict.identity = Some(identity);
                Ok(RecordOutcome::Conflict(conflict))
            }
        }
    }

    fn fold_stats(&self, report: &SyncReport) {
        let mut stats = self.stats.write();
        stats.passes_completed += 1;
        stats.records_created += report.created as u64;
        stats.records_updated += report.updated as u64;
        stats.records_failed += report.failed as u64;
        stats.records_skipped += report.skipped as u64;
        stats.conflicts_detected += report.conflicts.len() as u64;
        stats.last_error = report.errors.last().cloned();
        stats.last_synced_at = Some(report.synced_at);
    }
}

impl Default for SyncOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

fn index_by_identity(records: Vec<Record>, id_field: &str) -> BTreeMap<String, Record> {
    records
        .into_iter()
        .filter_map(|record| record.identity(id_field).map(|id| (id, record)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictResolution;
    use crate::destination::MemoryDestination;
    use crate::validate::Transform;
    use dealsync_record::Value;

    fn deal(id: &str, name: &str) -> Record {
        Record::new().with("id", id).with("name", name)
    }

    fn options() -> SyncOptions {
        SyncOptions::new("deals", SyncStrategy::Full, ConflictResolution::SourceWins)
            .with_required_fields(["id", "name"])
    }

    #[test]
    fn creates_new_records() {
        let orchestrator = SyncOrchestrator::new();
        let destination = MemoryDestination::new("id");
        let report = orchestrator.sync(&[deal("1", "Acme")], &destination, &options());

        assert!(report.success);
        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 0);
        assert_eq!(report.failed, 0);
        assert_eq!(destination.records().len(), 1);
    }

    #[test]
    fn validation_failure_is_isolated() {
        let orchestrator = SyncOrchestrator::new();
        let destination = MemoryDestination::new("id");
        let incomplete = Record::new().with("id", "1");
        let report =
            orchestrator.sync(&[incomplete, deal("2", "Beta")], &destination, &options());

        assert_eq!(report.created, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.success);
        assert!(report.errors[0].contains("name"));
        assert_eq!(destination.records().len(), 1);
    }

    #[test]
    fn missing_identity_fails_record() {
        let orchestrator = SyncOrchestrator::new();
        let destination = MemoryDestination::new("id");
        let options = SyncOptions::new(
            "deals",
            SyncStrategy::Full,
            ConflictResolution::SourceWins,
        );
        let anonymous = Record::new().with("name", "nobody");
        let report = orchestrator.sync(&[anonymous], &destination, &options);

        assert_eq!(report.failed, 1);
        assert!(report.errors[0].contains("identity"));
        assert_eq!(destination.records().len(), 0);
    }

    #[test]
    fn identical_records_are_skipped() {
        let orchestrator = SyncOrchestrator::new();
        let destination = MemoryDestination::with_records("id", vec![deal("1", "Acme")]);
        let report = orchestrator.sync(&[deal("1", "Acme")], &destination, &options());

        assert!(report.success);
        assert_eq!(report.skipped, 1);
        assert_eq!(destination.update_calls(), 0);
    }

    #[test]
    fn destination_extra_fields_trigger_update_outside_mirror() {
        let orchestrator = SyncOrchestrator::new();
        // Destination has an extra field the source does not carry; the
        // source fields all match, so no conflict, but the records are not
        // field-for-field identical.
        let destination = MemoryDestination::with_records(
            "id",
            vec![deal("1", "Acme").with("internal_score", 9i64)],
        );
        let report = orchestrator.sync(&[deal("1", "Acme")], &destination, &options());
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 0);

        // Mirror skips unconditionally when no source field differs.
        let destination = MemoryDestination::with_records(
            "id",
            vec![deal("1", "Acme").with("internal_score", 9i64)],
        );
        let mirror = SyncOptions::new(
            "deals",
            SyncStrategy::Mirror,
            ConflictResolution::SourceWins,
        )
        .with_required_fields(["id", "name"]);
        let report = orchestrator.sync(&[deal("1", "Acme")], &destination, &mirror);
        assert_eq!(report.skipped, 1);
        assert_eq!(destination.update_calls(), 0);
    }

    #[test]
    fn conflicting_records_resolve_and_update() {
        let orchestrator = SyncOrchestrator::new();
        let destination = MemoryDestination::with_records("id", vec![deal("1", "Old name")]);
        let report = orchestrator.sync(&[deal("1", "New name")], &destination, &options());

        assert_eq!(report.updated, 1);
        assert_eq!(
            destination.records()[0].get("name"),
            Some(&Value::Text("New name".to_string()))
        );
    }

    #[test]
    fn manual_resolution_defers_without_writing() {
        let orchestrator = SyncOrchestrator::new();
        let destination = MemoryDestination::with_records("id", vec![deal("1", "Theirs")]);
        let manual = SyncOptions::new("deals", SyncStrategy::Full, ConflictResolution::Manual)
            .with_required_fields(["id", "name"]);
        let report = orchestrator.sync(&[deal("1", "Ours")], &destination, &manual);

        assert!(!report.success);
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.created + report.updated + report.failed, 0);
        assert_eq!(report.conflicts[0].identity, Some("1".to_string()));
        assert_eq!(report.conflicts[0].fields, vec!["name"]);
        // Nothing written, destination untouched.
        assert_eq!(destination.update_calls(), 0);
        assert_eq!(
            destination.records()[0].get("name"),
            Some(&Value::Text("Theirs".to_string()))
        );
    }

    #[test]
    fn mapping_and_transforms_run_before_validation() {
        let orchestrator = SyncOrchestrator::new();
        let destination = MemoryDestination::new("id");
        let options = options()
            .with_field_mapping("dealname", "name")
            .with_transform("name", Transform::Trim);

        let source = Record::new().with("id", "1").with("dealname", "  Acme  ");
        let report = orchestrator.sync(&[source], &destination, &options);

        assert!(report.success);
        assert_eq!(
            destination.records()[0].get("name"),
            Some(&Value::Text("Acme".to_string()))
        );
    }

    #[test]
    fn transform_warnings_surface_in_report() {
        let orchestrator = SyncOrchestrator::new();
        let destination = MemoryDestination::new("id");
        let options = options().with_transform("name", Transform::ToInt);

        let report = orchestrator.sync(&[deal("1", "not a number")], &destination, &options);
        assert!(report.success);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("name:"));
    }

    #[test]
    fn stats_accumulate_across_passes() {
        let orchestrator = SyncOrchestrator::new();
        let destination = MemoryDestination::new("id");
        orchestrator.sync(&[deal("1", "Acme")], &destination, &options());
        orchestrator.sync(&[deal("1", "Acme"), deal("2", "Beta")], &destination, &options());

        let stats = orchestrator.stats();
        assert_eq!(stats.passes_completed, 2);
        assert_eq!(stats.records_created, 2);
        assert_eq!(stats.records_skipped, 1);
        assert!(stats.last_synced_at.is_some());
    }
}
