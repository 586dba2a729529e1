//! Destination store abstraction.

use crate::error::{SyncError, SyncResult};
use dealsync_record::Record;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A destination store for one entity type.
///
/// Implementations wrap a concrete external platform (or the internal
/// store) that already knows how to fetch and persist records for it.
/// Timeout and retry policy belong to the implementation; the engine
/// imposes none.
pub trait Destination: Send + Sync {
    /// Returns the full current set of destination records.
    ///
    /// Called exactly once per pass.
    fn list(&self) -> SyncResult<Vec<Record>>;

    /// Creates (`id == None`) or updates (`id == Some`) a record.
    ///
    /// Must be idempotent for retried calls with the same resolved record.
    fn write(&self, id: Option<&str>, record: &Record, is_update: bool) -> SyncResult<()>;
}

/// An in-memory destination for tests and in-process callers.
pub struct MemoryDestination {
    id_field: String,
    records: RwLock<Vec<Record>>,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl MemoryDestination {
    /// Creates an empty destination keyed by `id_field`.
    pub fn new(id_field: impl Into<String>) -> Self {
        Self::with_records(id_field, Vec::new())
    }

    /// Creates a destination pre-populated with records.
    pub fn with_records(id_field: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            id_field: id_field.into(),
            records: RwLock::new(records),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<Record> {
        self.records.read().clone()
    }

    /// Number of create writes received.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of update writes received.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn upsert(&self, identity: Option<String>, record: &Record) {
        let mut records = self.records.write();
        let position = identity.as_ref().and_then(|id| {
            records
                .iter()
                .position(|r| r.identity(&self.id_field).as_deref() == Some(id.as_str()))
        });
        match position {
            Some(i) => records[i] = record.clone(),
            None => records.push(record.clone()),
        }
    }
}

impl Destination for MemoryDestination {
    fn list(&self) -> SyncResult<Vec<Record>> {
        Ok(self.records.read().clone())
    }

    fn write(&self, id: Option<&str>, record: &Record, is_update: bool) -> SyncResult<()> {
        if is_update {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            let identity = id
                .map(str::to_string)
                .or_else(|| record.identity(&self.id_field))
                .ok_or_else(|| {
                    SyncError::destination_write("<unknown>", "update without an identity")
                })?;
            self.upsert(Some(identity), record);
        } else {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            // Upsert by the record's own identity keeps creates idempotent.
            self.upsert(record.identity(&self.id_field), record);
        }
        Ok(())
    }
}
