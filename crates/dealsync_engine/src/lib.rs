//! # dealsync Engine
//!
//! Record reconciliation engine for dealsync.
//!
//! This crate keeps records consistent between the platform's internal
//! store and an arbitrary external system (accounting platform, CRM,
//! social platform) when neither side is a strict source of truth.
//!
//! It provides:
//! - Change classification against a caller-owned fingerprint baseline
//! - Field mapping, validation, and per-field transforms
//! - Conflict detection and five resolution policies
//! - A one-directional sync orchestrator with per-record failure isolation
//! - A bidirectional coordinator running the two directions sequentially
//!
//! ## Architecture
//!
//! The engine is a library, not a service. The caller fetches source
//! records from a concrete platform, implements [`Destination`] over the
//! other side, and invokes [`SyncOrchestrator::sync`]; scheduling belongs
//! to `dealsync_scheduler` and persistence to the caller.
//!
//! ## Key Invariants
//!
//! - Exactly one outcome per source record: created, updated, skipped,
//!   failed, or one conflict
//! - Record-level failures never abort a pass; destination-listing
//!   failures always do, returning the partial report
//! - A manual conflict is never written to any store
//! - The two directions of a bidirectional sync never run concurrently

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bidirectional;
mod change;
mod config;
mod conflict;
mod destination;
mod error;
mod mapper;
mod orchestrator;
mod report;
mod validate;

pub use bidirectional::{BidirectionalCoordinator, BidirectionalReport};
pub use change::{classify, snapshot, Baseline, ChangeSet};
pub use config::{SyncDirection, SyncOptions, SyncStrategy};
pub use conflict::{
    ConflictDetector, ConflictRecord, ConflictResolution, ConflictResolver, Resolution,
};
pub use destination::{Destination, MemoryDestination};
pub use error::{SyncError, SyncResult};
pub use mapper::FieldMapper;
pub use orchestrator::{SyncOrchestrator, SyncStats};
pub use report::{RecordOutcome, SyncReport};
pub use validate::{Transform, Validation, Validator};
