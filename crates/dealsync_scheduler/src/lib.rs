//! # dealsync Scheduler
//!
//! Recurring execution of named sync jobs on the tokio runtime.
//!
//! The scheduler owns a registry of named jobs, each running as an
//! independent task. It drives whatever orchestration function it is
//! given; it knows nothing about records or destinations.
//!
//! ## Key Invariants
//!
//! - Ticks within one job are strictly sequential; a slow pass never
//!   overlaps the next tick of the same job
//! - Different jobs run fully concurrently and share no state
//! - Scheduling an existing job id replaces the prior job
//! - A failed tick is logged and never unschedules the job
//! - Cancellation takes effect before the next tick; a tick already
//!   executing finishes

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod scheduler;

pub use scheduler::{JobError, SyncScheduler};
