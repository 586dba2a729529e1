//! # dealsync Record Model
//!
//! Dynamic records and change fingerprinting for the dealsync
//! reconciliation core.
//!
//! This crate provides:
//! - A closed dynamic [`Value`] type for the field shapes the platform syncs
//! - [`Record`], an ordered field map with value semantics
//! - Canonical byte rendering with deterministic field order
//! - SHA-256 fingerprints for cheap change detection
//!
//! ## Key Invariants
//!
//! - Field insertion order never affects a record's canonical form or
//!   fingerprint
//! - A field absent from a record fingerprints differently from a field
//!   that is present but null or empty
//! - Fingerprinting has no error conditions

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod canonical;
mod fingerprint;
mod record;
mod value;

pub use canonical::canonical_bytes;
pub use fingerprint::{fingerprint, fingerprint_fields};
pub use record::Record;
pub use value::Value;
