//! # Audit Replay Crate
//!
//! Re-publishes previously captured messages at an adjustable
//! real-time-relative speed. A virtual replay clock, seeded from the first
//! record's timestamp, is advanced by a background ticking task; a record
//! becomes publishable once the virtual clock has caught up to its
//! timestamp. Records are read lazily, one ahead of the clock comparison,
//! so pacing decisions never commit a record.
//!
//! The replayed messages enter the same store and bus pipeline as live
//! traffic, for demonstrations and pipeline tests without a broker.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod record;
pub mod replay;
pub mod source;

pub use record::ReplayRecord;
pub use replay::AuditReplay;
pub use source::{AuditSource, FileAuditSource, ReplayError};
