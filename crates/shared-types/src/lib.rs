//! # Shared Types Crate
//!
//! Core types shared across the TopicScope subsystems: the message model,
//! monotonic clock port, configuration objects and the payload-formatting
//! collaborator port.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **No Hidden Globals**: message ids come from an injected [`MessageSeq`]
//!   owned by the process-wide context, never from a global counter.
//! - **Monotonic Time Only**: elapsed-time comparisons go through the
//!   [`MonotonicClock`] port so they are immune to wall-clock adjustments
//!   and can be driven manually in tests.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod config;
pub mod formatting;
pub mod message;
pub mod status;

pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use config::{ReconnectionSettings, ReplaySettings, StoreConfig};
pub use formatting::{FormatterDetails, FormatterError, PayloadFormatter, PlainFormatter};
pub use message::{Message, MessageId, MessageSeq};
pub use status::ConnectionStatus;

/// Topic segment delimiter used throughout the workspace.
pub const TOPIC_DELIMITER: char = '/';
