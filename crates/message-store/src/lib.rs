//! # Message Store Crate
//!
//! Per-connection/per-tab message buffering: an ordered, newest-first
//! [`MessageList`] with a hard capacity cap, a pluggable [`MessageFilter`]
//! chain, and per-topic [`TopicSummary`] bookkeeping kept transactionally in
//! step with the list contents.
//!
//! All mutating operations on one [`BoundedMessageStore`] are serialized
//! behind a single mutex; independent stores may be driven concurrently from
//! different threads. UI-bound add/remove notifications are queued on the
//! shared-bus [`EventQueue`](shared_bus::EventQueue) rather than published
//! directly, so the single-threaded consumer receives them in batches.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod filters;
pub mod list;
pub mod store;
pub mod summary;

pub use filters::{MessageFilter, UniqueContentOnlyFilter};
pub use list::MessageList;
pub use store::BoundedMessageStore;
pub use summary::{TopicSummary, TopicSummaryEntry};
