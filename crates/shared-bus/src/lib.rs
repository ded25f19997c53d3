//! # Shared Bus - Event Dispatch for TopicScope
//!
//! Decouples producers (connection threads, stores, replay) from consumers
//! (UI, scripts, tests) through a typed, filterable, synchronous event bus,
//! plus a batching layer that protects a single-threaded consumer from
//! per-message update storms.
//!
//! ## Dispatch Model
//!
//! ```text
//! ┌──────────────┐                       ┌──────────────┐
//! │  Producer    │                       │  Consumer    │
//! │              │      publish()        │              │
//! │              │ ──────┐               │              │
//! └──────────────┘       │               └──────────────┘
//!                        ▼                      ↑
//!                  ┌──────────────┐             │
//!                  │  Event Bus   │ ────────────┘
//!                  │ (kind cache) │   subscribe(kind, filter)
//!                  └──────────────┘
//! ```
//!
//! Events are an explicit tagged union ([`ScopeEvent`]); the supertype
//! relation consumers subscribe against is the explicit [`EventKind`]
//! hierarchy rather than runtime reflection. A consumer declared for a
//! family kind receives every concrete kind under it.
//!
//! ## Batched Delivery
//!
//! Store-originated events are not published directly: they accumulate on an
//! [`EventQueue`] and a [`BatchDispatcher`] task drains them on a fixed time
//! slice, grouped by event kind and then by owning message list, so one
//! chatty subscription cannot head-of-line block the others.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod dispatcher;
pub mod events;
pub mod queue;

// Re-export main types
pub use bus::{ConsumerError, ConsumerId, EventBus, EventConsumer};
pub use dispatcher::BatchDispatcher;
pub use events::{EventKind, ListKey, ScopeEvent};
pub use queue::{EventQueue, QueuedEvent, QueuedKind};

/// Default time slice of the batch dispatcher.
pub const DEFAULT_BATCH_INTERVAL_MS: u64 = 100;
