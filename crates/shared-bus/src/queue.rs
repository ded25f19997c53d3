//! # Event Queue
//!
//! Accumulates store-originated events between batch-dispatch time slices so
//! that a single-threaded consumer is not flooded with one update per
//! received message. Producers add events from their own threads; the batch
//! dispatcher drains whole kinds at a time.

use crate::events::ListKey;
use shared_types::Message;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Kinds of queueable store events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueuedKind {
    /// A message was added to a list.
    MessageAdded,
    /// A message was removed from a list.
    MessageRemoved,
    /// A topic summary row changed.
    TopicSummaryChanged,
}

/// All queueable kinds, in drain order.
pub const QUEUED_KINDS: [QueuedKind; 3] = [
    QueuedKind::MessageAdded,
    QueuedKind::MessageRemoved,
    QueuedKind::TopicSummaryChanged,
];

/// One store event awaiting batch delivery.
#[derive(Debug, Clone)]
pub enum QueuedEvent {
    /// A message was added to the list.
    MessageAdded {
        /// Owning list.
        list: ListKey,
        /// The added message.
        message: Arc<Message>,
    },
    /// A message was removed from the list.
    MessageRemoved {
        /// Owning list.
        list: ListKey,
        /// The removed message.
        message: Arc<Message>,
    },
    /// The summary row for a topic changed.
    TopicSummaryChanged {
        /// Owning list.
        list: ListKey,
        /// Topic whose row changed.
        topic: String,
    },
}

impl QueuedEvent {
    /// The event's queue kind.
    #[must_use]
    pub fn kind(&self) -> QueuedKind {
        match self {
            Self::MessageAdded { .. } => QueuedKind::MessageAdded,
            Self::MessageRemoved { .. } => QueuedKind::MessageRemoved,
            Self::TopicSummaryChanged { .. } => QueuedKind::TopicSummaryChanged,
        }
    }

    /// The owning list key, used as the batch grouping parent.
    #[must_use]
    pub fn list(&self) -> &ListKey {
        match self {
            Self::MessageAdded { list, .. }
            | Self::MessageRemoved { list, .. }
            | Self::TopicSummaryChanged { list, .. } => list,
        }
    }
}

/// Thread-safe accumulator of [`QueuedEvent`]s, bucketed by kind.
#[derive(Debug, Default)]
pub struct EventQueue {
    buckets: Mutex<HashMap<QueuedKind, Vec<QueuedEvent>>>,
    pending: AtomicU64,
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next batch.
    pub fn add(&self, event: QueuedEvent) {
        let kind = event.kind();
        {
            let mut buckets = self.lock_buckets();
            buckets.entry(kind).or_default().push(event);
        }
        self.pending.fetch_add(1, Ordering::Relaxed);
    }

    /// Drain every queued event of one kind, in queueing order.
    #[must_use]
    pub fn take(&self, kind: QueuedKind) -> Vec<QueuedEvent> {
        let drained = {
            let mut buckets = self.lock_buckets();
            buckets.remove(&kind).unwrap_or_default()
        };
        if !drained.is_empty() {
            self.pending
                .fetch_sub(drained.len() as u64, Ordering::Relaxed);
        }
        drained
    }

    /// Number of events awaiting the next batch.
    #[must_use]
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    fn lock_buckets(&self) -> std::sync::MutexGuard<'_, HashMap<QueuedKind, Vec<QueuedEvent>>> {
        match self.buckets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
