//! # Batch Dispatcher
//!
//! Bridges the [`EventQueue`] to the [`EventBus`] on a fixed time slice.
//! Rather than flooding a single-threaded consumer with one bus event per
//! received message, queued events are drained every slice and published as
//! one batch per (kind, owning list) pair, so unrelated lists do not
//! head-of-line block each other.

use crate::bus::EventBus;
use crate::events::{ListKey, ScopeEvent};
use crate::queue::{EventQueue, QueuedEvent, QueuedKind, QUEUED_KINDS};
use crate::DEFAULT_BATCH_INTERVAL_MS;
use shared_types::Message;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Periodic drain task turning queued store events into batched bus events.
pub struct BatchDispatcher {
    queue: Arc<EventQueue>,
    bus: Arc<EventBus>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl BatchDispatcher {
    /// Create a dispatcher with the default 100ms time slice.
    #[must_use]
    pub fn new(queue: Arc<EventQueue>, bus: Arc<EventBus>) -> Self {
        Self::with_interval(queue, bus, Duration::from_millis(DEFAULT_BATCH_INTERVAL_MS))
    }

    /// Create a dispatcher with a custom time slice.
    #[must_use]
    pub fn with_interval(queue: Arc<EventQueue>, bus: Arc<EventBus>, interval: Duration) -> Self {
        Self {
            queue,
            bus,
            interval,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the drain loop. It wakes every time slice, flushes pending
    /// events, and exits within one slice of [`BatchDispatcher::stop`].
    pub fn start(&self) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        let queue = self.queue.clone();
        let bus = self.bus.clone();
        let running = self.running.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            debug!("Batch dispatcher starting");
            while running.load(Ordering::SeqCst) {
                if queue.pending() > 0 {
                    let published = flush_queue(&queue, &bus);
                    trace!(published, "Dispatched event batches");
                }
                tokio::time::sleep(interval).await;
            }
            debug!("Batch dispatcher ending");
        })
    }

    /// Signal the drain loop to stop after its current slice.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Drain and publish everything currently queued; returns the number of
    /// bus events published. Exposed for deterministic use in tests and
    /// shutdown paths.
    pub fn flush(&self) -> usize {
        flush_queue(&self.queue, &self.bus)
    }
}

/// Drain each kind bucket, group by owning list, publish one event per group.
fn flush_queue(queue: &EventQueue, bus: &EventBus) -> usize {
    let mut published = 0;
    for kind in QUEUED_KINDS {
        let drained = queue.take(kind);
        if drained.is_empty() {
            continue;
        }
        for event in batch_by_list(kind, drained) {
            bus.publish(&event);
            published += 1;
        }
    }
    published
}

/// Group drained events of one kind by their owning list, preserving the
/// order lists first appeared in the queue.
fn batch_by_list(kind: QueuedKind, drained: Vec<QueuedEvent>) -> Vec<ScopeEvent> {
    let mut groups: Vec<(ListKey, Vec<QueuedEvent>)> = Vec::new();
    for event in drained {
        let list = event.list().clone();
        match groups.iter_mut().find(|(key, _)| *key == list) {
            Some((_, bucket)) => bucket.push(event),
            None => groups.push((list, vec![event])),
        }
    }

    groups
        .into_iter()
        .map(|(list, events)| match kind {
            QueuedKind::MessageAdded => ScopeEvent::MessageAdded {
                list,
                messages: collect_messages(events),
            },
            QueuedKind::MessageRemoved => ScopeEvent::MessageRemoved {
                list,
                messages: collect_messages(events),
            },
            QueuedKind::TopicSummaryChanged => ScopeEvent::TopicSummaryChanged {
                list,
                topics: collect_topics(events),
            },
        })
        .collect()
}

fn collect_messages(events: Vec<QueuedEvent>) -> Vec<Arc<Message>> {
    events
        .into_iter()
        .filter_map(|event| match event {
            QueuedEvent::MessageAdded { message, .. }
            | QueuedEvent::MessageRemoved { message, .. } => Some(message),
            QueuedEvent::TopicSummaryChanged { .. } => None,
        })
        .collect()
}

fn collect_topics(events: Vec<QueuedEvent>) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for event in events {
        if let QueuedEvent::TopicSummaryChanged { topic, .. } = event {
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
    }
    topics
}
