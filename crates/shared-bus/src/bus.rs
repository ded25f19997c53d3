//! # Event Bus
//!
//! Synchronous, kind-driven dispatcher. Producers publish a [`ScopeEvent`];
//! every consumer whose declared [`EventKind`] accepts the event's concrete
//! kind (and whose optional filter value matches) is invoked in subscription
//! order, on the publisher's thread.
//!
//! Consumer lookup goes through a cache keyed by concrete kind; the cache is
//! recomputed whenever the subscription table changes. Table mutation and
//! cache rebuild share one critical section; the matched consumer list is
//! cloned out before invocation so consumer code never runs under the bus
//! lock.

use crate::events::{EventKind, ScopeEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Errors a consumer may return from an `accept` call.
///
/// An error never propagates to the publisher: the consumer is logged and
/// skipped, and dispatch continues with the remaining consumers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsumerError {
    /// The consumer cannot accept events of this kind.
    #[error("Consumer cannot accept events of kind {kind:?}")]
    Incompatible { kind: EventKind },

    /// The consumer failed while handling the event.
    #[error("Consumer failed: {reason}")]
    Failed { reason: String },
}

/// A consumer callback registered with the bus.
pub type EventConsumer = Arc<dyn Fn(&ScopeEvent) -> Result<(), ConsumerError> + Send + Sync>;

/// Handle identifying one registered consumer, for targeted unsubscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsumerId(Uuid);

struct Registration {
    id: ConsumerId,
    subscriber: String,
    kind: EventKind,
    filter: Option<String>,
    consumer: EventConsumer,
}

#[derive(Default)]
struct BusState {
    /// Registrations in subscription order; dispatch order follows this.
    registrations: Vec<Registration>,

    /// Concrete kind -> matching consumer ids. Recomputed after any change
    /// to the registration table.
    kind_cache: HashMap<EventKind, Vec<ConsumerId>>,
}

impl BusState {
    fn match_consumers(&self, concrete: EventKind) -> Vec<ConsumerId> {
        self.registrations
            .iter()
            .filter(|registration| registration.kind.accepts(concrete))
            .map(|registration| registration.id)
            .collect()
    }

    /// Recalculate all cached kind -> consumer mappings.
    fn recalculate_cache(&mut self) {
        let kinds: Vec<EventKind> = self.kind_cache.keys().copied().collect();
        for kind in kinds {
            let matched = self.match_consumers(kind);
            self.kind_cache.insert(kind, matched);
        }
    }
}

/// Typed publish/subscribe dispatcher.
///
/// Safe to use concurrently from multiple threads; see the module docs for
/// the locking discipline.
pub struct EventBus {
    state: Mutex<BusState>,

    /// Total events published.
    events_published: AtomicU64,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BusState::default()),
            events_published: AtomicU64::new(0),
        }
    }

    /// Register a consumer for a declared kind.
    ///
    /// When `filter` is set, the consumer only receives events whose
    /// [`ScopeEvent::filter_value`] equals it. Multiple consumers per
    /// subscriber are allowed; `subscriber_id` groups them for
    /// [`EventBus::unsubscribe`].
    pub fn subscribe(
        &self,
        subscriber_id: &str,
        consumer: EventConsumer,
        kind: EventKind,
        filter: Option<String>,
    ) -> ConsumerId {
        let id = ConsumerId(Uuid::new_v4());
        let mut state = self.lock_state();
        state.registrations.push(Registration {
            id,
            subscriber: subscriber_id.to_owned(),
            kind,
            filter,
            consumer,
        });
        state.recalculate_cache();
        debug!(subscriber = subscriber_id, ?kind, "New bus subscription");
        id
    }

    /// Remove every consumer registered by a subscriber.
    pub fn unsubscribe(&self, subscriber_id: &str) {
        let mut state = self.lock_state();
        let before = state.registrations.len();
        state
            .registrations
            .retain(|registration| registration.subscriber != subscriber_id);
        let removed = before - state.registrations.len();
        if removed == 0 {
            warn!(subscriber = subscriber_id, "Removed consumers: 0");
        } else {
            trace!(subscriber = subscriber_id, removed, "Removed consumers");
        }
        state.recalculate_cache();
    }

    /// Remove one consumer by its handle.
    pub fn unsubscribe_consumer(&self, subscriber_id: &str, consumer_id: ConsumerId) {
        let mut state = self.lock_state();
        state.registrations.retain(|registration| {
            !(registration.id == consumer_id && registration.subscriber == subscriber_id)
        });
        state.recalculate_cache();
    }

    /// Remove the first consumer a subscriber registered for a declared kind.
    pub fn unsubscribe_kind(&self, subscriber_id: &str, kind: EventKind) {
        let mut state = self.lock_state();
        let found = state
            .registrations
            .iter()
            .position(|registration| {
                registration.subscriber == subscriber_id && registration.kind == kind
            });
        if let Some(index) = found {
            state.registrations.remove(index);
            state.recalculate_cache();
        }
    }

    /// Publish an event synchronously to every matching consumer.
    ///
    /// Returns the number of consumers that received the event. Consumers
    /// returning an error are logged and skipped; the remaining consumers
    /// still receive the event.
    pub fn publish(&self, event: &ScopeEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let concrete = event.kind();

        // Resolve matched consumers under the lock, invoke outside it.
        let matched: Vec<(EventConsumer, Option<String>)> = {
            let mut state = self.lock_state();
            if !state.kind_cache.contains_key(&concrete) {
                let computed = state.match_consumers(concrete);
                trace!(?concrete, consumers = computed.len(), "Cached consumer match");
                state.kind_cache.insert(concrete, computed);
            }
            let ids = state.kind_cache[&concrete].clone();
            ids.iter()
                .filter_map(|id| {
                    state
                        .registrations
                        .iter()
                        .find(|registration| registration.id == *id)
                        .map(|registration| {
                            (registration.consumer.clone(), registration.filter.clone())
                        })
                })
                .collect()
        };

        let mut delivered = 0;
        for (consumer, filter) in matched {
            let wanted = match &filter {
                None => true,
                Some(value) => event.filter_value() == Some(value.as_str()),
            };
            if !wanted {
                continue;
            }

            match consumer(event) {
                Ok(()) => delivered += 1,
                Err(error) => {
                    warn!(?concrete, %error, "Consumer rejected event, skipping");
                }
            }
        }
        delivered
    }

    /// Total events published through this bus.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BusState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
