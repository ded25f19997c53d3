//! # Message Router
//!
//! The receive path of a connection. An incoming `(topic, payload)` pair is
//! matched against the connection's subscription filters, and one message
//! copy is delivered to every store backing a matching filter, annotated
//! with the filter it satisfied.
//!
//! The matcher lock is released before any store is touched, so slow store
//! work never blocks subscription changes.

use message_store::BoundedMessageStore;
use shared_types::{Message, MessageSeq};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use topic_matching::{TopicFilterError, TopicMatcher};
use tracing::{debug, trace};

/// Routes received messages to the stores subscribed to their topic.
///
/// One router per connection. Filters registered here mirror the filters
/// subscribed on the transport; the router only decides local delivery.
pub struct MessageRouter {
    connection_id: String,
    seq: Arc<MessageSeq>,
    matcher: Mutex<TopicMatcher>,
    /// Filter -> stores that display messages matching it.
    targets: Mutex<HashMap<String, Vec<Arc<BoundedMessageStore>>>>,
}

impl MessageRouter {
    /// Create a router for the given connection.
    #[must_use]
    pub fn new(connection_id: impl Into<String>, seq: Arc<MessageSeq>) -> Self {
        Self {
            connection_id: connection_id.into(),
            seq,
            matcher: Mutex::new(TopicMatcher::new()),
            targets: Mutex::new(HashMap::new()),
        }
    }

    /// Register a subscription filter and the store that displays it.
    ///
    /// Subscribing the same `(filter, store)` pair twice is a no-op.
    ///
    /// # Errors
    ///
    /// Malformed filters are rejected before any state changes.
    pub fn subscribe(
        &self,
        filter: &str,
        store: Arc<BoundedMessageStore>,
    ) -> Result<(), TopicFilterError> {
        self.lock_matcher().add_filter(filter, &self.connection_id)?;

        let mut targets = self.lock_targets();
        let stores = targets.entry(filter.to_owned()).or_default();
        if !stores.iter().any(|existing| Arc::ptr_eq(existing, &store)) {
            debug!(
                connection = %self.connection_id,
                filter,
                store = store.name(),
                "Subscription registered"
            );
            stores.push(store);
        }

        Ok(())
    }

    /// Remove a subscription filter and all its delivery targets.
    pub fn unsubscribe(&self, filter: &str) {
        self.lock_matcher().remove_filter(filter, &self.connection_id);
        if self.lock_targets().remove(filter).is_some() {
            debug!(connection = %self.connection_id, filter, "Subscription removed");
        }
    }

    /// Remove every subscription on this router, for connection teardown.
    pub fn unsubscribe_all(&self) {
        self.lock_matcher().wipe(&self.connection_id);
        self.lock_targets().clear();
    }

    /// The active subscription filters, sorted.
    ///
    /// Connectors use this to replay subscriptions after a reconnect.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        self.lock_matcher()
            .list_all_subscriptions()
            .into_iter()
            .map(|(_, filter)| filter)
            .collect()
    }

    /// Deliver a received message to every store whose filter matches the
    /// topic. Returns the number of deliveries made.
    ///
    /// Each target gets its own message copy so the attached subscription
    /// reflects the filter that store subscribed with.
    pub fn route(&self, topic: &str, payload: &[u8], qos: u8, retained: bool) -> usize {
        let matched = self.lock_matcher().matches(topic);
        if matched.is_empty() {
            trace!(connection = %self.connection_id, topic, "No matching subscription");
            return 0;
        }

        let deliveries: Vec<(String, Arc<BoundedMessageStore>)> = {
            let targets = self.lock_targets();
            matched
                .into_iter()
                .flat_map(|filter| {
                    targets
                        .get(&filter)
                        .into_iter()
                        .flatten()
                        .cloned()
                        .map(move |store| (filter.clone(), store))
                        .collect::<Vec<_>>()
                })
                .collect()
        };

        let received_at = epoch_millis();
        let mut delivered = 0;
        for (filter, store) in deliveries {
            let message = Message::new(self.seq.next_id(), topic, payload.to_vec(), received_at)
                .with_delivery(qos, retained)
                .with_subscription(filter);
            store.receive(message);
            delivered += 1;
        }

        trace!(connection = %self.connection_id, topic, delivered, "Routed message");
        delivered
    }

    fn lock_matcher(&self) -> MutexGuard<'_, TopicMatcher> {
        match self.matcher.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_targets(&self) -> MutexGuard<'_, HashMap<String, Vec<Arc<BoundedMessageStore>>>> {
        match self.targets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
}
