//! # Topic Matcher
//!
//! Owns the registered `(filter, subscriber)` pairs and answers which
//! filters a published topic satisfies. Registration is idempotent per
//! pair; removal and whole-session wipes are supported for connection
//! teardown.

use crate::pattern::{filter_matches, validate_filter, TopicFilterError};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Matching engine over a dynamic set of wildcard subscription filters.
///
/// Matching scans the distinct filter set with a segment walk; the filter
/// population of an inspection tool is small (one entry per subscription
/// tab), so a scan keeps the result ordering trivially deterministic.
#[derive(Debug, Default)]
pub struct TopicMatcher {
    /// Subscriber id -> filters registered by that subscriber.
    subscriptions: BTreeMap<String, BTreeSet<String>>,
}

impl TopicMatcher {
    /// Create an empty matcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter for a subscriber.
    ///
    /// Adding an already-registered `(filter, subscriber)` pair is a no-op.
    ///
    /// # Errors
    ///
    /// Malformed filters (empty string, misplaced `#`, wildcard not alone
    /// in its segment) are rejected here so the matching path never sees
    /// them.
    pub fn add_filter(
        &mut self,
        filter: &str,
        subscriber_id: &str,
    ) -> Result<(), TopicFilterError> {
        validate_filter(filter)?;

        let filters = self.subscriptions.entry(subscriber_id.to_owned()).or_default();
        if filters.insert(filter.to_owned()) {
            debug!(filter, subscriber = subscriber_id, "Added subscription to store");
        }

        Ok(())
    }

    /// Remove a filter previously registered by a subscriber.
    pub fn remove_filter(&mut self, filter: &str, subscriber_id: &str) {
        if let Some(filters) = self.subscriptions.get_mut(subscriber_id) {
            if filters.remove(filter) {
                debug!(filter, subscriber = subscriber_id, "Removed subscription from store");
            }
            if filters.is_empty() {
                self.subscriptions.remove(subscriber_id);
            }
        }
    }

    /// Remove every filter registered by a subscriber.
    pub fn wipe(&mut self, subscriber_id: &str) {
        if self.subscriptions.remove(subscriber_id).is_some() {
            debug!(subscriber = subscriber_id, "Wiped subscriptions");
        }
    }

    /// Whether the subscriber has any registered filters.
    #[must_use]
    pub fn contains(&self, subscriber_id: &str) -> bool {
        self.subscriptions.contains_key(subscriber_id)
    }

    /// The filters whose pattern matches the given topic, sorted.
    #[must_use]
    pub fn matches(&self, topic: &str) -> Vec<String> {
        let mut matched = BTreeSet::new();
        for filters in self.subscriptions.values() {
            for filter in filters {
                if filter_matches(filter, topic) {
                    matched.insert(filter.clone());
                }
            }
        }
        matched.into_iter().collect()
    }

    /// Every `(subscriber, filter)` pair in the store, sorted.
    #[must_use]
    pub fn list_all_subscriptions(&self) -> Vec<(String, String)> {
        self.subscriptions
            .iter()
            .flat_map(|(subscriber, filters)| {
                filters
                    .iter()
                    .map(move |filter| (subscriber.clone(), filter.clone()))
            })
            .collect()
    }
}
