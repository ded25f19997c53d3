//! # Bounded Message Store
//!
//! The top-level store handling received messages for one logical stream
//! (a connection or subscription tab): formatting, the filter chain,
//! capacity eviction, browse visibility and topic summaries, with add and
//! remove notifications queued for batched delivery.
//!
//! One mutex guards the list, the summary and the visibility sets together,
//! so every observable state satisfies `len <= max_size` and summary counts
//! equal list contents. The formatter runs before the lock is taken and the
//! event queue is only appended to, never drained, inside it.

use crate::filters::{MessageFilter, UniqueContentOnlyFilter};
use crate::list::MessageList;
use crate::summary::{TopicSummary, TopicSummaryEntry};
use shared_bus::{EventQueue, ListKey, QueuedEvent};
use shared_types::{FormatterDetails, Message, PayloadFormatter, StoreConfig};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

struct StoreInner {
    list: MessageList,
    summary: TopicSummary,
    /// Every topic this store has seen.
    all_topics: BTreeSet<String>,
    /// Topics currently shown in the browse view.
    browsed_topics: BTreeSet<String>,
    unique_filter: UniqueContentOnlyFilter,
    extra_filters: Vec<Box<dyn MessageFilter>>,
}

impl StoreInner {
    /// Browse filtering is considered enabled when some known topic is
    /// hidden from the browse view.
    fn browsing_filters_enabled(&self) -> bool {
        self.browsed_topics.len() != self.all_topics.len()
    }
}

/// Bounded, filterable message store for one logical stream.
pub struct BoundedMessageStore {
    name: String,
    key: ListKey,
    formatter_details: FormatterDetails,
    formatter: Arc<dyn PayloadFormatter>,
    queue: Arc<EventQueue>,
    inner: Mutex<StoreInner>,
}

impl BoundedMessageStore {
    /// Create a store from its configuration and collaborators.
    #[must_use]
    pub fn new(
        config: &StoreConfig,
        formatter: Arc<dyn PayloadFormatter>,
        queue: Arc<EventQueue>,
    ) -> Self {
        Self {
            name: config.name.clone(),
            key: ListKey::new(config.name.clone()),
            formatter_details: FormatterDetails::plain(),
            formatter,
            queue,
            inner: Mutex::new(StoreInner {
                list: MessageList::new(
                    config.name.clone(),
                    config.preferred_size,
                    config.max_size,
                ),
                summary: TopicSummary::new(config.name.clone(), config.max_payload_length),
                all_topics: BTreeSet::new(),
                browsed_topics: BTreeSet::new(),
                unique_filter: UniqueContentOnlyFilter::new(),
                extra_filters: Vec::new(),
            }),
        }
    }

    /// Store a received message.
    ///
    /// The message is formatted, run through the filter chain, inserted at
    /// the head (evicting the tail when at capacity) and reflected in the
    /// topic summary; add/remove notifications are queued for the batch
    /// dispatcher. Returns the evicted message, if any.
    pub fn receive(&self, message: Message) -> Option<Arc<Message>> {
        // Formatting is a pure collaborator call; keep it outside the lock.
        let message = match self.formatter.format(&message.payload, &self.formatter_details) {
            Ok(formatted) => message.with_formatted_payload(formatted),
            Err(error) => {
                warn!(store = %self.name, %error, "Formatting failed, storing raw payload");
                message
            }
        };
        let message = Arc::new(message);

        let mut inner = self.lock_inner();

        // Record the browse state before this message changes it.
        let all_topics_shown = !inner.browsing_filters_enabled();
        let topic_already_exists = inner.all_topics.contains(&message.topic);
        inner.all_topics.insert(message.topic.clone());

        // Filter chain: filters may remove prior entries and may veto the
        // inbound message.
        let mut removals = Vec::new();
        let dropped = {
            let StoreInner {
                ref mut list,
                ref mut unique_filter,
                ref mut extra_filters,
                ..
            } = *inner;
            let mut dropped = unique_filter.apply(&message, list, &mut removals);
            for filter in extra_filters.iter_mut() {
                dropped |= filter.apply(&message, list, &mut removals);
            }
            dropped
        };

        for removed in &removals {
            inner.summary.remove_message(removed);
            self.queue.add(QueuedEvent::MessageRemoved {
                list: self.key.clone(),
                message: removed.clone(),
            });
            self.queue.add(QueuedEvent::TopicSummaryChanged {
                list: self.key.clone(),
                topic: removed.topic.clone(),
            });
        }

        if dropped {
            return None;
        }

        // Insert at the head; the tail goes first when at capacity.
        let evicted = inner.list.add(message.clone());
        if let Some(removed) = &evicted {
            inner.summary.remove_message(removed);
            self.queue.add(QueuedEvent::MessageRemoved {
                list: self.key.clone(),
                message: removed.clone(),
            });
            self.queue.add(QueuedEvent::TopicSummaryChanged {
                list: self.key.clone(),
                topic: removed.topic.clone(),
            });
        }

        // Summary row for the new message; a first-seen topic becomes
        // visible when every topic is currently shown.
        inner.summary.add_message(&message);
        if all_topics_shown && !topic_already_exists {
            inner.browsed_topics.insert(message.topic.clone());
            inner.summary.set_show(&message.topic, true);
        }

        if all_topics_shown || inner.browsed_topics.contains(&message.topic) {
            self.queue.add(QueuedEvent::MessageAdded {
                list: self.key.clone(),
                message: message.clone(),
            });
        }
        self.queue.add(QueuedEvent::TopicSummaryChanged {
            list: self.key.clone(),
            topic: message.topic.clone(),
        });

        evicted
    }

    /// Snapshot of all retained messages, newest first.
    #[must_use]
    pub fn messages(&self) -> Vec<Arc<Message>> {
        self.lock_inner().list.messages()
    }

    /// Snapshot of retained messages on browsed topics, newest first.
    #[must_use]
    pub fn browsed_messages(&self) -> Vec<Arc<Message>> {
        let inner = self.lock_inner();
        if !inner.browsing_filters_enabled() {
            return inner.list.messages();
        }
        inner
            .list
            .iter()
            .filter(|message| inner.browsed_topics.contains(&message.topic))
            .cloned()
            .collect()
    }

    /// Remove all messages, topics and summary rows.
    pub fn clear(&self) {
        let mut inner = self.lock_inner();
        inner.list.clear();
        inner.summary.clear();
        inner.all_topics.clear();
        inner.browsed_topics.clear();
    }

    /// Append a filter to the chain.
    pub fn add_filter(&self, filter: Box<dyn MessageFilter>) {
        self.lock_inner().extra_filters.push(filter);
    }

    /// Enable or disable the consecutive-duplicate filter.
    pub fn set_unique_content_only(&self, enabled: bool) {
        self.lock_inner().unique_filter.set_enabled(enabled);
    }

    /// Messages dropped as consecutive duplicates since last reset.
    #[must_use]
    pub fn dropped_duplicates(&self) -> u64 {
        self.lock_inner().unique_filter.dropped()
    }

    /// Show or hide one topic in the browse view.
    pub fn set_topic_visible(&self, topic: &str, visible: bool) {
        let mut inner = self.lock_inner();
        if visible {
            inner.browsed_topics.insert(topic.to_owned());
        } else {
            inner.browsed_topics.remove(topic);
        }
        inner.summary.set_show(topic, visible);
    }

    /// Show or hide every known topic.
    pub fn set_all_visible(&self, visible: bool) {
        let mut inner = self.lock_inner();
        if visible {
            inner.browsed_topics = inner.all_topics.clone();
        } else {
            inner.browsed_topics.clear();
        }
        inner.summary.set_all_show(visible);
    }

    /// Flip visibility for the given topics.
    pub fn toggle_topics_visible<'a>(&self, topics: impl IntoIterator<Item = &'a str>) {
        let mut inner = self.lock_inner();
        for topic in topics {
            if inner.browsed_topics.contains(topic) {
                inner.browsed_topics.remove(topic);
            } else {
                inner.browsed_topics.insert(topic.to_owned());
            }
        }
        let browsed = inner.browsed_topics.clone();
        inner.summary.set_all_show(false);
        for topic in &browsed {
            inner.summary.set_show(topic, true);
        }
    }

    /// Whether some known topic is hidden from the browse view.
    #[must_use]
    pub fn browsing_filters_enabled(&self) -> bool {
        self.lock_inner().browsing_filters_enabled()
    }

    /// Every topic this store has seen, sorted.
    #[must_use]
    pub fn all_topics(&self) -> Vec<String> {
        self.lock_inner().all_topics.iter().cloned().collect()
    }

    /// The summary row for a topic.
    #[must_use]
    pub fn summary_entry(&self, topic: &str) -> Option<TopicSummaryEntry> {
        self.lock_inner().summary.entry(topic).cloned()
    }

    /// The store name (also the batch grouping key).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The batch grouping key for this store's list.
    #[must_use]
    pub fn list_key(&self) -> &ListKey {
        &self.key
    }

    fn lock_inner(&self) -> MutexGuard<'_, StoreInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
