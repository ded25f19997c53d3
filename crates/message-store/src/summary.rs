//! # Topic Summary
//!
//! Per-topic bookkeeping for a message list: message count, the most recent
//! message, and the per-topic `show` flag driving UI browse filtering. The
//! owning store updates the summary in the same critical section as the
//! list, so summary state never diverges from list contents.

use shared_types::Message;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, trace};

/// Summary row for one topic.
#[derive(Debug, Clone)]
pub struct TopicSummaryEntry {
    /// Messages currently retained for this topic.
    pub count: usize,
    /// Whether the topic is shown in the browse view.
    pub show: bool,
    /// Most recent message on the topic, payload truncated for display.
    pub last_payload: String,
}

/// Per-topic counts and visibility for one message list.
#[derive(Debug)]
pub struct TopicSummary {
    name: String,
    max_payload_length: usize,
    rows: BTreeMap<String, TopicSummaryEntry>,
}

impl TopicSummary {
    /// Create an empty summary for the named list.
    #[must_use]
    pub fn new(name: impl Into<String>, max_payload_length: usize) -> Self {
        Self {
            name: name.into(),
            max_payload_length,
            rows: BTreeMap::new(),
        }
    }

    /// Record an inserted message. Returns `true` when this created a new
    /// topic row.
    pub fn add_message(&mut self, message: &Arc<Message>) -> bool {
        let payload = truncate_display(message.display_payload(), self.max_payload_length);

        match self.rows.get_mut(&message.topic) {
            Some(entry) => {
                entry.count += 1;
                entry.last_payload = payload;
                trace!(list = %self.name, topic = %message.topic, count = entry.count, "Summary updated");
                false
            }
            None => {
                self.rows.insert(
                    message.topic.clone(),
                    TopicSummaryEntry {
                        count: 1,
                        show: false,
                        last_payload: payload,
                    },
                );
                true
            }
        }
    }

    /// Record a removed message (eviction or filter removal).
    pub fn remove_message(&mut self, message: &Arc<Message>) {
        match self.rows.get_mut(&message.topic) {
            Some(entry) => {
                entry.count = entry.count.saturating_sub(1);
            }
            None => {
                error!(list = %self.name, topic = %message.topic, "Found empty value for topic");
            }
        }
    }

    /// Set the show flag for one topic.
    pub fn set_show(&mut self, topic: &str, show: bool) {
        if let Some(entry) = self.rows.get_mut(topic) {
            entry.show = show;
        }
    }

    /// Set the show flag for every known topic.
    pub fn set_all_show(&mut self, show: bool) {
        for entry in self.rows.values_mut() {
            entry.show = show;
        }
    }

    /// Flip the show flag for the given topics.
    pub fn toggle_show<'a>(&mut self, topics: impl IntoIterator<Item = &'a str>) {
        for topic in topics {
            if let Some(entry) = self.rows.get_mut(topic) {
                entry.show = !entry.show;
            }
        }
    }

    /// The summary row for a topic.
    #[must_use]
    pub fn entry(&self, topic: &str) -> Option<&TopicSummaryEntry> {
        self.rows.get(topic)
    }

    /// All known topics, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.rows.keys().cloned().collect()
    }

    /// Remove all rows.
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

/// Cap a display payload at `max_len` bytes without splitting a multi-byte
/// character; lossy decoding makes non-ASCII payloads routine.
fn truncate_display(mut payload: String, max_len: usize) -> String {
    if payload.len() > max_len {
        let mut cut = max_len;
        while !payload.is_char_boundary(cut) {
            cut -= 1;
        }
        payload.truncate(cut);
    }
    payload
}
