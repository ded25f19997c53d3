//! # Message List
//!
//! Ordered sequence of received messages, newest first, with a soft
//! preferred size and a hard maximum enforced on every insert. The list has
//! no internal lock: it is owned by exactly one store, which serializes all
//! access.

use shared_types::Message;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

/// Newest-first message buffer with capacity eviction.
#[derive(Debug)]
pub struct MessageList {
    messages: VecDeque<Arc<Message>>,
    name: String,
    preferred_size: usize,
    max_size: usize,
}

impl MessageList {
    /// Create an empty list.
    #[must_use]
    pub fn new(name: impl Into<String>, preferred_size: usize, max_size: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            name: name.into(),
            preferred_size,
            max_size,
        }
    }

    /// Insert a message at the head.
    ///
    /// When the list is already at its maximum size the tail (oldest)
    /// element is removed first and returned, so `len() <= max_size` holds
    /// before and after every call.
    pub fn add(&mut self, message: Arc<Message>) -> Option<Arc<Message>> {
        let removed = if self.is_max_size() {
            self.messages.pop_back()
        } else {
            None
        };

        self.messages.push_front(message);
        trace!(
            list = %self.name,
            len = self.messages.len(),
            preferred = self.preferred_size,
            max = self.max_size,
            "Store update"
        );
        removed
    }

    /// Remove and return the message at the given position (0 = newest).
    pub fn remove(&mut self, index: usize) -> Option<Arc<Message>> {
        self.messages.remove(index)
    }

    /// Remove all messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The newest message, if any.
    #[must_use]
    pub fn head(&self) -> Option<&Arc<Message>> {
        self.messages.front()
    }

    /// Snapshot of the messages, newest first.
    #[must_use]
    pub fn messages(&self) -> Vec<Arc<Message>> {
        self.messages.iter().cloned().collect()
    }

    /// Iterate the messages, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Message>> {
        self.messages.iter()
    }

    /// Current length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether the hard cap has been reached.
    #[must_use]
    pub fn is_max_size(&self) -> bool {
        self.messages.len() >= self.max_size
    }

    /// Whether the soft threshold has been exceeded.
    #[must_use]
    pub fn exceeding_preferred_size(&self) -> bool {
        self.messages.len() > self.preferred_size
    }

    /// The list name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The soft threshold.
    #[must_use]
    pub fn preferred_size(&self) -> usize {
        self.preferred_size
    }

    /// The hard cap.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
