//! # Message Filters
//!
//! Filters run inside the store's critical section, before insertion. A
//! filter may veto the inbound message or react by mutating the list;
//! removals it performs are reported back so the store can keep its summary
//! and the UI event queue in step.

use crate::list::MessageList;
use shared_types::Message;
use std::sync::Arc;

/// A filter consulted for each inbound message before insertion.
pub trait MessageFilter: Send {
    /// Inspect the inbound message against the current list.
    ///
    /// Messages the filter removes from the list must be pushed onto
    /// `removals`. Returns `true` to drop the inbound message itself.
    fn apply(
        &mut self,
        message: &Arc<Message>,
        list: &mut MessageList,
        removals: &mut Vec<Arc<Message>>,
    ) -> bool;

    /// Clear any accumulated filter state.
    fn reset(&mut self);

    /// Whether the filter has acted since the last reset.
    fn is_active(&self) -> bool;
}

/// Drops consecutive duplicates per topic.
///
/// When enabled and the inbound message carries the same topic and payload
/// as the current head of the list, the *previous* head is removed (the new
/// message is kept, refreshing the receipt timestamp) and a running drop
/// count is maintained for observability.
#[derive(Debug, Default)]
pub struct UniqueContentOnlyFilter {
    enabled: bool,
    dropped: u64,
}

impl UniqueContentOnlyFilter {
    /// Create a disabled filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the filter; disabling resets the drop count.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    /// Whether the filter is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Messages dropped as duplicates since the last reset.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl MessageFilter for UniqueContentOnlyFilter {
    fn apply(
        &mut self,
        message: &Arc<Message>,
        list: &mut MessageList,
        removals: &mut Vec<Arc<Message>>,
    ) -> bool {
        if !self.enabled || list.is_empty() {
            return false;
        }

        let duplicate_of_head = list.head().is_some_and(|head| {
            head.topic == message.topic && head.display_payload() == message.display_payload()
        });

        if duplicate_of_head {
            if let Some(previous) = list.remove(0) {
                removals.push(previous);
            }
            self.dropped += 1;
        }

        false
    }

    fn reset(&mut self) {
        self.dropped = 0;
    }

    fn is_active(&self) -> bool {
        self.dropped > 0
    }
}
