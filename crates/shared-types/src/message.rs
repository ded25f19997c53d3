//! # Message Model
//!
//! The immutable received-message representation and the injected sequence
//! generator that hands out process-unique message ids.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique, monotonically increasing message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// Sequence generator for [`MessageId`]s.
///
/// One instance is owned by the process-wide context and passed to every
/// constructor that creates messages (connections, replay). Uniqueness is
/// guaranteed per generator instance.
#[derive(Debug, Default)]
pub struct MessageSeq {
    next: AtomicU64,
}

impl MessageSeq {
    /// Create a generator starting at id 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Hand out the next unique id.
    pub fn next_id(&self) -> MessageId {
        MessageId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed).saturating_sub(1)
    }
}

/// A single received (or replayed) message.
///
/// Created on receipt, optionally annotated with a formatted payload and the
/// owning subscription once matched, then shared immutably. The annotation
/// methods consume `self` so a message cannot change after it has been
/// handed to a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id from the owning [`MessageSeq`].
    pub id: MessageId,
    /// Topic the message was published on.
    pub topic: String,
    /// Receipt timestamp, epoch milliseconds.
    pub received_at: u64,
    /// Raw payload bytes as delivered by the transport.
    pub payload: Vec<u8>,
    /// Quality of service the message was delivered with.
    pub qos: u8,
    /// Whether the broker flagged the message as retained.
    pub retained: bool,
    /// Payload after formatting; attached by the owning store.
    pub formatted_payload: Option<String>,
    /// Topic filter of the subscription the message was matched to.
    pub subscription: Option<String>,
}

impl Message {
    /// Create a message as received from the transport.
    #[must_use]
    pub fn new(id: MessageId, topic: impl Into<String>, payload: Vec<u8>, received_at: u64) -> Self {
        Self {
            id,
            topic: topic.into(),
            received_at,
            payload,
            qos: 0,
            retained: false,
            formatted_payload: None,
            subscription: None,
        }
    }

    /// Set QoS and retained delivery details.
    #[must_use]
    pub fn with_delivery(mut self, qos: u8, retained: bool) -> Self {
        self.qos = qos;
        self.retained = retained;
        self
    }

    /// Attach the formatting result.
    #[must_use]
    pub fn with_formatted_payload(mut self, formatted: String) -> Self {
        self.formatted_payload = Some(formatted);
        self
    }

    /// Attach the matched subscription's topic filter.
    #[must_use]
    pub fn with_subscription(mut self, filter: impl Into<String>) -> Self {
        self.subscription = Some(filter.into());
        self
    }

    /// Formatted payload if attached, otherwise the raw bytes decoded lossily.
    #[must_use]
    pub fn display_payload(&self) -> String {
        match &self.formatted_payload {
            Some(formatted) => formatted.clone(),
            None => String::from_utf8_lossy(&self.payload).into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_ids_are_unique_and_increasing() {
        let seq = MessageSeq::new();
        let a = seq.next_id();
        let b = seq.next_id();
        assert!(a < b);
        assert_eq!(seq.issued(), 2);
    }

    #[test]
    fn test_display_payload_prefers_formatted() {
        let seq = MessageSeq::new();
        let message = Message::new(seq.next_id(), "a/b", b"raw".to_vec(), 0)
            .with_formatted_payload("pretty".into());
        assert_eq!(message.display_payload(), "pretty");
    }

    #[test]
    fn test_display_payload_falls_back_to_raw() {
        let seq = MessageSeq::new();
        let message = Message::new(seq.next_id(), "a/b", b"raw".to_vec(), 0);
        assert_eq!(message.display_payload(), "raw");
    }
}
