//! # Bus Events
//!
//! The tagged union of events that flow through the bus, and the explicit
//! kind hierarchy consumers subscribe against.

use shared_types::{ConnectionStatus, Message};
use std::fmt;
use std::sync::Arc;

/// Key identifying the message list a store event originated from.
///
/// Batches are grouped by this key so unrelated streams reach the consumer
/// as separate batches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListKey(pub String);

impl ListKey {
    /// Create a key from a list name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The underlying list name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared event kinds, forming an explicit subtype hierarchy.
///
/// Concrete kinds are what events report via [`ScopeEvent::kind`]; family
/// kinds (`MessageBrowse`, `Connection`, `Replay`) and the root `Any` exist
/// only for subscriptions. [`EventKind::accepts`] encodes the contravariant
/// matching rule: a consumer declared for a kind receives every concrete
/// kind at or below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Root of the hierarchy; accepts every event.
    Any,
    /// Family: message browse updates (additions, removals, summary rows).
    MessageBrowse,
    /// A batch of messages was added to a list.
    MessageAdded,
    /// A batch of messages was removed from a list (eviction or filtering).
    MessageRemoved,
    /// Per-topic summary rows changed for a list.
    TopicSummaryChanged,
    /// Family: connection lifecycle.
    Connection,
    /// A managed connection changed status.
    ConnectionStatusChanged,
    /// Family: audit replay.
    Replay,
    /// Replay progressed through its source.
    ReplayProgress,
}

impl EventKind {
    /// The declared parent kind, or `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Any => None,
            Self::MessageAdded | Self::MessageRemoved | Self::TopicSummaryChanged => {
                Some(Self::MessageBrowse)
            }
            Self::ConnectionStatusChanged => Some(Self::Connection),
            Self::ReplayProgress => Some(Self::Replay),
            Self::MessageBrowse | Self::Connection | Self::Replay => Some(Self::Any),
        }
    }

    /// Whether a consumer declared for `self` accepts an event of the given
    /// concrete kind.
    #[must_use]
    pub fn accepts(self, concrete: Self) -> bool {
        let mut current = Some(concrete);
        while let Some(kind) = current {
            if kind == self {
                return true;
            }
            current = kind.parent();
        }
        false
    }
}

/// All events that can be published to the bus.
#[derive(Debug, Clone)]
pub enum ScopeEvent {
    /// Messages added to a list within one batch window.
    MessageAdded {
        /// The owning list.
        list: ListKey,
        /// Added messages, in arrival order.
        messages: Vec<Arc<Message>>,
    },

    /// Messages removed from a list (eviction or duplicate filtering).
    MessageRemoved {
        /// The owning list.
        list: ListKey,
        /// Removed messages, in removal order.
        messages: Vec<Arc<Message>>,
    },

    /// Topic summary rows of a list changed.
    TopicSummaryChanged {
        /// The owning list.
        list: ListKey,
        /// Distinct topics whose summary rows changed.
        topics: Vec<String>,
    },

    /// A managed connection changed status.
    ConnectionStatusChanged {
        /// Connection identity.
        connection_id: String,
        /// The new status.
        status: ConnectionStatus,
    },

    /// Audit replay progressed through its source.
    ReplayProgress {
        /// Replay source name.
        source: String,
        /// Records published so far.
        published: u64,
        /// Total records in the source.
        total: u64,
    },
}

impl ScopeEvent {
    /// The event's concrete kind.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MessageAdded { .. } => EventKind::MessageAdded,
            Self::MessageRemoved { .. } => EventKind::MessageRemoved,
            Self::TopicSummaryChanged { .. } => EventKind::TopicSummaryChanged,
            Self::ConnectionStatusChanged { .. } => EventKind::ConnectionStatusChanged,
            Self::ReplayProgress { .. } => EventKind::ReplayProgress,
        }
    }

    /// The value compared against a consumer's subscription filter.
    ///
    /// Store events carry their list name; connection events their
    /// connection id; replay events their source name.
    #[must_use]
    pub fn filter_value(&self) -> Option<&str> {
        match self {
            Self::MessageAdded { list, .. }
            | Self::MessageRemoved { list, .. }
            | Self::TopicSummaryChanged { list, .. } => Some(list.name()),
            Self::ConnectionStatusChanged { connection_id, .. } => Some(connection_id),
            Self::ReplayProgress { source, .. } => Some(source),
        }
    }
}
