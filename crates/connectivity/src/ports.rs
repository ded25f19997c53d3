//! # Connectivity Ports
//!
//! Traits at the boundary between this crate and the transport layer. The
//! transport client performs the actual network I/O; the reconnection
//! manager only observes connection state and launches connector attempts.

use async_trait::async_trait;
use shared_types::{ConnectionStatus, ReconnectionSettings};
use thiserror::Error;

/// Errors from a connection attempt or transport operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The transport failed to establish or use the connection.
    #[error("Transport failure: {reason}")]
    Transport { reason: String },

    /// The broker refused the connection.
    #[error("Connection refused: {reason}")]
    Refused { reason: String },
}

/// The registry's view of one connection.
///
/// Status is fed by the transport client's state notifications and read by
/// the reconnection manager's poll cycle.
pub trait ManagedConnection: Send + Sync {
    /// Stable connection identity.
    fn id(&self) -> &str;

    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Current connection status.
    fn status(&self) -> ConnectionStatus;

    /// Record a status transition.
    fn set_status(&self, status: ConnectionStatus);

    /// Retry configuration for this connection.
    fn reconnection_settings(&self) -> ReconnectionSettings;
}

/// One connection attempt, run on its own task by the reconnection manager.
///
/// Implementations own the transport handshake and, when
/// [`ReconnectionSettings::resubscribe`] is set, replay the connection's
/// subscriptions after a successful connect.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Attempt to (re)establish the connection.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectError`] when the attempt fails; the manager
    /// records the failed attempt and retries on a later cycle.
    async fn connect(&self) -> Result<(), ConnectError>;
}

/// External transport client interface (collaborator contract only).
///
/// Implemented outside this workspace by the concrete MQTT client wrapper;
/// referenced here so connectors and the GUI layer share one vocabulary.
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Open the network connection.
    async fn connect(&self) -> Result<(), ConnectError>;

    /// Close the network connection.
    async fn disconnect(&self) -> Result<(), ConnectError>;

    /// Subscribe to a topic filter at the given QoS.
    async fn subscribe(&self, filter: &str, qos: u8) -> Result<(), ConnectError>;

    /// Remove a subscription.
    async fn unsubscribe(&self, filter: &str) -> Result<(), ConnectError>;

    /// Publish a payload to a topic.
    async fn publish(&self, topic: &str, payload: &[u8], qos: u8, retained: bool)
        -> Result<(), ConnectError>;
}
