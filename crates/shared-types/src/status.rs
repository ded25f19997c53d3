//! # Connection Status
//!
//! Lifecycle states of a managed connection, fed by the transport client's
//! state notifications and read by the reconnection manager.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a managed connection.
///
/// Transitions: `NotConnected -> Connecting -> Connected`;
/// `Connected -> Disconnected` (or directly to `NotConnected`) on
/// failure/close; `Disconnected | NotConnected -> Connecting` on a
/// reconnect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Never connected since registration.
    NotConnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The transport reported a live connection.
    Connected,
    /// A previously live connection was lost or closed.
    Disconnected,
}

impl ConnectionStatus {
    /// Whether the reconnection manager may launch a connector for this state.
    #[must_use]
    pub fn eligible_for_reconnect(self) -> bool {
        matches!(self, Self::NotConnected | Self::Disconnected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotConnected => "not connected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}
