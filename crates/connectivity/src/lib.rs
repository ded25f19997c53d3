//! # Connectivity Crate
//!
//! Keeps client connections alive under failure and routes received
//! messages to their local delivery targets.
//!
//! - [`ReconnectionManager`]: a polling scheduler that relaunches the
//!   connector of any registered connection that has been down longer than
//!   its retry interval, with at most one in-flight attempt per connection.
//! - [`MessageRouter`]: consults the topic matcher on the receive path to
//!   decide which subscription stores an incoming topic satisfies, and
//!   fans the message out to them.
//!
//! The transport itself is an external collaborator behind the
//! [`TransportClient`] and [`Connector`] ports; this crate decides *whether*
//! and *when* to reconnect and *which* stores see a message, never doing
//! network I/O of its own.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod ports;
pub mod reconnection;
pub mod router;

pub use ports::{ConnectError, Connector, ManagedConnection, TransportClient};
pub use reconnection::ReconnectionManager;
pub use router::MessageRouter;

/// Sleep between reconnection poll cycles, milliseconds.
pub const POLL_INTERVAL_MS: u64 = 100;
