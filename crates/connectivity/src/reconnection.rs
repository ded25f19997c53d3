//! # Reconnection Manager
//!
//! Periodic liveness scheduler over a registry of managed connections.
//! Every poll cycle it launches the connector of each connection that is
//! down and past its retry interval, on its own task. The `Connecting`
//! status is set before the task is spawned, which is the gate guaranteeing
//! at most one in-flight attempt per connection.
//!
//! Elapsed-time checks use the injected monotonic clock, so wall-clock
//! adjustments cannot trigger premature or starved retries.

use crate::ports::{Connector, ManagedConnection};
use crate::POLL_INTERVAL_MS;
use shared_bus::{EventBus, ScopeEvent};
use shared_types::{ConnectionStatus, MonotonicClock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct Registration {
    connection: Arc<dyn ManagedConnection>,
    connector: Arc<dyn Connector>,
    /// Monotonic millis of the last attempt, `None` before the first.
    last_attempt: Option<u64>,
}

/// Scheduler that (re)establishes registered connections.
pub struct ReconnectionManager {
    clock: Arc<dyn MonotonicClock>,
    bus: Arc<EventBus>,
    /// Registry in registration order; the poll cycle attempts eligible
    /// connections in this order.
    connections: Mutex<Vec<Registration>>,
    running: Arc<AtomicBool>,
}

impl ReconnectionManager {
    /// Create a manager publishing status transitions on the given bus.
    #[must_use]
    pub fn new(clock: Arc<dyn MonotonicClock>, bus: Arc<EventBus>) -> Self {
        Self {
            clock,
            bus,
            connections: Mutex::new(Vec::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register a connection and its connector.
    pub fn add_connection(
        &self,
        connection: Arc<dyn ManagedConnection>,
        connector: Arc<dyn Connector>,
    ) {
        let mut connections = self.lock_registry();
        connections.push(Registration {
            connection,
            connector,
            last_attempt: None,
        });
    }

    /// Deregister a connection. In-flight attempts run to completion.
    pub fn remove_connection(&self, connection_id: &str) {
        let mut connections = self.lock_registry();
        connections.retain(|registration| registration.connection.id() != connection_id);
    }

    /// Number of registered connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.lock_registry().len()
    }

    /// Perform one poll cycle: launch a connector for every registered
    /// connection that is down and past its retry interval.
    ///
    /// Exposed for deterministic tests; [`ReconnectionManager::start`] calls
    /// this on the polling task.
    pub fn one_cycle(&self) {
        // Decide and mark under the registry lock; launch afterwards so no
        // consumer or connector code runs while the lock is held.
        let mut launches: Vec<(Arc<dyn ManagedConnection>, Arc<dyn Connector>)> = Vec::new();
        {
            let now = self.clock.now_millis();
            let mut connections = self.lock_registry();
            for registration in connections.iter_mut() {
                let connection = &registration.connection;
                let status = connection.status();

                if status == ConnectionStatus::Connecting {
                    // Attempt already in flight
                    continue;
                }

                let retry_interval = connection.reconnection_settings().retry_interval_ms;
                if let Some(last) = registration.last_attempt {
                    if last + retry_interval > now {
                        // Not due to reconnect yet
                        continue;
                    }
                }

                if status.eligible_for_reconnect() {
                    registration.last_attempt = Some(now);
                    connection.set_status(ConnectionStatus::Connecting);
                    launches.push((connection.clone(), registration.connector.clone()));
                }
            }
        }

        for (connection, connector) in launches {
            info!(connection = connection.name(), "Starting connection");
            self.bus.publish(&ScopeEvent::ConnectionStatusChanged {
                connection_id: connection.id().to_owned(),
                status: ConnectionStatus::Connecting,
            });

            let bus = self.bus.clone();
            tokio::spawn(async move {
                let outcome = connector.connect().await;
                let status = match outcome {
                    Ok(()) => {
                        info!(connection = connection.name(), "Connection established");
                        ConnectionStatus::Connected
                    }
                    Err(error) => {
                        warn!(connection = connection.name(), %error, "Connection attempt failed");
                        ConnectionStatus::Disconnected
                    }
                };
                connection.set_status(status);
                bus.publish(&ScopeEvent::ConnectionStatusChanged {
                    connection_id: connection.id().to_owned(),
                    status,
                });
            });
        }
    }

    /// Spawn the polling loop. It runs one cycle every
    /// [`POLL_INTERVAL_MS`] and exits within one sleep interval of
    /// [`ReconnectionManager::stop`].
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        let manager = self.clone();

        tokio::spawn(async move {
            debug!("Reconnection manager starting");
            while manager.running.load(Ordering::SeqCst) {
                manager.one_cycle();
                tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
            debug!("Reconnection manager ending");
        })
    }

    /// Stop the polling loop after its current cycle and sleep.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn lock_registry(&self) -> MutexGuard<'_, Vec<Registration>> {
        match self.connections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
