//! # Reconnection Lifecycle Flow
//!
//! Drives the reconnection manager's polling loop against a mock transport
//! that fails before it succeeds, and checks the status transitions other
//! subsystems observe on the bus.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use connectivity::{ConnectError, Connector, ManagedConnection, ReconnectionManager};
    use shared_bus::{EventBus, EventKind, ScopeEvent};
    use shared_types::{ConnectionStatus, ManualClock, ReconnectionSettings};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct MockConnection {
        id: String,
        status: Mutex<ConnectionStatus>,
        settings: ReconnectionSettings,
    }

    impl MockConnection {
        fn new(id: &str, retry_interval_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_owned(),
                status: Mutex::new(ConnectionStatus::NotConnected),
                settings: ReconnectionSettings {
                    retry_interval_ms,
                    resubscribe: true,
                },
            })
        }
    }

    impl ManagedConnection for MockConnection {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            &self.id
        }

        fn status(&self) -> ConnectionStatus {
            *self.status.lock().unwrap()
        }

        fn set_status(&self, status: ConnectionStatus) {
            *self.status.lock().unwrap() = status;
        }

        fn reconnection_settings(&self) -> ReconnectionSettings {
            self.settings.clone()
        }
    }

    /// Fails the first `failures` attempts, then connects.
    struct FlakyConnector {
        failures: usize,
        attempts: AtomicUsize,
    }

    impl FlakyConnector {
        fn new(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                failures,
                attempts: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Connector for FlakyConnector {
        async fn connect(&self) -> Result<(), ConnectError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                Err(ConnectError::Transport {
                    reason: format!("attempt {attempt} refused"),
                })
            } else {
                Ok(())
            }
        }
    }

    async fn wait_until(mut done: impl FnMut() -> bool) {
        for _ in 0..200 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_connection_recovers_after_transient_failures() {
        let clock = ManualClock::shared();
        let bus = Arc::new(EventBus::new());
        let manager = Arc::new(ReconnectionManager::new(clock.clone(), bus.clone()));

        let statuses = Arc::new(Mutex::new(Vec::new()));
        let sink = statuses.clone();
        bus.subscribe(
            "watcher",
            Arc::new(move |event: &ScopeEvent| {
                if let ScopeEvent::ConnectionStatusChanged { status, .. } = event {
                    sink.lock().unwrap().push(*status);
                }
                Ok(())
            }),
            EventKind::Connection,
            None,
        );

        let connection = MockConnection::new("broker-1", 200);
        let connector = FlakyConnector::new(2);
        manager.add_connection(connection.clone(), connector.clone());
        let handle = manager.start();

        // Two failed attempts, each unlocked by advancing past the retry
        // interval, then a successful third.
        wait_until(|| connection.status() == ConnectionStatus::Disconnected).await;
        clock.advance(250);
        wait_until(|| connector.attempts.load(Ordering::SeqCst) >= 2).await;
        wait_until(|| connection.status() == ConnectionStatus::Disconnected).await;
        clock.advance(250);
        wait_until(|| connection.status() == ConnectionStatus::Connected).await;

        manager.stop();
        handle.await.unwrap();

        assert_eq!(connector.attempts.load(Ordering::SeqCst), 3);
        let seen = statuses.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                ConnectionStatus::Connecting,
                ConnectionStatus::Disconnected,
                ConnectionStatus::Connecting,
                ConnectionStatus::Disconnected,
                ConnectionStatus::Connecting,
                ConnectionStatus::Connected,
            ]
        );
    }

    #[tokio::test]
    async fn test_connected_connection_is_left_alone() {
        let clock = ManualClock::shared();
        let manager = Arc::new(ReconnectionManager::new(
            clock.clone(),
            Arc::new(EventBus::new()),
        ));

        let connection = MockConnection::new("broker-1", 0);
        connection.set_status(ConnectionStatus::Connected);
        let connector = FlakyConnector::new(0);
        manager.add_connection(connection.clone(), connector.clone());

        manager.one_cycle();
        clock.advance(1000);
        manager.one_cycle();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
        assert_eq!(connection.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_two_connections_attempted_independently() {
        let clock = ManualClock::shared();
        let manager = Arc::new(ReconnectionManager::new(
            clock,
            Arc::new(EventBus::new()),
        ));

        let first = MockConnection::new("broker-1", 1000);
        let second = MockConnection::new("broker-2", 1000);
        manager.add_connection(first.clone(), FlakyConnector::new(0));
        manager.add_connection(second.clone(), FlakyConnector::new(0));

        manager.one_cycle();
        wait_until(|| first.status() == ConnectionStatus::Connected).await;
        wait_until(|| second.status() == ConnectionStatus::Connected).await;
    }
}
