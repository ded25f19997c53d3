//! # Replay-to-Pipeline Flow
//!
//! Replays a captured log into the same store and bus pipeline live traffic
//! uses, pacing records against the manually driven clock.

#[cfg(test)]
mod tests {
    use audit_replay::AuditReplay;
    use message_store::BoundedMessageStore;
    use shared_bus::{BatchDispatcher, EventBus, EventConsumer, EventKind, EventQueue, ScopeEvent};
    use shared_types::{ManualClock, MessageSeq, PlainFormatter, StoreConfig};
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn audit_log(lines: &[String]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn record(topic: &str, payload: &str, timestamp: u64) -> String {
        format!(r#"{{"topic":"{topic}","payload":"{payload}","timestamp":{timestamp}}}"#)
    }

    /// Seed the virtual clock, then return with the ticking task stopped so
    /// the test drives ticks by hand.
    async fn seed(replay: &Arc<AuditReplay>) {
        let handle = replay.start();
        replay.stop();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_replayed_records_flow_into_store_and_bus() {
        let clock = ManualClock::shared();
        let bus = Arc::new(EventBus::new());
        let queue = Arc::new(EventQueue::new());
        let store = BoundedMessageStore::new(
            &StoreConfig::named("replay-tab"),
            Arc::new(PlainFormatter),
            queue.clone(),
        );
        let replay = Arc::new(AuditReplay::new(
            "session.log",
            clock.clone(),
            Arc::new(MessageSeq::new()),
            bus.clone(),
        ));

        let added = Arc::new(Mutex::new(Vec::new()));
        let sink = added.clone();
        let consumer: EventConsumer = Arc::new(move |event| {
            if let ScopeEvent::MessageAdded { messages, .. } = event {
                let mut topics = sink.lock().unwrap();
                topics.extend(messages.iter().map(|message| message.topic.clone()));
            }
            Ok(())
        });
        bus.subscribe("ui", consumer, EventKind::MessageAdded, None);

        let log = audit_log(&[
            record("s/1", "one", 1000),
            record("s/2", "two", 1200),
            record("s/3", "three", 1600),
        ]);
        assert_eq!(replay.read_from_file(log.path()).unwrap(), 3);
        seed(&replay).await;

        // First record is due at the seeded virtual time
        assert!(replay.is_ready_to_publish());
        store.receive((*replay.next_message().unwrap()).clone());

        // 200ms of recorded time to the second record
        assert!(!replay.is_ready_to_publish());
        clock.advance(200);
        replay.tick();
        assert!(replay.is_ready_to_publish());
        store.receive((*replay.next_message().unwrap()).clone());

        clock.advance(400);
        replay.tick();
        store.receive((*replay.next_message().unwrap()).clone());
        assert!(replay.next_message().is_none());

        BatchDispatcher::new(queue, bus).flush();

        // Newest first in the store
        let snapshot = store.messages();
        let stored: Vec<&str> = snapshot
            .iter()
            .map(|message| message.topic.as_str())
            .collect();
        assert_eq!(stored, vec!["s/3", "s/2", "s/1"]);
        assert_eq!(
            *added.lock().unwrap(),
            vec!["s/1".to_owned(), "s/2".to_owned(), "s/3".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_double_speed_halves_the_wait() {
        let clock = ManualClock::shared();
        let replay = Arc::new(AuditReplay::new(
            "session.log",
            clock.clone(),
            Arc::new(MessageSeq::new()),
            Arc::new(EventBus::new()),
        ));

        let log = audit_log(&[record("s/1", "one", 0), record("s/2", "two", 1000)]);
        replay.read_from_file(log.path()).unwrap();
        seed(&replay).await;
        replay.next_message().unwrap();

        replay.set_speed(2.0);
        clock.advance(500);
        replay.tick();

        // 500ms of real time covers the 1000ms recorded gap at speed 2
        assert!(replay.is_ready_to_publish());
        assert_eq!(replay.next_message().unwrap().topic, "s/2");
    }

    #[tokio::test]
    async fn test_progress_events_track_consumption() {
        let clock = ManualClock::shared();
        let bus = Arc::new(EventBus::new());
        let replay = Arc::new(AuditReplay::new(
            "session.log",
            clock,
            Arc::new(MessageSeq::new()),
            bus.clone(),
        ));

        let progress = Arc::new(Mutex::new(Vec::new()));
        let sink = progress.clone();
        let consumer: EventConsumer = Arc::new(move |event| {
            if let ScopeEvent::ReplayProgress {
                source,
                published,
                total,
            } = event
            {
                sink.lock().unwrap().push((source.clone(), *published, *total));
            }
            Ok(())
        });
        bus.subscribe("ui", consumer, EventKind::Replay, None);

        let log = audit_log(&[record("s/1", "one", 0), record("s/2", "two", 0)]);
        replay.read_from_file(log.path()).unwrap();
        replay.next_message().unwrap();
        replay.next_message().unwrap();

        assert_eq!(
            *progress.lock().unwrap(),
            vec![
                ("session.log".to_owned(), 1, 2),
                ("session.log".to_owned(), 2, 2),
            ]
        );
    }
}
