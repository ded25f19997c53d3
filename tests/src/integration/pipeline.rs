//! # Store Pipeline Flow
//!
//! Messages received by a store accumulate add/remove/summary events on the
//! shared queue; the batch dispatcher drains them and publishes one bus
//! event per (kind, list) pair. These tests drive the full path a live
//! connection would: receive into the store, flush, observe on the bus.

#[cfg(test)]
mod tests {
    use message_store::BoundedMessageStore;
    use shared_bus::{
        BatchDispatcher, EventBus, EventConsumer, EventKind, EventQueue, ListKey, ScopeEvent,
    };
    use shared_types::{Message, MessageSeq, PlainFormatter, StoreConfig};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct Pipeline {
        seq: MessageSeq,
        queue: Arc<EventQueue>,
        bus: Arc<EventBus>,
        store: Arc<BoundedMessageStore>,
        dispatcher: BatchDispatcher,
    }

    fn pipeline(config: StoreConfig) -> Pipeline {
        let queue = Arc::new(EventQueue::new());
        let bus = Arc::new(EventBus::new());
        let store = Arc::new(BoundedMessageStore::new(
            &config,
            Arc::new(PlainFormatter),
            queue.clone(),
        ));
        let dispatcher = BatchDispatcher::new(queue.clone(), bus.clone());
        Pipeline {
            seq: MessageSeq::new(),
            queue,
            bus,
            store,
            dispatcher,
        }
    }

    fn received(seq: &MessageSeq, topic: &str, payload: &[u8]) -> Message {
        Message::new(seq.next_id(), topic, payload.to_vec(), 0)
    }

    #[test]
    fn test_receives_surface_as_one_batched_bus_event() {
        let pipeline = pipeline(StoreConfig::named("tab-1"));

        let batches = Arc::new(Mutex::new(Vec::new()));
        let sink = batches.clone();
        let consumer: EventConsumer = Arc::new(move |event| {
            if let ScopeEvent::MessageAdded { list, messages } = event {
                sink.lock().unwrap().push((list.clone(), messages.len()));
            }
            Ok(())
        });
        pipeline
            .bus
            .subscribe("ui", consumer, EventKind::MessageAdded, None);

        for topic in ["s/1", "s/2", "s/3"] {
            pipeline.store.receive(received(&pipeline.seq, topic, b"x"));
        }
        pipeline.dispatcher.flush();

        let seen = batches.lock().unwrap();
        assert_eq!(*seen, vec![(ListKey::new("tab-1"), 3)]);
    }

    #[test]
    fn test_eviction_surfaces_as_removal_batch() {
        let pipeline = pipeline(StoreConfig::named("tab-1").with_sizes(2, 2));

        let removed = Arc::new(Mutex::new(Vec::new()));
        let sink = removed.clone();
        let consumer: EventConsumer = Arc::new(move |event| {
            if let ScopeEvent::MessageRemoved { messages, .. } = event {
                let mut topics = sink.lock().unwrap();
                topics.extend(messages.iter().map(|message| message.topic.clone()));
            }
            Ok(())
        });
        pipeline
            .bus
            .subscribe("ui", consumer, EventKind::MessageRemoved, None);

        for topic in ["s/1", "s/2", "s/3"] {
            pipeline.store.receive(received(&pipeline.seq, topic, b"x"));
        }
        pipeline.dispatcher.flush();

        // Oldest message evicted when the third arrived
        assert_eq!(*removed.lock().unwrap(), vec!["s/1".to_owned()]);
        assert_eq!(pipeline.store.messages().len(), 2);
    }

    #[test]
    fn test_summary_changes_reach_family_subscribers() {
        let pipeline = pipeline(StoreConfig::named("tab-1"));

        // Family-kind subscriber sees adds and summary changes alike
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let sink = kinds.clone();
        let consumer: EventConsumer = Arc::new(move |event| {
            sink.lock().unwrap().push(event.kind());
            Ok(())
        });
        pipeline
            .bus
            .subscribe("ui", consumer, EventKind::MessageBrowse, None);

        pipeline.store.receive(received(&pipeline.seq, "s/1", b"x"));
        pipeline.dispatcher.flush();

        let seen = kinds.lock().unwrap();
        assert!(seen.contains(&EventKind::MessageAdded));
        assert!(seen.contains(&EventKind::TopicSummaryChanged));
    }

    #[test]
    fn test_unrelated_stores_batch_separately() {
        let queue = Arc::new(EventQueue::new());
        let bus = Arc::new(EventBus::new());
        let seq = MessageSeq::new();
        let first = BoundedMessageStore::new(
            &StoreConfig::named("tab-a"),
            Arc::new(PlainFormatter),
            queue.clone(),
        );
        let second = BoundedMessageStore::new(
            &StoreConfig::named("tab-b"),
            Arc::new(PlainFormatter),
            queue.clone(),
        );

        let lists = Arc::new(Mutex::new(Vec::new()));
        let sink = lists.clone();
        let consumer: EventConsumer = Arc::new(move |event| {
            if let ScopeEvent::MessageAdded { list, .. } = event {
                sink.lock().unwrap().push(list.clone());
            }
            Ok(())
        });
        bus.subscribe("ui", consumer, EventKind::MessageAdded, None);

        first.receive(received(&seq, "s/1", b"x"));
        second.receive(received(&seq, "s/2", b"x"));
        first.receive(received(&seq, "s/3", b"x"));
        BatchDispatcher::new(queue, bus).flush();

        // One event per list, in first-appearance order
        assert_eq!(
            *lists.lock().unwrap(),
            vec![ListKey::new("tab-a"), ListKey::new("tab-b")]
        );
    }

    #[tokio::test]
    async fn test_dispatcher_task_drains_queue() {
        let pipeline = pipeline(StoreConfig::named("tab-1"));
        let dispatcher = BatchDispatcher::with_interval(
            pipeline.queue.clone(),
            pipeline.bus.clone(),
            Duration::from_millis(10),
        );
        let handle = dispatcher.start();

        pipeline.store.receive(received(&pipeline.seq, "s/1", b"x"));

        for _ in 0..100 {
            if pipeline.queue.pending() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(pipeline.queue.pending(), 0);

        dispatcher.stop();
        handle.await.unwrap();
    }
}
