//! # Receive-Path Routing Flow
//!
//! A router fans one received `(topic, payload)` out to every store whose
//! subscription filter matches, and the stores' queued events then flow
//! through the batch dispatcher. This is the path a live transport callback
//! takes.

#[cfg(test)]
mod tests {
    use connectivity::MessageRouter;
    use message_store::BoundedMessageStore;
    use shared_bus::{BatchDispatcher, EventBus, EventConsumer, EventKind, EventQueue, ScopeEvent};
    use shared_types::{MessageSeq, PlainFormatter, StoreConfig};
    use std::sync::{Arc, Mutex};

    fn store(name: &str, queue: &Arc<EventQueue>) -> Arc<BoundedMessageStore> {
        Arc::new(BoundedMessageStore::new(
            &StoreConfig::named(name),
            Arc::new(PlainFormatter),
            queue.clone(),
        ))
    }

    #[test]
    fn test_routed_message_lands_in_matching_stores_only() {
        let queue = Arc::new(EventQueue::new());
        let router = MessageRouter::new("conn-1", Arc::new(MessageSeq::new()));
        let sensors = store("sensors", &queue);
        let actuators = store("actuators", &queue);
        router.subscribe("sensors/#", sensors.clone()).unwrap();
        router.subscribe("actuators/#", actuators.clone()).unwrap();

        let delivered = router.route("sensors/1/temp", b"21.5", 0, false);

        assert_eq!(delivered, 1);
        assert_eq!(sensors.messages().len(), 1);
        assert!(actuators.messages().is_empty());
    }

    #[test]
    fn test_fan_out_attributes_each_copy_to_its_filter() {
        let queue = Arc::new(EventQueue::new());
        let router = MessageRouter::new("conn-1", Arc::new(MessageSeq::new()));
        let wide = store("wide", &queue);
        let narrow = store("narrow", &queue);
        router.subscribe("a/#", wide.clone()).unwrap();
        router.subscribe("a/+/c", narrow.clone()).unwrap();

        router.route("a/b/c", b"x", 0, false);

        assert_eq!(wide.messages()[0].subscription.as_deref(), Some("a/#"));
        assert_eq!(narrow.messages()[0].subscription.as_deref(), Some("a/+/c"));
    }

    #[test]
    fn test_routed_messages_reach_the_bus_in_batches() {
        let queue = Arc::new(EventQueue::new());
        let bus = Arc::new(EventBus::new());
        let router = MessageRouter::new("conn-1", Arc::new(MessageSeq::new()));
        let target = store("tab-1", &queue);
        router.subscribe("s/#", target).unwrap();

        let added = Arc::new(Mutex::new(0usize));
        let sink = added.clone();
        let consumer: EventConsumer = Arc::new(move |event| {
            if let ScopeEvent::MessageAdded { messages, .. } = event {
                *sink.lock().unwrap() += messages.len();
            }
            Ok(())
        });
        bus.subscribe("ui", consumer, EventKind::MessageAdded, None);

        router.route("s/1", b"a", 0, false);
        router.route("s/2", b"b", 0, false);
        BatchDispatcher::new(queue, bus).flush();

        assert_eq!(*added.lock().unwrap(), 2);
    }

    #[test]
    fn test_subscription_set_survives_for_replay_after_reconnect() {
        let queue = Arc::new(EventQueue::new());
        let router = MessageRouter::new("conn-1", Arc::new(MessageSeq::new()));
        router.subscribe("a/b", store("s1", &queue)).unwrap();
        router.subscribe("c/#", store("s2", &queue)).unwrap();

        // The connector re-subscribes from this list after a reconnect
        assert_eq!(
            router.subscriptions(),
            vec!["a/b".to_owned(), "c/#".to_owned()]
        );

        router.unsubscribe_all();
        assert!(router.subscriptions().is_empty());
        assert_eq!(router.route("a/b", b"x", 0, false), 0);
    }
}
