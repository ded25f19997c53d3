//! # Replay Engine
//!
//! Paces a recorded message log against a virtual clock. The clock is
//! seeded from the first record's timestamp and advanced by a ticking task
//! adding `real_elapsed * speed` each tick, so speed 2.0 fast-forwards and
//! speed 0.5 plays in slow motion. One record is read ahead of the clock;
//! [`AuditReplay::is_ready_to_publish`] compares against its timestamp and
//! [`AuditReplay::next_message`] consumes it.

use crate::record::ReplayRecord;
use crate::source::AuditSource;
use crate::ReplayError;
use shared_bus::{EventBus, ScopeEvent};
use shared_types::{Message, MessageSeq, MonotonicClock, ReplaySettings};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

struct ReplayState {
    source: Option<Box<dyn AuditSource>>,
    /// Read-ahead record; pacing compares against its timestamp without
    /// consuming it.
    next_record: Option<ReplayRecord>,
    /// Lines taken from the source so far, for malformed-record logs.
    lines_read: usize,
    total: usize,
    published: usize,
    /// Virtual replay clock, epoch milliseconds in recorded time.
    replay_time: u64,
    /// Monotonic millis at the last tick.
    last_tick: u64,
    speed: f64,
}

/// Timed replay over one audit log.
pub struct AuditReplay {
    name: String,
    clock: Arc<dyn MonotonicClock>,
    seq: Arc<MessageSeq>,
    bus: Arc<EventBus>,
    settings: ReplaySettings,
    state: Mutex<ReplayState>,
    running: Arc<AtomicBool>,
}

impl AuditReplay {
    /// Create a replay named after its source, publishing progress on the
    /// given bus.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        clock: Arc<dyn MonotonicClock>,
        seq: Arc<MessageSeq>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self::with_settings(name, clock, seq, bus, ReplaySettings::default())
    }

    /// Create a replay with explicit tick settings.
    #[must_use]
    pub fn with_settings(
        name: impl Into<String>,
        clock: Arc<dyn MonotonicClock>,
        seq: Arc<MessageSeq>,
        bus: Arc<EventBus>,
        settings: ReplaySettings,
    ) -> Self {
        Self {
            name: name.into(),
            clock,
            seq,
            bus,
            settings,
            state: Mutex::new(ReplayState {
                source: None,
                next_record: None,
                lines_read: 0,
                total: 0,
                published: 0,
                replay_time: 0,
                last_tick: 0,
                speed: 1.0,
            }),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Load an audit log from disk. Returns the record count.
    ///
    /// # Errors
    ///
    /// Returns a [`ReplayError`] when the file cannot be opened.
    pub fn read_from_file(&self, path: impl AsRef<Path>) -> Result<usize, ReplayError> {
        let source = crate::FileAuditSource::open(path)?;
        Ok(self.read_from_source(Box::new(source)))
    }

    /// Attach an audit source and read ahead its first valid record.
    /// Returns the record count.
    pub fn read_from_source(&self, source: Box<dyn AuditSource>) -> usize {
        let mut state = self.lock_state();
        let total = source.message_count();
        state.source = Some(source);
        state.total = total;
        state.lines_read = 0;
        state.published = 0;
        Self::read_ahead(&mut state);
        info!(replay = %self.name, total, "Loaded audit log");
        total
    }

    /// Start the ticking task.
    ///
    /// The virtual clock is seeded from the first record's timestamp;
    /// starting with no records loaded is a logged no-op. Each tick adds
    /// `real_elapsed * speed` to the virtual clock, on the injected
    /// monotonic clock.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        {
            let mut state = self.lock_state();
            match &state.next_record {
                Some(record) => {
                    state.replay_time = record.timestamp;
                    state.last_tick = self.clock.now_millis();
                }
                None => {
                    warn!(replay = %self.name, "No messages to replay");
                    return tokio::spawn(async {});
                }
            }
        }

        self.running.store(true, Ordering::SeqCst);
        let replay = self.clone();
        let interval = Duration::from_millis(self.settings.tick_interval_ms);

        tokio::spawn(async move {
            debug!(replay = %replay.name, "Replay clock starting");
            while replay.running.load(Ordering::SeqCst) {
                replay.tick();
                tokio::time::sleep(interval).await;
            }
            debug!(replay = %replay.name, "Replay clock ending");
        })
    }

    /// Stop the ticking task after its current tick and sleep.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Advance the virtual clock once. Exposed for deterministic tests;
    /// [`AuditReplay::start`] calls this on the ticking task.
    pub fn tick(&self) {
        let now = self.clock.now_millis();
        let mut state = self.lock_state();
        let elapsed = now.saturating_sub(state.last_tick);
        state.replay_time += (elapsed as f64 * state.speed) as u64;
        state.last_tick = now;
    }

    /// Change the speed factor for subsequent ticks.
    ///
    /// The factor must be finite and greater than zero; anything else is
    /// logged and ignored. Real time already elapsed since the last tick is
    /// accounted at the old speed first, so the change is never retroactive.
    pub fn set_speed(&self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            warn!(replay = %self.name, factor, "Ignoring invalid replay speed");
            return;
        }
        self.tick();
        let mut state = self.lock_state();
        info!(replay = %self.name, previous = state.speed, new = factor, "Changing replay speed");
        state.speed = factor;
    }

    /// The current speed factor.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.lock_state().speed
    }

    /// Whether the virtual clock has caught up to the next record.
    #[must_use]
    pub fn is_ready_to_publish(&self) -> bool {
        let state = self.lock_state();
        match &state.next_record {
            Some(record) => state.replay_time >= record.timestamp,
            None => false,
        }
    }

    /// Consume the read-ahead record as a message and read ahead the next.
    ///
    /// The message's receipt timestamp is the recorded one, so downstream
    /// stores see the original capture times.
    pub fn next_message(&self) -> Option<Arc<Message>> {
        let (message, published, total) = {
            let mut state = self.lock_state();
            let record = state.next_record.take()?;
            Self::read_ahead(&mut state);
            state.published += 1;

            let message = Arc::new(Message::new(
                self.seq.next_id(),
                record.topic,
                record.payload.into_bytes(),
                record.timestamp,
            ));
            (message, state.published as u64, state.total as u64)
        };

        self.bus.publish(&ScopeEvent::ReplayProgress {
            source: self.name.clone(),
            published,
            total,
        });
        Some(message)
    }

    /// Records handed out so far.
    #[must_use]
    pub fn published(&self) -> usize {
        self.lock_state().published
    }

    /// Records in the loaded log.
    #[must_use]
    pub fn total(&self) -> usize {
        self.lock_state().total
    }

    /// Current virtual clock value, epoch milliseconds in recorded time.
    #[must_use]
    pub fn replay_time(&self) -> u64 {
        self.lock_state().replay_time
    }

    /// Whether the ticking task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Pull lines from the source until one parses or the log ends.
    /// Malformed lines are logged with their position and skipped.
    fn read_ahead(state: &mut ReplayState) {
        state.next_record = None;
        let Some(source) = state.source.as_mut() else {
            return;
        };

        while let Some(line) = source.next_record() {
            state.lines_read += 1;
            match ReplayRecord::parse(&line) {
                Ok(record) => {
                    state.next_record = Some(record);
                    return;
                }
                Err(parse_error) => {
                    error!(record = state.lines_read, %parse_error, "Discarded invalid replay record");
                }
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ReplayState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
