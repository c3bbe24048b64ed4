#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use schedule_core::{NotifiableSet, Slot, Source, SourceReading, SourceSnapshot};
use schedule_engine::{
    ChatTransport, DeliveryError, DispatchError, FailureKind, FetchError, MailMessage,
    MailTransport, NotificationStrategy, SlackMessage, SnapshotStore, SourceReader, StoreError,
};

pub fn init_logging() {
    engine_logging::initialize_for_tests();
}

pub fn tokyo(day: u32, hour: u32, minute: u32) -> Slot {
    let local = NaiveDate::from_ymd_opt(2016, 6, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap();
    Slot::from_tokyo_local(local).unwrap()
}

pub fn source(id: &str, name: &str) -> Source {
    Source {
        id: id.to_string(),
        display_name: name.to_string(),
        page_url: format!("http://example.com/teacher/{id}/"),
        icon_url: Some(format!("http://example.com/teacher/{id}.png")),
    }
}

pub fn notifiable(id: &str, name: &str, new_slots: Vec<Slot>) -> NotifiableSet {
    NotifiableSet {
        source: source(id, name),
        new_slots,
    }
}

/// Serves canned readings; ids without one fail like an unreachable page.
#[derive(Default)]
pub struct FakeReader {
    readings: Mutex<HashMap<String, Vec<Slot>>>,
    delays: Mutex<HashMap<String, Duration>>,
    panics: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeReader {
    pub fn with(self, id: &str, slots: Vec<Slot>) -> Self {
        self.set(id, slots);
        self
    }

    pub fn delayed(self, id: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(id.to_string(), delay);
        self
    }

    pub fn panicking(self, id: &str) -> Self {
        self.panics.lock().unwrap().insert(id.to_string());
        self
    }

    pub fn set(&self, id: &str, slots: Vec<Slot>) {
        self.readings.lock().unwrap().insert(id.to_string(), slots);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SourceReader for FakeReader {
    async fn read(&self, source_id: &str) -> Result<SourceReading, FetchError> {
        self.calls.lock().unwrap().push(source_id.to_string());
        let delay = self.delays.lock().unwrap().get(source_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let panics = self.panics.lock().unwrap().contains(source_id);
        if panics {
            panic!("reader blew up on {source_id}");
        }
        let slots = self.readings.lock().unwrap().get(source_id).cloned();
        match slots {
            Some(slots) => Ok(SourceReading {
                source: source(source_id, &format!("Teacher {source_id}")),
                slots,
            }),
            None => Err(FetchError {
                kind: FailureKind::HttpStatus(503),
                message: "503 Service Unavailable".to_string(),
            }),
        }
    }
}

/// In-memory store with switchable failures and an event log.
#[derive(Default)]
pub struct MemoryStore {
    snapshots: Mutex<HashMap<String, SourceSnapshot>>,
    fail_get: Mutex<HashSet<String>>,
    fail_put: Mutex<HashSet<String>>,
    puts: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn seeded(self, id: &str, slots: Vec<Slot>) -> Self {
        let captured_at = tokyo(1, 0, 0).at();
        self.snapshots.lock().unwrap().insert(
            id.to_string(),
            SourceSnapshot {
                source_id: id.to_string(),
                slots,
                captured_at,
            },
        );
        self
    }

    pub fn failing_get(self, id: &str) -> Self {
        self.fail_get.lock().unwrap().insert(id.to_string());
        self
    }

    pub fn failing_put(self, id: &str) -> Self {
        self.fail_put.lock().unwrap().insert(id.to_string());
        self
    }

    pub fn snapshot(&self, id: &str) -> Option<SourceSnapshot> {
        self.snapshots.lock().unwrap().get(id).cloned()
    }

    pub fn puts(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemoryStore {
    async fn get(&self, source_id: &str) -> Result<Option<SourceSnapshot>, StoreError> {
        if self.fail_get.lock().unwrap().contains(source_id) {
            return Err(StoreError::Read("backend unavailable".to_string()));
        }
        Ok(self.snapshots.lock().unwrap().get(source_id).cloned())
    }

    async fn put(&self, source_id: &str, snapshot: &SourceSnapshot) -> Result<(), StoreError> {
        if self.fail_put.lock().unwrap().contains(source_id) {
            return Err(StoreError::Write("disk full".to_string()));
        }
        self.puts.lock().unwrap().push(source_id.to_string());
        self.snapshots
            .lock()
            .unwrap()
            .insert(source_id.to_string(), snapshot.clone());
        Ok(())
    }
}

/// Records every batch it is asked to dispatch. Clones share the record.
#[derive(Clone, Default)]
pub struct RecordingStrategy {
    batches: Arc<Mutex<Vec<Vec<NotifiableSet>>>>,
}

impl RecordingStrategy {
    pub fn batches(&self) -> Vec<Vec<NotifiableSet>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NotificationStrategy for RecordingStrategy {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn dispatch(&self, sets: Vec<NotifiableSet>) -> Vec<Result<(), DispatchError>> {
        let results = sets.iter().map(|_| Ok(())).collect();
        self.batches.lock().unwrap().push(sets);
        results
    }
}

/// Chat transport that records messages and refuses the usernames it is told to.
#[derive(Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<SlackMessage>>,
    refuse: Mutex<HashSet<String>>,
}

impl RecordingChat {
    pub fn refusing(self, username: &str) -> Self {
        self.refuse.lock().unwrap().insert(username.to_string());
        self
    }

    pub fn sent(&self) -> Vec<SlackMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatTransport for RecordingChat {
    async fn send(&self, message: &SlackMessage) -> Result<Vec<u8>, DeliveryError> {
        if self.refuse.lock().unwrap().contains(&message.username) {
            return Err(DeliveryError::Transport("connection reset".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(br#"{"ok":true}"#.to_vec())
    }
}

#[derive(Default)]
pub struct RecordingMail {
    sent: Mutex<Vec<MailMessage>>,
    fail: bool,
}

impl RecordingMail {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MailTransport for RecordingMail {
    async fn send(&self, message: &MailMessage) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail {
            return Err(DeliveryError::Rejected("http status 500".to_string()));
        }
        Ok(())
    }
}
