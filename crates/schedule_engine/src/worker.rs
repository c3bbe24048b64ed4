use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use engine_logging::{engine_debug, engine_error};
use schedule_core::{tokyo_offset, NotifiableSet, SourceId, SourceSnapshot};
use thiserror::Error;

use crate::reader::SourceReader;
use crate::store::{SnapshotStore, StoreError};
use crate::FetchError;

/// Source of capture timestamps for snapshots.
pub type Clock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

pub fn tokyo_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&tokyo_offset())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    StoreRead(StoreError),
    #[error("{0}")]
    StoreWrite(StoreError),
}

/// Result of checking one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Failed {
        source_id: SourceId,
        reason: WorkerError,
    },
    NoChange {
        source_id: SourceId,
    },
    Notifiable(NotifiableSet),
}

impl Outcome {
    pub fn source_id(&self) -> &str {
        match self {
            Outcome::Failed { source_id, .. } | Outcome::NoChange { source_id } => source_id,
            Outcome::Notifiable(set) => &set.source.id,
        }
    }
}

/// Fetches one source, swaps its stored snapshot and reports what is new.
#[derive(Clone)]
pub struct SourceWorker {
    reader: Arc<dyn SourceReader>,
    store: Arc<dyn SnapshotStore>,
    clock: Clock,
}

impl SourceWorker {
    pub fn new(reader: Arc<dyn SourceReader>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            reader,
            store,
            clock: Arc::new(tokyo_now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Never fails: every error becomes `Outcome::Failed` for this source only.
    pub async fn process(&self, source_id: &str) -> Outcome {
        match self.try_process(source_id).await {
            Ok(outcome) => outcome,
            Err(reason) => {
                engine_error!("source={} check failed: {}", source_id, reason);
                Outcome::Failed {
                    source_id: source_id.to_string(),
                    reason,
                }
            }
        }
    }

    async fn try_process(&self, source_id: &str) -> Result<Outcome, WorkerError> {
        let reading = self.reader.read(source_id).await?;

        let previous = self
            .store
            .get(source_id)
            .await
            .map_err(WorkerError::StoreRead)?
            .map(|snapshot| snapshot.slots)
            .unwrap_or_default();

        // The new snapshot becomes the baseline before anything is sent, so slots
        // whose notification fails later in this run are not offered again.
        let current = SourceSnapshot::from_reading(&reading, (self.clock)());
        self.store
            .put(source_id, &current)
            .await
            .map_err(WorkerError::StoreWrite)?;

        let new_slots = current.notifiable_slots(&previous);
        engine_debug!(
            "source={} slots={} previous={} new={}",
            source_id,
            current.slots.len(),
            previous.len(),
            new_slots.len()
        );

        if new_slots.is_empty() {
            return Ok(Outcome::NoChange {
                source_id: source_id.to_string(),
            });
        }
        Ok(Outcome::Notifiable(NotifiableSet {
            source: reading.source,
            new_slots,
        }))
    }
}
