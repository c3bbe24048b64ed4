use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::{diff, Slot, Source, SourceId};

/// What a source reader produces: the page metadata and the slots currently open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReading {
    pub source: Source,
    pub slots: Vec<Slot>,
}

/// The full slot list captured for a source during one run.
///
/// Duplicate slots are kept as the page listed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub source_id: SourceId,
    pub slots: Vec<Slot>,
    pub captured_at: DateTime<FixedOffset>,
}

impl SourceSnapshot {
    pub fn from_reading(reading: &SourceReading, captured_at: DateTime<FixedOffset>) -> Self {
        Self {
            source_id: reading.source.id.clone(),
            slots: reading.slots.clone(),
            captured_at,
        }
    }

    /// Slots of this snapshot that `previous` does not contain.
    pub fn notifiable_slots(&self, previous: &[Slot]) -> Vec<Slot> {
        diff(&self.slots, previous)
    }
}

/// New slots of one source, ready to be turned into a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifiableSet {
    pub source: Source,
    pub new_slots: Vec<Slot>,
}

impl NotifiableSet {
    pub fn formatted_slots(&self) -> Vec<String> {
        self.new_slots
            .iter()
            .map(Slot::format_for_message)
            .collect()
    }
}
