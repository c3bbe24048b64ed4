use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Layout used when a slot is shown to a person, e.g. `2014-12-31(Wed) 12:13:24`.
pub const MESSAGE_TIME_FORMAT: &str = "%Y-%m-%d(%a) %H:%M:%S";

const TOKYO_OFFSET_SECS: i32 = 9 * 60 * 60;

/// The fixed UTC+9 zone every schedule page publishes its times in.
pub fn tokyo_offset() -> FixedOffset {
    match FixedOffset::east_opt(TOKYO_OFFSET_SECS) {
        Some(offset) => offset,
        None => unreachable!("UTC+9 is inside the accepted offset range"),
    }
}

/// One bookable lesson start. Two slots are equal when they denote the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(DateTime<FixedOffset>);

impl Slot {
    pub fn new(at: DateTime<FixedOffset>) -> Self {
        Self(at)
    }

    /// Interpret a wall-clock time as UTC+9.
    pub fn from_tokyo_local(local: NaiveDateTime) -> Option<Self> {
        tokyo_offset()
            .from_local_datetime(&local)
            .single()
            .map(Self)
    }

    pub fn at(&self) -> DateTime<FixedOffset> {
        self.0
    }

    pub fn format_for_message(&self) -> String {
        self.0.format(MESSAGE_TIME_FORMAT).to_string()
    }
}

impl From<DateTime<FixedOffset>> for Slot {
    fn from(at: DateTime<FixedOffset>) -> Self {
        Self(at)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
