//! Schedule core: pure domain types and change detection.
mod diff;
mod slot;
mod snapshot;
mod source;

pub use diff::diff;
pub use slot::{tokyo_offset, Slot, MESSAGE_TIME_FORMAT};
pub use snapshot::{NotifiableSet, SourceReading, SourceSnapshot};
pub use source::{Source, SourceId};
