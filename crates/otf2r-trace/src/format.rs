//! Versioned archive envelope: global definitions plus one event stream per
//! location.

use serde::{Deserialize, Serialize};

use crate::mapping::MappingRecord;
use crate::record::{EventRecord, GlobalDefRecord};

/// Envelope version written by this crate.
pub const ARCHIVE_VERSION: u16 = 1;

/// Events of one location.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationStream {
    /// Global location reference.
    pub location: u64,
    /// Local → global id tables for this stream.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<MappingRecord>,
    /// Events in time order.
    pub events: Vec<EventRecord>,
}

/// Archive envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveFile {
    /// Format/version tag for forward-compat.
    pub version: u16,
    /// Tool that wrote the archive.
    pub creator: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Global definitions in write order.
    pub definitions: Vec<GlobalDefRecord>,
    /// Per-location event streams.
    pub locations: Vec<LocationStream>,
    /// Optional metadata (command line, host, ...).
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

impl ArchiveFile {
    /// Empty archive stamped with the current version.
    #[must_use]
    pub fn new(creator: impl Into<String>) -> Self {
        Self {
            version: ARCHIVE_VERSION,
            creator: creator.into(),
            description: None,
            definitions: Vec::new(),
            locations: Vec::new(),
            meta: None,
        }
    }

    /// Total number of events over all locations.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.locations.iter().map(|l| l.events.len()).sum()
    }

    /// Stream of `location`, if present.
    #[must_use]
    pub fn stream(&self, location: u64) -> Option<&LocationStream> {
        self.locations.iter().find(|l| l.location == location)
    }
}
