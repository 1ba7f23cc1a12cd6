//! Read path: archive → registry → typed events.
//!
//! Definitions are replayed in file order into a [`Registry`]; each record's
//! raw references are resolved against what was inserted before it. Events
//! are then replayed per location, remapped from local to global ids and
//! resolved to [`Event`]s before reaching the [`EventHandler`].

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use otf2r_core::{Def, Location, LocationRef, Registry, RegistryOptions};
use tracing::{debug, info};

use crate::convert::insert_definition;
use crate::event::Event;
use crate::format::{ArchiveFile, ARCHIVE_VERSION};
use crate::io::read_archive_auto;
use crate::mapping::LocalMappings;

/// Receives typed events during [`Reader::read_events`].
///
/// Locations are passed as the stream's own reference. It stays intact when
/// the location definition is missing and a lenient registry resolved it to
/// the undefined value.
pub trait EventHandler {
    /// Called once per event, in stream order.
    fn on_event(&mut self, location: LocationRef, event: &Event) -> Result<()>;

    /// Called before the first event of a location, with its definition.
    fn on_location_begin(&mut self, _location: LocationRef, _definition: &Def<Location>) -> Result<()> {
        Ok(())
    }

    /// Called after the last event of a location.
    fn on_location_end(&mut self, _location: LocationRef, _events: u64) -> Result<()> {
        Ok(())
    }
}

impl<F> EventHandler for F
where
    F: FnMut(LocationRef, &Event) -> Result<()>,
{
    fn on_event(&mut self, location: LocationRef, event: &Event) -> Result<()> {
        self(location, event)
    }
}

/// Reader over one archive.
#[derive(Debug)]
pub struct Reader {
    archive: ArchiveFile,
    registry: Registry,
    selected: Option<BTreeSet<u64>>,
    definitions_read: bool,
}

impl Reader {
    /// Open an archive (format chosen by extension).
    pub fn open<P: AsRef<Path>>(path: P, options: RegistryOptions) -> Result<Self> {
        let path = path.as_ref();
        let archive = read_archive_auto(path)?;
        info!(path = %path.display(), definitions = archive.definitions.len(), locations = archive.locations.len(), "archive opened");
        Self::from_archive(archive, options)
    }

    /// Reader over an in-memory archive.
    pub fn from_archive(archive: ArchiveFile, options: RegistryOptions) -> Result<Self> {
        ensure!(
            archive.version <= ARCHIVE_VERSION,
            "unsupported archive version {} (max {})",
            archive.version,
            ARCHIVE_VERSION
        );
        Ok(Self { archive, registry: Registry::with_options(options), selected: None, definitions_read: false })
    }

    /// Restrict event replay to `locations`.
    pub fn select_locations(&mut self, locations: impl IntoIterator<Item = LocationRef>) {
        self.selected = Some(locations.into_iter().map(LocationRef::get).collect());
    }

    /// Underlying archive.
    #[must_use]
    pub const fn archive(&self) -> &ArchiveFile {
        &self.archive
    }

    /// Registry populated so far.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Take the registry.
    #[must_use]
    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Take the archive and the registry.
    #[must_use]
    pub fn into_parts(self) -> (ArchiveFile, Registry) {
        (self.archive, self.registry)
    }

    /// Replay all definition records into the registry. Idempotent.
    pub fn read_definitions(&mut self) -> Result<&Registry> {
        if !self.definitions_read {
            for (i, rec) in self.archive.definitions.iter().enumerate() {
                insert_definition(&mut self.registry, rec)
                    .with_context(|| format!("definition record {i} ({})", rec.kind()))?;
            }
            self.definitions_read = true;
            info!(definitions = self.registry.total(), "definitions read");
        }
        Ok(&self.registry)
    }

    /// Replay events of the selected locations (all by default) to `handler`.
    /// Returns the number of events delivered.
    pub fn read_events<H: EventHandler + ?Sized>(&mut self, handler: &mut H) -> Result<u64> {
        self.read_definitions()?;
        let mut total = 0u64;
        for stream in &self.archive.locations {
            if self.selected.as_ref().is_some_and(|s| !s.contains(&stream.location)) {
                continue;
            }
            let location = LocationRef::new(stream.location);
            let definition = self
                .registry
                .resolve::<Location>(location)
                .with_context(|| format!("location {}", stream.location))?;
            let mappings = LocalMappings::from_records(&stream.mappings);
            handler.on_location_begin(location, &definition)?;
            let mut count = 0u64;
            for (i, rec) in stream.events.iter().enumerate() {
                let global = mappings.remap(rec);
                let event = Event::resolve(&self.registry, &global)
                    .with_context(|| format!("location {} event {i}", stream.location))?;
                handler.on_event(location, &event)?;
                count += 1;
            }
            handler.on_location_end(location, count)?;
            debug!(location = stream.location, events = count, "location replayed");
            total += count;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::LocationStream;
    use crate::mapping::{IdMap, MappingRecord, MappingType};
    use crate::record::{EventRecord, GlobalDefRecord};
    use otf2r_core::Region;

    fn archive() -> ArchiveFile {
        let mut a = ArchiveFile::new("test");
        a.definitions = vec![
            GlobalDefRecord::String { id: 0, text: "main".into() },
            GlobalDefRecord::String { id: 1, text: "work".into() },
            GlobalDefRecord::Region {
                id: 0,
                name: 0,
                canonical_name: 0,
                description: u32::MAX,
                role: 1,
                paradigm: 1,
                flags: 0,
                source_file: u32::MAX,
                begin_line_number: 0,
                end_line_number: 0,
            },
            GlobalDefRecord::Region {
                id: 1,
                name: 1,
                canonical_name: 1,
                description: u32::MAX,
                role: 1,
                paradigm: 1,
                flags: 0,
                source_file: u32::MAX,
                begin_line_number: 0,
                end_line_number: 0,
            },
        ];
        // Stream-local region 0 is global region 1.
        a.locations = vec![
            LocationStream {
                location: 0,
                mappings: vec![MappingRecord {
                    mapping_type: MappingType::Region,
                    map: IdMap::from_pairs([(0, 1)]),
                }],
                events: vec![EventRecord::Enter { time: 1, region: 0 }],
            },
            LocationStream { location: 1, mappings: Vec::new(), events: vec![EventRecord::Enter { time: 1, region: 0 }] },
        ];
        a
    }

    #[test]
    fn events_are_remapped_before_resolution() {
        let mut reader = Reader::from_archive(archive(), RegistryOptions::default()).unwrap();
        let mut names = Vec::new();
        let n = reader
            .read_events(&mut |_: LocationRef, e: &Event| {
                if let Event::Enter { region, .. } = e {
                    names.push(region.data().map(|r: &Region| r.name.to_string()).unwrap_or_default());
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(names, vec!["work".to_string(), "main".to_string()]);
    }

    #[test]
    fn location_filter_limits_replay() {
        let mut reader = Reader::from_archive(archive(), RegistryOptions::default()).unwrap();
        reader.select_locations([LocationRef::new(1)]);
        let n = reader.read_events(&mut |_: LocationRef, _: &Event| Ok(())).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn undefined_locations_keep_their_stream_reference() {
        // Neither location 0 nor 1 is defined in the archive.
        let mut reader = Reader::from_archive(archive(), RegistryOptions::default()).unwrap();
        let mut seen = Vec::new();
        reader.read_events(&mut |loc: LocationRef, _: &Event| {
            seen.push(loc);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![LocationRef::new(0), LocationRef::new(1)]);
        assert!(!reader.registry().get::<Location>(LocationRef::new(0)).is_valid());
    }

    #[test]
    fn newer_versions_are_rejected() {
        let mut a = archive();
        a.version = ARCHIVE_VERSION + 1;
        assert!(Reader::from_archive(a, RegistryOptions::default()).is_err());
    }
}
