//! Write path: registry + per-location event streams → archive.
//!
//! Definitions are flushed in a fixed dependency order so that every record
//! only names records written before it:
//!
//! clock → strings → attributes → system tree nodes (+ properties) →
//! location groups (+ properties) → locations (+ properties) → regions →
//! groups → comms → I/O paradigms → I/O regular files → I/O directories →
//! I/O handles → parameters → source code locations → calling contexts
//! (+ properties) → interrupt generators → metric members → metric classes →
//! metric instances → markers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Result};
use indexmap::IndexMap;
use otf2r_core::{
    Attribute, CallingContext, Comm, Def, Group, Holds, HoldsProperties, InterruptGenerator,
    IoDirectory, IoHandle, IoParadigm, IoRegularFile, Location, LocationGroup, LocationRef, Marker,
    Metric, MetricClass, MetricInstance, MetricMember, MetricValue, Parameter, Region, Registry,
    SourceCodeLocation, StringDef, SystemTreeNode,
};
use tracing::{error, info};

use crate::convert::{clock_record, definition_record, DefinitionRecord, PropertyRecord};
use crate::event::Event;
use crate::format::{ArchiveFile, LocationStream};
use crate::io::write_archive_auto;
use crate::record::{EventRecord, GlobalDefRecord};

/// Destination of flushed definition records.
pub trait DefinitionSink {
    /// Accept one record.
    fn write_definition(&mut self, record: GlobalDefRecord) -> Result<()>;
}

impl DefinitionSink for Vec<GlobalDefRecord> {
    fn write_definition(&mut self, record: GlobalDefRecord) -> Result<()> {
        self.push(record);
        Ok(())
    }
}

fn emit<K, S>(registry: &Registry, sink: &mut S) -> Result<usize>
where
    K: DefinitionRecord,
    Registry: Holds<K>,
    S: DefinitionSink + ?Sized,
{
    let mut n = 0;
    for rec in registry.definitions::<K>().filter_map(definition_record) {
        sink.write_definition(rec)?;
        n += 1;
    }
    Ok(n)
}

fn emit_properties<O, S>(registry: &Registry, sink: &mut S) -> Result<usize>
where
    O: PropertyRecord,
    Registry: HoldsProperties<O>,
    S: DefinitionSink + ?Sized,
{
    let props = registry.properties::<O>();
    for p in props {
        sink.write_definition(O::property_record(p))?;
    }
    Ok(props.len())
}

/// Flush every definition of `registry` to `sink` in dependency order.
///
/// Location records take their event count from `event_counts` when the
/// location has an entry there. Returns the number of records written.
pub fn flush_definitions<S: DefinitionSink + ?Sized>(
    registry: &Registry,
    event_counts: &BTreeMap<u64, u64>,
    sink: &mut S,
) -> Result<usize> {
    let mut n = 0;
    if let Some(clock) = registry.clock_properties() {
        sink.write_definition(clock_record(clock))?;
        n += 1;
    }
    n += emit::<StringDef, S>(registry, sink)?;
    n += emit::<Attribute, S>(registry, sink)?;
    n += emit::<SystemTreeNode, S>(registry, sink)?;
    n += emit_properties::<SystemTreeNode, S>(registry, sink)?;
    n += emit::<LocationGroup, S>(registry, sink)?;
    n += emit_properties::<LocationGroup, S>(registry, sink)?;
    for mut rec in registry.definitions::<Location>().filter_map(definition_record) {
        if let GlobalDefRecord::Location { id, number_of_events, .. } = &mut rec {
            if let Some(count) = event_counts.get(id) {
                *number_of_events = *count;
            }
        }
        sink.write_definition(rec)?;
        n += 1;
    }
    n += emit_properties::<Location, S>(registry, sink)?;
    n += emit::<Region, S>(registry, sink)?;
    n += emit::<Group, S>(registry, sink)?;
    n += emit::<Comm, S>(registry, sink)?;
    n += emit::<IoParadigm, S>(registry, sink)?;
    n += emit::<IoRegularFile, S>(registry, sink)?;
    n += emit::<IoDirectory, S>(registry, sink)?;
    n += emit::<IoHandle, S>(registry, sink)?;
    n += emit::<Parameter, S>(registry, sink)?;
    n += emit::<SourceCodeLocation, S>(registry, sink)?;
    n += emit::<CallingContext, S>(registry, sink)?;
    n += emit_properties::<CallingContext, S>(registry, sink)?;
    n += emit::<InterruptGenerator, S>(registry, sink)?;
    n += emit::<MetricMember, S>(registry, sink)?;
    n += emit::<MetricClass, S>(registry, sink)?;
    n += emit::<MetricInstance, S>(registry, sink)?;
    n += emit::<Marker, S>(registry, sink)?;
    Ok(n)
}

/// Event stream of one location. Timestamps must not decrease.
#[derive(Clone, Debug)]
pub struct LocationWriter {
    location: LocationRef,
    events: Vec<EventRecord>,
}

impl LocationWriter {
    fn new(location: LocationRef) -> Self {
        Self { location, events: Vec::new() }
    }

    /// Location this stream belongs to.
    #[must_use]
    pub const fn location(&self) -> LocationRef {
        self.location
    }

    /// Number of events written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append a raw event with global references.
    pub fn write_record(&mut self, record: EventRecord) -> Result<()> {
        if let Some(last) = self.events.last() {
            ensure!(
                record.time() >= last.time(),
                "location {}: timestamp {} precedes {}",
                self.location,
                record.time(),
                last.time()
            );
        }
        self.events.push(record);
        Ok(())
    }

    /// Append a typed event.
    pub fn write(&mut self, event: &Event) -> Result<()> {
        self.write_record(event.to_record())
    }

    /// Region entry.
    pub fn enter(&mut self, time: u64, region: &Def<Region>) -> Result<()> {
        self.write_record(EventRecord::Enter { time, region: region.reference().get() })
    }

    /// Region exit.
    pub fn leave(&mut self, time: u64, region: &Def<Region>) -> Result<()> {
        self.write_record(EventRecord::Leave { time, region: region.reference().get() })
    }

    /// Metric sample.
    pub fn metric(&mut self, time: u64, metric: &Metric, values: &[MetricValue]) -> Result<()> {
        self.write(&Event::Metric { time, metric: metric.clone(), values: values.to_vec() })
    }
}

/// Archive writer owning a registry and per-location streams.
///
/// [`close`](Self::close) writes the archive; if the writer is dropped
/// without closing, the archive is written on drop and failures are logged.
#[derive(Debug)]
pub struct Writer {
    target: Option<PathBuf>,
    creator: String,
    description: Option<String>,
    meta: Option<serde_json::Value>,
    registry: Registry,
    streams: IndexMap<LocationRef, LocationWriter>,
    closed: bool,
}

impl Writer {
    /// Writer that will produce `path` (format chosen by extension).
    #[must_use]
    pub fn create<P: AsRef<Path>>(path: P, creator: impl Into<String>) -> Self {
        let mut writer = Self::in_memory(creator);
        writer.target = Some(path.as_ref().to_path_buf());
        writer
    }

    /// Writer that only builds an [`ArchiveFile`].
    #[must_use]
    pub fn in_memory(creator: impl Into<String>) -> Self {
        Self {
            target: None,
            creator: creator.into(),
            description: None,
            meta: None,
            registry: Registry::new(),
            streams: IndexMap::new(),
            closed: false,
        }
    }

    /// Replace the registry (e.g. with one filled by a [`Reader`](crate::reader::Reader)).
    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the archive description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Set archive metadata.
    pub fn set_meta(&mut self, meta: serde_json::Value) {
        self.meta = Some(meta);
    }

    /// Registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registry, for creating definitions.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Stream of `location`, created on first use. Streams keep first-use order.
    pub fn location_writer(&mut self, location: LocationRef) -> &mut LocationWriter {
        self.streams.entry(location).or_insert_with(|| LocationWriter::new(location))
    }

    /// Build the archive without consuming the writer.
    pub fn to_archive(&self) -> Result<ArchiveFile> {
        let counts: BTreeMap<u64, u64> = self
            .streams
            .values()
            .map(|s| (s.location.get(), s.events.len() as u64))
            .collect();
        let mut archive = ArchiveFile::new(self.creator.clone());
        archive.description.clone_from(&self.description);
        archive.meta.clone_from(&self.meta);
        flush_definitions(&self.registry, &counts, &mut archive.definitions)?;
        archive.locations = self
            .streams
            .values()
            .map(|s| LocationStream { location: s.location.get(), mappings: Vec::new(), events: s.events.clone() })
            .collect();
        Ok(archive)
    }

    /// Build the archive and consume the writer without touching the target.
    pub fn into_archive(mut self) -> Result<ArchiveFile> {
        self.closed = true;
        self.to_archive()
    }

    /// Write the archive to the target (no-op for in-memory writers).
    pub fn close(mut self) -> Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        self.closed = true;
        let Some(path) = self.target.clone() else {
            return Ok(());
        };
        let archive = self.to_archive()?;
        write_archive_auto(&path, &archive)?;
        info!(
            path = %path.display(),
            definitions = archive.definitions.len(),
            locations = archive.locations.len(),
            events = archive.event_count(),
            "archive written"
        );
        Ok(())
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.finish() {
            error!(error = %format!("{e:#}"), "writing archive on drop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otf2r_core::{LocationType, Paradigm, RegionRole, SystemTreeNodeRef};

    #[test]
    fn definitions_flush_in_dependency_order() {
        let mut w = Writer::in_memory("test");
        let reg = w.registry_mut();
        // Create in an order that differs from the flush order.
        let name = reg.create(StringDef::new("main")).unwrap();
        reg.create(Region::new(name.clone(), RegionRole::Function, Paradigm::User)).unwrap();
        let node = reg.create(SystemTreeNode::new(name.clone(), name.clone(), Def::undefined())).unwrap();
        let group = reg
            .create(LocationGroup { name: name.clone(), system_tree_parent: node, ..LocationGroup::default() })
            .unwrap();
        reg.create(Location::new(name, LocationType::CpuThread, group)).unwrap();

        let kinds: Vec<&str> = w.to_archive().unwrap().definitions.iter().map(GlobalDefRecord::kind).collect();
        assert_eq!(kinds, vec!["string", "system_tree_node", "location_group", "location", "region"]);
        assert_eq!(w.registry().get::<SystemTreeNode>(SystemTreeNodeRef::new(0)).raw(), 0);
    }

    #[test]
    fn location_records_carry_written_event_counts() {
        let mut w = Writer::in_memory("test");
        let reg = w.registry_mut();
        let name = reg.create(StringDef::new("thread")).unwrap();
        let region = reg.create(Region::new(name.clone(), RegionRole::Function, Paradigm::User)).unwrap();
        let loc = reg.create(Location::new(name, LocationType::CpuThread, Def::undefined())).unwrap();

        let lw = w.location_writer(loc.reference());
        lw.enter(1, &region).unwrap();
        lw.leave(2, &region).unwrap();

        let archive = w.into_archive().unwrap();
        assert!(archive.definitions.iter().any(|d| matches!(
            d,
            GlobalDefRecord::Location { number_of_events: 2, .. }
        )));
        assert_eq!(archive.event_count(), 2);
    }

    #[test]
    fn streams_keep_first_use_order() {
        let mut w = Writer::in_memory("test");
        for (loc, time) in [(9, 1), (3, 1), (9, 2), (3, 2), (9, 3)] {
            w.location_writer(LocationRef::new(loc))
                .write_record(EventRecord::Enter { time, region: 0 })
                .unwrap();
        }
        let archive = w.into_archive().unwrap();
        let shape: Vec<(u64, usize)> = archive.locations.iter().map(|s| (s.location, s.events.len())).collect();
        assert_eq!(shape, vec![(9, 3), (3, 2)]);
    }

    #[test]
    fn decreasing_timestamps_are_rejected() {
        let mut w = Writer::in_memory("test");
        let lw = w.location_writer(LocationRef::new(0));
        lw.write_record(EventRecord::Enter { time: 5, region: 0 }).unwrap();
        lw.write_record(EventRecord::Leave { time: 5, region: 0 }).unwrap();
        assert!(lw.write_record(EventRecord::Enter { time: 4, region: 0 }).is_err());
        assert_eq!(lw.len(), 2);
    }
}
