//! Deterministic synthetic archive generator used by the CLI `simulate`
//! subcommand, tests and benches.
//!
//! One machine node hosts one process whose threads each record a properly
//! nested enter/leave stream over a small region set, with periodic samples
//! of a single cycle counter.

use anyhow::Result;
use otf2r_core::{
    AttributeValue, ClockProperties, Def, Location, LocationGroup, LocationGroupType, LocationRef,
    LocationType, Metric, MetricClass, MetricMember, MetricMode, MetricOccurrence, MetricType,
    MetricValue, Paradigm, Property, RecorderKind, Region, RegionRole, StringDef, SystemTreeNode,
    Type,
};
use rand::{rngs::StdRng, Rng as _, SeedableRng};

use crate::format::ArchiveFile;
use crate::writer::Writer;

/// Shape of a generated archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of thread locations.
    pub locations: u32,
    /// Target number of events per location (the final leaves may add a few).
    pub events_per_location: u64,
    /// Number of distinct regions.
    pub regions: u32,
    /// RNG seed.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { locations: 4, events_per_location: 1_000, regions: 8, seed: 42 }
    }
}

/// Generate a synthetic archive.
pub fn generate_archive(cfg: &GeneratorConfig) -> Result<ArchiveFile> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut writer = Writer::in_memory(concat!("otf2r-trace ", env!("CARGO_PKG_VERSION")));
    writer.set_description("synthetic archive");

    let reg = writer.registry_mut();
    reg.set_clock_properties(ClockProperties { timer_resolution: 1_000_000_000, global_offset: 0, trace_length: 0 });

    let machine = reg.create(StringDef::new("machine"))?;
    let node_class = reg.create(StringDef::new("node"))?;
    let node = reg.create(SystemTreeNode::new(machine, node_class, Def::undefined()))?;
    let cores = reg.create(StringDef::new("cores"))?;
    reg.add_property(Property::new(node.clone(), cores, AttributeValue::UInt32(cfg.locations)))?;

    let process = reg.create(StringDef::new("process 0"))?;
    let group = reg.create(LocationGroup {
        name: process,
        group_type: LocationGroupType::Process,
        system_tree_parent: node,
    })?;

    let mut regions = Vec::with_capacity(cfg.regions as usize);
    for i in 0..cfg.regions.max(1) {
        let name = reg.create(StringDef::new(if i == 0 { "main".to_owned() } else { format!("kernel_{i}") }))?;
        let role = if i == 0 { RegionRole::Function } else { RegionRole::Loop };
        regions.push(reg.create(Region::new(name, role, Paradigm::User))?);
    }

    let cycles = reg.create(StringDef::new("cycles"))?;
    let unit = reg.create(StringDef::new("#"))?;
    let member = reg.create(MetricMember {
        name: cycles.clone(),
        description: cycles,
        metric_type: MetricType::Papi,
        mode: MetricMode::AccumulatedStart,
        value_type: Type::UInt64,
        unit,
        ..MetricMember::default()
    })?;
    let metric: Metric = reg
        .create(MetricClass {
            members: vec![member],
            occurrence: MetricOccurrence::Synchronous,
            recorder_kind: RecorderKind::Cpu,
        })?
        .into();

    let mut locations = Vec::with_capacity(cfg.locations as usize);
    for t in 0..cfg.locations {
        let name = reg.create(StringDef::new(format!("thread {t}")))?;
        let loc = reg.create_with_ref(
            LocationRef::new(u64::from(t)),
            Location::new(name, LocationType::CpuThread, group.clone()),
        )?;
        locations.push(loc);
    }

    let mut trace_end = 0u64;
    for loc in &locations {
        let lw = writer.location_writer(loc.reference());
        let mut time = 0u64;
        let mut counter = 0u64;
        let mut stack: Vec<&Def<Region>> = Vec::new();
        let mut written = 0u64;

        lw.enter(time, &regions[0])?;
        stack.push(&regions[0]);
        written += 1;
        while written + stack.len() as u64 <= cfg.events_per_location {
            time += rng.random_range(1..=100);
            let deeper = stack.len() < 2 || (stack.len() < 6 && rng.random_bool(0.5));
            if deeper && regions.len() > 1 {
                let r = &regions[rng.random_range(1..regions.len())];
                lw.enter(time, r)?;
                stack.push(r);
            } else if stack.len() > 1 {
                if let Some(r) = stack.pop() {
                    lw.leave(time, r)?;
                }
            } else {
                counter += rng.random_range(1_000..10_000);
                lw.metric(time, &metric, &[MetricValue::UInt64(counter)])?;
            }
            written += 1;
        }
        while let Some(r) = stack.pop() {
            time += 1;
            lw.leave(time, r)?;
        }
        trace_end = trace_end.max(time);
    }

    writer
        .registry_mut()
        .set_clock_properties(ClockProperties { timer_resolution: 1_000_000_000, global_offset: 0, trace_length: trace_end });
    writer.into_archive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let cfg = GeneratorConfig { locations: 2, events_per_location: 50, regions: 4, seed: 7 };
        let a = generate_archive(&cfg).unwrap();
        let b = generate_archive(&cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.locations.len(), 2);
        for stream in &a.locations {
            assert!(stream.events.len() as u64 >= 2);
            assert!(stream.events.windows(2).all(|w| w[0].time() <= w[1].time()));
        }
    }
}
