// crates/otf2r-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use otf2r_core::{Def, Location, LocationRef, MetricClass, Region, Registry, RegistryOptions, StringDef};
use otf2r_trace::{
    check::check_events,
    event::Event,
    generator::{generate_archive, GeneratorConfig},
    io::write_archive_auto,
    mapping::LocalMappings,
    reader::Reader,
    writer::Writer,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "otf2r",
    about = "otf2r trace archive CLI",
    long_about = "otf2r trace archive CLI.\n\nUse this tool to generate synthetic archives, inspect their definitions, convert between JSON/CBOR/JSONL and check event streams.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate a synthetic archive.
    /// The format follows the extension of --out (`.json`, `.cbor`, `.jsonl`).
    Simulate {
        /// Number of thread locations (>0)
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
        locations: u32,

        /// Events per location (>1)
        #[arg(long, default_value_t = 1_000, value_parser = clap::value_parser!(u64).range(2..))]
        events: u64,

        /// Number of distinct regions (>0)
        #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
        regions: u32,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output archive path (JSON/CBOR/JSONL)
        #[arg(long, default_value = "trace.json")]
        out: PathBuf,
    },

    /// Load the definitions of an archive and print per-kind counts
    Inspect {
        /// Input archive (JSON/CBOR/JSONL)
        input: PathBuf,

        /// Reject duplicate and dangling references instead of tolerating them
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Also list the definitions of one kind
        #[arg(long, value_enum)]
        list: Option<ListOpt>,
    },

    /// Re-encode an archive through the registry (validates every reference)
    Convert {
        /// Input archive (JSON/CBOR/JSONL)
        #[arg(long)]
        input: PathBuf,

        /// Output archive (JSON/CBOR/JSONL)
        #[arg(long)]
        output: PathBuf,

        /// Reject duplicate and dangling references instead of tolerating them
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Replay event streams and check nesting, ordering and metric arity
    Check {
        /// Input archive (JSON/CBOR/JSONL)
        input: PathBuf,

        /// Reject duplicate and dangling references instead of tolerating them
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Only replay these locations (repeatable)
        #[arg(long = "location")]
        locations: Vec<u64>,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum ListOpt {
    /// String definitions
    Strings,
    /// Regions
    Regions,
    /// Locations
    Locations,
    /// Metric classes
    Metrics,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Simulate {
            locations,
            events,
            regions,
            seed,
            out,
        } => simulate(locations, events, regions, seed, &out),

        Cmd::Inspect {
            input,
            strict,
            list,
        } => inspect(&input, options(strict), list),

        Cmd::Convert {
            input,
            output,
            strict,
        } => convert(&input, &output, options(strict)),

        Cmd::Check {
            input,
            strict,
            locations,
        } => check(&input, options(strict), &locations),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn options(strict: bool) -> RegistryOptions {
    if strict {
        RegistryOptions::strict()
    } else {
        RegistryOptions::default()
    }
}

fn simulate(locations: u32, events: u64, regions: u32, seed: u64, out: &Path) -> Result<()> {
    info!(locations, events, regions, seed, "generating synthetic archive");
    let cfg = GeneratorConfig {
        locations,
        events_per_location: events,
        regions,
        seed,
    };
    let archive = generate_archive(&cfg).context("generating archive")?;

    write_archive_auto(out, &archive)
        .with_context(|| format!("writing archive to {}", out.display()))?;

    println!(
        "Simulated archive: {} locations, {} definitions, {} events → {}",
        archive.locations.len(),
        archive.definitions.len(),
        archive.event_count(),
        out.display()
    );
    Ok(())
}

fn inspect(input: &Path, options: RegistryOptions, list: Option<ListOpt>) -> Result<()> {
    info!(input=%input.display(), ?options, "inspecting archive");
    let mut reader = Reader::open(input, options)?;
    let archive = reader.archive();
    println!(
        "{}: creator {:?}, version {}, {} locations, {} events",
        input.display(),
        archive.creator,
        archive.version,
        archive.locations.len(),
        archive.event_count()
    );

    let registry = reader
        .read_definitions()
        .with_context(|| format!("reading definitions of {}", input.display()))?;
    if let Some(clock) = registry.clock_properties() {
        println!(
            "clock: resolution {} ticks/s, offset {}, length {}",
            clock.timer_resolution, clock.global_offset, clock.trace_length
        );
    }
    for (kind, n) in registry.summary() {
        if n > 0 {
            println!("{kind:<24} {n:>10}");
        }
    }
    println!("{:<24} {:>10}", "total", registry.total());

    if let Some(list) = list {
        list_definitions(registry, list);
    }
    Ok(())
}

fn list_definitions(registry: &Registry, list: ListOpt) {
    match list {
        ListOpt::Strings => {
            for s in registry.definitions::<StringDef>() {
                println!("string {:>8}  {s}", s.reference());
            }
        }
        ListOpt::Regions => {
            for r in registry.definitions::<Region>() {
                if let Some(data) = r.data() {
                    println!(
                        "region {:>8}  {} ({:?}, {:?})",
                        r.reference(),
                        data.name,
                        data.role,
                        data.paradigm
                    );
                }
            }
        }
        ListOpt::Locations => {
            for l in registry.definitions::<Location>() {
                if let Some(data) = l.data() {
                    println!(
                        "location {:>6}  {} ({:?}, {} events, group {})",
                        l.reference(),
                        data.name,
                        data.location_type,
                        data.number_of_events,
                        data.location_group.reference()
                    );
                }
            }
        }
        ListOpt::Metrics => {
            for m in registry.definitions::<MetricClass>() {
                if let Some(data) = m.data() {
                    let names: Vec<String> = data
                        .members
                        .iter()
                        .filter_map(Def::data)
                        .map(|member| member.name.to_string())
                        .collect();
                    println!(
                        "metric {:>8}  {:?} [{}]",
                        m.reference(),
                        data.occurrence,
                        names.join(", ")
                    );
                }
            }
        }
    }
}

fn convert(input: &Path, output: &Path, options: RegistryOptions) -> Result<()> {
    info!(infile=%input.display(), outfile=%output.display(), ?options, "converting archive");
    let mut reader = Reader::open(input, options)?;

    // Resolving every event validates the streams under `options`.
    let n = reader
        .read_events(&mut |_: LocationRef, _: &Event| Ok(()))
        .with_context(|| format!("replaying {}", input.display()))?;
    let (archive, registry) = reader.into_parts();

    let mut writer = Writer::create(output, archive.creator).with_registry(registry);
    if let Some(description) = archive.description {
        writer.set_description(description);
    }
    if let Some(meta) = archive.meta {
        writer.set_meta(meta);
    }
    // Raw records are copied so that ids a lenient read left undefined survive.
    for stream in &archive.locations {
        let mappings = LocalMappings::from_records(&stream.mappings);
        let lw = writer.location_writer(LocationRef::new(stream.location));
        for record in &stream.events {
            lw.write_record(mappings.remap(record))
                .with_context(|| format!("location {}", stream.location))?;
        }
    }
    let definitions = writer.registry().total();
    writer
        .close()
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Converted {} definitions, {n} events: {} → {}",
        definitions,
        input.display(),
        output.display()
    );
    Ok(())
}

fn check(input: &Path, options: RegistryOptions, locations: &[u64]) -> Result<()> {
    info!(input=%input.display(), ?options, locations = locations.len(), "checking archive");
    let mut reader = Reader::open(input, options)?;
    if !locations.is_empty() {
        reader.select_locations(locations.iter().copied().map(LocationRef::new));
    }
    let report = check_events(&mut reader)
        .with_context(|| format!("checking {}", input.display()))?;

    for (kind, n) in &report.per_kind {
        println!("{kind:<20} {n:>10}");
    }
    for issue in &report.issues {
        println!("issue: {issue}");
    }
    if !report.is_ok() {
        bail!(
            "{} issue(s) found in {} events over {} locations",
            report.issues.len(),
            report.events,
            report.locations
        );
    }

    println!(
        "OK: {} events over {} locations",
        report.events, report.locations
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use otf2r_trace::format::{ArchiveFile, LocationStream};
    use otf2r_trace::io::read_archive_auto;
    use otf2r_trace::record::EventRecord;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn tmp_path(name: &str) -> Result<PathBuf> {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        Ok(std::env::temp_dir().join(format!("otf2r_cli_{nanos}_{name}")))
    }

    /// Two streams whose locations have no definition record.
    fn undefined_locations() -> ArchiveFile {
        let stream = |location, t0| LocationStream {
            location,
            mappings: Vec::new(),
            events: vec![
                EventRecord::Enter { time: t0, region: 0 },
                EventRecord::Leave { time: t0 + 10, region: 0 },
            ],
        };
        let mut archive = ArchiveFile::new("test");
        archive.locations = vec![stream(5, 10), stream(6, 1)];
        archive
    }

    #[test]
    fn lenient_convert_keeps_streams_of_undefined_locations() -> Result<()> {
        let input = tmp_path("undefined_in.json")?;
        let output = tmp_path("undefined_out.cbor")?;
        write_archive_auto(&input, &undefined_locations())?;

        convert(&input, &output, RegistryOptions::default())?;
        let converted = read_archive_auto(&output)?;
        assert_eq!(converted.locations, undefined_locations().locations);

        let _ = std::fs::remove_file(&input);
        let _ = std::fs::remove_file(&output);
        Ok(())
    }

    #[test]
    fn strict_convert_rejects_undefined_locations() -> Result<()> {
        let input = tmp_path("strict_in.json")?;
        let output = tmp_path("strict_out.json")?;
        write_archive_auto(&input, &undefined_locations())?;

        assert!(convert(&input, &output, RegistryOptions::strict()).is_err());
        assert!(!output.exists());

        let _ = std::fs::remove_file(&input);
        Ok(())
    }
}
