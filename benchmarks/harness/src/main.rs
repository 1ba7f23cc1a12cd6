//! otf2r-bench-harness
//!
//! Run small end-to-end benchmarks (generate -> write -> read definitions -> replay/check)
//! and append CSV rows into `benchmarks/reports/bench-<unix>.csv`.
//!
//! Usage examples:
//!   cargo run -p otf2r-bench-harness -- --profile benchmarks/configs/profiles/small.toml
//!   cargo run -p otf2r-bench-harness -- --profile benchmarks/configs/profiles/medium.toml --format json

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Deserialize;

use otf2r_core::RegistryOptions;
use otf2r_trace::check::check_events;
use otf2r_trace::generator::{generate_archive, GeneratorConfig};
use otf2r_trace::io::write_archive_auto;
use otf2r_trace::reader::Reader;

#[derive(Debug, Deserialize)]
struct Profile {
    /// Thread locations per archive
    locations: u32,
    /// Events per location
    events_per_location: u64,
    /// Distinct regions
    regions: u32,
    /// Generator seed
    seed: u64,
    /// Repetitions of the whole pipeline
    repeats: u32,
    /// Archive encoding: json | cbor | jsonl
    #[serde(default = "default_format")]
    format: String,
    /// Registry policies used on the read side
    #[serde(default)]
    registry: RegistryOptions,
}

fn default_format() -> String {
    "cbor".to_string()
}

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

fn dur_ms(d: Duration) -> u128 {
    d.as_millis()
}

fn main() -> Result<()> {
    let profile_path = PathBuf::from(parse_flag("profile", "benchmarks/configs/profiles/small.toml"));

    let profile_src = fs::read_to_string(&profile_path)
        .with_context(|| format!("read profile {}", profile_path.display()))?;
    let mut profile: Profile = toml::from_str(&profile_src).context("parse profile toml")?;
    profile.format = parse_flag("format", &profile.format);
    match profile.format.as_str() {
        "json" | "cbor" | "jsonl" => {}
        other => anyhow::bail!("unknown format {other} (use json|cbor|jsonl)"),
    }
    println!(
        "Profile: locations={}, events={}, regions={}, seed={}, repeats={}, format={}, registry={:?}",
        profile.locations,
        profile.events_per_location,
        profile.regions,
        profile.seed,
        profile.repeats,
        profile.format,
        profile.registry
    );

    fs::create_dir_all("benchmarks/reports").context("create benchmarks/reports")?;

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let csv_path = PathBuf::from(format!("benchmarks/reports/bench-{ts}.csv"));
    let mut csv = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&csv_path)
        .with_context(|| format!("open {}", csv_path.display()))?;
    writeln!(csv, "timestamp,format,locations,events_per_location,repeat,stage,ms,extra")?;

    let fmt = profile.format.clone();
    let row = |csv: &mut fs::File, rep: u32, stage: &str, d: Duration, extra: String| {
        writeln!(
            csv,
            "{ts},{fmt},{},{},{rep},{stage},{},{extra}",
            profile.locations,
            profile.events_per_location,
            dur_ms(d)
        )
    };

    let cfg = GeneratorConfig {
        locations: profile.locations,
        events_per_location: profile.events_per_location,
        regions: profile.regions,
        seed: profile.seed,
    };

    for rep in 0..profile.repeats {
        let archive_path = PathBuf::from(format!("benchmarks/tmp-archive-{ts}-{rep}.{}", profile.format));

        // 1) generate archive (registry creation + event recording + flush)
        let t0 = Instant::now();
        let archive = generate_archive(&cfg)?;
        let t_gen = t0.elapsed();
        row(&mut csv, rep, "gen", t_gen, format!("definitions={}", archive.definitions.len()))?;

        // 2) encode to disk
        let t0 = Instant::now();
        write_archive_auto(&archive_path, &archive)?;
        let t_write = t0.elapsed();
        let bytes = fs::metadata(&archive_path).map(|m| m.len()).unwrap_or(0);
        row(&mut csv, rep, "write", t_write, format!("bytes={bytes}"))?;

        // 3) decode + replay definitions into a registry
        let t0 = Instant::now();
        let mut reader = Reader::open(&archive_path, profile.registry)?;
        let total = reader.read_definitions()?.total();
        let t_defs = t0.elapsed();
        row(&mut csv, rep, "read_definitions", t_defs, format!("registry_total={total}"))?;

        // 4) replay + check every event stream
        let t0 = Instant::now();
        let report = check_events(&mut reader)?;
        let t_check = t0.elapsed();
        row(
            &mut csv,
            rep,
            "check",
            t_check,
            format!("events={} issues={}", report.events, report.issues.len()),
        )?;

        // cleanup temp files to avoid disk bloat
        let _ = fs::remove_file(&archive_path);
    }

    println!("Wrote report → {}", csv_path.display());
    Ok(())
}
