//! Raw trace records and the typed reader/writer facade over `otf2r-core`.
//!
//! This crate provides the pieces around the definition registry:
//!
//! - `record`: raw definition/event records (bare integers and codes).
//! - `format`: a minimal, versioned archive envelope (`ArchiveFile`).
//! - `mapping`: per-location local → global id tables.
//! - `convert`: raw record ⇄ typed definition conversion.
//! - `event`: typed events.
//! - `reader` / `writer`: the read and write paths.
//! - `io` / `io_jsonl`: JSON/CBOR/JSONL read/write helpers.
//! - `generator`: a deterministic synthetic archive generator.
//! - `check`: event stream consistency checks.
//!
//! We intentionally avoid broad re-exports so callers use stable paths like
//! `otf2r_trace::reader::Reader`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

/// Event stream consistency checks.
pub mod check;
/// Raw record ⇄ typed definition conversion.
pub mod convert;
/// Typed events.
pub mod event;
/// Versioned archive envelope.
pub mod format;
/// Deterministic synthetic archive generator (for sims/benches).
pub mod generator;
/// JSON/CBOR I/O helpers for `ArchiveFile`.
pub mod io;
/// JSON Lines streaming I/O.
pub mod io_jsonl;
/// Local → global id mapping tables.
pub mod mapping;
/// Read path.
pub mod reader;
/// Raw definition and event records.
pub mod record;
/// Write path.
pub mod writer;
