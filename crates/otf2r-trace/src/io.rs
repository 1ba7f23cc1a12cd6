//! I/O helpers for the `ArchiveFile` envelope.
//!
//! Supports JSON/CBOR/JSONL and extension-based auto-detection. These
//! routines do not interpret records; they only move the `ArchiveFile`
//! struct across the wire.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::format::ArchiveFile;
use crate::io_jsonl::{read_archive_jsonl, write_archive_jsonl};

/* ---------------- JSON ---------------- */

/// Read an `ArchiveFile` from **JSON**.
pub fn read_archive_json<P: AsRef<Path>>(path: P) -> Result<ArchiveFile> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let rdr = BufReader::new(f);
    let v: ArchiveFile =
        serde_json::from_reader(rdr).with_context(|| "deserialize JSON archive")?;
    Ok(v)
}

/// Write an `ArchiveFile` to **JSON** (pretty).
pub fn write_archive_json<P: AsRef<Path>>(path: P, v: &ArchiveFile) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v).with_context(|| "serialize JSON archive")?;
    w.flush().with_context(|| "flush JSON writer")?;
    Ok(())
}

/* ---------------- CBOR ---------------- */

/// Read an `ArchiveFile` from **CBOR**.
pub fn read_archive_cbor<P: AsRef<Path>>(path: P) -> Result<ArchiveFile> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let mut rdr = BufReader::new(f);
    let v: ArchiveFile =
        ciborium::de::from_reader(&mut rdr).with_context(|| "deserialize CBOR archive")?;
    Ok(v)
}

/// Write an `ArchiveFile` to **CBOR**.
pub fn write_archive_cbor<P: AsRef<Path>>(path: P, v: &ArchiveFile) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w).with_context(|| "serialize CBOR archive")?;
    w.flush().with_context(|| "flush CBOR writer")?;
    Ok(())
}

/* --------------- Auto-detect by extension --------------- */

/// Auto-detect **read** by extension (`.json` / `.cbor` / `.jsonl` /
/// `.ndjson`, case-insensitive).
pub fn read_archive_auto<P: AsRef<Path>>(path: P) -> Result<ArchiveFile> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_archive_json(path),
        Some("cbor") => read_archive_cbor(path),
        Some("jsonl" | "ndjson") => read_archive_jsonl(path),
        Some(other) => Err(anyhow!(
            "unsupported archive extension: {} (supported: .json, .cbor, .jsonl)",
            other
        )),
        None => Err(anyhow!("path has no extension (expected .json, .cbor or .jsonl)")),
    }
}

/// Auto-detect **write** (defaults to JSON if unknown/missing).
pub fn write_archive_auto<P: AsRef<Path>>(path: P, v: &ArchiveFile) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_archive_cbor(path, v),
        Some("jsonl" | "ndjson") => write_archive_jsonl(path, v),
        _ => write_archive_json(path, v),
    }
}

/* ---------------- Small helpers ---------------- */

/// Ensure the parent directory for a file exists (no-op if none).
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(path)))?;
        }
    }
    Ok(())
}

#[inline]
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

#[inline]
pub(crate) fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GlobalDefRecord;

    fn tmp_path(name: &str, ext: &str) -> std::path::PathBuf {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        std::env::temp_dir().join(format!("otf2r_io_{name}_{nanos}.{ext}"))
    }

    fn sample() -> ArchiveFile {
        let mut a = ArchiveFile::new("test");
        a.definitions.push(GlobalDefRecord::String { id: 0, text: "x".into() });
        a
    }

    #[test]
    fn auto_detects_by_extension() {
        for ext in ["json", "CBOR", "jsonl"] {
            let p = tmp_path("auto", ext);
            write_archive_auto(&p, &sample()).unwrap();
            assert_eq!(read_archive_auto(&p).unwrap(), sample());
            let _ = std::fs::remove_file(p);
        }
    }

    #[test]
    fn unknown_extension_is_rejected_on_read() {
        let err = read_archive_auto("archive.otf2").unwrap_err();
        assert!(err.to_string().contains("unsupported archive extension"));
        assert!(read_archive_auto("archive").is_err());
    }
}
