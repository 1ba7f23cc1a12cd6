//! JSON Lines (NDJSON) archive I/O.
//!
//! One [`ArchiveRecord`] per line: a header, then definitions, then per
//! location an optional mapping record followed by its events. The reader
//! is an iterator that *owns* its underlying file and yields one record at a
//! time, with line numbers in errors.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::format::{ArchiveFile, LocationStream};
use crate::io::{display, ensure_parent_dir};
use crate::mapping::MappingRecord;
use crate::record::{EventRecord, GlobalDefRecord};

/// One line of a JSONL archive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", content = "data", rename_all = "snake_case")]
pub enum ArchiveRecord {
    /// Envelope fields; must be the first line.
    Header {
        /// Format/version tag.
        version: u16,
        /// Tool that wrote the archive.
        creator: String,
        /// Free-form description.
        #[serde(default)]
        description: Option<String>,
        /// Optional metadata.
        #[serde(default)]
        meta: Option<serde_json::Value>,
    },
    /// A global definition.
    Definition(GlobalDefRecord),
    /// Mapping tables of one location.
    Mappings {
        /// Global location reference.
        location: u64,
        /// Tables.
        mappings: Vec<MappingRecord>,
    },
    /// One event of one location.
    Event {
        /// Global location reference.
        location: u64,
        /// The event.
        event: EventRecord,
    },
}

/// Owning JSONL iterator over `ArchiveRecord`.
pub struct JsonlRecordIter {
    rdr: BufReader<File>,
    buf: String,
    line_no: usize,
}

impl JsonlRecordIter {
    fn new(file: File) -> Self {
        Self { rdr: BufReader::new(file), buf: String::with_capacity(8 << 10), line_no: 0 }
    }
}

impl Iterator for JsonlRecordIter {
    type Item = Result<ArchiveRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.rdr.read_line(&mut self.buf) {
                Ok(0) => return None, // EOF
                Ok(_) => {
                    self.line_no += 1;
                    let line = self.buf.trim_end_matches(['\n', '\r']);
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(
                        serde_json::from_str(line)
                            .with_context(|| format!("parse jsonl line {}", self.line_no)),
                    );
                }
                Err(e) => {
                    return Some(Err(e).with_context(|| format!("read line {}", self.line_no + 1)))
                }
            }
        }
    }
}

/// Stream records from a JSONL archive.
pub fn stream_archive_jsonl<P: AsRef<Path>>(path: P) -> Result<JsonlRecordIter> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    Ok(JsonlRecordIter::new(f))
}

/// Assemble an `ArchiveFile` from a record stream.
///
/// Location streams appear in first-seen order; the header must come first.
pub fn collect_archive<I>(records: I) -> Result<ArchiveFile>
where
    I: IntoIterator<Item = Result<ArchiveRecord>>,
{
    let mut it = records.into_iter();
    let mut archive = match it.next().transpose()? {
        Some(ArchiveRecord::Header { version, creator, description, meta }) => ArchiveFile {
            version,
            creator,
            description,
            definitions: Vec::new(),
            locations: Vec::new(),
            meta,
        },
        Some(_) => return Err(anyhow!("jsonl archive must start with a header record")),
        None => return Err(anyhow!("empty jsonl archive")),
    };
    for rec in it {
        match rec? {
            ArchiveRecord::Header { .. } => return Err(anyhow!("duplicate header record")),
            ArchiveRecord::Definition(d) => archive.definitions.push(d),
            ArchiveRecord::Mappings { location, mappings } => {
                stream_mut(&mut archive, location).mappings.extend(mappings);
            }
            ArchiveRecord::Event { location, event } => {
                stream_mut(&mut archive, location).events.push(event);
            }
        }
    }
    Ok(archive)
}

fn stream_mut(archive: &mut ArchiveFile, location: u64) -> &mut LocationStream {
    let idx = match archive.locations.iter().position(|l| l.location == location) {
        Some(i) => i,
        None => {
            archive.locations.push(LocationStream { location, ..LocationStream::default() });
            archive.locations.len() - 1
        }
    };
    &mut archive.locations[idx]
}

/// Read a whole JSONL archive.
pub fn read_archive_jsonl<P: AsRef<Path>>(path: P) -> Result<ArchiveFile> {
    collect_archive(stream_archive_jsonl(path)?)
}

/// Flatten an archive into its line records.
pub fn archive_records(archive: &ArchiveFile) -> impl Iterator<Item = ArchiveRecord> + '_ {
    let header = ArchiveRecord::Header {
        version: archive.version,
        creator: archive.creator.clone(),
        description: archive.description.clone(),
        meta: archive.meta.clone(),
    };
    let defs = archive.definitions.iter().cloned().map(ArchiveRecord::Definition);
    let streams = archive.locations.iter().flat_map(|l| {
        let mappings = (!l.mappings.is_empty())
            .then(|| ArchiveRecord::Mappings { location: l.location, mappings: l.mappings.clone() });
        mappings.into_iter().chain(
            l.events
                .iter()
                .map(move |e| ArchiveRecord::Event { location: l.location, event: e.clone() }),
        )
    });
    std::iter::once(header).chain(defs).chain(streams)
}

/// Write an archive as JSON Lines.
pub fn write_archive_jsonl<P: AsRef<Path>>(path: P, archive: &ArchiveFile) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    for rec in archive_records(archive) {
        serde_json::to_writer(&mut w, &rec).context("serialize jsonl record")?;
        w.write_all(b"\n").context("write newline")?;
    }
    w.flush().context("flush writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(name: &str) -> std::path::PathBuf {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        std::env::temp_dir().join(format!("otf2r_jsonl_{name}_{nanos}.jsonl"))
    }

    #[test]
    fn interleaved_locations_are_regrouped() {
        let p = tmp_path("regroup");
        {
            let mut f = File::create(&p).unwrap();
            writeln!(f, r#"{{"record":"header","data":{{"version":1,"creator":"t"}}}}"#).unwrap();
            writeln!(f, r#"{{"record":"definition","data":{{"kind":"string","id":0,"text":"a"}}}}"#).unwrap();
            writeln!(f).unwrap();
            writeln!(f, r#"{{"record":"event","data":{{"location":1,"event":{{"kind":"enter","time":1,"region":0}}}}}}"#).unwrap();
            writeln!(f, r#"{{"record":"event","data":{{"location":0,"event":{{"kind":"enter","time":2,"region":0}}}}}}"#).unwrap();
            writeln!(f, r#"{{"record":"event","data":{{"location":1,"event":{{"kind":"leave","time":3,"region":0}}}}}}"#).unwrap();
        }
        let a = read_archive_jsonl(&p).unwrap();
        assert_eq!(a.definitions.len(), 1);
        assert_eq!(a.locations.iter().map(|l| l.location).collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(a.locations[0].events.len(), 2);
        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn bad_line_reports_its_number() {
        let p = tmp_path("bad");
        {
            let mut f = File::create(&p).unwrap();
            writeln!(f, r#"{{"record":"header","data":{{"version":1,"creator":"t"}}}}"#).unwrap();
            writeln!(f, "not json").unwrap();
        }
        let err = read_archive_jsonl(&p).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn header_must_come_first() {
        let recs = vec![Ok(ArchiveRecord::Definition(GlobalDefRecord::String { id: 0, text: "a".into() }))];
        assert!(collect_archive(recs).is_err());
    }
}
