//! The metadata index: every record ever created, persisted as one JSON file.
//!
//! `files` holds the active records and is authoritative. `deleted` holds
//! tombstones so retired serials are never handed out again. `tags` is a
//! tag → ids cache written for external readers; it is never read back into
//! records.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::record::{Record, RecordStatus};
use super::serial::next_serial;
use super::tags::TagIndex;
use crate::error::{NoteError, NoteResult};

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    files: BTreeMap<String, FileEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    deleted: BTreeMap<String, DeletedEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    filename: String,
    tags: Vec<String>,
    modified: DateTime<FixedOffset>,
    title: String,
    serial: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    tag_spellings: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DeletedEntry {
    #[serde(flatten)]
    entry: FileEntry,
    deleted_at: DateTime<FixedOffset>,
    #[serde(default)]
    purged: bool,
}

impl From<&Record> for FileEntry {
    fn from(record: &Record) -> Self {
        Self {
            filename: record.id.clone(),
            tags: record.tags.iter().cloned().collect(),
            modified: record.modified,
            title: record.title.clone(),
            serial: record.serial,
            tag_spellings: record.spellings.clone(),
        }
    }
}

impl FileEntry {
    fn into_record(self, status: RecordStatus) -> Record {
        Record {
            id: self.filename,
            serial: self.serial,
            title: self.title,
            tags: self.tags.into_iter().collect(),
            spellings: self.tag_spellings,
            modified: self.modified,
            status,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MetadataIndex {
    records: BTreeMap<String, Record>,
}

impl MetadataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index at `path`. A missing file is an empty index.
    pub fn load(path: &Path) -> NoteResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no index at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(corrupt(path, format!("unreadable: {}", e))),
        };

        let file: IndexFile =
            serde_json::from_str(&content).map_err(|e| corrupt(path, e.to_string()))?;
        let cached_tags = file.tags.clone();
        let index = Self::from_file(file).map_err(|reason| corrupt(path, reason))?;

        if let Some(cached) = cached_tags {
            if serde_json::to_value(index.tag_index()).ok().as_ref() != Some(&cached) {
                debug!("tag cache in {} is stale, ignoring it", path.display());
            }
        }

        debug!(
            "loaded {} active and {} deleted notes from {}",
            index.active().len(),
            index.records.len() - index.active().len(),
            path.display()
        );
        Ok(index)
    }

    /// Replace the index at `path` in one rename. On error the previous file is untouched.
    pub fn save(&self, path: &Path) -> NoteResult<()> {
        let mut file = self.to_file();
        match serde_json::to_value(self.tag_index()) {
            Ok(tags) => file.tags = Some(tags),
            Err(e) => warn!("tag cache not written: {}", e),
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| persistence(path, e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &file)
                .map_err(|e| persistence(path, e.into()))?;
            writer.flush().map_err(|e| persistence(path, e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| persistence(path, e))?;
        tmp.persist(path).map_err(|e| persistence(path, e.error))?;

        debug!("index written to {}", path.display());
        Ok(())
    }

    fn from_file(file: IndexFile) -> Result<Self, String> {
        let mut records = BTreeMap::new();
        let mut serials: HashMap<u64, String> = HashMap::new();

        let active = file
            .files
            .into_iter()
            .map(|(key, entry)| (key, entry, RecordStatus::Active));
        let deleted = file.deleted.into_iter().map(|(key, d)| {
            let status = RecordStatus::Deleted {
                at: d.deleted_at,
                purged: d.purged,
            };
            (key, d.entry, status)
        });

        for (key, entry, status) in active.chain(deleted) {
            if entry.filename != key {
                return Err(format!(
                    "entry '{}' points at file '{}'",
                    key, entry.filename
                ));
            }
            if entry.serial == 0 {
                return Err(format!("entry '{}' has serial 0", key));
            }
            if let Some(other) = serials.insert(entry.serial, key.clone()) {
                return Err(format!(
                    "serial {} used by both '{}' and '{}'",
                    entry.serial, other, key
                ));
            }
            if records.contains_key(&key) {
                return Err(format!("'{}' is both active and deleted", key));
            }
            records.insert(key, entry.into_record(status));
        }

        Ok(Self { records })
    }

    fn to_file(&self) -> IndexFile {
        let mut files = BTreeMap::new();
        let mut deleted = BTreeMap::new();

        for (id, record) in &self.records {
            match record.status {
                RecordStatus::Active => {
                    files.insert(id.clone(), FileEntry::from(record));
                }
                RecordStatus::Deleted { at, purged } => {
                    deleted.insert(
                        id.clone(),
                        DeletedEntry {
                            entry: FileEntry::from(record),
                            deleted_at: at,
                            purged,
                        },
                    );
                }
            }
        }

        IndexFile {
            files,
            deleted,
            tags: None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Insert or replace a record by id.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.id.clone(), record)
    }

    /// Active records in ascending serial order.
    pub fn active(&self) -> Vec<&Record> {
        let mut active: Vec<&Record> = self.records.values().filter(|r| r.is_active()).collect();
        active.sort_by_key(|r| r.serial);
        active
    }

    /// Tombstones in ascending serial order.
    pub fn tombstones(&self) -> Vec<&Record> {
        let mut deleted: Vec<&Record> = self.records.values().filter(|r| !r.is_active()).collect();
        deleted.sort_by_key(|r| r.serial);
        deleted
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn find_serial(&self, serial: u64) -> Option<&Record> {
        self.records
            .values()
            .find(|r| r.is_active() && r.serial == serial)
    }

    pub fn next_serial(&self) -> u64 {
        next_serial(self.records.values())
    }

    pub fn tag_index(&self) -> TagIndex {
        TagIndex::build(self.records.values())
    }

    /// Turn an active record into a tombstone. Returns the record as it was.
    pub fn mark_deleted(&mut self, id: &str, at: DateTime<FixedOffset>) -> Option<Record> {
        let record = self.records.get_mut(id).filter(|r| r.is_active())?;
        let snapshot = record.clone();
        record.status = RecordStatus::Deleted { at, purged: false };
        Some(snapshot)
    }

    pub fn mark_purged(&mut self, id: &str) -> bool {
        match self.records.get_mut(id) {
            Some(record) => match record.status {
                RecordStatus::Deleted { at, .. } => {
                    record.status = RecordStatus::Deleted { at, purged: true };
                    true
                }
                RecordStatus::Active => false,
            },
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn corrupt(path: &Path, reason: String) -> NoteError {
    NoteError::IndexCorrupt {
        path: PathBuf::from(path),
        reason,
    }
}

fn persistence(path: &Path, source: io::Error) -> NoteError {
    NoteError::PersistenceFailure {
        path: PathBuf::from(path),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tags::{extract_tags, tag_set};

    fn at(ts: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(ts).unwrap()
    }

    fn sample() -> MetadataIndex {
        let mut index = MetadataIndex::new();
        index.insert(
            Record::new(
                "0a1b".to_string(),
                1,
                "cat food".to_string(),
                Default::default(),
                at("2024-03-01T09:15:00.123456+01:00"),
            )
            .with_tags(extract_tags("#cat #Food")),
        );
        index.insert(Record::new(
            "9f8e".to_string(),
            2,
            "dog park #1h".to_string(),
            tag_set("#1h #dog"),
            at("2024-03-02T18:00:00-05:00"),
        ));
        index.insert(Record::new(
            "5c5c".to_string(),
            3,
            "old".to_string(),
            Default::default(),
            at("2024-01-01T00:00:00Z"),
        ));
        index.mark_deleted("5c5c", at("2024-02-01T00:00:00Z"));
        index
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = MetadataIndex::load(&dir.path().join("db.json")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_round_trip_is_lossless() -> NoteResult<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let index = sample();

        index.save(&path)?;
        let loaded = MetadataIndex::load(&path)?;
        assert_eq!(loaded, index);

        loaded.save(&path)?;
        assert_eq!(MetadataIndex::load(&path)?, index);
        Ok(())
    }

    #[test]
    fn test_saved_layout() -> NoteResult<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        sample().save(&path)?;

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["files"]["0a1b"]["filename"], "0a1b");
        assert_eq!(raw["files"]["0a1b"]["serial"], 1);
        assert_eq!(raw["deleted"]["5c5c"]["serial"], 3);
        assert_eq!(raw["files"]["0a1b"]["tags"], serde_json::json!(["cat", "food"]));
        assert_eq!(raw["files"]["0a1b"]["tag_spellings"]["food"], "Food");
        assert!(raw["files"]["9f8e"].get("tag_spellings").is_none());
        assert_eq!(raw["tags"]["cat"], serde_json::json!(["0a1b"]));
        assert!(raw["files"].get("5c5c").is_none());
        Ok(())
    }

    #[test]
    fn test_reads_legacy_file() -> NoteResult<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(
            &path,
            r#"{"files": {"abc": {"filename": "abc", "tags": ["france"], "modified": "2023-05-04T21:10:03.512345+02:00", "title": "Paris", "serial": 4}},
                "tags": {"france": ["abc", "gone-long-ago"]}}"#,
        )
        .unwrap();

        let index = MetadataIndex::load(&path)?;
        let record = index.get("abc").unwrap();
        assert_eq!(record.serial, 4);
        assert!(record.has_tag("france"));
        assert!(record.spellings.is_empty());
        assert_eq!(index.next_serial(), 5);
        assert_eq!(index.tag_index().ids("france").unwrap().len(), 1);
        Ok(())
    }

    #[test]
    fn test_corrupt_file_is_reported_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{\"files\": [").unwrap();

        let err = MetadataIndex::load(&path).unwrap_err();
        assert!(matches!(err, NoteError::IndexCorrupt { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"files\": [");
    }

    #[test]
    fn test_invalid_structure_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let cases = [
            r#"{"tags": {}}"#,
            r#"{"files": {"a": {"filename": "b", "tags": [], "modified": "2024-01-01T00:00:00Z", "title": "", "serial": 1}}}"#,
            r#"{"files": {"a": {"filename": "a", "tags": [], "modified": "2024-01-01T00:00:00Z", "title": "", "serial": 0}}}"#,
            r#"{"files": {"a": {"filename": "a", "tags": [], "modified": "yesterday", "title": "", "serial": 1}}}"#,
            r#"{"files": {"a": {"filename": "a", "tags": [], "modified": "2024-01-01T00:00:00Z", "title": "", "serial": 2},
                          "b": {"filename": "b", "tags": [], "modified": "2024-01-01T00:00:00Z", "title": "", "serial": 2}}}"#,
        ];
        for case in cases {
            fs::write(&path, case).unwrap();
            let err = MetadataIndex::load(&path).unwrap_err();
            assert!(matches!(err, NoteError::IndexCorrupt { .. }), "{}", case);
        }
    }

    #[test]
    fn test_save_failure_is_persistence_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("db.json");
        let err = sample().save(&path).unwrap_err();
        assert!(matches!(err, NoteError::PersistenceFailure { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_mark_deleted_and_purged() {
        let mut index = sample();
        let removed = index.mark_deleted("0a1b", at("2024-04-01T00:00:00Z")).unwrap();
        assert!(removed.is_active());
        assert!(index.mark_deleted("0a1b", at("2024-04-02T00:00:00Z")).is_none());
        assert!(index.find_serial(1).is_none());
        assert_eq!(index.active().len(), 1);

        assert!(index.mark_purged("0a1b"));
        assert!(index.get("0a1b").unwrap().is_purged());
        assert!(!index.mark_purged("9f8e"));
        assert_eq!(index.next_serial(), 4);
    }
}
