use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use uuid::Uuid;

use super::paths::NotePaths;
use crate::error::{NoteError, NoteResult};

lazy_static! {
    static ref BLOB_NAME_RE: Regex = Regex::new(r"^[0-9a-f]{32}$").unwrap();
}

/// Note bodies, one file per note, named by an opaque id.
#[derive(Debug, Clone)]
pub struct ContentStore {
    paths: NotePaths,
}

impl ContentStore {
    pub fn new(paths: &NotePaths) -> Self {
        Self {
            paths: paths.clone(),
        }
    }

    pub fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub fn path(&self, id: &str) -> PathBuf {
        self.paths.blob(id)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.path(id).is_file()
    }

    /// Write `content` to a fresh blob and return its id.
    pub fn create(&self, content: &str) -> NoteResult<String> {
        let id = Self::generate_id();
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path(&id))
            .map_err(|e| NoteError::blob(&id, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| NoteError::blob(&id, e))?;
        debug!("created blob {}", id);
        Ok(id)
    }

    pub fn read(&self, id: &str) -> NoteResult<String> {
        fs::read_to_string(self.path(id)).map_err(|e| NoteError::blob(id, e))
    }

    pub fn read_bytes(&self, id: &str) -> NoteResult<Vec<u8>> {
        fs::read(self.path(id)).map_err(|e| NoteError::blob(id, e))
    }

    pub fn write(&self, id: &str, content: &str) -> NoteResult<()> {
        fs::write(self.path(id), content).map_err(|e| NoteError::blob(id, e))
    }

    /// Rename the blob to `<id>.bak`. Returns `false` when there was no blob to move.
    pub fn soft_delete(&self, id: &str) -> NoteResult<bool> {
        let target = self.paths.deleted_blob(id);
        match fs::rename(self.path(id), &target) {
            Ok(()) => {
                debug!("renamed blob {} to {}", id, target.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("blob {} was already missing", id);
                Ok(false)
            }
            Err(e) => Err(NoteError::blob(id, e)),
        }
    }

    /// Permanently remove a soft-deleted blob. Returns `false` if it was already gone.
    pub fn purge(&self, id: &str) -> NoteResult<bool> {
        remove_if_present(&self.paths.deleted_blob(id)).map_err(|e| NoteError::blob(id, e))
    }

    /// Remove an active blob that never made it into the index.
    pub fn discard(&self, id: &str) -> NoteResult<()> {
        remove_if_present(&self.path(id))
            .map(|_| debug!("discarded blob {}", id))
            .map_err(|e| NoteError::blob(id, e))
    }

    /// Ids of the active blob files in the root, sorted.
    pub fn list_blobs(&self) -> NoteResult<Vec<String>> {
        let entries = fs::read_dir(&self.paths.root).map_err(|e| NoteError::blob("*", e))?;
        let mut ids: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| BLOB_NAME_RE.is_match(name))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

fn remove_if_present(path: &std::path::Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
