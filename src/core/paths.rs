use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "db.json";
pub const LOCK_FILE: &str = ".note.lock";
pub const DELETED_SUFFIX: &str = "bak";

#[derive(Debug, Clone)]
pub struct NotePaths {
    pub root: PathBuf,
    pub index: PathBuf,
    pub lock: PathBuf,
}

impl NotePaths {
    pub fn from_root(root: PathBuf) -> Self {
        Self {
            index: root.join(INDEX_FILE),
            lock: root.join(LOCK_FILE),
            root,
        }
    }

    /// Active blob for a note.
    pub fn blob(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Where a soft-deleted blob is moved to.
    pub fn deleted_blob(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.{}", id, DELETED_SUFFIX))
    }

    /// Creates the root directory when missing. Returns `true` if it had to be created.
    pub fn ensure_root(&self) -> io::Result<bool> {
        if self.root.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&self.root)?;
        Ok(true)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = NotePaths::from_root(PathBuf::from("/tmp/Note"));
        assert_eq!(paths.index, PathBuf::from("/tmp/Note/db.json"));
        assert_eq!(paths.lock, PathBuf::from("/tmp/Note/.note.lock"));
        assert_eq!(paths.blob("abc"), PathBuf::from("/tmp/Note/abc"));
        assert_eq!(paths.deleted_blob("abc"), PathBuf::from("/tmp/Note/abc.bak"));
    }

    #[test]
    fn test_ensure_root_creates_once() {
        let dir = tempfile::tempdir().unwrap();
        let paths = NotePaths::from_root(dir.path().join("Note"));
        assert!(paths.ensure_root().unwrap());
        assert!(!paths.ensure_root().unwrap());
    }
}
