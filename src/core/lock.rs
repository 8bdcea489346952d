//! Exclusive lock over a notes directory.
//!
//! The guard holds an OS advisory lock (`flock` / `LockFileEx`) on
//! `.note.lock`. The kernel drops it when the process exits for any reason,
//! including an interrupt during the editor session, so a dead run never
//! blocks the next one.
//!
//! The file itself stays in place. While held it names the holder, and a
//! clean release empties it. Holder info found on a lock nobody holds is
//! therefore a run that was interrupted mid-operation.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{NoteError, NoteResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    pub hostname: String,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            hostname: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            locked_at: Utc::now(),
        }
    }
}

impl fmt::Display for LockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pid {} on {} since {}",
            self.pid,
            self.hostname,
            self.locked_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

#[derive(Debug)]
pub struct IndexLock {
    path: PathBuf,
    file: File,
    interrupted: Option<LockInfo>,
}

impl IndexLock {
    /// Take the lock without waiting. A live holder gives `Locked`.
    pub fn acquire(path: &Path) -> NoteResult<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| failure(path, e))?;

        if let Err(e) = file.try_lock_exclusive() {
            if !is_contended(&e) {
                return Err(failure(path, e));
            }
            let holder = Self::holder(path)
                .map(|info| info.to_string())
                .unwrap_or_else(|| "another process".to_string());
            return Err(NoteError::Locked {
                path: path.to_path_buf(),
                holder,
            });
        }

        let interrupted = read_info(&mut file);
        let info = serde_json::to_vec(&LockInfo::current()).map_err(|e| failure(path, e.into()))?;
        write_info(&mut file, &info).map_err(|e| failure(path, e))?;

        debug!("acquired {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
            interrupted,
        })
    }

    /// Who holds the lock at `path`, or who last held it without releasing it.
    pub fn holder(path: &Path) -> Option<LockInfo> {
        let content = fs::read(path).ok()?;
        serde_json::from_slice(&content).ok()
    }

    /// The run that held this lock last and never released it.
    pub fn interrupted(&self) -> Option<&LockInfo> {
        self.interrupted.as_ref()
    }

    /// Empty a lock file left by an interrupted run and return who that was.
    /// A lock held by a live process is left alone and reported as `Locked`.
    pub fn clear_stale(path: &Path) -> NoteResult<Option<LockInfo>> {
        if !path.exists() {
            return Ok(None);
        }
        let mut lock = Self::acquire(path)?;
        let previous = lock.interrupted.take();
        if let Some(info) = &previous {
            warn!("cleared lock left by {}", info);
        }
        Ok(previous)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        // the OS lock goes with the file handle; only the holder info is ours to clear
        match self.file.set_len(0) {
            Ok(()) => debug!("released {}", self.path.display()),
            Err(e) => warn!("failed to clear {}: {}", self.path.display(), e),
        }
    }
}

fn read_info(file: &mut File) -> Option<LockInfo> {
    let mut content = Vec::new();
    file.read_to_end(&mut content).ok()?;
    serde_json::from_slice(&content).ok()
}

fn write_info(file: &mut File, info: &[u8]) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(info)?;
    file.sync_all()
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

fn failure(path: &Path, source: io::Error) -> NoteError {
    NoteError::PersistenceFailure {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stale_info(pid: u32) -> LockInfo {
        LockInfo {
            pid,
            hostname: "elsewhere".to_string(),
            locked_at: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_second_acquire_is_locked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".note.lock");

        let guard = IndexLock::acquire(&path).unwrap();
        let holder = IndexLock::holder(&path).unwrap();
        assert_eq!(holder.pid, std::process::id());
        assert!(guard.interrupted().is_none());

        let err = IndexLock::acquire(&path).unwrap_err();
        assert!(matches!(err, NoteError::Locked { .. }));
        assert!(err.to_string().contains(&format!("pid {}", holder.pid)));

        drop(guard);
        assert!(IndexLock::holder(&path).is_none());
        let again = IndexLock::acquire(&path).unwrap();
        assert!(again.interrupted().is_none());
    }

    #[test]
    fn test_released_on_error_path() {
        fn failing(path: &Path) -> NoteResult<()> {
            let _lock = IndexLock::acquire(path)?;
            Err(NoteError::SelectorNotFound("$1".to_string()))
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".note.lock");
        assert!(failing(&path).is_err());
        assert!(IndexLock::holder(&path).is_none());
        assert!(IndexLock::acquire(&path).is_ok());
    }

    #[test]
    fn test_left_over_info_does_not_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".note.lock");
        fs::write(&path, serde_json::to_vec(&stale_info(4242)).unwrap()).unwrap();

        let guard = IndexLock::acquire(&path).unwrap();
        assert_eq!(guard.interrupted(), Some(&stale_info(4242)));
        assert_eq!(IndexLock::holder(&path).unwrap().pid, std::process::id());
    }

    #[test]
    fn test_clear_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".note.lock");
        assert!(IndexLock::clear_stale(&path).unwrap().is_none());

        fs::write(&path, serde_json::to_vec(&stale_info(7)).unwrap()).unwrap();
        assert_eq!(IndexLock::clear_stale(&path).unwrap(), Some(stale_info(7)));
        assert!(IndexLock::holder(&path).is_none());

        fs::write(&path, "garbage").unwrap();
        assert!(IndexLock::clear_stale(&path).unwrap().is_none());
    }

    #[test]
    fn test_clear_stale_refuses_live_holder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".note.lock");

        let guard = IndexLock::acquire(&path).unwrap();
        let err = IndexLock::clear_stale(&path).unwrap_err();
        assert!(matches!(err, NoteError::Locked { .. }));
        assert_eq!(IndexLock::holder(&path).unwrap().pid, std::process::id());
        drop(guard);
    }
}
