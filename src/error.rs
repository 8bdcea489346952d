use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A record offered back to the caller when a selector matches more than one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub serial: u64,
    pub title: String,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} {}", self.serial, self.title)
    }
}

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("index {} is corrupt: {reason}", .path.display())]
    IndexCorrupt { path: PathBuf, reason: String },

    #[error("failed to write {}: {source}", .path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no note matches '{0}'")]
    SelectorNotFound(String),

    #[error("'{selector}' matches {} notes: {}", .candidates.len(), join_candidates(.candidates))]
    SelectorAmbiguous {
        selector: String,
        candidates: Vec<Candidate>,
    },

    #[error("editor '{editor}' failed: {reason}")]
    EditorLaunchFailure { editor: String, reason: String },

    #[error("notes directory is locked by {holder} ({})", .path.display())]
    Locked { path: PathBuf, holder: String },

    #[error("note {id}: {source}")]
    Blob {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read from terminal: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl NoteError {
    /// Fatal errors abort the current command; the others can be retried by the caller.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::SelectorNotFound(_)
            | Self::SelectorAmbiguous { .. }
            | Self::EditorLaunchFailure { .. }
            | Self::Locked { .. } => false,
            Self::IndexCorrupt { .. }
            | Self::PersistenceFailure { .. }
            | Self::Blob { .. }
            | Self::Prompt(_)
            | Self::Config(_) => true,
        }
    }

    pub(crate) fn blob(id: &str, source: std::io::Error) -> Self {
        Self::Blob {
            id: id.to_string(),
            source,
        }
    }
}

fn join_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(Candidate::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type NoteResult<T> = Result<T, NoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_lists_every_candidate() {
        let err = NoteError::SelectorAmbiguous {
            selector: "cat".to_string(),
            candidates: vec![
                Candidate {
                    serial: 1,
                    title: "cat food".to_string(),
                },
                Candidate {
                    serial: 4,
                    title: "cat toys".to_string(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "'cat' matches 2 notes: $1 cat food, $4 cat toys"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_fatal_classification() {
        let corrupt = NoteError::IndexCorrupt {
            path: PathBuf::from("db.json"),
            reason: "expected value".to_string(),
        };
        assert!(corrupt.is_fatal());
        assert!(!NoteError::SelectorNotFound("$9".to_string()).is_fatal());
    }
}
