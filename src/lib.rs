//! note library
//!
//! Command-line note store: notes are plain files, their metadata lives in
//! one JSON index next to them.
//!
//! # Modules
//!
//! - `core`: Records, the metadata index, blob storage, tags, expiry, locking
//! - `search`: Keyword search over titles and tags
//! - `repo`: The note operations (create, edit, delete, list, search)
//! - `config` / `logging`: Settings and log bootstrap used by the binary

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod repo;
pub mod search;

// Re-exports for convenience
pub use config::Config;
pub use crate::core::index::MetadataIndex;
pub use crate::core::record::{Record, RecordStatus};
pub use crate::core::tags::{extract_tags, Tag, TagIndex};
pub use error::{NoteError, NoteResult};
pub use repo::{NoteKind, NoteRepository, Outcome};
pub use search::SearchEngine;
