//! Note repository façade.
//!
//! # Responsibility
//! - Compose index, blob store, expiry and search into the note operations.
//! - Run every operation as lock → load → expire → work → save.
//!
//! # Invariants
//! - The lock is held for the whole operation and released on every exit.
//! - Expired notes are removed before the primary result is computed and
//!   are always reported back in [`Outcome::expired`].
//! - A failed editor run never changes the index.
//! - Closures passed to `transaction` mutate the index only after their last
//!   fallible step.

use std::collections::{BTreeSet, HashSet};

use chrono::Duration;
use lazy_static::lazy_static;
use log::{error, info, warn};
use regex::Regex;
use serde::Serialize;

use super::clock::{Clock, SystemClock};
use super::editor::{Editor, ExternalEditor};
use super::prompt::{default_title, TerminalPrompt, TitlePrompt};
use super::selector::Selector;
use crate::config::Config;
use crate::core::expiry::ExpiryEngine;
use crate::core::index::MetadataIndex;
use crate::core::lock::{IndexLock, LockInfo};
use crate::core::paths::NotePaths;
use crate::core::record::Record;
use crate::core::store::ContentStore;
use crate::core::tags::{note_tag_list, TagUsage};
use crate::error::{NoteError, NoteResult};
use crate::search::SearchEngine;

lazy_static! {
    // the first /.../ span of a quick note is its title
    static ref QUICK_TITLE_RE: Regex = Regex::new(r"/([^/]+)/").unwrap();
}

/// Result of an operation plus the volatile notes it expired on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub expired: Vec<Record>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    /// Body and optional `/title/` come from the command line.
    Quick,
    /// Title comes from the command line or a prompt, body from the editor.
    Edited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Record),
    /// The editor was closed on an empty note; nothing was stored.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Updated(Record),
    /// The editor left the bytes as they were; the index was not touched.
    Unchanged(Record),
}

impl EditOutcome {
    pub fn record(&self) -> &Record {
        match self {
            Self::Updated(record) | Self::Unchanged(record) => record,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Active notes whose blob is gone.
    pub missing_blobs: Vec<Record>,
    /// Blob files no active note points at.
    pub orphan_blobs: Vec<String>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.missing_blobs.is_empty() && self.orphan_blobs.is_empty()
    }
}

pub struct NoteRepository {
    paths: NotePaths,
    store: ContentStore,
    editor: Box<dyn Editor>,
    prompt: Box<dyn TitlePrompt>,
    clock: Box<dyn Clock>,
}

impl NoteRepository {
    pub fn new(
        paths: NotePaths,
        editor: Box<dyn Editor>,
        prompt: Box<dyn TitlePrompt>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            store: ContentStore::new(&paths),
            paths,
            editor,
            prompt,
            clock,
        }
    }

    /// Repository over the configured directory with the terminal collaborators.
    pub fn open(config: &Config) -> NoteResult<Self> {
        let paths = config.paths();
        let created = paths
            .ensure_root()
            .map_err(|source| NoteError::PersistenceFailure {
                path: paths.root.clone(),
                source,
            })?;
        if created {
            warn!(
                "notes location did not exist, created {}",
                paths.root.display()
            );
        }

        Ok(Self::new(
            paths,
            Box::new(ExternalEditor::new(&config.editor)),
            Box::new(TerminalPrompt),
            Box::new(SystemClock),
        ))
    }

    pub fn paths(&self) -> &NotePaths {
        &self.paths
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn create(&self, kind: NoteKind, input: &str) -> NoteResult<Outcome<CreateOutcome>> {
        let (title, body) = match kind {
            NoteKind::Quick => split_quick_input(input),
            NoteKind::Edited => {
                let title = collapse_whitespace(input);
                ((!title.is_empty()).then_some(title), String::new())
            }
        };
        let title = match title {
            Some(title) => title,
            None => self.prompt.ask_title(&default_title(self.clock.now()))?,
        };

        let mut committed_blob = None;
        let result = self.transaction(|index| {
            let id = self.store.create(&body)?;

            let body = match kind {
                NoteKind::Quick => body,
                NoteKind::Edited => {
                    let edited = self
                        .editor
                        .edit(&self.store.path(&id))
                        .and_then(|()| self.store.read(&id));
                    match edited {
                        Ok(text) if text.trim().is_empty() => {
                            self.store.discard(&id)?;
                            info!("empty note '{}' discarded", title);
                            return Ok((CreateOutcome::Discarded, false));
                        }
                        Ok(text) => text,
                        Err(err) => {
                            if let Err(e) = self.store.discard(&id) {
                                warn!("{}", e);
                            }
                            return Err(err);
                        }
                    }
                }
            };

            let tags = note_tag_list(&title, &body);
            let record = Record::new(id.clone(), index.next_serial(), title, BTreeSet::new(), self.clock.now())
                .with_tags(tags);
            index.insert(record.clone());
            committed_blob = Some(id);
            Ok((CreateOutcome::Created(record), true))
        });

        match (&result, committed_blob) {
            (Ok(outcome), _) => {
                if let CreateOutcome::Created(record) = &outcome.value {
                    info!("written {} note {} '{}'", kind_name(kind), record.handle(), record.title);
                }
            }
            // the index write failed after the blob was made
            (Err(_), Some(id)) => match kind {
                NoteKind::Quick => {
                    if let Err(e) = self.store.discard(&id) {
                        warn!("{}", e);
                    }
                }
                NoteKind::Edited => error!(
                    "note was not recorded; its text is kept in {}",
                    self.store.path(&id).display()
                ),
            },
            (Err(_), None) => {}
        }
        result
    }

    pub fn edit(&self, selector: &str) -> NoteResult<Outcome<EditOutcome>> {
        let selector = Selector::parse(selector)?;
        self.transaction(|index| {
            let record = selector.resolve(index)?.clone();

            let before = self.store.read_bytes(&record.id)?;
            self.editor.edit(&self.store.path(&record.id))?;
            let after = self.store.read(&record.id)?;

            if after.as_bytes() == before.as_slice() {
                info!("no changes in {} '{}'", record.handle(), record.title);
                return Ok((EditOutcome::Unchanged(record), false));
            }

            let tags = note_tag_list(&record.title, &after);
            let updated = Record {
                modified: self.clock.now(),
                ..record
            }
            .with_tags(tags);
            index.insert(updated.clone());
            info!("updated {} '{}'", updated.handle(), updated.title);
            Ok((EditOutcome::Updated(updated), true))
        })
    }

    /// Soft delete: the blob becomes `<id>.bak` and the entry a tombstone.
    pub fn delete(&self, selector: &str) -> NoteResult<Outcome<Record>> {
        let selector = Selector::parse(selector)?;
        self.transaction(|index| {
            let id = selector.resolve(index)?.id.clone();
            self.store.soft_delete(&id)?;

            let record = index
                .mark_deleted(&id, self.clock.now())
                .ok_or_else(|| NoteError::SelectorNotFound(id.clone()))?;
            info!(
                "renamed {} to {} and removed {} from the index",
                id,
                self.paths.deleted_blob(&id).display(),
                record.handle()
            );
            Ok((record, true))
        })
    }

    /// Active notes in ascending serial order.
    pub fn list(&self) -> NoteResult<Outcome<Vec<Record>>> {
        self.transaction(|index| {
            let records = index.active().into_iter().cloned().collect();
            Ok((records, false))
        })
    }

    pub fn search<S: AsRef<str>>(&self, keywords: &[S]) -> NoteResult<Outcome<Vec<Record>>> {
        let engine = SearchEngine::new(keywords);
        self.transaction(|index| {
            let found = engine
                .search(index.active())
                .into_iter()
                .cloned()
                .collect();
            Ok((found, false))
        })
    }

    /// Tag usage over the active notes, most used first.
    pub fn tags(&self) -> NoteResult<Outcome<Vec<TagUsage>>> {
        self.transaction(|index| {
            let usage = index.tag_index().usage(index.active());
            Ok((usage, false))
        })
    }

    /// A note and its body.
    pub fn show(&self, selector: &str) -> NoteResult<Outcome<(Record, String)>> {
        let selector = Selector::parse(selector)?;
        self.transaction(|index| {
            let record = selector.resolve(index)?.clone();
            let body = self.store.read(&record.id)?;
            Ok(((record, body), false))
        })
    }

    /// Permanently remove `.bak` blobs of notes deleted at least `retention` ago.
    /// Their tombstones stay so the serials remain retired.
    pub fn purge(&self, retention: Duration) -> NoteResult<Outcome<Vec<Record>>> {
        self.transaction(|index| {
            let now = self.clock.now();
            let due: Vec<String> = index
                .tombstones()
                .into_iter()
                .filter(|r| !r.is_purged())
                .filter(|r| {
                    r.deleted_at()
                        .map_or(false, |at| now.signed_duration_since(at) >= retention)
                })
                .map(|r| r.id.clone())
                .collect();

            // a blob that cannot be removed keeps its tombstone unpurged for the next run
            let removed: Vec<String> = due
                .into_iter()
                .filter(|id| match self.store.purge(id) {
                    Ok(_) => true,
                    Err(e) => {
                        error!("could not purge note {}: {}", id, e);
                        false
                    }
                })
                .collect();

            let mut purged = Vec::with_capacity(removed.len());
            for id in removed {
                index.mark_purged(&id);
                if let Some(record) = index.get(&id) {
                    info!("purged {} '{}'", record.handle(), record.title);
                    purged.push(record.clone());
                }
            }
            let changed = !purged.is_empty();
            Ok((purged, changed))
        })
    }

    /// Compare the index with the blob files. Read-only: nothing is expired or written.
    pub fn check(&self) -> NoteResult<CheckReport> {
        let _lock = self.lock()?;
        let index = MetadataIndex::load(&self.paths.index)?;

        let active = index.active();
        let known: HashSet<&str> = active.iter().map(|r| r.id.as_str()).collect();

        let missing_blobs = active
            .iter()
            .filter(|r| !self.store.exists(&r.id))
            .map(|r| (*r).clone())
            .collect();
        let orphan_blobs = self
            .store
            .list_blobs()?
            .into_iter()
            .filter(|id| !known.contains(id.as_str()))
            .collect();

        Ok(CheckReport {
            missing_blobs,
            orphan_blobs,
        })
    }

    /// Clear what an interrupted run left in the lock file and return who that was.
    /// Fails with `Locked` while a live process holds the lock.
    pub fn unlock(&self) -> NoteResult<Option<LockInfo>> {
        IndexLock::clear_stale(&self.paths.lock)
    }

    fn lock(&self) -> NoteResult<IndexLock> {
        let lock = IndexLock::acquire(&self.paths.lock)?;
        if let Some(previous) = lock.interrupted() {
            warn!(
                "the last run ({}) was interrupted; `note check` lists any note file it left behind",
                previous
            );
        }
        Ok(lock)
    }

    fn transaction<T>(
        &self,
        op: impl FnOnce(&mut MetadataIndex) -> NoteResult<(T, bool)>,
    ) -> NoteResult<Outcome<T>> {
        let _lock = self.lock()?;
        let mut index = MetadataIndex::load(&self.paths.index)?;
        let expired = ExpiryEngine::new(self.clock.now()).sweep(&mut index, &self.store);

        match op(&mut index) {
            Ok((value, changed)) => {
                if changed || !expired.is_empty() {
                    index.save(&self.paths.index)?;
                }
                Ok(Outcome { value, expired })
            }
            Err(err) => {
                // expired blobs are already renamed, the index has to follow
                if !expired.is_empty() {
                    if let Err(save_err) = index.save(&self.paths.index) {
                        error!("expired notes were not recorded: {}", save_err);
                    }
                }
                Err(err)
            }
        }
    }
}

/// Split quick-note input into its `/title/` (if any) and the remaining body.
pub fn split_quick_input(input: &str) -> (Option<String>, String) {
    let Some(caps) = QUICK_TITLE_RE.captures(input) else {
        return (None, collapse_whitespace(input));
    };
    let title = caps[1].trim().to_string();
    let span = caps.get(0).map_or(0..0, |m| m.range());
    let body = collapse_whitespace(&format!("{} {}", &input[..span.start], &input[span.end..]));

    ((!title.is_empty()).then_some(title), body)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn kind_name(kind: NoteKind) -> &'static str {
    match kind {
        NoteKind::Quick => "quick",
        NoteKind::Edited => "new",
    }
}
