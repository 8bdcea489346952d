use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::tags::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Active,
    /// Tombstone. The serial stays retired; `purged` means the `.bak` blob is gone too.
    Deleted {
        at: DateTime<FixedOffset>,
        purged: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: String,
    pub serial: u64,
    pub title: String,
    /// Lower-cased tags; matching and indexing use these.
    pub tags: BTreeSet<String>,
    /// Spelling as typed, for tags whose spelling differs from the lower-cased form.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub spellings: BTreeMap<String, String>,
    pub modified: DateTime<FixedOffset>,
    #[serde(skip)]
    pub status: RecordStatus,
}

impl Record {
    pub fn new(
        id: String,
        serial: u64,
        title: String,
        tags: BTreeSet<String>,
        modified: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id,
            serial,
            title,
            tags,
            spellings: BTreeMap::new(),
            modified,
            status: RecordStatus::Active,
        }
    }

    /// Replace the tags with `tags`, keeping how each one was spelled.
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags.clear();
        self.spellings.clear();
        for tag in tags {
            if tag.display() != tag.as_str() {
                self.spellings
                    .insert(tag.as_str().to_string(), tag.display().to_string());
            }
            self.tags.insert(tag.into_normalized());
        }
        self
    }

    /// Tags as the user wrote them, in tag order.
    pub fn display_tags(&self) -> Vec<&str> {
        self.tags
            .iter()
            .map(|t| self.spellings.get(t).unwrap_or(t).as_str())
            .collect()
    }

    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }

    pub fn deleted_at(&self) -> Option<DateTime<FixedOffset>> {
        match self.status {
            RecordStatus::Deleted { at, .. } => Some(at),
            RecordStatus::Active => None,
        }
    }

    pub fn is_purged(&self) -> bool {
        matches!(self.status, RecordStatus::Deleted { purged: true, .. })
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// `$N`, the handle users type to select this note.
    pub fn handle(&self) -> String {
        format!("${}", self.serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tags::extract_tags;
    use chrono::DateTime;

    #[test]
    fn test_display_tags_keep_spelling() {
        let record = Record::new(
            "a".to_string(),
            1,
            "trip".to_string(),
            BTreeSet::new(),
            DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap(),
        )
        .with_tags(extract_tags("#France #food #France-2024"));

        assert!(record.has_tag("france"));
        assert!(!record.has_tag("France"));
        assert_eq!(record.display_tags(), vec!["France", "France-2024", "food"]);
        assert_eq!(record.spellings.len(), 2);
    }
}
