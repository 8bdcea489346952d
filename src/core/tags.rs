use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::record::Record;

lazy_static! {
    // #word at the start of the text or after whitespace; "a#b" and "##b" are not tags
    static ref TAG_RE: Regex = Regex::new(r"(?:^|\s)#([\w-]+)").unwrap();
}

/// A tag as written in a note. Matching, indexing and persistence use the
/// lower-cased form; `display` keeps the spelling the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    normalized: String,
    display: String,
}

impl Tag {
    pub fn new(raw: &str) -> Self {
        let display = raw.trim_start_matches('#').to_string();
        Self {
            normalized: display.to_lowercase(),
            display,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn into_normalized(self) -> String {
        self.normalized
    }
}

/// Tags in order of first appearance, one per normalized form.
pub fn extract_tags(text: &str) -> Vec<Tag> {
    let mut seen = BTreeSet::new();
    TAG_RE
        .captures_iter(text)
        .map(|c| Tag::new(&c[1]))
        .filter(|tag| seen.insert(tag.as_str().to_string()))
        .collect()
}

/// The normalized tag set stored on a record.
pub fn tag_set(text: &str) -> BTreeSet<String> {
    extract_tags(text)
        .into_iter()
        .map(Tag::into_normalized)
        .collect()
}

/// Tags of a note are always derived from its title and body together.
pub fn note_tag_list(title: &str, body: &str) -> Vec<Tag> {
    extract_tags(&format!("{}\n{}", title, body))
}

pub fn note_tags(title: &str, body: &str) -> BTreeSet<String> {
    note_tag_list(title, body)
        .into_iter()
        .map(Tag::into_normalized)
        .collect()
}

/// Tag → ids of the active records carrying it. Derived from records, never loaded.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagIndex {
    entries: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagUsage {
    pub tag: String,
    /// Spelling from the lowest-numbered note that carries the tag.
    pub display: String,
    pub count: usize,
    pub serials: Vec<u64>,
}

impl TagIndex {
    pub fn build<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut entries: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for record in records.into_iter().filter(|r| r.is_active()) {
            for tag in &record.tags {
                entries
                    .entry(tag.clone())
                    .or_default()
                    .insert(record.id.clone());
            }
        }
        Self { entries }
    }

    pub fn ids(&self, tag: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(&tag.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Usage per tag, most used first, ties by name. Serials come from `records`.
    pub fn usage<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> Vec<TagUsage> {
        let mut records: Vec<&Record> = records.into_iter().collect();
        records.sort_by_key(|r| r.serial);
        let serial_of: BTreeMap<&str, u64> =
            records.iter().map(|r| (r.id.as_str(), r.serial)).collect();
        let spelling_of = |tag: &str| {
            records
                .iter()
                .find(|r| r.has_tag(tag))
                .and_then(|r| r.spellings.get(tag))
                .cloned()
                .unwrap_or_else(|| tag.to_string())
        };

        let mut usage: Vec<TagUsage> = self
            .entries
            .iter()
            .map(|(tag, ids)| {
                let mut serials: Vec<u64> = ids
                    .iter()
                    .filter_map(|id| serial_of.get(id.as_str()).copied())
                    .collect();
                serials.sort_unstable();
                TagUsage {
                    tag: tag.clone(),
                    display: spelling_of(tag.as_str()),
                    count: ids.len(),
                    serials,
                }
            })
            .collect();

        usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        usage
    }
}
