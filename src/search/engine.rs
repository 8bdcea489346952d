//! Search Engine - OR keyword match over titles and tags

use crate::core::record::Record;

/// Keywords are compared lower-cased. A keyword hits a record when it is a
/// substring of the title or names one of its tags (`cat` and `#cat` both
/// name the tag `cat`).
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    keywords: Vec<String>,
}

impl SearchEngine {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_match(&self, record: &Record) -> bool {
        let title = record.title.to_lowercase();
        self.keywords.iter().any(|keyword| {
            title.contains(keyword.as_str()) || record.has_tag(keyword.trim_start_matches('#'))
        })
    }

    /// Matching records in ascending serial order, whatever order they came in.
    pub fn search<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> Vec<&'a Record> {
        let mut found: Vec<&Record> = records.into_iter().filter(|r| self.is_match(r)).collect();
        found.sort_by_key(|r| r.serial);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn record(serial: u64, title: &str, tags: &[&str]) -> Record {
        Record::new(
            format!("id{}", serial),
            serial,
            title.to_string(),
            tags.iter().map(|t| t.to_string()).collect(),
            DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap(),
        )
    }

    #[test]
    fn test_or_semantics_in_serial_order() {
        let records = vec![
            record(3, "fish", &[]),
            record(2, "dog park", &["cat"]),
            record(1, "cat food", &[]),
        ];
        let found = SearchEngine::new(["cat", "dog"]).search(&records);
        let serials: Vec<u64> = found.iter().map(|r| r.serial).collect();
        assert_eq!(serials, vec![1, 2]);
    }

    #[test]
    fn test_case_insensitive_and_hash_prefix() {
        let note = record(1, "Weekly Report", &["work"]);
        assert!(SearchEngine::new(["REPORT"]).is_match(&note));
        assert!(SearchEngine::new(["#Work"]).is_match(&note));
        assert!(!SearchEngine::new(["wor"]).is_match(&record(2, "x", &["work"])));
    }

    #[test]
    fn test_blank_keywords_match_nothing() {
        let note = record(1, "anything", &[]);
        let engine = SearchEngine::new(["", "  "]);
        assert!(engine.keywords().is_empty());
        assert!(!engine.is_match(&note));
    }
}
