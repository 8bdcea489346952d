//! Volatile notes.
//!
//! A tag made of digits and one unit letter (`#30m`, `#2h`, `#7d`) gives the
//! note a lifetime counted from its last modification. With several such
//! tags the shortest one applies. Expired notes are soft-deleted by
//! [`ExpiryEngine::sweep`], which every repository operation runs first.

use chrono::{DateTime, Duration, FixedOffset};
use lazy_static::lazy_static;
use log::{error, info};
use regex::Regex;

use super::index::MetadataIndex;
use super::record::Record;
use super::store::ContentStore;

lazy_static! {
    static ref VOLATILE_RE: Regex = Regex::new(r"^([0-9]+)([mhd])$").unwrap();
}

/// Lifetime encoded by a volatile tag, or `None` for any other tag.
pub fn lifetime(tag: &str) -> Option<Duration> {
    let caps = VOLATILE_RE.captures(tag)?;
    let amount: i64 = caps[1].parse().ok()?;
    match &caps[2] {
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        _ => None,
    }
}

/// Shortest lifetime among the record's volatile tags.
pub fn duration(record: &Record) -> Option<Duration> {
    record.tags.iter().filter_map(|t| lifetime(t)).min()
}

pub fn is_volatile(record: &Record) -> bool {
    duration(record).is_some()
}

pub fn expires_at(record: &Record) -> Option<DateTime<FixedOffset>> {
    record.modified.checked_add_signed(duration(record)?)
}

pub fn is_expired(record: &Record, now: DateTime<FixedOffset>) -> bool {
    match duration(record) {
        Some(lifetime) => now.signed_duration_since(record.modified) >= lifetime,
        None => false,
    }
}

pub struct ExpiryEngine {
    now: DateTime<FixedOffset>,
}

impl ExpiryEngine {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// Active records whose lifetime has elapsed, in serial order.
    pub fn expired<'a>(&self, index: &'a MetadataIndex) -> Vec<&'a Record> {
        index
            .active()
            .into_iter()
            .filter(|r| is_expired(r, self.now))
            .collect()
    }

    /// Soft-delete every expired record and return what was removed.
    ///
    /// A record whose blob cannot be moved stays active so the index never
    /// points an active entry at a renamed blob; it is retried on the next run.
    pub fn sweep(&self, index: &mut MetadataIndex, store: &ContentStore) -> Vec<Record> {
        let ids: Vec<String> = self
            .expired(index)
            .into_iter()
            .map(|r| r.id.clone())
            .collect();

        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            if let Err(e) = store.soft_delete(&id) {
                error!("could not expire note {}: {}", id, e);
                continue;
            }
            if let Some(record) = index.mark_deleted(&id, self.now) {
                info!("expired {} '{}'", record.handle(), record.title);
                removed.push(record);
            }
        }
        removed
    }
}
