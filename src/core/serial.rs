use super::record::Record;

/// Next free serial: one past the highest ever issued, tombstones included.
pub fn next_serial<'a>(records: impl IntoIterator<Item = &'a Record>) -> u64 {
    records
        .into_iter()
        .map(|r| r.serial)
        .max()
        .map_or(1, |highest| highest + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::RecordStatus;
    use chrono::DateTime;

    fn record(serial: u64) -> Record {
        Record::new(
            format!("id{}", serial),
            serial,
            String::new(),
            Default::default(),
            DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap(),
        )
    }

    #[test]
    fn test_starts_at_one() {
        assert_eq!(next_serial(&Vec::<Record>::new()), 1);
    }

    #[test]
    fn test_counts_tombstones() {
        let mut top = record(7);
        top.status = RecordStatus::Deleted {
            at: top.modified,
            purged: true,
        };
        let records = vec![record(2), top, record(5)];
        assert_eq!(next_serial(&records), 8);
    }
}
