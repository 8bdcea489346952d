use chrono::{DateTime, FixedOffset, Local};
use colored::*;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use note_core::core::expiry;
use note_core::Record;

const TITLE_WIDTH: usize = 48;

#[derive(Serialize)]
pub struct RecordRow {
    pub serial: u64,
    pub title: String,
    pub tags: Vec<String>,
    pub modified: String,
    pub expires: Option<String>,
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        Self {
            serial: record.serial,
            title: record.title.clone(),
            tags: record.display_tags().into_iter().map(str::to_string).collect(),
            modified: record.modified.to_rfc3339(),
            expires: expiry::expires_at(record).map(|at| at.to_rfc3339()),
        }
    }
}

pub fn rows(records: &[Record]) -> Vec<RecordRow> {
    records.iter().map(RecordRow::from).collect()
}

/// serial | title | tags | modified, volatile notes highlighted.
pub fn print_records(records: &[Record]) {
    if records.is_empty() {
        println!("{}", "No notes.".yellow());
        return;
    }

    let now = Local::now().fixed_offset();
    let cells: Vec<[String; 4]> = records
        .iter()
        .map(|r| {
            [
                r.handle(),
                truncate(&r.title, TITLE_WIDTH),
                r.display_tags().join(" "),
                humanize(now, r.modified),
            ]
        })
        .collect();

    let headers = ["serial", "title", "tags", "modified"];
    let mut widths = headers.map(|h| h.width());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let header: Vec<String> = headers
        .iter()
        .zip(widths)
        .map(|(h, w)| pad(h, w))
        .collect();
    println!("{}", header.join("  ").bold());
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );

    for (record, row) in records.iter().zip(&cells) {
        let serial = pad(&row[0], widths[0]);
        let serial = if expiry::is_volatile(record) {
            serial.yellow()
        } else {
            serial.cyan()
        };
        println!(
            "{}  {}  {}  {}",
            serial,
            pad(&row[1], widths[1]),
            pad(&row[2], widths[2]).dimmed(),
            row[3]
        );
    }
}

/// Tell the user which volatile notes were removed while serving the command.
pub fn print_expired(expired: &[Record]) {
    for record in expired {
        eprintln!(
            "{} {} '{}' expired and was removed",
            "→".dimmed(),
            record.handle().yellow(),
            record.title
        );
    }
}

/// "just now", "5 minutes ago", "3 days ago", ...
pub fn humanize(now: DateTime<FixedOffset>, then: DateTime<FixedOffset>) -> String {
    let seconds = now.signed_duration_since(then).num_seconds();
    if seconds < 0 {
        return "in the future".to_string();
    }

    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    match seconds {
        s if s < 45 => "just now".to_string(),
        s if s < 90 => "a minute ago".to_string(),
        _ if minutes < 45 => format!("{} minutes ago", minutes.max(2)),
        _ if minutes < 90 => "an hour ago".to_string(),
        _ if hours < 22 => format!("{} hours ago", hours.max(2)),
        _ if hours < 36 => "a day ago".to_string(),
        _ if days < 26 => format!("{} days ago", days.max(2)),
        _ if days < 45 => "a month ago".to_string(),
        _ if days < 320 => format!("{} months ago", (days / 30).max(2)),
        _ if days < 548 => "a year ago".to_string(),
        _ => format!("{} years ago", (days / 365).max(2)),
    }
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_chars {
        s.to_string()
    } else {
        format!("{}...", chars[..max_chars].iter().collect::<String>())
    }
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}
