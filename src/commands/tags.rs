use anyhow::Result;
use colored::*;
use serde::Serialize;

use note_core::core::tags::TagUsage;
use note_core::NoteRepository;

use super::render::{self, RecordRow};

#[derive(Serialize)]
struct TagsResult {
    unique_tags: usize,
    tag_usage: Vec<TagUsage>,
    expired: Vec<RecordRow>,
}

pub fn run(repo: &NoteRepository, json: bool) -> Result<()> {
    let outcome = repo.tags()?;

    if json {
        let result = TagsResult {
            unique_tags: outcome.value.len(),
            tag_usage: outcome.value,
            expired: render::rows(&outcome.expired),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    render::print_expired(&outcome.expired);
    print_report(&outcome.value);
    Ok(())
}

fn print_report(usage: &[TagUsage]) {
    if usage.is_empty() {
        println!("{}", "No tags in use.".yellow());
        return;
    }

    println!("{}", "Tag Usage (sorted by count):".cyan().bold());
    println!("{}", "-".repeat(60));

    for entry in usage {
        let count_str = format!("{:>3}", entry.count);
        let count_colored = if entry.count >= 5 {
            count_str.green()
        } else if entry.count >= 2 {
            count_str.yellow()
        } else {
            count_str.normal()
        };
        let serials: Vec<String> = entry.serials.iter().map(|s| format!("${}", s)).collect();
        println!(
            "  {} × #{}  {}",
            count_colored,
            entry.display,
            serials.join(" ").dimmed()
        );
    }

    println!();
    println!("Unique tags: {}", usage.len());
}
