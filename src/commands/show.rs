use anyhow::Result;
use colored::*;

use note_core::core::expiry;
use note_core::NoteRepository;

use super::{joined, list_choices, render, select_note};

pub fn run(repo: &NoteRepository, selector: &[String]) -> Result<()> {
    let chosen = select_note(joined(selector), || list_choices(repo), |s| repo.show(s))?;

    let Some(outcome) = chosen else {
        return Ok(());
    };
    render::print_expired(&outcome.expired);

    let (record, body) = outcome.value;
    println!("{} {}", record.handle().cyan(), record.title.bold());
    if !record.tags.is_empty() {
        let tags: Vec<String> = record.display_tags().iter().map(|t| format!("#{}", t)).collect();
        println!("{}", tags.join(" ").dimmed());
    }
    if let Some(at) = expiry::expires_at(&record) {
        println!("{}", format!("expires {}", at.format("%Y-%m-%d %H:%M")).yellow());
    }
    println!("{}", "-".repeat(60));
    print!("{}", body);
    if !body.is_empty() && !body.ends_with('\n') {
        println!();
    }
    Ok(())
}
