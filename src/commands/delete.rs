use anyhow::Result;
use colored::*;

use note_core::NoteRepository;

use super::{joined, list_choices, render, select_note};

pub fn run(repo: &NoteRepository, selector: &[String]) -> Result<()> {
    let chosen = select_note(joined(selector), || list_choices(repo), |s| repo.delete(s))?;

    let Some(outcome) = chosen else {
        println!("{}", "No note deleted.".dimmed());
        return Ok(());
    };
    render::print_expired(&outcome.expired);

    let record = outcome.value;
    println!(
        "{} Deleted {} '{}' (kept as {})",
        "✓".green(),
        record.handle().cyan(),
        record.title,
        repo.paths().deleted_blob(&record.id).display()
    );
    Ok(())
}
