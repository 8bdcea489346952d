use anyhow::Result;
use colored::*;

use note_core::repo::CreateOutcome;
use note_core::{NoteKind, NoteRepository};

use super::render;

pub fn run(repo: &NoteRepository, title: &[String]) -> Result<()> {
    let outcome = repo.create(NoteKind::Edited, &title.join(" "))?;
    render::print_expired(&outcome.expired);

    match outcome.value {
        CreateOutcome::Created(record) => println!(
            "{} Written new note {} '{}'",
            "✓".green(),
            record.handle().cyan(),
            record.title
        ),
        CreateOutcome::Discarded => println!("{}", "Empty note discarded.".yellow()),
    }
    Ok(())
}
