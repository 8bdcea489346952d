use anyhow::Result;
use colored::*;

use note_core::repo::EditOutcome;
use note_core::NoteRepository;

use super::{joined, list_choices, render, select_note};

pub fn run(repo: &NoteRepository, title: &[String]) -> Result<()> {
    let chosen = select_note(joined(title), || list_choices(repo), |selector| repo.edit(selector))?;

    let Some(outcome) = chosen else {
        println!("{}", "No note edited.".dimmed());
        return Ok(());
    };
    render::print_expired(&outcome.expired);
    report(&outcome.value);
    Ok(())
}

pub(crate) fn report(outcome: &EditOutcome) {
    match outcome {
        EditOutcome::Updated(record) => println!(
            "{} Updated {} '{}'",
            "✓".green(),
            record.handle().cyan(),
            record.title
        ),
        EditOutcome::Unchanged(record) => println!(
            "{} No changes in {} '{}'",
            "→".dimmed(),
            record.handle().cyan(),
            record.title
        ),
    }
}
