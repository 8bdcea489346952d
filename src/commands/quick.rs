use anyhow::{bail, Result};
use colored::*;

use note_core::repo::CreateOutcome;
use note_core::{NoteKind, NoteRepository};

use super::{joined, render};

pub fn run(repo: &NoteRepository, words: &[String]) -> Result<()> {
    let Some(input) = joined(words) else {
        bail!("a quick note needs some text, e.g. note q buy milk /groceries/");
    };

    let outcome = repo.create(NoteKind::Quick, &input)?;
    render::print_expired(&outcome.expired);

    if let CreateOutcome::Created(record) = outcome.value {
        println!(
            "{} Written quick note {} '{}'",
            "✓".green(),
            record.handle().cyan(),
            record.title
        );
    }
    Ok(())
}
