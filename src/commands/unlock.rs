use anyhow::Result;
use colored::*;

use note_core::NoteRepository;

pub fn run(repo: &NoteRepository) -> Result<()> {
    match repo.unlock()? {
        Some(previous) => println!(
            "{} Cleared the lock left by {}; `note check` lists any note file it left behind",
            "✓".green(),
            previous
        ),
        None => println!("{}", "No lock left behind.".dimmed()),
    }
    Ok(())
}
