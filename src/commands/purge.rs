use anyhow::{anyhow, Result};
use chrono::Duration;
use colored::*;

use note_core::NoteRepository;

use super::render;

pub fn run(repo: &NoteRepository, days: i64) -> Result<()> {
    let retention = Duration::try_days(days)
        .filter(|d| *d >= Duration::zero())
        .ok_or_else(|| anyhow!("invalid retention: {} days", days))?;

    let outcome = repo.purge(retention)?;
    render::print_expired(&outcome.expired);

    if outcome.value.is_empty() {
        println!("{}", format!("Nothing deleted more than {} days ago.", days).dimmed());
        return Ok(());
    }
    for record in &outcome.value {
        println!(
            "{} Purged {} '{}'",
            "✓".green(),
            record.handle().cyan(),
            record.title
        );
    }
    Ok(())
}
