use anyhow::Result;
use colored::*;
use serde::Serialize;

use note_core::NoteRepository;

use super::edit;
use super::render::{self, RecordRow};
use super::select_note;

#[derive(Serialize)]
struct SearchResult {
    keywords: Vec<String>,
    found: usize,
    notes: Vec<RecordRow>,
    expired: Vec<RecordRow>,
}

pub fn run(repo: &NoteRepository, keywords: &[String], json: bool) -> Result<()> {
    let outcome = repo.search(keywords)?;

    if json {
        let result = SearchResult {
            keywords: keywords.to_vec(),
            found: outcome.value.len(),
            notes: render::rows(&outcome.value),
            expired: render::rows(&outcome.expired),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    render::print_expired(&outcome.expired);
    println!("{}", "Search Results".bold());
    println!("{}", "=".repeat(60));
    println!("Keywords: {}", keywords.join(" "));
    println!("Found: {} notes", outcome.value.len());
    println!();

    if outcome.value.is_empty() {
        println!("{}", "No matches found.".yellow());
        return Ok(());
    }
    render::print_records(&outcome.value);
    println!();

    // offer to open one of the hits right away
    let chosen = select_note(None, || Ok(()), |selector| repo.edit(selector))?;
    if let Some(outcome) = chosen {
        render::print_expired(&outcome.expired);
        edit::report(&outcome.value);
    }
    Ok(())
}
