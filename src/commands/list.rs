use anyhow::Result;
use serde::Serialize;

use note_core::NoteRepository;

use super::render::{self, RecordRow};

#[derive(Serialize)]
struct ListResult {
    notes: Vec<RecordRow>,
    expired: Vec<RecordRow>,
}

pub fn run(repo: &NoteRepository, json: bool) -> Result<()> {
    let outcome = repo.list()?;

    if json {
        let result = ListResult {
            notes: render::rows(&outcome.value),
            expired: render::rows(&outcome.expired),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render::print_expired(&outcome.expired);
        render::print_records(&outcome.value);
    }
    Ok(())
}
