use anyhow::Result;
use colored::*;

use note_core::repo::CheckReport;
use note_core::NoteRepository;

pub fn run(repo: &NoteRepository, json: bool, strict: bool) -> Result<()> {
    let report = repo.check()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if strict && !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &CheckReport) {
    println!("{}", "Note Store Check".bold());
    println!("{}", "=".repeat(60));

    if report.is_clean() {
        println!("{} Index and note files agree", "✓".green());
        return;
    }

    if !report.missing_blobs.is_empty() {
        println!();
        println!("{}", "Notes without a file:".red().bold());
        for record in &report.missing_blobs {
            println!("  {} {} ({})", record.handle().cyan(), record.title, record.id.dimmed());
        }
    }

    if !report.orphan_blobs.is_empty() {
        println!();
        println!("{}", "Files without an index entry:".yellow().bold());
        for id in &report.orphan_blobs {
            println!("  {}", id);
        }
    }
}
