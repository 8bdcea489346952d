mod commands;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};

use note_core::logging::init_logging;
use note_core::{Config, NoteRepository};

#[derive(Parser)]
#[command(name = "note")]
#[command(about = "Plain-file notes with tags, search and self-expiring reminders", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, global = true, env = "NOTE_LOCATION", help = "Directory holding the notes (default ~/Note)")]
    location: Option<PathBuf>,

    #[arg(long, global = true, env = "NOTE_EDITOR", help = "Editor command for new and edited notes")]
    editor: Option<String>,

    #[arg(long, global = true, env = "NOTE_LOG_LEVEL", default_value = "warn", help = "error, warn, info, debug or trace")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quick note from the command line; a /title/ anywhere sets the title
    #[command(name = "q", alias = "quick")]
    Quick {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// New note written in the editor
    #[command(name = "n", alias = "new")]
    New {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Edit a note chosen by title or $serial
    #[command(name = "e", alias = "edit")]
    Edit {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        selector: Vec<String>,
    },
    /// Notes whose title contains, or whose tags equal, any keyword
    #[command(name = "s", alias = "search")]
    Search {
        #[arg(required = true)]
        keywords: Vec<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Delete a note; its file is kept as <id>.bak until purged
    #[command(name = "d", alias = "delete")]
    Delete {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        selector: Vec<String>,
    },
    /// List notes by serial
    #[command(name = "l", alias = "list")]
    List {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Tag usage across notes
    #[command(name = "t", alias = "tags")]
    Tags {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Print a note
    Show {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        selector: Vec<String>,
    },
    /// Compare the index with the note files
    Check {
        #[arg(long, help = "JSON output")]
        json: bool,
        #[arg(long, help = "Exit 1 when issues are found")]
        strict: bool,
    },
    /// Remove files of notes deleted more than --days ago
    Purge {
        #[arg(long, default_value_t = 30, help = "Retention in days")]
        days: i64,
    },
    /// Clear the lock info left by an interrupted run
    Unlock,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _logger = init_logging(&cli.log_level).map_err(|e| anyhow!(e))?;
    let config = Config::resolve(cli.location, cli.editor)?;
    let repo = NoteRepository::open(&config)
        .with_context(|| format!("cannot open notes at {}", config.location.display()))?;

    match cli.command {
        Commands::Quick { words } => commands::quick::run(&repo, &words),
        Commands::New { title } => commands::new::run(&repo, &title),
        Commands::Edit { selector } => commands::edit::run(&repo, &selector),
        Commands::Search { keywords, json } => commands::search::run(&repo, &keywords, json),
        Commands::Delete { selector } => commands::delete::run(&repo, &selector),
        Commands::List { json } => commands::list::run(&repo, json),
        Commands::Tags { json } => commands::tags::run(&repo, json),
        Commands::Show { selector } => commands::show::run(&repo, &selector),
        Commands::Check { json, strict } => commands::check::run(&repo, json, strict),
        Commands::Purge { days } => commands::purge::run(&repo, days),
        Commands::Unlock => commands::unlock::run(&repo),
    }
}
