use std::io::{self, BufRead, Write};

use chrono::{DateTime, FixedOffset};

use crate::error::{NoteError, NoteResult};

/// Supplies a title when the command line did not carry one.
pub trait TitlePrompt {
    /// `default` is used when the user just presses enter.
    fn ask_title(&self, default: &str) -> NoteResult<String>;
}

/// Title given to notes created without one, e.g. `Tue, 05 Mar 2024 @14:07`.
pub fn default_title(now: DateTime<FixedOffset>) -> String {
    now.format("%a, %d %b %Y @%H:%M").to_string()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    /// Print `question` and read one line from stdin, trimmed.
    pub fn ask(&self, question: &str) -> NoteResult<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", question).map_err(NoteError::Prompt)?;
        stdout.flush().map_err(NoteError::Prompt)?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(NoteError::Prompt)?;
        Ok(line.trim().to_string())
    }
}

impl TitlePrompt for TerminalPrompt {
    fn ask_title(&self, default: &str) -> NoteResult<String> {
        let answer = self.ask(&format!(
            "Provide title or press enter for timestamp ({}): ",
            default
        ))?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title() {
        let now = DateTime::parse_from_rfc3339("2024-03-05T14:07:59+01:00").unwrap();
        assert_eq!(default_title(now), "Tue, 05 Mar 2024 @14:07");
    }
}
