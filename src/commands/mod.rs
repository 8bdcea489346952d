pub mod check;
pub mod delete;
pub mod edit;
pub mod list;
pub mod new;
pub mod purge;
pub mod quick;
pub mod render;
pub mod search;
pub mod show;
pub mod tags;
pub mod unlock;

use anyhow::Result;
use colored::*;

use note_core::repo::TerminalPrompt;
use note_core::{NoteError, NoteRepository, NoteResult};

const SELECT_QUESTION: &str = "Note title, or $serial, or <Enter> to abort: ";

/// Run `op` on a user-chosen note, asking again while the choice does not
/// name exactly one note. `Ok(None)` means the user gave up.
pub(crate) fn select_note<T>(
    initial: Option<String>,
    show_choices: impl Fn() -> Result<()>,
    op: impl FnMut(&str) -> NoteResult<T>,
) -> Result<Option<T>> {
    let prompt = TerminalPrompt;
    select_with(|question| prompt.ask(question), initial, show_choices, op)
}

fn select_with<T>(
    mut ask: impl FnMut(&str) -> NoteResult<String>,
    initial: Option<String>,
    show_choices: impl Fn() -> Result<()>,
    mut op: impl FnMut(&str) -> NoteResult<T>,
) -> Result<Option<T>> {
    let mut shown = false;
    let mut next = initial;

    if next.is_none() {
        show_choices()?;
        shown = true;
    }

    loop {
        let selector = match next.take() {
            Some(selector) => selector,
            None => {
                let answer = ask(SELECT_QUESTION)?;
                if answer.is_empty() {
                    return Ok(None);
                }
                answer
            }
        };

        let err = match op(&selector) {
            Ok(value) => return Ok(Some(value)),
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => err,
        };

        match err {
            NoteError::SelectorAmbiguous { candidates, .. } => {
                println!(
                    "{}",
                    format!("'{}' matches {} notes:", selector, candidates.len()).yellow()
                );
                for candidate in candidates {
                    println!("  {} {}", format!("${}", candidate.serial).cyan(), candidate.title);
                }
            }
            err => {
                println!("{}", err.to_string().yellow());
                if matches!(err, NoteError::SelectorNotFound(_)) && !shown {
                    show_choices()?;
                    shown = true;
                }
            }
        }
    }
}

/// Every active note, for picking one.
pub(crate) fn list_choices(repo: &NoteRepository) -> Result<()> {
    let outcome = repo.list()?;
    render::print_expired(&outcome.expired);
    render::print_records(&outcome.value);
    println!();
    Ok(())
}

pub(crate) fn joined(words: &[String]) -> Option<String> {
    let text = words.join(" ");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::path::PathBuf;

    use note_core::error::Candidate;

    use super::*;

    fn answers(lines: &[&str]) -> RefCell<VecDeque<String>> {
        RefCell::new(lines.iter().map(|l| l.to_string()).collect())
    }

    #[test]
    fn test_fatal_error_stops_selection() {
        let script = answers(&["$1"]);
        let result: Result<Option<()>> = select_with(
            |_| Ok(script.borrow_mut().pop_front().unwrap_or_default()),
            Some("cat".to_string()),
            || Ok(()),
            |_| {
                Err(NoteError::IndexCorrupt {
                    path: PathBuf::from("db.json"),
                    reason: "bad".to_string(),
                })
            },
        );

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NoteError>(),
            Some(NoteError::IndexCorrupt { .. })
        ));
        assert_eq!(script.borrow().len(), 1);
    }

    #[test]
    fn test_ambiguous_choice_asks_again() {
        let script = answers(&["$2"]);
        let result = select_with(
            |_| Ok(script.borrow_mut().pop_front().unwrap_or_default()),
            Some("cat".to_string()),
            || Ok(()),
            |selector| match selector {
                "$2" => Ok(2),
                other => Err(NoteError::SelectorAmbiguous {
                    selector: other.to_string(),
                    candidates: vec![
                        Candidate { serial: 1, title: "cat food".to_string() },
                        Candidate { serial: 2, title: "cat toys".to_string() },
                    ],
                }),
            },
        );
        assert_eq!(result.unwrap(), Some(2));
    }

    #[test]
    fn test_retryable_error_then_give_up() {
        let script = answers(&[""]);
        let shown = std::cell::Cell::new(0);
        let result: Result<Option<()>> = select_with(
            |_| Ok(script.borrow_mut().pop_front().unwrap_or_default()),
            Some("$1".to_string()),
            || {
                shown.set(shown.get() + 1);
                Ok(())
            },
            |_| {
                Err(NoteError::EditorLaunchFailure {
                    editor: "vi".to_string(),
                    reason: "not found".to_string(),
                })
            },
        );

        assert_eq!(result.unwrap(), None);
        assert!(script.borrow().is_empty());
        assert_eq!(shown.get(), 0);
    }
}
