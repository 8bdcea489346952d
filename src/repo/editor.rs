use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{NoteError, NoteResult};

/// Edits a file in place and returns once the user is done.
pub trait Editor {
    fn edit(&self, path: &Path) -> NoteResult<()>;
}

/// Runs an external program such as `vi` or `code --wait` on the file.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn default_command() -> &'static str {
        if cfg!(windows) {
            "notepad.exe"
        } else {
            "vi"
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn failure(&self, reason: impl Into<String>) -> NoteError {
        NoteError::EditorLaunchFailure {
            editor: self.command.clone(),
            reason: reason.into(),
        }
    }
}

impl Default for ExternalEditor {
    fn default() -> Self {
        Self::new(Self::default_command())
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, path: &Path) -> NoteResult<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| self.failure("no editor configured"))?;

        debug!("running {} on {}", self.command, path.display());
        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .map_err(|e| self.failure(e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(self.failure(format!("exited with {}", status)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let editor = ExternalEditor::new("definitely-not-an-editor-4711");
        let err = editor.edit(Path::new("/tmp/nothing")).unwrap_err();
        assert!(matches!(err, NoteError::EditorLaunchFailure { .. }));
    }

    #[test]
    fn test_blank_command() {
        let err = ExternalEditor::new("  ").edit(Path::new("x")).unwrap_err();
        assert!(err.to_string().contains("no editor configured"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status() {
        assert!(ExternalEditor::new("true").edit(Path::new("x")).is_ok());
        let err = ExternalEditor::new("false").edit(Path::new("x")).unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }
}
