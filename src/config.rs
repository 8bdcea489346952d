use std::path::PathBuf;

use crate::core::paths::NotePaths;
use crate::error::{NoteError, NoteResult};
use crate::repo::editor::ExternalEditor;

pub const DEFAULT_FOLDER: &str = "Note";

/// Settings for one run. The binary fills these from flags and `NOTE_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub location: PathBuf,
    pub editor: String,
}

impl Config {
    /// Fill unset values with defaults: `~/Note` and the platform editor.
    pub fn resolve(location: Option<PathBuf>, editor: Option<String>) -> NoteResult<Self> {
        let location = match location {
            Some(location) => location,
            None => Self::default_location().ok_or_else(|| {
                NoteError::Config(
                    "no home directory found; set NOTE_LOCATION to choose where notes live"
                        .to_string(),
                )
            })?,
        };

        let editor = editor
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| ExternalEditor::default_command().to_string());

        Ok(Self { location, editor })
    }

    pub fn default_location() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_FOLDER))
    }

    pub fn paths(&self) -> NotePaths {
        NotePaths::from_root(self.location.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_values_win() {
        let config = Config::resolve(Some(PathBuf::from("/srv/notes")), Some("nano".to_string())).unwrap();
        assert_eq!(config.location, PathBuf::from("/srv/notes"));
        assert_eq!(config.editor, "nano");
        assert_eq!(config.paths().index, PathBuf::from("/srv/notes/db.json"));
    }

    #[test]
    fn test_blank_editor_falls_back() {
        let config = Config::resolve(Some(PathBuf::from("/srv/notes")), Some(" ".to_string())).unwrap();
        assert_eq!(config.editor, ExternalEditor::default_command());
    }
}
