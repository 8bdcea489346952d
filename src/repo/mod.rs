//! Note operations and the collaborators they call out to.

pub mod clock;
pub mod editor;
pub mod note_repo;
pub mod prompt;
pub mod selector;

pub use clock::{Clock, SystemClock};
pub use editor::{Editor, ExternalEditor};
pub use note_repo::{CheckReport, CreateOutcome, EditOutcome, NoteKind, NoteRepository, Outcome};
pub use prompt::{TerminalPrompt, TitlePrompt};
pub use selector::Selector;
