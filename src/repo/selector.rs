use crate::core::index::MetadataIndex;
use crate::core::record::Record;
use crate::error::{Candidate, NoteError, NoteResult};

/// How a user names a note: `$N` for a serial, anything else is title text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Serial(u64),
    Title(String),
}

impl Selector {
    pub fn parse(input: &str) -> NoteResult<Self> {
        let input = input.trim();
        if let Some(serial) = input.strip_prefix('$') {
            return serial
                .trim()
                .parse()
                .map(Self::Serial)
                .map_err(|_| NoteError::SelectorNotFound(input.to_string()));
        }
        if input.is_empty() {
            return Err(NoteError::SelectorNotFound(String::new()));
        }
        Ok(Self::Title(input.to_string()))
    }

    /// Resolve to exactly one active record.
    ///
    /// Title text picks the note whose title equals it (ignoring case) when
    /// there is exactly one; otherwise every title containing it is a
    /// candidate and more than one is an error.
    pub fn resolve<'a>(&self, index: &'a MetadataIndex) -> NoteResult<&'a Record> {
        match self {
            Self::Serial(serial) => index
                .find_serial(*serial)
                .ok_or_else(|| NoteError::SelectorNotFound(format!("${}", serial))),
            Self::Title(text) => {
                let needle = text.to_lowercase();
                let active = index.active();

                let exact: Vec<&Record> = active
                    .iter()
                    .copied()
                    .filter(|r| r.title.to_lowercase() == needle)
                    .collect();
                if let [only] = exact.as_slice() {
                    return Ok(*only);
                }

                let matches: Vec<&Record> = active
                    .into_iter()
                    .filter(|r| r.title.to_lowercase().contains(&needle))
                    .collect();
                match matches.as_slice() {
                    [] => Err(NoteError::SelectorNotFound(text.clone())),
                    [only] => Ok(*only),
                    many => Err(NoteError::SelectorAmbiguous {
                        selector: text.clone(),
                        candidates: many
                            .iter()
                            .map(|r| Candidate {
                                serial: r.serial,
                                title: r.title.clone(),
                            })
                            .collect(),
                    }),
                }
            }
        }
    }
}
