//! Keyword search over note titles and tags.

pub mod engine;

pub use engine::SearchEngine;
