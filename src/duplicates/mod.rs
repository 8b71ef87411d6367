//! Duplicate detection over a loaded manifest.

pub mod finder;

pub use finder::{find, DuplicateGroup, DuplicateReport};
