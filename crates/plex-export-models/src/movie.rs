use serde::{Deserialize, Serialize};

/// Full movie item re-fetched from the library by title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub rating_key: String,
    pub title: String,
    pub year: Option<u32>,
}

/// Outcome of a by-title lookup in a library section.
///
/// `NotFound` is an expected condition (renamed or deleted content) and is
/// handled by falling back to the sparse history entry. Transport and
/// decode failures travel in the `Err` branch of the surrounding `Result`,
/// so every call site sees three cases: found, not found, other error.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemLookup {
    Found(MovieDetails),
    NotFound,
}
