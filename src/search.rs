//! Literal byte search over loaded content.
//!
//! A search is submitted once per term and produces an ordered list of every match in
//! the content, including overlapping ones. Navigation then cycles through that list
//! without re-scanning.

pub mod matches;
pub mod state;

pub use matches::{line_occurrences, perform_search, SearchMatch, SearchMatchList};
pub use state::SearchState;
