use crate::content::Content;
use crate::error::{FatError, Result};
use memchr::memmem;

/// One occurrence of the search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchMatch {
    pub line_idx: usize,
    /// Byte offset of the match start within the line.
    pub byte_offset: usize,
}

/// All matches of a term, ascending by `(line_idx, byte_offset)`, plus a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchMatchList {
    matches: Vec<SearchMatch>,
    current: usize,
}

impl SearchMatchList {
    pub fn new(matches: Vec<SearchMatch>) -> Self {
        Self {
            matches,
            current: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<SearchMatch> {
        self.matches.get(self.current).copied()
    }

    /// Advance cyclically and return the new current match.
    pub fn next_match(&mut self) -> Result<SearchMatch> {
        if self.matches.is_empty() {
            return Err(FatError::unsupported("no active search"));
        }
        self.current = (self.current + 1) % self.matches.len();
        Ok(self.matches[self.current])
    }

    /// Step back cyclically and return the new current match.
    pub fn prev_match(&mut self) -> Result<SearchMatch> {
        if self.matches.is_empty() {
            return Err(FatError::unsupported("no active search"));
        }
        self.current = if self.current == 0 {
            self.matches.len() - 1
        } else {
            self.current - 1
        };
        Ok(self.matches[self.current])
    }

    pub fn clear(&mut self) {
        self.matches.clear();
        self.current = 0;
    }
}

/// Find every occurrence of `term` in `content`.
///
/// Scanning resumes one byte after the previous match start, so overlapping matches are
/// all reported (`"aa"` in `"aaa"` gives offsets 0 and 1). An empty term yields an empty
/// list; a term that never occurs is `NotFound`.
pub fn perform_search(content: &Content, term: &[u8]) -> Result<SearchMatchList> {
    if term.is_empty() {
        return Ok(SearchMatchList::default());
    }

    let finder = memmem::Finder::new(term);
    let mut matches = Vec::new();
    for (line_idx, line) in content.lines().iter().enumerate() {
        let bytes: &[u8] = line.as_ref();
        let mut pos = 0;
        while pos < bytes.len() {
            let Some(found) = finder.find(&bytes[pos..]) else {
                break;
            };
            let byte_offset = pos + found;
            matches.push(SearchMatch {
                line_idx,
                byte_offset,
            });
            pos = byte_offset + 1;
        }
    }

    if matches.is_empty() {
        return Err(FatError::not_found(format!(
            "pattern '{}' not found",
            String::from_utf8_lossy(term)
        )));
    }
    log::debug!("search found {} matches", matches.len());
    Ok(SearchMatchList::new(matches))
}

/// Non-overlapping occurrences of `term` in `segment` as byte ranges.
///
/// Used for highlighting, where each printed byte belongs to at most one run. A current
/// match that overlaps an earlier occurrence (`aa` at offset 1 of `aaa`) starts inside
/// that occurrence's run, so it is shown highlighted but never bold.
pub fn line_occurrences<'a>(
    segment: &'a [u8],
    term: &'a [u8],
) -> impl Iterator<Item = (usize, usize)> + 'a {
    let len = term.len();
    let iter = (!term.is_empty()).then(|| memmem::find_iter(segment, term));
    iter.into_iter()
        .flatten()
        .map(move |start| (start, start + len))
}
