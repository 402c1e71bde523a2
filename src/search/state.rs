use crate::content::Content;
use crate::error::Result;
use crate::search::{perform_search, SearchMatch, SearchMatchList};
use bstr::{BStr, BString};

/// Search state of the current view.
///
/// `term` is kept after the results are dropped so the next prompt can be pre-filled;
/// highlighting and navigation only apply while results exist.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    term: BString,
    results: SearchMatchList,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a new search, replacing any previous results.
    ///
    /// Returns the first match, `None` for an empty term, or `NotFound` with the results
    /// left cleared.
    pub fn submit(&mut self, content: &Content, term: &[u8]) -> Result<Option<SearchMatch>> {
        self.results.clear();
        self.term = BString::from(term);
        if term.is_empty() {
            return Ok(None);
        }
        self.results = perform_search(content, term)?;
        Ok(self.results.current())
    }

    pub fn is_active(&self) -> bool {
        !self.results.is_empty()
    }

    /// Term of the last submission.
    pub fn term(&self) -> &BStr {
        BStr::new(&self.term)
    }

    /// Term to highlight, only while results exist.
    pub fn active_term(&self) -> Option<&[u8]> {
        self.is_active().then(|| self.term.as_slice())
    }

    pub fn results(&self) -> &SearchMatchList {
        &self.results
    }

    pub fn current(&self) -> Option<SearchMatch> {
        self.results.current()
    }

    /// `(1-based index, total)` of the current match.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.is_active()
            .then(|| (self.results.current_index() + 1, self.results.len()))
    }

    pub fn next_match(&mut self) -> Result<SearchMatch> {
        self.results.next_match()
    }

    pub fn prev_match(&mut self) -> Result<SearchMatch> {
        self.results.prev_match()
    }

    /// Drop results; the term stays available for the prompt.
    pub fn clear(&mut self) {
        self.results.clear();
    }

    /// Forget the term as well, used when leaving a file.
    pub fn reset(&mut self) {
        self.results.clear();
        self.term.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FatError;

    #[test]
    fn submit_then_cycle() {
        let content: Content = ["xfoofoo", "bar"].into_iter().collect();
        let mut state = SearchState::new();

        let first = state.submit(&content, b"foo").unwrap().unwrap();
        assert_eq!(first.byte_offset, 1);
        assert_eq!(state.position(), Some((1, 2)));
        assert_eq!(state.active_term(), Some(&b"foo"[..]));

        state.next_match().unwrap();
        assert_eq!(state.position(), Some((2, 2)));
        assert_eq!(state.next_match().unwrap(), first);
    }

    #[test]
    fn failed_search_leaves_results_cleared() {
        let content: Content = ["alpha"].into_iter().collect();
        let mut state = SearchState::new();
        state.submit(&content, b"al").unwrap();
        assert!(state.is_active());

        let err = state.submit(&content, b"zeta").unwrap_err();
        assert!(matches!(err, FatError::NotFound { .. }));
        assert!(!state.is_active());
        assert_eq!(state.term(), "zeta");
        assert!(state.active_term().is_none());
    }

    #[test]
    fn empty_term_clears() {
        let content: Content = ["alpha"].into_iter().collect();
        let mut state = SearchState::new();
        state.submit(&content, b"a").unwrap();
        assert_eq!(state.submit(&content, b"").unwrap(), None);
        assert!(!state.is_active());
        assert!(matches!(
            state.next_match(),
            Err(FatError::Unsupported { .. })
        ));
    }
}
