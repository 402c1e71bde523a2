//! Turns content plus view state into positioned draw requests for the content pane.
//!
//! Geometry follows the bordered pane: the outer width includes both border columns, a
//! 6-column gutter (`"{:>5} "`) precedes the text, so the text area is `width - 8`
//! columns wide and `height - 2` rows tall. Columns are counted in characters.

use crate::content::Content;
use crate::render::protocol::{DrawRequest, TextAttrs, GUTTER_COLS};
use crate::search::{line_occurrences, SearchMatch, SearchState};
use crate::utf8::{byte_offset_of_char, char_count, char_count_until, char_len, take_chars};

/// Line-number area plus the left border.
pub const LINE_NUMBER_WIDTH: usize = 7;

/// View state the pipeline reads.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub content: &'a Content,
    pub top_line: usize,
    /// Horizontal scroll, in characters.
    pub left_char: usize,
    pub wrap: bool,
    pub search: Option<&'a SearchState>,
}

/// Width available to text in a content pane of `pane_width` outer columns.
pub fn content_width(pane_width: u16) -> usize {
    usize::from(pane_width).saturating_sub(LINE_NUMBER_WIDTH + 1)
}

/// Rows available to text in a content pane of `pane_height` outer rows.
pub fn content_rows(pane_height: u16) -> usize {
    usize::from(pane_height).saturating_sub(2)
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

/// Where the wrap segment starting at byte `start` ends.
///
/// Returns `(chars, end, next)`: the segment covers `line[start..end]` (`chars` characters)
/// and the following segment starts at `next`. A full-width segment with more text after
/// it breaks at its last whitespace when that lies past the middle of the row; the
/// whitespace itself is dropped.
pub fn wrap_break(line: &[u8], start: usize, width: usize) -> (usize, usize, usize) {
    let rest = &line[start..];
    let (chars, bytes) = take_chars(rest, width);
    let end = start + bytes;
    if end >= line.len() || chars < width {
        return (chars, end, end);
    }

    let mut last_space = None;
    let mut pos = start;
    let mut idx = 0;
    while pos < end {
        if is_space(line[pos]) {
            last_space = Some((pos, idx));
        }
        pos += char_len(&line[pos..]).max(1);
        idx += 1;
    }

    match last_space {
        Some((space_pos, space_idx)) if space_idx > width / 2 => {
            let next = space_pos + char_len(&line[space_pos..]).max(1);
            (space_idx, space_pos, next)
        }
        _ => (chars, end, end),
    }
}

/// Horizontal scroll that keeps `current` fully inside the text area.
fn effective_left(
    line: &[u8],
    left: usize,
    width: usize,
    current: SearchMatch,
    term: &[u8],
) -> usize {
    let match_col = char_count_until(line, current.byte_offset);
    let term_chars = char_count(term);
    let mut left = left.min(match_col);
    if match_col + term_chars > left + width {
        left = (match_col + term_chars).saturating_sub(width);
    }
    left
}

struct Highlight<'a> {
    term: &'a [u8],
    current: Option<SearchMatch>,
}

/// Accumulates the runs of one screen row.
struct RowWriter<'o> {
    out: &'o mut Vec<DrawRequest>,
    row: u16,
    col: usize,
    width: usize,
    reverse: bool,
}

impl RowWriter<'_> {
    fn push(&mut self, bytes: &[u8], highlight: bool, bold: bool) {
        if bytes.is_empty() || self.col >= self.width {
            return;
        }
        let (chars, len) = take_chars(bytes, self.width - self.col);
        let attrs = TextAttrs {
            reverse: self.reverse,
            highlight,
            bold,
        };
        self.out.push(DrawRequest::new(
            self.row,
            GUTTER_COLS + self.col as u16,
            String::from_utf8_lossy(&bytes[..len]),
            attrs,
        ));
        self.col += chars;
    }

    /// Write `line[start..end]`, splitting it into plain and highlighted runs.
    fn segment(
        &mut self,
        line: &[u8],
        line_idx: usize,
        start: usize,
        end: usize,
        highlight: Option<&Highlight<'_>>,
    ) {
        let mut pos = start;
        if let Some(hl) = highlight {
            // scan from the segment start; a match is drawn if it begins inside the segment
            for (s, e) in line_occurrences(&line[start..], hl.term) {
                let (s, e) = (start + s, (start + e).min(end));
                if s >= end {
                    break;
                }
                self.push(&line[pos..s], false, false);
                let is_current = hl.current
                    == Some(SearchMatch {
                        line_idx,
                        byte_offset: s,
                    });
                self.push(&line[s..e], true, is_current);
                pos = e;
            }
        }
        if pos < end {
            self.push(&line[pos..end], false, false);
        }
    }
}

/// Produce the draw requests for the content pane of `pane_width` x `pane_height`.
///
/// The line at `top_line` is the active line and every request on its rows is reversed.
pub fn render_content(
    input: &RenderInput<'_>,
    pane_width: u16,
    pane_height: u16,
) -> Vec<DrawRequest> {
    let width = content_width(pane_width);
    let rows = content_rows(pane_height);
    let mut out = Vec::new();
    if width < 1 {
        return out;
    }

    let highlight = input.search.and_then(|s| {
        s.active_term().map(|term| Highlight {
            term,
            current: s.current(),
        })
    });

    let mut row = 0usize;
    let mut line_idx = input.top_line;
    while line_idx < input.content.len() && row < rows {
        let active = line_idx == input.top_line;
        let line: &[u8] = input.content.lines()[line_idx].as_ref();

        out.push(DrawRequest::new(
            row as u16,
            0,
            format!("{:>5} ", line_idx + 1),
            TextAttrs::reversed(active),
        ));

        if input.wrap {
            let mut start = 0;
            loop {
                let (_, end, next) = wrap_break(line, start, width);
                let mut writer = RowWriter {
                    out: &mut out,
                    row: row as u16,
                    col: 0,
                    width,
                    reverse: active,
                };
                writer.segment(line, line_idx, start, end, highlight.as_ref());
                row += 1;
                start = next;
                if start >= line.len() || row >= rows {
                    break;
                }
                out.push(DrawRequest::new(
                    row as u16,
                    0,
                    " ".repeat(usize::from(GUTTER_COLS)),
                    TextAttrs::reversed(active),
                ));
            }
        } else {
            let mut left = input.left_char;
            if let Some(hl) = &highlight {
                if let Some(current) = hl.current.filter(|m| m.line_idx == line_idx) {
                    left = effective_left(line, left, width, current, hl.term);
                }
            }
            let start = byte_offset_of_char(line, left);
            let mut writer = RowWriter {
                out: &mut out,
                row: row as u16,
                col: 0,
                width,
                reverse: active,
            };
            writer.segment(line, line_idx, start, line.len(), highlight.as_ref());
            row += 1;
        }
        line_idx += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(lines: &[&str]) -> Content {
        lines.iter().copied().collect()
    }

    fn input<'a>(
        content: &'a Content,
        wrap: bool,
        search: Option<&'a SearchState>,
    ) -> RenderInput<'a> {
        RenderInput {
            content,
            top_line: 0,
            left_char: 0,
            wrap,
            search,
        }
    }

    fn text_rows(requests: &[DrawRequest]) -> Vec<(u16, String)> {
        let mut rows: Vec<(u16, String)> = Vec::new();
        for req in requests.iter().filter(|r| !r.is_gutter()) {
            match rows.last_mut() {
                Some((row, text)) if *row == req.row => text.push_str(&req.text),
                _ => rows.push((req.row, req.text.clone())),
            }
        }
        rows
    }

    #[test]
    fn wrap_prefers_whitespace_past_midpoint() {
        let line = format!("{} {}", "a".repeat(18), "b".repeat(10));
        let (chars, end, next) = wrap_break(line.as_bytes(), 0, 20);
        assert_eq!((chars, end, next), (18, 18, 19));
    }

    #[test]
    fn wrap_breaks_hard_without_whitespace() {
        let line = "c".repeat(30);
        assert_eq!(wrap_break(line.as_bytes(), 0, 20), (20, 20, 20));

        // whitespace too early in the row is ignored
        let early = format!("{} {}", "a".repeat(5), "b".repeat(30));
        assert_eq!(wrap_break(early.as_bytes(), 0, 20), (20, 20, 20));
    }

    #[test]
    fn wrap_counts_characters_not_bytes() {
        let line = "é".repeat(25);
        let (chars, end, _) = wrap_break(line.as_bytes(), 0, 20);
        assert_eq!(chars, 20);
        assert_eq!(end, 40);
    }

    #[test]
    fn gutter_and_active_line() {
        let text = content(&["first", "second"]);
        let requests = render_content(&input(&text, false, None), 40, 10);

        assert_eq!(requests[0], DrawRequest::new(0, 0, "    1 ", TextAttrs::reversed(true)));
        assert_eq!(requests[1].col, GUTTER_COLS);
        assert!(requests[1].attrs.reverse);
        let second_gutter = requests.iter().find(|r| r.row == 1 && r.is_gutter()).unwrap();
        assert_eq!(second_gutter.text, "    2 ");
        assert!(!second_gutter.attrs.reverse);
    }

    #[test]
    fn wrapped_lines_get_blank_gutters() {
        let text = content(&["abcdefghijklmnop"]);
        // width 18 leaves 10 text columns
        let requests = render_content(&input(&text, true, None), 18, 10);
        assert_eq!(
            text_rows(&requests),
            [(0, "abcdefghij".to_string()), (1, "klmnop".to_string())]
        );
        let continuation = requests.iter().find(|r| r.row == 1 && r.is_gutter()).unwrap();
        assert_eq!(continuation.text, "      ");
        assert!(continuation.attrs.reverse);
    }

    #[test]
    fn rows_are_limited_by_pane_height() {
        let lines: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
        let text: Content = lines.iter().map(String::as_str).collect();
        let requests = render_content(&input(&text, false, None), 40, 6);
        assert_eq!(text_rows(&requests).len(), 4);
    }

    #[test]
    fn empty_content_and_tiny_panes_render_nothing() {
        let empty = Content::empty();
        assert!(render_content(&input(&empty, true, None), 80, 24).is_empty());

        let text = content(&["hello"]);
        assert!(render_content(&input(&text, false, None), 8, 24).is_empty());
    }

    #[test]
    fn empty_line_still_takes_a_row() {
        let text = content(&["", "next"]);
        let requests = render_content(&input(&text, true, None), 40, 10);
        assert_eq!(text_rows(&requests), [(1, "next".to_string())]);
        assert!(requests.iter().any(|r| r.row == 0 && r.text == "    1 "));
    }

    #[test]
    fn scroll_mode_skips_left_characters() {
        let text = content(&["0123456789"]);
        let mut view = input(&text, false, None);
        view.left_char = 4;
        let requests = render_content(&view, 40, 10);
        assert_eq!(text_rows(&requests), [(0, "456789".to_string())]);
    }

    #[test]
    fn search_overlay_marks_current_match_bold() {
        let text = content(&["xfoofoo", "bar"]);
        let mut search = SearchState::new();
        search.submit(&text, b"foo").unwrap();

        let requests = render_content(&input(&text, false, Some(&search)), 40, 10);
        let hits: Vec<&DrawRequest> = requests.iter().filter(|r| r.attrs.highlight).collect();
        assert_eq!(hits.len(), 2);
        assert_eq!((hits[0].col, hits[0].attrs.bold), (GUTTER_COLS + 1, true));
        assert_eq!((hits[1].col, hits[1].attrs.bold), (GUTTER_COLS + 4, false));
    }

    #[test]
    fn scroll_mode_pulls_current_match_into_view() {
        let line = format!("{}needle", "x".repeat(40));
        let text = content(&[line.as_str()]);
        let mut search = SearchState::new();
        search.submit(&text, b"needle").unwrap();

        // 10 text columns; the match ends at column 46
        let requests = render_content(&input(&text, false, Some(&search)), 18, 10);
        let hit = requests.iter().find(|r| r.attrs.highlight).unwrap();
        assert_eq!(hit.text, "needle");
        assert_eq!(hit.col, GUTTER_COLS + 4);
    }

    #[test]
    fn match_straddling_wrap_point_is_clipped() {
        let text = content(&["abcdefghifoo"]);
        let mut search = SearchState::new();
        search.submit(&text, b"ifoo").unwrap();

        let requests = render_content(&input(&text, true, Some(&search)), 18, 10);
        let hits: Vec<&DrawRequest> = requests.iter().filter(|r| r.attrs.highlight).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "if");
        assert_eq!(hits[0].row, 0);
    }

    #[test]
    fn overlapping_current_match_is_highlighted_not_bold() {
        let text = content(&["aaa"]);
        let mut search = SearchState::new();
        search.submit(&text, b"aa").unwrap();
        search.next_match().unwrap();
        assert_eq!(search.current().unwrap().byte_offset, 1);

        let requests = render_content(&input(&text, false, Some(&search)), 40, 10);
        let hits: Vec<&DrawRequest> = requests.iter().filter(|r| r.attrs.highlight).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].text.as_str(), hits[0].col), ("aa", GUTTER_COLS));
        assert!(!hits[0].attrs.bold);
    }
}
