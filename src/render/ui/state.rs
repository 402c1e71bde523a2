//! Render-ready snapshot of the application
//!
//! The application builds a `ViewState` every frame; the renderer only lays it out. All
//! positions here use the same coordinates as the draw requests they accompany.

use crate::render::protocol::DrawRequest;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen split: metadata pane on the left third, content pane on the rest, and a
/// one-row status bar at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub metadata: Rect,
    pub content: Rect,
    pub status: Rect,
}

impl PaneLayout {
    pub fn split(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(area.width / 3), Constraint::Min(0)])
            .split(rows[0]);
        Self {
            metadata: panes[0],
            content: panes[1],
            status: rows[1],
        }
    }
}

/// Mode tag shown at the left of the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTag {
    Normal,
    Archive,
    Binary,
    Search,
    Command,
}

impl ModeTag {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "[NORMAL]",
            Self::Archive => "[ARCHIVE]",
            Self::Binary => "[BINARY]",
            Self::Search => "[SEARCH]",
            Self::Command => "[COMMAND]",
        }
    }
}

/// Text being edited in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptLine {
    Search(String),
    Command(String),
    JumpToLine(String),
}

/// One positioned piece of the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSegment {
    pub col: u16,
    pub text: String,
    pub bold: bool,
    pub reverse: bool,
}

impl StatusSegment {
    fn plain(col: u16, text: impl Into<String>) -> Self {
        Self {
            col,
            text: text.into(),
            bold: false,
            reverse: false,
        }
    }

    fn bold(col: u16, text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(col, text)
        }
    }
}

/// Status line information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub mode: ModeTag,
    /// Wrap indicator, only meaningful for text views
    pub wrap: bool,
    pub path: String,
    /// Position text, e.g. `Match 2/5 | Line 10/200`
    pub position: String,
    pub prompt: Option<PromptLine>,
    /// Transient message; replaces the whole bar until the next key
    pub message: Option<String>,
}

impl StatusLine {
    pub fn new(mode: ModeTag) -> Self {
        Self {
            mode,
            wrap: false,
            path: String::new(),
            position: String::new(),
            prompt: None,
            message: None,
        }
    }

    /// Lay the bar out for a terminal `width` columns wide; later segments overwrite
    /// earlier ones where they overlap.
    pub fn compose(&self, width: u16) -> Vec<StatusSegment> {
        if let Some(message) = &self.message {
            return vec![StatusSegment::plain(
                1,
                format!("MSG: {} (Press any key)", message),
            )];
        }

        match &self.prompt {
            Some(PromptLine::JumpToLine(buffer)) => {
                return vec![
                    StatusSegment::bold(1, "[GO TO LINE]"),
                    StatusSegment::plain(15, buffer.clone()),
                ];
            }
            Some(PromptLine::Command(buffer)) => {
                return vec![
                    StatusSegment::bold(1, ModeTag::Command.label()),
                    StatusSegment::plain(11, format!("Open with: {}", buffer)),
                ];
            }
            Some(PromptLine::Search(buffer)) => {
                return vec![
                    StatusSegment::bold(1, ModeTag::Search.label()),
                    StatusSegment::plain(9, format!("/{}", buffer)),
                ];
            }
            None => {}
        }

        let mut segments = vec![StatusSegment::bold(1, self.mode.label())];
        if self.wrap {
            segments.push(StatusSegment {
                reverse: true,
                ..StatusSegment::bold(11, " WRAP ")
            });
        }

        let path_room = usize::from(width).saturating_sub(40);
        if path_room > 0 {
            let path: String = self.path.chars().take(path_room).collect();
            segments.push(StatusSegment::plain(19, path));
        }

        let len = self.position.chars().count() as u16;
        if len + 1 <= width {
            segments.push(StatusSegment::plain(width - len - 1, self.position.clone()));
        }
        segments
    }

    /// Cursor column while a prompt is open.
    pub fn cursor_col(&self) -> Option<u16> {
        if self.message.is_some() {
            return None;
        }
        let (col, text_len) = match self.prompt.as_ref()? {
            PromptLine::Search(buffer) => (10, buffer.chars().count()),
            PromptLine::Command(buffer) => (11 + "Open with: ".len(), buffer.chars().count()),
            PromptLine::JumpToLine(buffer) => (15, buffer.chars().count()),
        };
        Some((col + text_len).min(usize::from(u16::MAX)) as u16)
    }
}

/// One row of the help overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpRow {
    pub keys: String,
    pub description: String,
}

/// Modal drawn on top of the panes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Help {
        /// `normal`, `archive` or `binary`
        mode_name: &'static str,
        rows: Vec<HelpRow>,
    },
    ThemeSelector {
        names: Vec<String>,
        selected: usize,
    },
    TooSmall {
        width: u16,
        height: u16,
        min_width: u16,
        min_height: u16,
    },
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// `(label, value)` pairs for the metadata pane
    pub metadata: Vec<(String, String)>,
    /// Content pane draw requests, relative to the pane's inner area
    pub content: Vec<DrawRequest>,
    pub status: StatusLine,
    pub overlay: Option<Overlay>,
}

impl ViewState {
    pub fn new(status: StatusLine) -> Self {
        Self {
            metadata: Vec::new(),
            content: Vec::new(),
            status,
            overlay: None,
        }
    }

    /// Frame that only shows the "terminal too small" notice.
    pub fn too_small(width: u16, height: u16, min_width: u16, min_height: u16) -> Self {
        Self {
            overlay: Some(Overlay::TooSmall {
                width,
                height,
                min_width,
                min_height,
            }),
            ..Self::new(StatusLine::new(ModeTag::Normal))
        }
    }
}

/// Fit `value` into `room` columns, ending with `...` when cut.
pub fn truncate_with_ellipsis(value: &str, room: usize) -> String {
    if value.chars().count() <= room {
        return value.to_string();
    }
    if room <= 3 {
        return String::new();
    }
    let mut cut: String = value.chars().take(room - 4).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_splits_thirds_and_status_row() {
        let layout = PaneLayout::split(Rect::new(0, 0, 90, 30));
        assert_eq!(layout.metadata, Rect::new(0, 0, 30, 29));
        assert_eq!(layout.content, Rect::new(30, 0, 60, 29));
        assert_eq!(layout.status, Rect::new(0, 29, 90, 1));
    }

    #[test]
    fn status_bar_positions() {
        let mut status = StatusLine::new(ModeTag::Normal);
        status.wrap = true;
        status.path = "/tmp/notes.txt".to_string();
        status.position = "Line 3/10".to_string();

        let segments = status.compose(80);
        assert_eq!(segments[0], StatusSegment::bold(1, "[NORMAL]"));
        assert_eq!(segments[1].col, 11);
        assert!(segments[1].reverse);
        assert_eq!(segments[2], StatusSegment::plain(19, "/tmp/notes.txt"));
        assert_eq!(segments[3], StatusSegment::plain(80 - 9 - 1, "Line 3/10"));
    }

    #[test]
    fn long_paths_are_cut_to_fit() {
        let mut status = StatusLine::new(ModeTag::Archive);
        status.path = "x".repeat(100);
        let segments = status.compose(60);
        let path = segments.iter().find(|s| s.col == 19).unwrap();
        assert_eq!(path.text.len(), 20);
    }

    #[test]
    fn prompts_replace_the_bar() {
        let mut status = StatusLine::new(ModeTag::Normal);
        status.position = "Line 1/1".to_string();

        status.prompt = Some(PromptLine::Search("foo".to_string()));
        assert_eq!(
            status.compose(80),
            [
                StatusSegment::bold(1, "[SEARCH]"),
                StatusSegment::plain(9, "/foo")
            ]
        );
        assert_eq!(status.cursor_col(), Some(13));

        status.prompt = Some(PromptLine::Command("vim".to_string()));
        assert_eq!(status.compose(80)[1].text, "Open with: vim");

        status.prompt = Some(PromptLine::JumpToLine("42".to_string()));
        assert_eq!(status.compose(80)[0].text, "[GO TO LINE]");
        assert_eq!(status.cursor_col(), Some(17));

        status.message = Some("No matches found.".to_string());
        assert_eq!(
            status.compose(80),
            [StatusSegment::plain(
                1,
                "MSG: No matches found. (Press any key)"
            )]
        );
        assert_eq!(status.cursor_col(), None);
    }

    #[test]
    fn ellipsis_truncation() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("application/octet-stream", 10), "applic...");
        assert_eq!(truncate_with_ellipsis("abcdef", 3), "");
    }
}
