//! Draw requests exchanged between the content pipeline and the terminal renderer.

/// Text attributes of a draw request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextAttrs {
    /// Part of the active (cursor) line.
    pub reverse: bool,
    /// Inside a search match.
    pub highlight: bool,
    /// Inside the current search match.
    pub bold: bool,
}

impl TextAttrs {
    pub fn reversed(reverse: bool) -> Self {
        Self {
            reverse,
            ..Self::default()
        }
    }
}

/// Columns taken by the line-number gutter inside the content pane's border.
pub const GUTTER_COLS: u16 = 6;

/// One styled run of text, positioned relative to the content pane's inner area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRequest {
    pub row: u16,
    pub col: u16,
    pub text: String,
    pub attrs: TextAttrs,
}

impl DrawRequest {
    pub fn new(row: u16, col: u16, text: impl Into<String>, attrs: TextAttrs) -> Self {
        Self {
            row,
            col,
            text: text.into(),
            attrs,
        }
    }

    /// Line numbers and continuation indents.
    pub fn is_gutter(&self) -> bool {
        self.col < GUTTER_COLS
    }
}
