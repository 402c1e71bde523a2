//! Terminal UI implementation using ratatui
//!
//! This module provides the concrete implementation of UIRenderer using ratatui with the
//! crossterm backend. It only lays out a prepared `ViewState`; deciding what is shown is
//! the application's job.

use crate::error::Result;
use crate::render::protocol::DrawRequest;
use crate::render::ui::state::{
    truncate_with_ellipsis, HelpRow, Overlay, PaneLayout, StatusLine, ViewState,
};
use crate::render::ui::{ColorTheme, UIRenderer};
use ratatui::crossterm::{
    cursor::{Hide, Show},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{block::Title, Block, Borders, Clear},
    Frame, Terminal,
};
use std::io::{self, Stdout};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Terminal UI implementation with ratatui backend
pub struct TerminalUI {
    terminal: Option<CrosstermTerminal>,
    theme: ColorTheme,
}

/// Write `text` at (`col`, `row`) inside `area`, clipped to the area's right edge.
fn put(buf: &mut Buffer, area: Rect, col: u16, row: u16, text: &str, style: Style) {
    if col >= area.width || row >= area.height {
        return;
    }
    buf.set_stringn(
        area.x + col,
        area.y + row,
        text,
        usize::from(area.width - col),
        style,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

impl TerminalUI {
    /// Create a new terminal UI instance with the default theme
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: None,
            theme: ColorTheme::default(),
        })
    }

    /// Create terminal UI with custom theme
    pub fn with_theme(theme: ColorTheme) -> Result<Self> {
        Ok(Self {
            terminal: None,
            theme,
        })
    }

    fn draw_frame(frame: &mut Frame, view_state: &ViewState, theme: &ColorTheme) {
        let size = frame.size();

        if let Some(Overlay::TooSmall {
            width,
            height,
            min_width,
            min_height,
        }) = &view_state.overlay
        {
            frame.render_widget(Clear, size);
            Self::draw_too_small(frame.buffer_mut(), size, *width, *height, *min_width, *min_height);
            return;
        }

        let layout = PaneLayout::split(size);
        Self::draw_metadata(frame, layout.metadata, &view_state.metadata, theme);
        Self::draw_content(frame, layout.content, &view_state.content, theme);
        Self::draw_status(frame.buffer_mut(), layout.status, &view_state.status, theme);

        match &view_state.overlay {
            Some(Overlay::Help { mode_name, rows }) => Self::draw_help(frame, mode_name, rows, theme),
            Some(Overlay::ThemeSelector { names, selected }) => {
                Self::draw_theme_selector(frame, names, *selected, theme)
            }
            _ => {
                if let Some(col) = view_state.status.cursor_col() {
                    if col < layout.status.width {
                        frame.set_cursor(layout.status.x + col, layout.status.y);
                    }
                }
            }
        }
    }

    fn pane_block(theme: &ColorTheme) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border)
    }

    fn draw_metadata(frame: &mut Frame, area: Rect, metadata: &[(String, String)], theme: &ColorTheme) {
        frame.render_widget(Self::pane_block(theme), area);
        let buf = frame.buffer_mut();
        let title_style = theme.title.add_modifier(Modifier::BOLD);

        put(buf, area, 2, 1, "File Info", title_style);
        if area.width > 2 {
            let rule = "─".repeat(usize::from(area.width - 2));
            put(buf, area, 1, 2, &rule, title_style);
        }

        for (i, (label, value)) in metadata.iter().enumerate() {
            let row = i as u16 + 4;
            if row >= area.height.saturating_sub(1) {
                break;
            }
            let label_text = format!("{}:", label);
            put(buf, area, 2, row, &label_text, theme.metadata_label);

            let value_col = 2 + label_text.chars().count();
            let room = usize::from(area.width).saturating_sub(value_col + 2);
            if room == 0 {
                continue;
            }
            let value = truncate_with_ellipsis(value, room);
            put(buf, area, value_col as u16, row, &format!(" {}", value), Style::default());
        }
    }

    fn request_style(request: &DrawRequest, theme: &ColorTheme) -> Style {
        let mut style = if request.is_gutter() {
            theme.line_num
        } else {
            Style::default()
        };
        if request.attrs.highlight {
            style = style.patch(theme.search_highlight);
        }
        if request.attrs.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if request.attrs.reverse {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    }

    fn draw_content(frame: &mut Frame, area: Rect, requests: &[DrawRequest], theme: &ColorTheme) {
        let version = Title::from(Span::styled(
            format!(" {} ", crate::VERSION),
            theme.title.add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right);
        let block = Self::pane_block(theme).title(version);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let buf = frame.buffer_mut();
        for request in requests {
            put(
                buf,
                inner,
                request.col,
                request.row,
                &request.text,
                Self::request_style(request, theme),
            );
        }
    }

    fn draw_status(buf: &mut Buffer, area: Rect, status: &StatusLine, theme: &ColorTheme) {
        buf.set_style(area, theme.statusbar);
        for segment in status.compose(area.width) {
            let mut style = theme.statusbar;
            if segment.bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            if segment.reverse {
                style = style.add_modifier(Modifier::REVERSED);
            }
            put(buf, area, segment.col, 0, &segment.text, style);
        }
    }

    fn modal(frame: &mut Frame, area: Rect, theme: &ColorTheme) {
        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.help_border)
                .style(theme.statusbar),
            area,
        );
    }

    fn draw_help(frame: &mut Frame, mode_name: &str, rows: &[HelpRow], theme: &ColorTheme) {
        let screen = frame.size();
        let key_width = rows.iter().map(|r| r.keys.chars().count()).max().unwrap_or(0);
        let height = (rows.len() as u16 + 4).min(screen.height.saturating_sub(2));
        let width = (key_width as u16 + 45).min(screen.width.saturating_sub(2));
        let area = centered(screen, width, height);
        Self::modal(frame, area, theme);

        let buf = frame.buffer_mut();
        let title = format!("Keybindings ({} mode)", mode_name);
        let title_col = area.width.saturating_sub(title.len() as u16) / 2;
        put(buf, area, title_col, 1, &title, theme.statusbar.add_modifier(Modifier::BOLD));

        let key_style = theme.statusbar.patch(theme.help_key).add_modifier(Modifier::BOLD);
        for (i, row) in rows.iter().enumerate() {
            let y = i as u16 + 2;
            if y >= area.height.saturating_sub(1) {
                break;
            }
            let keys = format!("{:<width$}", row.keys, width = key_width);
            put(buf, area, 3, y, &keys, key_style);
            let desc = format!(" : {}", row.description);
            put(buf, area, 3 + key_width as u16, y, &desc, theme.statusbar);
        }

        let footer = "Press any key to close";
        put(
            buf,
            area,
            area.width.saturating_sub(21) / 2,
            area.height.saturating_sub(2),
            footer,
            theme.statusbar,
        );
    }

    fn draw_theme_selector(frame: &mut Frame, names: &[String], selected: usize, theme: &ColorTheme) {
        let screen = frame.size();
        let wanted = if names.len() < 10 { names.len() as u16 + 4 } else { 14 };
        let height = wanted.min(screen.height.saturating_sub(4));
        let area = centered(screen, 40, height);
        Self::modal(frame, area, theme);

        let buf = frame.buffer_mut();
        put(buf, area, area.width.saturating_sub(13) / 2, 1, "Select Theme", theme.statusbar);

        let visible = usize::from(area.height.saturating_sub(3)).max(1);
        let offset = (selected + 1).saturating_sub(visible);
        for (row, (idx, name)) in names.iter().enumerate().skip(offset).take(visible).enumerate() {
            let mut style = theme.statusbar;
            if idx == selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let room = usize::from(area.width.saturating_sub(4));
            let label: String = name.chars().take(room).collect();
            put(buf, area, 2, row as u16 + 2, &label, style);
        }
    }

    fn draw_too_small(
        buf: &mut Buffer,
        area: Rect,
        width: u16,
        height: u16,
        min_width: u16,
        min_height: u16,
    ) {
        if area.width < 45 {
            return;
        }
        let lines = [
            (area.height / 2).saturating_sub(1),
            area.height / 2,
            area.height.saturating_sub(2),
        ];
        let texts = [
            "Terminal is too small.".to_string(),
            format!(
                "Current: {}x{}, Required: {}x{}",
                width, height, min_width, min_height
            ),
            "Resize window or press 'q' to quit.".to_string(),
        ];
        for (row, text) in lines.into_iter().zip(texts.iter()) {
            let col = area.width.saturating_sub(text.len() as u16) / 2;
            put(buf, area, col, row, text, Style::default());
        }
    }
}

impl UIRenderer for TerminalUI {
    fn render(&mut self, view_state: &ViewState) -> Result<()> {
        if let Some(ref mut terminal) = self.terminal {
            // Extract theme before closure to avoid borrowing issues
            let theme = &self.theme;
            terminal.draw(|frame| Self::draw_frame(frame, view_state, theme))?;
        }
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        self.terminal = Some(terminal);

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show)?;
            self.terminal = None;
        }
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show)?;
            disable_raw_mode()?;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if let Some(ref mut terminal) = self.terminal {
            enable_raw_mode()?;
            execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture, Hide)?;
            terminal.clear()?;
        }
        Ok(())
    }

    fn set_theme(&mut self, theme: ColorTheme) {
        self.theme = theme;
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        let (cols, rows) = ratatui::crossterm::terminal::size()?;
        Ok((cols, rows))
    }
}

impl Drop for TerminalUI {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::protocol::TextAttrs;
    use crate::render::ui::state::{ModeTag, StatusLine};
    use ratatui::backend::TestBackend;
    use ratatui::style::Color;

    fn draw(view_state: &ViewState, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let theme = ColorTheme::default();
        terminal
            .draw(|frame| TerminalUI::draw_frame(frame, view_state, &theme))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn row_text_from(buf: &Buffer, x0: u16, y: u16) -> String {
        (x0..buf.area.width)
            .map(|x| buf.get(x, y).symbol().to_string())
            .collect()
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        row_text_from(buf, 0, y)
    }

    #[test]
    fn test_terminal_ui_creation() {
        let ui = TerminalUI::new().unwrap();
        assert!(ui.terminal.is_none());
        assert_eq!(ui.theme.statusbar.bg, Some(Color::Blue));

        let ui = TerminalUI::with_theme(ColorTheme::monochrome()).unwrap();
        assert_eq!(ui.theme.name, "monochrome");
    }

    #[test]
    fn panes_and_status_are_drawn() {
        let mut status = StatusLine::new(ModeTag::Normal);
        status.path = "/tmp/a.txt".to_string();
        status.position = "Line 1/1".to_string();
        let mut view = ViewState::new(status);
        view.metadata = vec![("File".to_string(), "a.txt".to_string())];
        view.content = vec![
            DrawRequest::new(0, 0, "    1 ", TextAttrs::reversed(true)),
            DrawRequest::new(0, 6, "hello", TextAttrs::reversed(true)),
        ];

        let buf = draw(&view, 90, 24);
        assert!(row_text(&buf, 1).contains("File Info"));
        assert!(row_text(&buf, 4).contains("File: a.txt"));
        // content pane starts at column 30; inner area one further in
        assert!(row_text_from(&buf, 30, 1).contains("    1 hello"));
        let cell = buf.get(37, 1);
        assert!(cell.modifier.contains(Modifier::REVERSED));
        assert!(row_text(&buf, 23).starts_with(" [NORMAL]"));
        assert!(row_text(&buf, 23).trim_end().ends_with("Line 1/1"));
    }

    #[test]
    fn too_small_notice_replaces_everything() {
        let view = ViewState::too_small(50, 10, 80, 20);
        let buf = draw(&view, 50, 10);
        assert!(row_text(&buf, 4).contains("Terminal is too small."));
        assert!(row_text(&buf, 5).contains("Current: 50x10, Required: 80x20"));
        assert!(row_text(&buf, 8).contains("press 'q' to quit"));
    }

    #[test]
    fn help_overlay_lists_rows() {
        let mut view = ViewState::new(StatusLine::new(ModeTag::Archive));
        view.overlay = Some(Overlay::Help {
            mode_name: "archive",
            rows: vec![HelpRow {
                keys: "Enter".to_string(),
                description: "Open the selected entry".to_string(),
            }],
        });
        let buf = draw(&view, 100, 30);
        let text: Vec<String> = (0..30).map(|y| row_text(&buf, y)).collect();
        assert!(text.iter().any(|l| l.contains("Keybindings (archive mode)")));
        assert!(text.iter().any(|l| l.contains("Enter : Open the selected entry")));
        assert!(text.iter().any(|l| l.contains("Press any key to close")));
    }
}
