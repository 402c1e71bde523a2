//! Single-line editor behind the search, command and jump-to-line prompts.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of feeding one key to a [`LineEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Editing,
    Submit(String),
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    buffer: String,
    digits_only: bool,
}

impl LineEditor {
    /// Editor pre-filled with `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            buffer: initial.into(),
            digits_only: false,
        }
    }

    /// Editor that only accepts ASCII digits.
    pub fn numeric() -> Self {
        Self {
            buffer: String::new(),
            digits_only: true,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> EditOutcome {
        match key.code {
            KeyCode::Enter => EditOutcome::Submit(std::mem::take(&mut self.buffer)),
            KeyCode::Esc => EditOutcome::Cancel,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                EditOutcome::Cancel
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                EditOutcome::Editing
            }
            KeyCode::Char(ch)
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let accepted = if self.digits_only {
                    ch.is_ascii_digit()
                } else {
                    !ch.is_control()
                };
                if accepted {
                    self.buffer.push(ch);
                }
                EditOutcome::Editing
            }
            _ => EditOutcome::Editing,
        }
    }
}
