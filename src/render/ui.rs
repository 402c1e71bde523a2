//! Terminal rendering components.
//!
//! This module hosts the concrete terminal UI implementation along with the supporting view/state
//! structures and styling utilities.

pub mod renderer;
pub mod state;
pub mod terminal;
pub mod theme;

pub use renderer::{SuspendGuard, UIRenderer};
pub use state::{HelpRow, ModeTag, Overlay, PaneLayout, PromptLine, StatusLine, ViewState};
pub use terminal::TerminalUI;
pub use theme::{ColorTheme, ThemeCatalog};

#[cfg(test)]
pub use renderer::tests::MockUIRenderer;
