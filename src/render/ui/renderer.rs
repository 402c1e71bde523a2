//! UI renderer trait
//!
//! This module defines the `UIRenderer` trait for drawing frames and managing terminal
//! lifecycle hooks such as initialization, cleanup and temporary release for external
//! commands.

use crate::error::Result;
use crate::render::ui::state::ViewState;
use crate::render::ui::theme::ColorTheme;

/// Core trait for UI rendering
pub trait UIRenderer {
    /// Render one frame
    ///
    /// This method should:
    /// - Draw the metadata pane, content pane and status bar from the view state
    /// - Draw the overlay, if any, on top of the panes
    /// - Place the cursor when a prompt is open
    fn render(&mut self, view_state: &ViewState) -> Result<()>;

    /// Initialize the terminal UI
    ///
    /// This method should:
    /// - Set up raw mode
    /// - Enter the alternate screen
    /// - Hide cursor
    fn initialize(&mut self) -> Result<()>;

    /// Clean up and restore terminal state
    ///
    /// This method should:
    /// - Restore cursor
    /// - Leave the alternate screen
    /// - Exit raw mode
    fn cleanup(&mut self) -> Result<()>;

    /// Hand the terminal to a child process
    fn suspend(&mut self) -> Result<()>;

    /// Take the terminal back after [`UIRenderer::suspend`] and force a full repaint
    fn resume(&mut self) -> Result<()>;

    /// Use `theme` for subsequent frames
    fn set_theme(&mut self, theme: ColorTheme);

    /// Get current terminal dimensions
    fn get_terminal_size(&self) -> Result<(u16, u16)>; // (width, height)
}

/// Keeps the terminal released while alive; restores it on drop.
pub struct SuspendGuard<'a> {
    renderer: &'a mut dyn UIRenderer,
}

impl<'a> SuspendGuard<'a> {
    pub fn new(renderer: &'a mut dyn UIRenderer) -> Result<Self> {
        renderer.suspend()?;
        Ok(Self { renderer })
    }
}

impl Drop for SuspendGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.renderer.resume() {
            log::error!("failed to restore terminal: {}", err);
        }
    }
}
