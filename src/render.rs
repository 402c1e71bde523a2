//! Rendering subsystem.
//!
//! [`pipeline`] turns the current view into [`protocol::DrawRequest`]s for the content
//! pane; [`ui`] lays those out on the terminal together with the metadata pane, the
//! status bar and the modal overlays.

pub mod pipeline;
pub mod protocol;
pub mod ui;

pub use pipeline::{render_content, RenderInput};
pub use protocol::{DrawRequest, TextAttrs};
