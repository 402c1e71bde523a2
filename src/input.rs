//! Input subsystem.
//!
//! Terminal events flow through three layers:
//!
//! - [`raw`] reads events from an [`EventSource`] and coalesces mouse wheel ticks
//! - [`service`] maps keys to [`Action`]s and resolves the `g` prefix
//! - [`editor`] edits prompt text one key at a time

pub mod editor;
pub mod raw;
pub mod service;

// Public re-exports for convenience. Modules outside this crate should prefer importing
// from `crate::input` rather than reaching into submodules.
pub use editor::{EditOutcome, LineEditor};
pub use raw::{CrosstermEvents, EventSource, ScriptedEvents, ScrollDirection};
pub use service::{parse_key, Action, InputEvent, InputService, KeyMap, ACTIONS};
