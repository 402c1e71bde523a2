//! # fat - File & Archive Tool
//!
//! A terminal viewer for text files, hex dumps and archive listings, with the ability to
//! dive into nested archives and come back out through a breadcrumb history.
//!
//! ## Features
//!
//! - **Text view**: line numbers, wrapping or horizontal scrolling, literal search with
//!   overlapping matches
//! - **Hex view**: 16-byte rows with an ASCII column for binary files
//! - **Archives**: gzip, zstd, tar and zip handlers bundled; more through native plugin
//!   modules loaded at startup
//! - **Terminal UI**: metadata pane, themes, configurable key bindings
//!
//! ## Architecture
//!
//! The library is organized into focused modules:
//!
//! - [`error`] - Centralized error types and handling
//! - [`utf8`] - Byte-level UTF-8 cursor helpers
//! - [`content`] - Content sources: text lines, hex dumps, MIME detection, metadata
//! - [`plugin`] / [`plugins`] - Archive handler interface, registry and bundled handlers
//! - [`search`] - Literal search and match cycling
//! - [`render`] - Content pipeline and the terminal user interface
//! - [`input`] - Key reading and key bindings
//! - [`config`] - User configuration
//! - [`app`] - Navigation state machine and application loop

// Core modules
pub mod error;
pub mod utf8;

// Content and format handling
pub mod content;
pub mod plugin;
pub mod plugins;

// Subsystems
pub mod config;
pub mod input;
pub mod render;
pub mod search;

// Core components
pub mod app;

// Re-export commonly used types for convenience
pub use error::{FatError, Result};

// Public API surface for external usage
pub use app::{AppState, Application, ForceViewMode, ViewMode, ViewPolicy};
pub use content::Content;
pub use plugin::{ArchivePlugin, PluginRegistry};
pub use search::{SearchMatch, SearchState};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
