//! Error types and handling infrastructure for fat.
//!
//! Every fallible operation in the library returns [`Result`], whose error side is the
//! closed [`FatError`] taxonomy. Nothing here aborts: the state machine turns errors into
//! status-bar messages and keeps running, and only the binary converts them into
//! `anyhow` errors at process start.
//!
//! ## Design Principles
//!
//! - **User-friendly messages**: every variant maps to a short status-bar message
//! - **Context preservation**: paths and io sources are kept for the log file
//! - **Closed set**: callers can match exhaustively on outcome kinds

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fat operations.
#[derive(Error, Debug)]
pub enum FatError {
    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Generic { message: String },

    /// Allocation failure reported by the OS or a reader
    #[error("Out of memory: {message}")]
    OutOfMemory { message: String },

    /// File not found specifically (common case for user feedback)
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Reading a file failed after it was opened
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a file (usually an extraction temp file) failed
    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid command line arguments or API input
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A plugin module could not be opened or registered
    #[error("Plugin load failed for {path}: {message}")]
    PluginLoad { path: PathBuf, message: String },

    /// A theme file could not be read or parsed
    #[error("Theme load failed for {path}: {message}")]
    ThemeLoad { path: PathBuf, message: String },

    /// An archive handler failed to list or extract
    #[error("Archive error: {message}")]
    ArchiveError { message: String },

    /// The requested operation is not available in the current state
    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    /// A lookup came back empty (no search matches, nothing to go back to)
    #[error("{message}")]
    NotFound { message: String },
}

/// Standard Result type for fat operations.
pub type Result<T> = std::result::Result<T, FatError>;

impl FatError {
    /// Create a Generic error with a descriptive message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Create a FileRead error from an io::Error, promoting NotFound to FileNotFound
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            std::io::ErrorKind::OutOfMemory => Self::OutOfMemory {
                message: format!("reading {}", path.display()),
            },
            _ => Self::FileRead { path, source },
        }
    }

    /// Create a FileWrite error from an io::Error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn plugin_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PluginLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn theme_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ThemeLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an ArchiveError with a descriptive message
    pub fn archive(message: impl Into<String>) -> Self {
        Self::ArchiveError {
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Short message shown in the status bar.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Generic { .. } => "An unknown error occurred.",
            Self::OutOfMemory { .. } => "Memory allocation failed.",
            Self::FileNotFound { .. } => "File or directory not found.",
            Self::FileRead { .. } => "Could not read from file.",
            Self::FileWrite { .. } => "Could not write to file.",
            Self::InvalidArgument { .. } => "Invalid argument provided to function.",
            Self::PluginLoad { .. } => "Failed to load a plugin.",
            Self::ThemeLoad { .. } => "Failed to load theme.",
            Self::ArchiveError { .. } => "An error occurred while handling an archive.",
            Self::Unsupported { .. } => "Operation not supported.",
            Self::NotFound { .. } => "No matches found.",
        }
    }
}

// Automatic conversion from io::Error to FatError when no path is at hand
impl From<std::io::Error> for FatError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound {
                path: PathBuf::new(),
            },
            std::io::ErrorKind::OutOfMemory => Self::OutOfMemory {
                message: err.to_string(),
            },
            _ => Self::FileRead {
                path: PathBuf::new(),
                source: err,
            },
        }
    }
}
