//! File validation utilities for ensuring a path can be opened by the viewer.
//!
//! These checks run before any content source touches the file so the status bar can
//! report a precise reason instead of a generic read failure.

use crate::error::{FatError, Result};
use std::fs::File;
use std::path::Path;

/// Validate that a file path is accessible and suitable for viewing
///
/// # Validations Performed
/// - Path exists
/// - Path is a regular file (symlinks are followed)
/// - File is readable by the current process
///
/// Empty files are valid: they display as an empty view.
pub fn validate_file_path(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| FatError::file_read(path, e))?;

    if !metadata.is_file() {
        return Err(FatError::invalid_argument(format!(
            "Path is not a regular file: {}",
            path.display()
        )));
    }

    // Try to open the file to verify read permissions
    File::open(path).map_err(|e| FatError::file_read(path, e))?;

    Ok(())
}
