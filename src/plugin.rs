//! Archive plugin interface and registry.
//!
//! An [`ArchivePlugin`] knows how to recognize one archive or compression format, list
//! its entries and extract a single entry into a process-temporary file. Plugins come
//! from two places:
//!
//! - native modules in a plugin directory, loaded through the C ABI in [`abi`]
//! - the handlers bundled with the crate (see [`crate::plugins`])
//!
//! Both go through [`PluginRegistry::register`], which keeps the first plugin of a given
//! name and rejects later duplicates.

pub mod abi;
pub mod dynamic;
pub mod registry;

pub use dynamic::DynamicPlugin;
pub use registry::{PluginRegistry, MAX_PLUGINS};

use crate::content::Content;
use crate::error::{FatError, Result};
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};

/// Format handler for archives and compressed files.
pub trait ArchivePlugin {
    /// Declared name, used for deduplication (e.g. `"ZIP Archive Handler"`).
    fn name(&self) -> &str;

    /// Cheap check: extension and/or magic bytes
    ///
    /// This method should:
    /// - Never fail; unreadable files are simply not handled
    /// - Avoid reading more than the format header
    fn can_handle(&self, path: &Path) -> bool;

    /// List the entry names of the archive, one per line
    ///
    /// This method should:
    /// - Omit directories and entries that cannot be extracted
    /// - Preserve archive order
    fn list_contents(&self, path: &Path) -> Result<Content>;

    /// Extract `entry` into a new temporary file and hand over its ownership
    ///
    /// This method should:
    /// - Name the file with [`temp_file_prefix`] so shutdown can sweep leftovers
    /// - Remove the partial file on failure
    fn extract_entry(&self, archive: &Path, entry: &[u8]) -> Result<TempPath>;
}

/// Prefix shared by every extraction temp file of this process.
pub fn temp_file_prefix() -> String {
    format!("fat-{}-", std::process::id())
}

/// Create an empty extraction target named after `entry`.
///
/// The file lives in the system temp directory as `fat-<pid>-XXXXXX-<entry>`, so the
/// entry's extension stays last and extension-based format checks still work. Only
/// `[A-Za-z0-9._-]` survive from the entry name; everything else becomes `_`.
pub fn create_extraction_file(entry: &[u8]) -> Result<NamedTempFile> {
    let chars: Vec<char> = String::from_utf8_lossy(entry).chars().collect();
    // keep the tail so long names still end in their extension
    let sanitized: String = chars[chars.len().saturating_sub(64)..]
        .iter()
        .map(|&c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();

    let prefix = temp_file_prefix();
    let suffix = format!("-{}", sanitized);
    tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| FatError::file_write(std::env::temp_dir().join(&prefix), e))
}

/// Entry name an extraction file was created for, e.g. `inner.txt.gz` for
/// `fat-<pid>-XXXXXX-inner.txt.gz`. Other names are returned unchanged.
pub fn extracted_entry_name(file_name: &str) -> &str {
    file_name
        .strip_prefix(temp_file_prefix().as_str())
        .and_then(|rest| rest.split_once('-'))
        .map_or(file_name, |(_, entry)| entry)
}
