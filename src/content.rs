//! Content sources for the viewer.
//!
//! A [`Content`] is the ordered list of logical lines the current view displays. It is
//! produced by one of three sources and replaced wholesale on every load:
//!
//! - [`read_text_lines`] for text files
//! - [`generate_hex_dump`] for binary files
//! - an archive plugin's listing (see [`crate::plugin`])
//!
//! The submodules also cover the on-disk facts shown next to the content: MIME sniffing
//! and file metadata.

pub mod hex;
pub mod metadata;
pub mod mime;
pub mod text;
pub mod validation;

pub use hex::generate_hex_dump;
pub use metadata::FileMetadata;
pub use mime::{detect_mime, is_binary_mime};
pub use text::read_text_lines;
pub use validation::validate_file_path;

use crate::error::{FatError, Result};
use crate::utf8;
use bstr::{BStr, BString};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Files at or above this size are memory-mapped instead of read into a buffer.
pub const MMAP_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Ordered logical lines of the current view, stored as raw bytes.
///
/// Lines are best-effort UTF-8. `max_line_len` is the character count of the longest
/// line and is computed once when the content is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    lines: Vec<BString>,
    max_line_len: usize,
}

impl Content {
    pub fn new(lines: Vec<BString>) -> Self {
        let max_line_len = lines
            .iter()
            .map(|line| utf8::char_count(line))
            .max()
            .unwrap_or(0);
        Self {
            lines,
            max_line_len,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, idx: usize) -> Option<&BStr> {
        self.lines.get(idx).map(BStr::new)
    }

    pub fn lines(&self) -> &[BString] {
        &self.lines
    }

    /// Character count of the longest line.
    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }
}

impl<T: Into<BString>> FromIterator<T> for Content {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Run `f` over the whole file, mapping it when it is large.
pub(crate) fn with_file_bytes<T>(path: &Path, f: impl FnOnce(&[u8]) -> T) -> Result<T> {
    let file = File::open(path).map_err(|e| FatError::file_read(path, e))?;
    let size = file
        .metadata()
        .map_err(|e| FatError::file_read(path, e))?
        .len();

    if size >= MMAP_THRESHOLD {
        log::debug!("mapping {} ({} bytes)", path.display(), size);
        // Safety: the mapping is read-only and dropped before this function returns.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| FatError::file_read(path, e))?;
        Ok(f(&mmap))
    } else {
        let bytes = std::fs::read(path).map_err(|e| FatError::file_read(path, e))?;
        Ok(f(&bytes))
    }
}
