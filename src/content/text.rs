//! Text reader: splits a file into logical lines.

use crate::content::{with_file_bytes, Content};
use crate::error::Result;
use bstr::BString;
use std::path::Path;

/// Read `path` as newline-separated lines.
///
/// Lines are split on `\n` only; a trailing `\r` stays part of the line. A newline at the
/// very end of the file does not produce an extra empty line, so an empty file yields an
/// empty [`Content`].
pub fn read_text_lines(path: &Path) -> Result<Content> {
    let content = with_file_bytes(path, split_lines)?;
    log::debug!("read {} lines from {}", content.len(), path.display());
    Ok(content)
}

pub(crate) fn split_lines(data: &[u8]) -> Content {
    if data.is_empty() {
        return Content::empty();
    }
    let body = data.strip_suffix(b"\n").unwrap_or(data);
    Content::new(body.split(|&b| b == b'\n').map(BString::from).collect())
}
