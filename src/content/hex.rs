//! Hex dump formatter for binary files.

use crate::content::{with_file_bytes, Content};
use crate::error::Result;
use bstr::BString;
use std::fmt::Write;
use std::path::Path;

/// Bytes shown per dump row.
pub const BYTES_PER_ROW: usize = 16;

/// Produce one line per 16 bytes of `path`.
///
/// Row layout: `"{offset:08X}: "`, sixteen `"{byte:02X} "` groups (three spaces for the
/// missing bytes of a short final row), `" |"`, then the printable-ASCII column where
/// every byte outside `0x20..=0x7E` is shown as `.`.
pub fn generate_hex_dump(path: &Path) -> Result<Content> {
    let content = with_file_bytes(path, dump_bytes)?;
    log::debug!("hex dump of {}: {} rows", path.display(), content.len());
    Ok(content)
}

pub(crate) fn dump_bytes(data: &[u8]) -> Content {
    Content::new(
        data.chunks(BYTES_PER_ROW)
            .enumerate()
            .map(|(row, chunk)| format_row(row * BYTES_PER_ROW, chunk))
            .collect(),
    )
}

/// Format a single dump row starting at `offset`.
pub fn format_row(offset: usize, chunk: &[u8]) -> BString {
    let mut row = String::with_capacity(10 + BYTES_PER_ROW * 4 + 2);
    let _ = write!(row, "{:08X}: ", offset);
    for i in 0..BYTES_PER_ROW {
        match chunk.get(i) {
            Some(byte) => {
                let _ = write!(row, "{:02X} ", byte);
            }
            None => row.push_str("   "),
        }
    }
    row.push_str(" |");
    row.extend(chunk.iter().map(|&b| {
        if (0x20..=0x7E).contains(&b) {
            b as char
        } else {
            '.'
        }
    }));
    BString::from(row)
}
