//! MIME detection by magic numbers and a text/binary heuristic.
//!
//! Only the first few kilobytes of a file are inspected. Signatures are checked first;
//! anything unrecognized is classified as text or `application/octet-stream` from the
//! sampled bytes.

use crate::error::{FatError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading bytes sampled for detection.
const SNIFF_LEN: usize = 8192;

/// Known file signatures: (offset, magic bytes, mime type)
const SIGNATURES: &[(usize, &[u8], &str)] = &[
    (0, b"\x89PNG\r\n\x1a\n", "image/png"),
    (0, b"\xff\xd8\xff", "image/jpeg"),
    (0, b"GIF87a", "image/gif"),
    (0, b"GIF89a", "image/gif"),
    (0, b"BM", "image/bmp"),
    (0, b"%PDF-", "application/pdf"),
    (0, b"PK\x03\x04", "application/zip"),
    (0, b"PK\x05\x06", "application/zip"),
    (0, b"\x1f\x8b", "application/gzip"),
    (0, b"\x28\xb5\x2f\xfd", "application/zstd"),
    (0, b"BZh", "application/x-bzip2"),
    (0, b"\xfd7zXZ\x00", "application/x-xz"),
    (0, b"7z\xbc\xaf\x27\x1c", "application/x-7z-compressed"),
    (0, b"\x7fELF", "application/x-executable"),
    (0, b"MZ", "application/x-dosexec"),
    (0, b"\x00asm", "application/wasm"),
    (0, b"SQLite format 3\x00", "application/vnd.sqlite3"),
    (0, b"OggS", "audio/ogg"),
    (0, b"ID3", "audio/mpeg"),
    (0, b"\x1aE\xdf\xa3", "video/webm"),
    (257, b"ustar", "application/x-tar"),
];

/// Detect the MIME type of `path`.
pub fn detect_mime(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| FatError::file_read(path, e))?;
    let mut sample = Vec::with_capacity(SNIFF_LEN);
    file.by_ref()
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut sample)
        .map_err(|e| FatError::file_read(path, e))?;
    Ok(sniff(&sample).to_string())
}

/// Classify a sample of leading bytes.
pub fn sniff(sample: &[u8]) -> &'static str {
    if sample.is_empty() {
        return "inode/x-empty";
    }

    if let Some(mime) = sniff_container(sample) {
        return mime;
    }

    for &(offset, magic, mime) in SIGNATURES {
        if sample.len() >= offset + magic.len() && &sample[offset..offset + magic.len()] == magic
        {
            return mime;
        }
    }

    if memchr::memchr(0, sample).is_some() {
        return "application/octet-stream";
    }

    let text = match std::str::from_utf8(sample) {
        Ok(text) => text,
        // A sample cut in the middle of a character is still UTF-8 text.
        Err(e) if e.error_len().is_none() => match std::str::from_utf8(&sample[..e.valid_up_to()]) {
            Ok(text) => text,
            Err(_) => return "application/octet-stream",
        },
        Err(_) => {
            return if mostly_printable(sample) {
                "text/plain"
            } else {
                "application/octet-stream"
            }
        }
    };

    let trimmed = text.trim();
    if looks_like_json(trimmed) {
        "application/json"
    } else if trimmed.starts_with("<?xml") {
        "text/xml"
    } else if trimmed.starts_with("<!DOCTYPE html") || trimmed.starts_with("<html") {
        "text/html"
    } else {
        "text/plain"
    }
}

/// RIFF and ISO media containers carry their type after a size field.
fn sniff_container(sample: &[u8]) -> Option<&'static str> {
    if sample.len() >= 12 && &sample[0..4] == b"RIFF" {
        return match &sample[8..12] {
            b"WEBP" => Some("image/webp"),
            b"AVI " => Some("video/x-msvideo"),
            b"WAVE" => Some("audio/x-wav"),
            _ => None,
        };
    }
    if sample.len() >= 12 && &sample[4..8] == b"ftyp" {
        return match &sample[8..12] {
            b"qt  " => Some("video/quicktime"),
            b"avif" => Some("image/avif"),
            b"heic" => Some("image/heic"),
            _ => Some("video/mp4"),
        };
    }
    None
}

fn looks_like_json(text: &str) -> bool {
    (text.starts_with('{') && text.ends_with('}')) || (text.starts_with('[') && text.ends_with(']'))
}

fn mostly_printable(sample: &[u8]) -> bool {
    let control = sample
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b))
        .count();
    control * 10 < sample.len()
}

/// Decide whether a MIME type should open as a hex dump.
///
/// `text_mimes` wins over `binary_mimes`, which wins over the built-in rule: every
/// `application/*` type except JSON, plus `image/*` and `video/*`, is binary.
pub fn is_binary_mime(mime: &str, text_mimes: &[String], binary_mimes: &[String]) -> bool {
    if text_mimes.iter().any(|m| m == mime) {
        return false;
    }
    if binary_mimes.iter().any(|m| m == mime) {
        return true;
    }
    (mime.starts_with("application/") && mime != "application/json")
        || mime.starts_with("image/")
        || mime.starts_with("video/")
}
