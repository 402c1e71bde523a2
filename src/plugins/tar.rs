//! TAR archive handler.

use crate::content::Content;
use crate::error::{FatError, Result};
use crate::plugin::{create_extraction_file, ArchivePlugin};
use bstr::BString;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tempfile::TempPath;

const BLOCK_SIZE: usize = 512;
const CHECKSUM_FIELD: std::ops::Range<usize> = 148..156;

/// Lists and extracts regular files from plain (uncompressed) tar archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarPlugin;

impl TarPlugin {
    fn open(path: &Path) -> Result<::tar::Archive<File>> {
        let file = File::open(path).map_err(|e| FatError::file_read(path, e))?;
        Ok(::tar::Archive::new(file))
    }
}

fn archive_error(path: &Path, err: io::Error) -> FatError {
    FatError::archive(format!("tar archive {}: {}", path.display(), err))
}

/// Validate the checksum of the first header block.
///
/// Works for both ustar and old-style (v7) archives, which carry no magic string.
pub fn header_checksum_ok(block: &[u8]) -> bool {
    if block.len() < BLOCK_SIZE || block[..BLOCK_SIZE].iter().all(|&b| b == 0) {
        return false;
    }
    let Some(stored) = parse_octal(&block[CHECKSUM_FIELD]) else {
        return false;
    };
    let computed: u32 = block[..BLOCK_SIZE]
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            if CHECKSUM_FIELD.contains(&i) {
                u32::from(b' ')
            } else {
                u32::from(b)
            }
        })
        .sum();
    stored == computed
}

fn parse_octal(field: &[u8]) -> Option<u32> {
    let text = std::str::from_utf8(field).ok()?;
    let digits = text.trim_matches(|c: char| c == '\0' || c == ' ');
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 8).ok()
}

impl ArchivePlugin for TarPlugin {
    fn name(&self) -> &str {
        "TAR Archive Handler"
    }

    fn can_handle(&self, path: &Path) -> bool {
        let Ok(file) = File::open(path) else {
            return false;
        };
        let mut block = Vec::with_capacity(BLOCK_SIZE);
        if file
            .take(BLOCK_SIZE as u64)
            .read_to_end(&mut block)
            .is_err()
        {
            return false;
        }
        header_checksum_ok(&block)
    }

    fn list_contents(&self, path: &Path) -> Result<Content> {
        let mut archive = Self::open(path)?;
        let mut entries = Vec::new();
        for entry in archive.entries().map_err(|e| archive_error(path, e))? {
            let entry = entry.map_err(|e| archive_error(path, e))?;
            if entry.header().entry_type().is_file() {
                entries.push(BString::from(entry.path_bytes().into_owned()));
            }
        }
        Ok(Content::new(entries))
    }

    fn extract_entry(&self, archive_path: &Path, entry_name: &[u8]) -> Result<TempPath> {
        let mut archive = Self::open(archive_path)?;
        for entry in archive
            .entries()
            .map_err(|e| archive_error(archive_path, e))?
        {
            let mut entry = entry.map_err(|e| archive_error(archive_path, e))?;
            if entry.path_bytes().as_ref() != entry_name {
                continue;
            }
            if !entry.header().entry_type().is_file() {
                return Err(FatError::unsupported(format!(
                    "'{}' is not a regular file",
                    String::from_utf8_lossy(entry_name)
                )));
            }

            let mut target = create_extraction_file(entry_name)?;
            io::copy(&mut entry, target.as_file_mut())
                .map_err(|e| archive_error(archive_path, e))?;
            return Ok(target.into_temp_path());
        }
        Err(FatError::archive(format!(
            "entry '{}' not found in {}",
            String::from_utf8_lossy(entry_name),
            archive_path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn build_tar(dir: &Path) -> PathBuf {
        let path = dir.join("bundle.tar");
        let mut builder = ::tar::Builder::new(File::create(&path).unwrap());

        let mut header = ::tar::Header::new_gnu();
        header.set_entry_type(::tar::EntryType::Directory);
        header.set_size(0);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, "docs/", io::empty())
            .unwrap();

        let files: [(&str, &[u8]); 2] = [
            ("docs/readme.md", b"# readme\n"),
            ("main.rs", b"fn main() {}\n"),
        ];
        for (name, body) in files {
            let mut header = ::tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, body).unwrap();
        }

        let mut header = ::tar::Header::new_gnu();
        header.set_entry_type(::tar::EntryType::Symlink);
        header.set_size(0);
        header.set_mode(0o777);
        header.set_link_name("main.rs").unwrap();
        header.set_cksum();
        builder.append_data(&mut header, "latest", io::empty()).unwrap();

        builder.into_inner().unwrap();
        path
    }

    #[test]
    fn recognizes_tar_by_header_checksum() {
        let dir = tempfile::TempDir::new().unwrap();
        let tar = build_tar(dir.path());
        assert!(TarPlugin.can_handle(&tar));

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "x".repeat(600)).unwrap();
        assert!(!TarPlugin.can_handle(&text));

        let short = dir.path().join("short.tar");
        std::fs::write(&short, b"tiny").unwrap();
        assert!(!TarPlugin.can_handle(&short));
    }

    #[test]
    fn lists_regular_files_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let tar = build_tar(dir.path());
        let content = TarPlugin.list_contents(&tar).unwrap();
        assert_eq!(
            content.lines(),
            [BString::from("docs/readme.md"), BString::from("main.rs")]
        );
    }

    #[test]
    fn extracts_named_entry() {
        let dir = tempfile::TempDir::new().unwrap();
        let tar = build_tar(dir.path());

        let temp = TarPlugin.extract_entry(&tar, b"docs/readme.md").unwrap();
        assert_eq!(std::fs::read(&temp).unwrap(), b"# readme\n");

        let err = TarPlugin.extract_entry(&tar, b"latest").unwrap_err();
        assert!(matches!(err, FatError::Unsupported { .. }));

        let err = TarPlugin.extract_entry(&tar, b"absent").unwrap_err();
        assert!(matches!(err, FatError::ArchiveError { .. }));
    }
}
