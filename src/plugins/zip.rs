//! ZIP archive handler.

use crate::content::Content;
use crate::error::{FatError, Result};
use crate::plugin::{create_extraction_file, ArchivePlugin};
use ::zip::result::ZipError;
use ::zip::ZipArchive;
use bstr::BString;
use std::fs::File;
use std::io;
use std::path::Path;
use tempfile::TempPath;

/// Lists and extracts file entries of ZIP archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipPlugin;

fn zip_error(path: &Path, err: ZipError) -> FatError {
    match err {
        ZipError::Io(e) => FatError::file_read(path, e),
        other => FatError::archive(format!("zip archive {}: {}", path.display(), other)),
    }
}

impl ZipPlugin {
    fn open(path: &Path) -> Result<ZipArchive<File>> {
        let file = File::open(path).map_err(|e| FatError::file_read(path, e))?;
        ZipArchive::new(file).map_err(|e| zip_error(path, e))
    }
}

impl ArchivePlugin for ZipPlugin {
    fn name(&self) -> &str {
        "ZIP Archive Handler"
    }

    fn can_handle(&self, path: &Path) -> bool {
        Self::open(path).is_ok()
    }

    /// Directories and zero-length entries are left out of the listing.
    fn list_contents(&self, path: &Path) -> Result<Content> {
        let mut archive = Self::open(path)?;
        let mut entries = Vec::with_capacity(archive.len());
        for idx in 0..archive.len() {
            let file = archive.by_index(idx).map_err(|e| zip_error(path, e))?;
            if file.is_dir() || file.size() == 0 {
                continue;
            }
            entries.push(BString::from(file.name()));
        }
        Ok(Content::new(entries))
    }

    fn extract_entry(&self, archive_path: &Path, entry: &[u8]) -> Result<TempPath> {
        let mut archive = Self::open(archive_path)?;
        for idx in 0..archive.len() {
            let mut file = archive
                .by_index(idx)
                .map_err(|e| zip_error(archive_path, e))?;
            if file.name().as_bytes() != entry {
                continue;
            }
            if file.is_dir() {
                return Err(FatError::unsupported(format!(
                    "'{}' is a directory",
                    file.name()
                )));
            }

            let mut target = create_extraction_file(entry)?;
            io::copy(&mut file, target.as_file_mut()).map_err(|e| {
                FatError::archive(format!(
                    "extracting '{}' from {}: {}",
                    String::from_utf8_lossy(entry),
                    archive_path.display(),
                    e
                ))
            })?;
            return Ok(target.into_temp_path());
        }
        Err(FatError::archive(format!(
            "entry '{}' not found in {}",
            String::from_utf8_lossy(entry),
            archive_path.display()
        )))
    }
}
