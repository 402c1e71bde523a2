//! Single-stream decompressors presented as one-entry archives.
//!
//! A `.gz` or `.zst` file "contains" one entry named after the file without its
//! compression extension. Extracting it decompresses the whole stream into a temp file.
//!
//! # Magic Numbers Used
//! - Gzip: `1f 8b` (RFC 1952)
//! - Zstd: `28 b5 2f fd` (Zstandard frame format)

use crate::content::Content;
use crate::error::{FatError, Result};
use crate::plugin::{create_extraction_file, extracted_entry_name, ArchivePlugin};
use bstr::BString;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tempfile::TempPath;

/// Entry name used when the file name has no recognizable extension.
const FALLBACK_ENTRY: &str = "decompressed_file";

/// Supported compression formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// Gzip compression (.gz files)
    Gzip,
    /// Zstandard compression (.zst, .zstd files)
    Zstd,
}

impl CompressionType {
    /// Get human-readable name for the compression type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
        }
    }

    /// Name the handler registers under
    pub fn plugin_name(&self) -> &'static str {
        match self {
            Self::Gzip => "GZIP Decompressor",
            Self::Zstd => "ZSTD Decompressor",
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Gzip => &["gz"],
            Self::Zstd => &["zst", "zstd"],
        }
    }
}

/// Detect compression format from magic bytes
pub fn detect_by_magic(magic: &[u8]) -> Option<CompressionType> {
    if magic.starts_with(&[0x1f, 0x8b]) {
        Some(CompressionType::Gzip)
    } else if magic.starts_with(&[0x28, 0xb5, 0x2f, 0xfd]) {
        Some(CompressionType::Zstd)
    } else {
        None
    }
}

/// Detect compression format from file extension
pub fn detect_by_extension(path: &Path) -> Option<CompressionType> {
    let ext = path.extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "gz" => Some(CompressionType::Gzip),
        "zst" | "zstd" => Some(CompressionType::Zstd),
        _ => None,
    }
}

/// Handler for one compression format.
#[derive(Debug, Clone, Copy)]
pub struct DecompressorPlugin {
    kind: CompressionType,
}

impl DecompressorPlugin {
    pub fn new(kind: CompressionType) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> CompressionType {
        self.kind
    }

    fn decoder(&self, file: File) -> io::Result<Box<dyn Read>> {
        Ok(match self.kind {
            CompressionType::Gzip => Box::new(MultiGzDecoder::new(file)),
            CompressionType::Zstd => Box::new(zstd::stream::read::Decoder::new(file)?),
        })
    }

    fn entry_name(&self, path: &Path) -> String {
        let Some(file_name) = path
            .file_name()
            .map(|n| extracted_entry_name(&n.to_string_lossy()).to_string())
        else {
            return FALLBACK_ENTRY.to_string();
        };
        for ext in self.kind.extensions() {
            let suffix = format!(".{}", ext);
            if file_name.len() > suffix.len() && file_name.to_lowercase().ends_with(&suffix) {
                return file_name[..file_name.len() - suffix.len()].to_string();
            }
        }
        FALLBACK_ENTRY.to_string()
    }
}

impl ArchivePlugin for DecompressorPlugin {
    fn name(&self) -> &str {
        self.kind.plugin_name()
    }

    fn can_handle(&self, path: &Path) -> bool {
        if detect_by_extension(path) != Some(self.kind) {
            return false;
        }
        let mut magic = [0u8; 4];
        let Ok(mut file) = File::open(path) else {
            return false;
        };
        let mut read = 0;
        while read < magic.len() {
            match file.read(&mut magic[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(_) => return false,
            }
        }
        detect_by_magic(&magic[..read]) == Some(self.kind)
    }

    fn list_contents(&self, path: &Path) -> Result<Content> {
        Ok(Content::new(vec![BString::from(self.entry_name(path))]))
    }

    fn extract_entry(&self, archive: &Path, entry: &[u8]) -> Result<TempPath> {
        let file = File::open(archive).map_err(|e| FatError::file_read(archive, e))?;
        let mut decoder = self
            .decoder(file)
            .map_err(|e| FatError::archive(format!("{}: {}", self.kind.name(), e)))?;

        let mut target = create_extraction_file(entry)?;
        io::copy(&mut decoder, target.as_file_mut()).map_err(|e| {
            FatError::archive(format!(
                "{} decompression of {} failed: {}",
                self.kind.name(),
                archive.display(),
                e
            ))
        })?;
        log::debug!(
            "decompressed {} into {}",
            archive.display(),
            target.path().display()
        );
        Ok(target.into_temp_path())
    }
}
