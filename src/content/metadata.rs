//! On-disk file facts shown in the metadata pane.

use crate::error::{FatError, Result};
use std::fs;
use std::path::Path;

/// Label/value pairs describing the displayed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
    entries: Vec<(String, String)>,
}

impl FileMetadata {
    /// Gather name, MIME type, size and permissions for `path`.
    pub fn read(path: &Path, mime: &str) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|e| FatError::file_read(path, e))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut entries = vec![
            ("File".to_string(), name),
            ("Type".to_string(), mime.to_string()),
            ("Size".to_string(), format!("{} bytes", meta.len())),
        ];
        if let Some(perms) = permissions_string(&meta) {
            entries.push(("Perms".to_string(), perms));
        }
        Ok(Self { entries })
    }

    /// Replace (or append) the trailing count line, e.g. `Lines: 42`.
    pub fn set_count(&mut self, label: &str, count: usize) {
        self.entries
            .retain(|(existing, _)| existing != "Lines" && existing != "Entries");
        self.entries.push((label.to_string(), count.to_string()));
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Lines as rendered in the pane: `Label: value`.
    pub fn display_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect()
    }
}

#[cfg(unix)]
fn permissions_string(meta: &fs::Metadata) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    let mut perms = String::with_capacity(10);
    perms.push(if meta.is_dir() { 'd' } else { '-' });
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        perms.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        perms.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        perms.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    Some(perms)
}

#[cfg(not(unix))]
fn permissions_string(meta: &fs::Metadata) -> Option<String> {
    Some(if meta.permissions().readonly() {
        "read-only".to_string()
    } else {
        "read-write".to_string()
    })
}
