//! Breadcrumb history of nested archive views.

use bstr::ByteSlice;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// One level of the history. Levels entered from an archive own the extracted temp file.
#[derive(Debug)]
pub struct Crumb {
    path: PathBuf,
    label: String,
    temp: Option<TempPath>,
}

impl Crumb {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Human-readable location, e.g. `/data/logs.zip/app/notes.txt`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_extracted(&self) -> bool {
        self.temp.is_some()
    }

    fn release(self) {
        if let Some(temp) = self.temp {
            let path = temp.to_path_buf();
            match temp.close() {
                Ok(()) => log::debug!("removed {}", path.display()),
                Err(err) => log::warn!("failed to remove {}: {}", path.display(), err),
            }
        }
    }
}

/// Stack of visited paths; the last crumb is the displayed file.
#[derive(Debug, Default)]
pub struct Breadcrumbs {
    stack: Vec<Crumb>,
}

impl Breadcrumbs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new history at `path`, releasing whatever was there.
    pub fn reset(&mut self, path: &Path) {
        self.clear();
        self.stack.push(Crumb {
            path: path.to_path_buf(),
            label: path.display().to_string(),
            temp: None,
        });
    }

    /// Push an extracted archive entry; the crumb takes ownership of the temp file.
    pub fn push_extracted(&mut self, entry: &[u8], temp: TempPath) {
        let label = match self.current() {
            Some(parent) => format!("{}/{}", parent.label, entry.to_str_lossy()),
            None => entry.to_str_lossy().into_owned(),
        };
        self.stack.push(Crumb {
            path: temp.to_path_buf(),
            label,
            temp: Some(temp),
        });
    }

    /// Drop the top crumb, deleting its temp file. The root is never popped.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        if let Some(crumb) = self.stack.pop() {
            crumb.release();
        }
        true
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current(&self) -> Option<&Crumb> {
        self.stack.last()
    }

    pub fn parent(&self) -> Option<&Crumb> {
        self.stack.len().checked_sub(2).and_then(|idx| self.stack.get(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Crumb> {
        self.stack.iter()
    }

    /// Release every crumb, newest first.
    pub fn clear(&mut self) {
        while let Some(crumb) = self.stack.pop() {
            crumb.release();
        }
    }
}

impl Drop for Breadcrumbs {
    fn drop(&mut self) {
        self.clear();
    }
}
