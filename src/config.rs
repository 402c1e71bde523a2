//! User configuration.
//!
//! Settings live in `<config_dir>/fat/config.toml` next to the `themes/` and `plugins/`
//! directories. A missing file is created with commented defaults; a broken one is
//! logged and ignored.

use crate::error::{FatError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"# FAT (File & Archive Tool) configuration

# Theme to start with: a built-in (default, monochrome, high-contrast) or the file
# stem of a theme in the themes/ directory.
# default_theme = "default"

# Smallest usable terminal.
min_term_width = 80
min_term_height = 20

# MIME types forced to the text view or the hex view.
text_mimes = ["application/json"]
binary_mimes = []

# Command used by open_external_default when no per-MIME command matches.
# The file path is appended in double quotes.
# default_command = "xdg-open"

[mime_commands]
# "image/png" = "feh"

[keys]
# Action name to key list. Listing an action replaces all of its default keys.
# quit = ["q", "Ctrl+c"]
# toggle_help = ["?", "F1"]
"#;

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_theme: Option<String>,
    pub min_term_width: u16,
    pub min_term_height: u16,
    pub text_mimes: Vec<String>,
    pub binary_mimes: Vec<String>,
    pub default_command: Option<String>,
    pub mime_commands: BTreeMap<String, String>,
    pub keys: BTreeMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_theme: None,
            min_term_width: 80,
            min_term_height: 20,
            text_mimes: vec!["application/json".to_string()],
            binary_mimes: Vec::new(),
            default_command: None,
            mime_commands: BTreeMap::new(),
            keys: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FatError::file_read(path, e))?;
        toml::from_str(&text)
            .map_err(|e| FatError::invalid_argument(format!("{}: {}", path.display(), e)))
    }

    /// Load the configuration from `dir`, creating the directory layout and a default
    /// file on first run. Never fails: problems are logged and defaults used.
    pub fn load_or_create(dir: &Path) -> Self {
        if let Err(err) = ensure_layout(dir) {
            log::warn!("could not prepare {}: {}", dir.display(), err);
        }

        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            log::info!("config file not found, writing defaults to {}", path.display());
            if let Err(err) = fs::write(&path, DEFAULT_CONFIG) {
                log::warn!("could not write {}: {}", path.display(), err);
            }
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("{}; using defaults", err);
                Self::default()
            }
        }
    }

    /// Command for `mime`: the exact per-MIME entry, else the `type/*` entry, else the
    /// default command.
    pub fn command_for(&self, mime: &str) -> Option<&str> {
        let wildcard = mime.split('/').next().map(|major| format!("{}/*", major));
        self.mime_commands
            .get(mime)
            .or_else(|| wildcard.and_then(|w| self.mime_commands.get(&w)))
            .or(self.default_command.as_ref())
            .map(String::as_str)
            .filter(|cmd| !cmd.trim().is_empty())
    }
}

/// `<config_dir>/fat`, if the platform has a config directory.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fat"))
}

pub fn themes_dir(config_dir: &Path) -> PathBuf {
    config_dir.join("themes")
}

pub fn plugins_dir(config_dir: &Path) -> PathBuf {
    config_dir.join("plugins")
}

fn ensure_layout(dir: &Path) -> Result<()> {
    for sub in [dir.to_path_buf(), themes_dir(dir), plugins_dir(dir)] {
        fs::create_dir_all(&sub).map_err(|e| FatError::file_write(&sub, e))?;
    }
    Ok(())
}
