//! Color themes using ratatui colors
//!
//! A theme assigns a style to each themed UI element. Three themes are built in; more can
//! be dropped into the themes directory as TOML files:
//!
//! ```toml
//! name = "Nord"
//! author = "someone"
//!
//! [colors.border]
//! fg = "cyan"
//! bg = "default"
//! ```
//!
//! Color names are anything ratatui's `Color::from_str` accepts (`red`, `lightblue`,
//! `#88c0d0`, `236`), plus `default` for the terminal's own color.

use crate::error::{FatError, Result};
use ratatui::style::{Color, Style};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Themed elements, in the order the theme file documents them.
pub const ELEMENTS: [&str; 8] = [
    "border",
    "title",
    "metadata_label",
    "line_num",
    "statusbar",
    "search_highlight",
    "help_border",
    "help_key",
];

/// Color theme for terminal UI elements
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTheme {
    pub name: String,
    pub author: Option<String>,

    /// Pane borders
    pub border: Style,

    /// Pane titles and the version tag
    pub title: Style,

    /// Labels in the metadata pane
    pub metadata_label: Style,

    /// Line-number gutter
    pub line_num: Style,

    /// Status bar background and text
    pub statusbar: Style,

    /// Search match highlighting
    pub search_highlight: Style,

    /// Border of the help and theme overlays
    pub help_border: Style,

    /// Key column of the help overlay
    pub help_key: Style,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            author: None,
            border: Style::default().fg(Color::Blue),
            title: Style::default().fg(Color::Yellow),
            metadata_label: Style::default().fg(Color::Cyan),
            line_num: Style::default().fg(Color::DarkGray),
            statusbar: Style::default().fg(Color::White).bg(Color::Blue),
            search_highlight: Style::default().fg(Color::Black).bg(Color::Yellow),
            help_border: Style::default().fg(Color::Green),
            help_key: Style::default().fg(Color::Yellow),
        }
    }
}

impl ColorTheme {
    /// Create a monochrome theme for terminals without color support
    pub fn monochrome() -> Self {
        Self {
            name: "monochrome".to_string(),
            author: None,
            border: Style::default(),
            title: Style::default(),
            metadata_label: Style::default(),
            line_num: Style::default(),
            statusbar: Style::default().fg(Color::Black).bg(Color::White),
            search_highlight: Style::default().fg(Color::Black).bg(Color::White),
            help_border: Style::default(),
            help_key: Style::default(),
        }
    }

    /// Create a high-contrast theme for accessibility
    pub fn high_contrast() -> Self {
        Self {
            name: "high-contrast".to_string(),
            author: None,
            border: Style::default().fg(Color::White),
            title: Style::default().fg(Color::LightYellow),
            metadata_label: Style::default().fg(Color::LightCyan),
            line_num: Style::default().fg(Color::LightGreen),
            statusbar: Style::default().fg(Color::Black).bg(Color::White),
            search_highlight: Style::default().fg(Color::Black).bg(Color::LightYellow),
            help_border: Style::default().fg(Color::White),
            help_key: Style::default().fg(Color::LightYellow),
        }
    }

    /// Load a theme file. Elements the file leaves out keep the default theme's style.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| FatError::file_read(path, e))?;
        let file: ThemeFile =
            toml::from_str(&text).map_err(|e| FatError::theme_load(path, e.to_string()))?;

        let mut theme = Self {
            name: file.name,
            author: file.author,
            ..Self::default()
        };
        for (element, spec) in &file.colors {
            let style = spec
                .to_style()
                .map_err(|msg| FatError::theme_load(path, format!("{}: {}", element, msg)))?;
            match theme.element_mut(element) {
                Some(slot) => *slot = style,
                None => log::warn!("theme {}: unknown element '{}'", path.display(), element),
            }
        }
        Ok(theme)
    }

    fn element_mut(&mut self, element: &str) -> Option<&mut Style> {
        Some(match element {
            "border" => &mut self.border,
            "title" => &mut self.title,
            "metadata_label" => &mut self.metadata_label,
            "line_num" => &mut self.line_num,
            "statusbar" => &mut self.statusbar,
            "search_highlight" => &mut self.search_highlight,
            "help_border" => &mut self.help_border,
            "help_key" => &mut self.help_key,
            _ => return None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ThemeFile {
    name: String,
    author: Option<String>,
    #[serde(default)]
    colors: BTreeMap<String, ColorSpec>,
}

#[derive(Debug, Deserialize)]
struct ColorSpec {
    fg: Option<String>,
    bg: Option<String>,
}

impl ColorSpec {
    fn to_style(&self) -> std::result::Result<Style, String> {
        let mut style = Style::default();
        if let Some(fg) = &self.fg {
            style = style.fg(parse_color(fg)?);
        }
        if let Some(bg) = &self.bg {
            style = style.bg(parse_color(bg)?);
        }
        Ok(style)
    }
}

fn parse_color(name: &str) -> std::result::Result<Color, String> {
    if name.eq_ignore_ascii_case("default") {
        return Ok(Color::Reset);
    }
    Color::from_str(name).map_err(|_| format!("unknown color '{}'", name))
}

/// Where a selectable theme comes from.
#[derive(Debug, Clone)]
pub enum ThemeSource {
    Builtin(fn() -> ColorTheme),
    File(PathBuf),
}

/// Selectable theme as listed in the theme selector.
#[derive(Debug, Clone)]
pub struct ThemeEntry {
    pub name: String,
    pub source: ThemeSource,
}

impl ThemeEntry {
    pub fn load(&self) -> Result<ColorTheme> {
        match &self.source {
            ThemeSource::Builtin(make) => Ok(make()),
            ThemeSource::File(path) => ColorTheme::load(path),
        }
    }
}

/// Built-in themes followed by the theme files found on disk.
#[derive(Debug, Clone, Default)]
pub struct ThemeCatalog {
    entries: Vec<ThemeEntry>,
}

impl ThemeCatalog {
    pub fn builtin() -> Self {
        let builtin: [(&str, fn() -> ColorTheme); 3] = [
            ("default", ColorTheme::default),
            ("monochrome", ColorTheme::monochrome),
            ("high-contrast", ColorTheme::high_contrast),
        ];
        Self {
            entries: builtin
                .into_iter()
                .map(|(name, make)| ThemeEntry {
                    name: name.to_string(),
                    source: ThemeSource::Builtin(make),
                })
                .collect(),
        }
    }

    /// Built-ins plus every `*.toml` in `dir`, sorted by path.
    pub fn discover(dir: &Path) -> Self {
        let mut catalog = Self::builtin();
        let Ok(read_dir) = std::fs::read_dir(dir) else {
            log::info!("themes directory {} not readable", dir.display());
            return catalog;
        };
        let mut files: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().map_or(false, |ext| ext == "toml"))
            .collect();
        files.sort();

        for path in files {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            catalog.entries.push(ThemeEntry {
                name,
                source: ThemeSource::File(path),
            });
        }
        catalog
    }

    pub fn entries(&self) -> &[ThemeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry whose name equals `name`, else the first whose name starts with it.
    pub fn find(&self, name: &str) -> Option<&ThemeEntry> {
        let wanted = name.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.name.to_lowercase() == wanted)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|e| e.name.to_lowercase().starts_with(&wanted))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.statusbar.fg, Some(Color::White));
        assert_eq!(theme.statusbar.bg, Some(Color::Blue));
        assert_eq!(theme.search_highlight.fg, Some(Color::Black));
        assert_eq!(theme.search_highlight.bg, Some(Color::Yellow));
    }

    #[test]
    fn every_element_is_addressable() {
        let mut theme = ColorTheme::default();
        for element in ELEMENTS {
            assert!(theme.element_mut(element).is_some(), "{element}");
        }
        assert!(theme.element_mut("cursor").is_none());
    }

    #[test]
    fn test_monochrome_theme() {
        let theme = ColorTheme::monochrome();
        assert_eq!(theme.line_num, Style::default());
        assert_eq!(theme.statusbar.bg, Some(Color::White));
    }

    #[test]
    fn loads_theme_file_over_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nord.toml");
        std::fs::write(
            &path,
            r##"
name = "Nord"
author = "arctic"

[colors.border]
fg = "#88c0d0"
bg = "default"

[colors.statusbar]
fg = "black"
bg = "lightblue"
"##,
        )
        .unwrap();

        let theme = ColorTheme::load(&path).unwrap();
        assert_eq!(theme.name, "Nord");
        assert_eq!(theme.author.as_deref(), Some("arctic"));
        assert_eq!(theme.border.fg, Some(Color::Rgb(0x88, 0xc0, 0xd0)));
        assert_eq!(theme.border.bg, Some(Color::Reset));
        assert_eq!(theme.statusbar.bg, Some(Color::LightBlue));
        // untouched elements come from the default theme
        assert_eq!(theme.help_key, ColorTheme::default().help_key);
    }

    #[test]
    fn bad_theme_files_are_theme_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "name = ").unwrap();
        assert!(matches!(
            ColorTheme::load(&broken),
            Err(FatError::ThemeLoad { .. })
        ));

        let bad_color = dir.path().join("bad.toml");
        std::fs::write(&bad_color, "name = \"x\"\n[colors.title]\nfg = \"chartreuse-ish\"\n")
            .unwrap();
        assert!(matches!(
            ColorTheme::load(&bad_color),
            Err(FatError::ThemeLoad { .. })
        ));
    }

    #[test]
    fn catalog_discovers_sorted_files() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("zenburn.toml"), "name = \"Zenburn\"").unwrap();
        std::fs::write(dir.path().join("nord.toml"), "name = \"Nord\"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = ThemeCatalog::discover(dir.path());
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            ["default", "monochrome", "high-contrast", "nord", "zenburn"]
        );

        assert_eq!(catalog.find("NORD").unwrap().name, "nord");
        assert_eq!(catalog.find("high").unwrap().name, "high-contrast");
        assert!(catalog.find("solarized").is_none());
        assert_eq!(catalog.find("zen").unwrap().load().unwrap().name, "Zenburn");
    }
}
