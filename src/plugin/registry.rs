//! Ordered, name-deduplicated set of archive plugins.

use crate::error::{FatError, Result};
use crate::plugin::{ArchivePlugin, DynamicPlugin};
use std::path::Path;

/// Upper bound on registered plugins.
pub const MAX_PLUGINS: usize = 16;

/// Platform extension of loadable modules.
#[cfg(target_os = "macos")]
const MODULE_EXTENSIONS: &[&str] = &["dylib", "so"];
#[cfg(windows)]
const MODULE_EXTENSIONS: &[&str] = &["dll"];
#[cfg(not(any(target_os = "macos", windows)))]
const MODULE_EXTENSIONS: &[&str] = &["so"];

/// Plugins in load order. Lookups return the first plugin that accepts a path.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn ArchivePlugin>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin unless one with the same name is already present.
    ///
    /// Returns whether the plugin was accepted. A rejected plugin is dropped here, which
    /// unloads its module when it came from one.
    pub fn register(&mut self, plugin: Box<dyn ArchivePlugin>) -> bool {
        if self.plugins.iter().any(|p| p.name() == plugin.name()) {
            log::info!(
                "plugin '{}' is already registered; ignoring duplicate",
                plugin.name()
            );
            return false;
        }
        if self.plugins.len() >= MAX_PLUGINS {
            log::warn!(
                "plugin limit of {} reached; ignoring '{}'",
                MAX_PLUGINS,
                plugin.name()
            );
            return false;
        }
        log::info!("registered plugin '{}'", plugin.name());
        self.plugins.push(plugin);
        true
    }

    /// Load every native module in `dir`.
    ///
    /// Modules are visited in path order so load order is stable across runs. Modules
    /// that fail to open or register are logged and skipped. Returns the number of
    /// plugins accepted; a missing directory yields 0.
    pub fn load_plugins(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            log::debug!("plugin directory {} does not exist", dir.display());
            return Ok(0);
        }

        let mut modules: Vec<_> = std::fs::read_dir(dir)
            .map_err(|e| FatError::file_read(dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_module(path))
            .collect();
        modules.sort();

        let mut accepted = 0;
        for module in modules {
            match DynamicPlugin::open(&module) {
                Ok(plugin) => {
                    if self.register(Box::new(plugin)) {
                        accepted += 1;
                    }
                }
                Err(err) => log::warn!("skipping plugin {}: {}", module.display(), err),
            }
        }
        Ok(accepted)
    }

    /// First plugin in load order that can handle `path`.
    pub fn get_handler(&self, path: &Path) -> Option<&dyn ArchivePlugin> {
        self.handler_index(path).map(|idx| self.plugins[idx].as_ref())
    }

    /// Position of the handler for `path`, stable for the registry's lifetime.
    pub fn handler_index(&self, path: &Path) -> Option<usize> {
        self.plugins.iter().position(|p| p.can_handle(path))
    }

    pub fn get(&self, idx: usize) -> Option<&dyn ArchivePlugin> {
        self.plugins.get(idx).map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name())
    }
}

fn is_module(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| MODULE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use tempfile::TempPath;

    struct Named(&'static str, &'static str);

    impl ArchivePlugin for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn can_handle(&self, path: &Path) -> bool {
            path.to_string_lossy().ends_with(self.1)
        }

        fn list_contents(&self, _path: &Path) -> Result<Content> {
            Ok(Content::empty())
        }

        fn extract_entry(&self, _archive: &Path, _entry: &[u8]) -> Result<TempPath> {
            Err(FatError::unsupported("test plugin"))
        }
    }

    #[test]
    fn first_matching_plugin_wins() {
        let mut registry = PluginRegistry::new();
        assert!(registry.register(Box::new(Named("GZ", ".gz"))));
        assert!(registry.register(Box::new(Named("TGZ", ".tar.gz"))));

        let handler = registry.get_handler(Path::new("a.tar.gz")).unwrap();
        assert_eq!(handler.name(), "GZ");
        assert_eq!(registry.handler_index(Path::new("a.txt")), None);
    }

    #[test]
    fn enforces_plugin_limit() {
        let names: Vec<&'static str> = (0..MAX_PLUGINS + 2)
            .map(|i| &*Box::leak(format!("plugin-{i}").into_boxed_str()))
            .collect();
        let mut registry = PluginRegistry::new();
        let mut accepted = 0;
        for name in names {
            if registry.register(Box::new(Named(name, ".x"))) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, MAX_PLUGINS);
        assert_eq!(registry.len(), MAX_PLUGINS);
    }

    #[test]
    fn skips_broken_modules_and_missing_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("libbroken.so"), b"garbage").unwrap();
        std::fs::write(dir.path().join("libbroken.dll"), b"garbage").unwrap();
        std::fs::write(dir.path().join("libbroken.dylib"), b"garbage").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"not a module").unwrap();

        let mut registry = PluginRegistry::new();
        assert_eq!(registry.load_plugins(dir.path()).unwrap(), 0);
        assert!(registry.is_empty());

        let missing = dir.path().join("nope");
        assert_eq!(registry.load_plugins(&missing).unwrap(), 0);
    }
}
