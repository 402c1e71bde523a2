//! Native plugin modules opened with `libloading`.

use crate::content::Content;
use crate::error::{FatError, Result};
use crate::plugin::abi::{
    path_from_ptr, path_to_cstring, PluginDescriptor, PluginStatus, RegisterFn, ABI_VERSION,
    ENTRY_SYMBOL,
};
use crate::plugin::ArchivePlugin;
use bstr::BString;
use libloading::Library;
use std::ffi::{c_char, c_void, CStr};
use std::path::{Path, PathBuf};
use std::ptr;
use tempfile::TempPath;

/// An [`ArchivePlugin`] backed by a module's exported descriptor.
///
/// The descriptor points into the module's memory, so the library handle is kept for as
/// long as the plugin lives and closed when it is dropped.
pub struct DynamicPlugin {
    name: String,
    descriptor: *const PluginDescriptor,
    source: PathBuf,
    // Dropped last: unloads the module.
    _library: Option<Library>,
}

impl std::fmt::Debug for DynamicPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicPlugin")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}

impl DynamicPlugin {
    /// Open a module, resolve its entry symbol and validate the descriptor.
    pub fn open(path: &Path) -> Result<Self> {
        // Safety: loading a module runs its initializers; plugin directories are trusted
        // the same way as the binary itself.
        let library = unsafe { Library::new(path) }
            .map_err(|e| FatError::plugin_load(path, e.to_string()))?;

        let descriptor = {
            let register = unsafe { library.get::<RegisterFn>(ENTRY_SYMBOL) }
                .map_err(|e| FatError::plugin_load(path, format!("missing entry symbol: {}", e)))?;
            unsafe { register() }
        };

        // Safety: the descriptor was produced by the module just loaded and stays valid
        // while `library` is alive, which the returned value guarantees.
        unsafe { Self::from_descriptor(descriptor, Some(library), path) }
    }

    /// Wrap a descriptor that is already in memory.
    ///
    /// # Safety
    /// `descriptor` must be null or point to a descriptor that outlives the returned
    /// plugin. When it lives inside a module, pass that module as `library`.
    pub unsafe fn from_descriptor(
        descriptor: *const PluginDescriptor,
        library: Option<Library>,
        source: &Path,
    ) -> Result<Self> {
        if descriptor.is_null() {
            return Err(FatError::plugin_load(source, "registration returned null"));
        }
        let desc = &*descriptor;
        if desc.abi_version != ABI_VERSION {
            return Err(FatError::plugin_load(
                source,
                format!(
                    "ABI version {} does not match expected {}",
                    desc.abi_version, ABI_VERSION
                ),
            ));
        }
        if desc.name.is_null() {
            return Err(FatError::plugin_load(source, "plugin has no name"));
        }
        let name = CStr::from_ptr(desc.name).to_string_lossy().into_owned();

        Ok(Self {
            name,
            descriptor,
            source: source.to_path_buf(),
            _library: library,
        })
    }

    /// Path the module was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    fn descriptor(&self) -> &PluginDescriptor {
        // Safety: checked non-null in `from_descriptor` and kept alive by `_library`.
        unsafe { &*self.descriptor }
    }

    fn c_path(&self, path: &Path) -> Result<std::ffi::CString> {
        path_to_cstring(path).ok_or_else(|| {
            FatError::invalid_argument(format!("path contains NUL: {}", path.display()))
        })
    }
}

unsafe extern "C" fn collect_entry(ctx: *mut c_void, entry: *const u8, len: usize) {
    if ctx.is_null() || entry.is_null() {
        return;
    }
    let entries = &mut *(ctx as *mut Vec<BString>);
    entries.push(BString::from(std::slice::from_raw_parts(entry, len)));
}

impl ArchivePlugin for DynamicPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, path: &Path) -> bool {
        let Ok(c_path) = self.c_path(path) else {
            return false;
        };
        unsafe { (self.descriptor().can_handle)(c_path.as_ptr()) }
    }

    fn list_contents(&self, path: &Path) -> Result<Content> {
        let c_path = self.c_path(path)?;
        let mut entries: Vec<BString> = Vec::new();
        let status = unsafe {
            (self.descriptor().list_contents)(
                c_path.as_ptr(),
                &mut entries as *mut Vec<BString> as *mut c_void,
                collect_entry,
            )
        };
        match PluginStatus::from_raw(status) {
            PluginStatus::Ok => Ok(Content::new(entries)),
            other => Err(other.into_error(&self.name, "list_contents")),
        }
    }

    fn extract_entry(&self, archive: &Path, entry: &[u8]) -> Result<TempPath> {
        let c_archive = self.c_path(archive)?;
        let mut out: *mut c_char = ptr::null_mut();
        let desc = self.descriptor();
        let status = unsafe {
            (desc.extract_entry)(c_archive.as_ptr(), entry.as_ptr(), entry.len(), &mut out)
        };

        let extracted = if out.is_null() {
            None
        } else {
            let path = unsafe { path_from_ptr(out) };
            unsafe { (desc.free_string)(out) };
            path
        };

        match (PluginStatus::from_raw(status), extracted) {
            (PluginStatus::Ok, Some(path)) => Ok(TempPath::from_path(path)),
            (PluginStatus::Ok, None) => Err(FatError::archive(format!(
                "{} reported success without a path",
                self.name
            ))),
            (status, leftover) => {
                if let Some(path) = leftover {
                    let _ = std::fs::remove_file(path);
                }
                Err(status.into_error(&self.name, "extract_entry"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::abi::ExportedPlugin;
    use std::io::Write;

    #[derive(Default)]
    struct Listing;

    impl ArchivePlugin for Listing {
        fn name(&self) -> &str {
            "Listing Test Handler"
        }

        fn can_handle(&self, path: &Path) -> bool {
            path.extension().map_or(false, |ext| ext == "lst")
        }

        fn list_contents(&self, path: &Path) -> Result<Content> {
            crate::content::read_text_lines(path)
        }

        fn extract_entry(&self, _archive: &Path, entry: &[u8]) -> Result<TempPath> {
            if entry == b"missing" {
                return Err(FatError::not_found("no such entry"));
            }
            let mut file = crate::plugin::create_extraction_file(entry)?;
            file.write_all(entry)
                .map_err(|e| FatError::file_write(file.path(), e))?;
            Ok(file.into_temp_path())
        }
    }

    /// Same declared name as [`Listing`], but claims every path.
    #[derive(Default)]
    struct Greedy;

    impl ArchivePlugin for Greedy {
        fn name(&self) -> &str {
            "Listing Test Handler"
        }

        fn can_handle(&self, _path: &Path) -> bool {
            true
        }

        fn list_contents(&self, _path: &Path) -> Result<Content> {
            Ok(Content::empty())
        }

        fn extract_entry(&self, _archive: &Path, _entry: &[u8]) -> Result<TempPath> {
            Err(FatError::unsupported("listing only"))
        }
    }

    fn exported() -> (ExportedPlugin, DynamicPlugin) {
        let exported = ExportedPlugin::new::<Listing>();
        let plugin =
            unsafe { DynamicPlugin::from_descriptor(exported.descriptor(), None, Path::new("t")) }
                .unwrap();
        (exported, plugin)
    }

    #[test]
    fn calls_cross_the_abi() {
        let (_exported, plugin) = exported();
        assert_eq!(plugin.name(), "Listing Test Handler");
        assert!(plugin.can_handle(Path::new("/tmp/x.lst")));
        assert!(!plugin.can_handle(Path::new("/tmp/x.txt")));

        let mut list = tempfile::Builder::new().suffix(".lst").tempfile().unwrap();
        list.write_all(b"a.txt\nb/c.txt\n").unwrap();
        list.flush().unwrap();
        let content = plugin.list_contents(list.path()).unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content.lines()[1], "b/c.txt");
    }

    #[test]
    fn extracted_file_is_owned_by_host() {
        let (_exported, plugin) = exported();
        let temp = plugin
            .extract_entry(Path::new("/ignored.lst"), b"hello")
            .unwrap();
        let path = temp.to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        drop(temp);
        assert!(!path.exists());
    }

    #[test]
    fn plugin_errors_become_fat_errors() {
        let (_exported, plugin) = exported();
        let err = plugin
            .extract_entry(Path::new("/ignored.lst"), b"missing")
            .unwrap_err();
        assert!(matches!(err, FatError::NotFound { .. }));
    }

    #[test]
    fn rejects_null_descriptor_and_wrong_abi() {
        let err = unsafe { DynamicPlugin::from_descriptor(ptr::null(), None, Path::new("p")) }
            .unwrap_err();
        assert!(matches!(err, FatError::PluginLoad { .. }));

        let exported = ExportedPlugin::new::<Listing>();
        let mut copy = unsafe { ptr::read(exported.descriptor()) };
        copy.abi_version = ABI_VERSION + 1;
        let err = unsafe { DynamicPlugin::from_descriptor(&copy, None, Path::new("p")) }
            .unwrap_err();
        assert!(matches!(err, FatError::PluginLoad { .. }));
    }

    #[test]
    fn open_reports_non_modules() {
        let mut file = tempfile::Builder::new().suffix(".so").tempfile().unwrap();
        file.write_all(b"not a shared object").unwrap();
        file.flush().unwrap();
        let err = DynamicPlugin::open(file.path()).unwrap_err();
        assert!(matches!(err, FatError::PluginLoad { .. }));
    }

    #[test]
    fn second_module_with_same_name_is_rejected() {
        let first = ExportedPlugin::new::<Listing>();
        let second = ExportedPlugin::new::<Greedy>();
        let mut registry = crate::plugin::PluginRegistry::new();

        let wrap = |exported: &ExportedPlugin, source: &str| unsafe {
            DynamicPlugin::from_descriptor(exported.descriptor(), None, Path::new(source))
                .unwrap()
        };
        assert!(registry.register(Box::new(wrap(&first, "a.so"))));
        assert!(!registry.register(Box::new(wrap(&second, "b.so"))));

        assert_eq!(registry.len(), 1);
        assert!(registry.get_handler(Path::new("/tmp/x.lst")).is_some());
        assert!(registry.get_handler(Path::new("/tmp/x.txt")).is_none());
    }
}
