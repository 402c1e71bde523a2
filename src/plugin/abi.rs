//! C ABI shared between the viewer and native plugin modules.
//!
//! A module exports one symbol, [`ENTRY_SYMBOL`], returning a pointer to a static
//! [`PluginDescriptor`]. Plugins written in Rust get the symbol and all shims from
//! [`declare_archive_plugin!`](crate::declare_archive_plugin):
//!
//! ```ignore
//! #[derive(Default)]
//! struct SevenZip;
//! impl fat::plugin::ArchivePlugin for SevenZip { /* ... */ }
//! fat::declare_archive_plugin!(SevenZip);
//! ```
//!
//! Strings crossing the boundary are NUL-terminated paths or `(ptr, len)` byte slices.
//! Memory allocated by the module is returned to it through `free_string`.

use crate::error::FatError;
use crate::plugin::ArchivePlugin;
use std::ffi::{c_char, c_void, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::ptr;

/// Bumped whenever the descriptor layout changes.
pub const ABI_VERSION: u32 = 1;

/// Name of the registration function every module exports.
pub const ENTRY_SYMBOL: &[u8] = b"fat_plugin_register\0";

/// Signature of the exported registration function.
pub type RegisterFn = unsafe extern "C" fn() -> *const PluginDescriptor;

/// Receives one listing entry; `ctx` is the opaque pointer given to `list_contents`.
pub type EntryCallback = unsafe extern "C" fn(ctx: *mut c_void, entry: *const u8, len: usize);

/// Status codes returned by descriptor functions.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginStatus {
    Ok = 0,
    ArchiveError = 1,
    Unsupported = 2,
    FileRead = 3,
    FileWrite = 4,
    OutOfMemory = 5,
    NotFound = 6,
    InvalidArgument = 7,
}

impl PluginStatus {
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            2 => Self::Unsupported,
            3 => Self::FileRead,
            4 => Self::FileWrite,
            5 => Self::OutOfMemory,
            6 => Self::NotFound,
            7 => Self::InvalidArgument,
            _ => Self::ArchiveError,
        }
    }

    pub fn from_error(err: &FatError) -> Self {
        match err {
            FatError::Unsupported { .. } => Self::Unsupported,
            FatError::FileNotFound { .. } | FatError::FileRead { .. } => Self::FileRead,
            FatError::FileWrite { .. } => Self::FileWrite,
            FatError::OutOfMemory { .. } => Self::OutOfMemory,
            FatError::NotFound { .. } => Self::NotFound,
            FatError::InvalidArgument { .. } => Self::InvalidArgument,
            _ => Self::ArchiveError,
        }
    }

    /// Convert a non-`Ok` status reported by `plugin` into a [`FatError`].
    pub fn into_error(self, plugin: &str, operation: &str) -> FatError {
        let message = format!("{} failed in {} ({:?})", operation, plugin, self);
        match self {
            Self::Unsupported => FatError::unsupported(message),
            Self::OutOfMemory => FatError::OutOfMemory { message },
            Self::NotFound => FatError::not_found(message),
            Self::InvalidArgument => FatError::invalid_argument(message),
            _ => FatError::archive(message),
        }
    }
}

/// Descriptor exported by a plugin module.
#[repr(C)]
pub struct PluginDescriptor {
    pub abi_version: u32,
    /// NUL-terminated plugin name, valid for the lifetime of the module
    pub name: *const c_char,
    pub can_handle: unsafe extern "C" fn(path: *const c_char) -> bool,
    pub list_contents:
        unsafe extern "C" fn(path: *const c_char, ctx: *mut c_void, on_entry: EntryCallback) -> i32,
    pub extract_entry: unsafe extern "C" fn(
        archive: *const c_char,
        entry: *const u8,
        entry_len: usize,
        out_path: *mut *mut c_char,
    ) -> i32,
    /// Frees a string returned through `extract_entry`'s `out_path`
    pub free_string: unsafe extern "C" fn(s: *mut c_char),
}

/// Owned descriptor backing a Rust plugin exported through [`declare_archive_plugin!`].
///
/// [`declare_archive_plugin!`]: crate::declare_archive_plugin
pub struct ExportedPlugin {
    _name: CString,
    descriptor: PluginDescriptor,
}

// The descriptor only holds a pointer into `_name`, which is never mutated.
unsafe impl Send for ExportedPlugin {}
unsafe impl Sync for ExportedPlugin {}

impl ExportedPlugin {
    pub fn new<P: ArchivePlugin + Default>() -> Self {
        let name = CString::new(P::default().name().replace('\0', "")).unwrap_or_default();
        let descriptor = PluginDescriptor {
            abi_version: ABI_VERSION,
            name: name.as_ptr(),
            can_handle: can_handle_shim::<P>,
            list_contents: list_contents_shim::<P>,
            extract_entry: extract_entry_shim::<P>,
            free_string: free_string_shim,
        };
        Self {
            _name: name,
            descriptor,
        }
    }

    pub fn descriptor(&self) -> *const PluginDescriptor {
        &self.descriptor
    }
}

/// Export a Rust [`ArchivePlugin`] as a native module.
///
/// The type must implement `ArchivePlugin + Default`; each call through the ABI uses a
/// fresh `Default` instance.
#[macro_export]
macro_rules! declare_archive_plugin {
    ($plugin:ty) => {
        #[no_mangle]
        pub extern "C" fn fat_plugin_register() -> *const $crate::plugin::abi::PluginDescriptor {
            static EXPORTED: ::std::sync::OnceLock<$crate::plugin::abi::ExportedPlugin> =
                ::std::sync::OnceLock::new();
            EXPORTED
                .get_or_init($crate::plugin::abi::ExportedPlugin::new::<$plugin>)
                .descriptor()
        }
    };
}

pub(crate) unsafe fn path_from_ptr(path: *const c_char) -> Option<PathBuf> {
    if path.is_null() {
        return None;
    }
    let bytes = CStr::from_ptr(path).to_bytes();
    Some(path_from_bytes(bytes))
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

pub(crate) fn path_to_cstring(path: &Path) -> Option<CString> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path.to_string_lossy().into_owned().into_bytes();
    CString::new(bytes).ok()
}

unsafe extern "C" fn can_handle_shim<P: ArchivePlugin + Default>(path: *const c_char) -> bool {
    let Some(path) = path_from_ptr(path) else {
        return false;
    };
    catch_unwind(AssertUnwindSafe(|| P::default().can_handle(&path))).unwrap_or(false)
}

unsafe extern "C" fn list_contents_shim<P: ArchivePlugin + Default>(
    path: *const c_char,
    ctx: *mut c_void,
    on_entry: EntryCallback,
) -> i32 {
    let Some(path) = path_from_ptr(path) else {
        return PluginStatus::InvalidArgument as i32;
    };
    let listed = catch_unwind(AssertUnwindSafe(|| P::default().list_contents(&path)));
    match listed {
        Ok(Ok(content)) => {
            for line in content.lines() {
                on_entry(ctx, line.as_ptr(), line.len());
            }
            PluginStatus::Ok as i32
        }
        Ok(Err(err)) => PluginStatus::from_error(&err) as i32,
        Err(_) => PluginStatus::ArchiveError as i32,
    }
}

unsafe extern "C" fn extract_entry_shim<P: ArchivePlugin + Default>(
    archive: *const c_char,
    entry: *const u8,
    entry_len: usize,
    out_path: *mut *mut c_char,
) -> i32 {
    if out_path.is_null() || entry.is_null() {
        return PluginStatus::InvalidArgument as i32;
    }
    *out_path = ptr::null_mut();
    let Some(archive) = path_from_ptr(archive) else {
        return PluginStatus::InvalidArgument as i32;
    };
    let entry = std::slice::from_raw_parts(entry, entry_len).to_vec();

    let extracted = catch_unwind(AssertUnwindSafe(|| {
        P::default().extract_entry(&archive, &entry)
    }));
    match extracted {
        Ok(Ok(temp_path)) => {
            // Ownership of the file moves to the host, which deletes it when done.
            let path = match temp_path.keep() {
                Ok(path) => path,
                Err(_) => return PluginStatus::FileWrite as i32,
            };
            match path_to_cstring(&path) {
                Some(c_path) => {
                    *out_path = c_path.into_raw();
                    PluginStatus::Ok as i32
                }
                None => {
                    let _ = std::fs::remove_file(&path);
                    PluginStatus::InvalidArgument as i32
                }
            }
        }
        Ok(Err(err)) => PluginStatus::from_error(&err) as i32,
        Err(_) => PluginStatus::ArchiveError as i32,
    }
}

unsafe extern "C" fn free_string_shim(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
