//! Archive handlers bundled with the viewer.
//!
//! They are registered after any native modules, so a module declaring the same name
//! replaces the bundled version.

pub mod compression;
pub mod tar;
pub mod zip;

pub use self::compression::{CompressionType, DecompressorPlugin};
pub use self::tar::TarPlugin;
pub use self::zip::ZipPlugin;

use crate::plugin::PluginRegistry;

/// Register the bundled handlers; returns how many were accepted.
pub fn register_bundled(registry: &mut PluginRegistry) -> usize {
    let bundled: Vec<Box<dyn crate::plugin::ArchivePlugin>> = vec![
        Box::new(DecompressorPlugin::new(CompressionType::Gzip)),
        Box::new(DecompressorPlugin::new(CompressionType::Zstd)),
        Box::new(TarPlugin),
        Box::new(ZipPlugin),
    ];
    bundled
        .into_iter()
        .map(|plugin| registry.register(plugin))
        .filter(|accepted| *accepted)
        .count()
}
