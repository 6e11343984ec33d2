// coin-glue/src/platform/unix/mod.rs
//
//! Symbol sources for Linux and the BSDs.

use super::generic::dylib::{DynamicLibrary, LibrarySymbolSource};

pub mod glx;

pub(crate) const GL_LIBRARY_NAMES: [&str; 2] = ["libGL.so.1", "libGL.so"];

/// Looks symbols up in the process image first, then in `libGL` if it can be loaded.
pub(crate) fn gl_library_source() -> LibrarySymbolSource {
    let libraries = DynamicLibrary::process_image()
        .into_iter()
        .chain(DynamicLibrary::open_first(GL_LIBRARY_NAMES))
        .collect();
    LibrarySymbolSource::new("dlsym", libraries)
}
