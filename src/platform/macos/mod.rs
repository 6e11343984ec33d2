// coin-glue/src/platform/macos/mod.rs
//
//! Symbol sources for macOS.
//!
//! There is no extension loader on macOS; every entry point, core or extension, is exported by
//! the OpenGL framework.

use super::generic::dylib::{DynamicLibrary, LibrarySymbolSource};

pub(crate) const OPENGL_FRAMEWORK: &str =
    "/System/Library/Frameworks/OpenGL.framework/Versions/Current/OpenGL";

pub(crate) fn gl_library_source() -> LibrarySymbolSource {
    let libraries = DynamicLibrary::process_image()
        .into_iter()
        .chain(DynamicLibrary::open(OPENGL_FRAMEWORK))
        .collect();
    LibrarySymbolSource::new("dlsym", libraries)
}
