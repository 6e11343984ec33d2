// coin-glue/src/platform/windows/mod.rs
//
//! Symbol sources for Windows.

use super::generic::dylib::{DynamicLibrary, LibrarySymbolSource};

pub mod wgl;

/// Looks symbols up in `opengl32.dll`, which exports the GL 1.1 entry points.
pub(crate) fn gl_library_source() -> Option<LibrarySymbolSource> {
    let library = DynamicLibrary::open("opengl32.dll")?;
    Some(LibrarySymbolSource::new("opengl32", vec![library]))
}
