// coin-glue/src/platform/mod.rs
//
//! Platform-specific symbol sources and offscreen backends.

use crate::loader::SymbolSource;
use crate::offscreen::OffscreenBackend;

use std::sync::Arc;

pub mod generic;

#[cfg(linux)]
pub mod unix;

#[cfg(macos)]
pub mod macos;

#[cfg(windows)]
pub mod windows;

/// The platform's extension loader followed by the shared-library lookup.
pub(crate) fn default_sources() -> Vec<Box<dyn SymbolSource>> {
    let mut sources: Vec<Box<dyn SymbolSource>> = vec![];

    #[cfg(linux)]
    {
        if let Some(glx) = unix::glx::GlxSymbolSource::new() {
            sources.push(Box::new(glx));
        }
        sources.push(Box::new(unix::gl_library_source()));
    }

    #[cfg(macos)]
    sources.push(Box::new(macos::gl_library_source()));

    #[cfg(windows)]
    {
        if let Some(wgl) = windows::wgl::WglSymbolSource::new() {
            sources.push(Box::new(wgl));
        }
        if let Some(library) = windows::gl_library_source() {
            sources.push(Box::new(library));
        }
    }

    sources
}

/// The software rasterizer's own proc-address table, if it is compiled in.
#[cfg(osmesa)]
pub(crate) fn osmesa_fallback_source() -> Option<Box<dyn SymbolSource>> {
    use generic::osmesa::api::SystemOSMesa;
    use generic::osmesa::loader::OSMesaSymbolSource;
    Some(Box::new(OSMesaSymbolSource::new(Arc::new(SystemOSMesa))))
}

#[cfg(not(osmesa))]
pub(crate) fn osmesa_fallback_source() -> Option<Box<dyn SymbolSource>> {
    None
}

/// The backend used for offscreen rendering when the application installs none.
///
/// Framebuffer objects need a host context, so only OSMesa can serve as a default.
#[cfg(osmesa)]
pub(crate) fn default_offscreen_backend(debug: bool) -> Option<Arc<dyn OffscreenBackend>> {
    use generic::osmesa::api::SystemOSMesa;
    use generic::osmesa::context::OSMesaBackend;
    Some(Arc::new(OSMesaBackend::new(Arc::new(SystemOSMesa)).with_debug(debug)))
}

#[cfg(not(osmesa))]
pub(crate) fn default_offscreen_backend(_debug: bool) -> Option<Arc<dyn OffscreenBackend>> {
    None
}
