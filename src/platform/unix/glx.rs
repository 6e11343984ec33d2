// coin-glue/src/platform/unix/glx.rs
//
//! The GLX extension loader.

use super::GL_LIBRARY_NAMES;
use crate::loader::SymbolSource;
use crate::platform::generic::dylib::DynamicLibrary;

use std::ffi::CStr;
use std::mem;
use std::os::raw::{c_uchar, c_void};

type GlXGetProcAddressFn = unsafe extern "C" fn(*const c_uchar) -> *const c_void;

/// Resolves entry points with `glXGetProcAddressARB` (or the GLX 1.4 spelling).
pub struct GlxSymbolSource {
    get_proc_address: GlXGetProcAddressFn,
    // Keeps the library that exported the loader mapped.
    _library: DynamicLibrary,
}

impl GlxSymbolSource {
    /// Returns `None` when no GLX implementation is loaded or loadable.
    pub fn new() -> Option<GlxSymbolSource> {
        let libraries = DynamicLibrary::process_image()
            .into_iter()
            .chain(DynamicLibrary::open_first(GL_LIBRARY_NAMES));
        for library in libraries {
            for name in [c"glXGetProcAddressARB", c"glXGetProcAddress"] {
                let address = library.symbol(name);
                if !address.is_null() {
                    debug!("using {:?} from {}", name, library.name());
                    let get_proc_address =
                        unsafe { mem::transmute::<*const c_void, GlXGetProcAddressFn>(address) };
                    return Some(GlxSymbolSource { get_proc_address, _library: library });
                }
            }
        }
        None
    }
}

impl SymbolSource for GlxSymbolSource {
    fn name(&self) -> &str {
        "glx"
    }

    fn lookup(&self, symbol_name: &CStr) -> *const c_void {
        unsafe { (self.get_proc_address)(symbol_name.as_ptr() as *const c_uchar) }
    }
}
