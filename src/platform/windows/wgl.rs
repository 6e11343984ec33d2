// coin-glue/src/platform/windows/wgl.rs
//
//! The WGL extension loader.

use crate::loader::SymbolSource;
use crate::platform::generic::dylib::DynamicLibrary;

use std::ffi::CStr;
use std::mem;
use std::os::raw::{c_char, c_void};
use std::ptr;

type WglGetProcAddressFn = unsafe extern "system" fn(*const c_char) -> *const c_void;

/// Resolves extension entry points with `wglGetProcAddress`.
///
/// `wglGetProcAddress` only works while a context is current, and some drivers return the small
/// integers 1, 2, 3 or -1 instead of null for unknown names; those are treated as null.
pub struct WglSymbolSource {
    get_proc_address: WglGetProcAddressFn,
    _library: DynamicLibrary,
}

impl WglSymbolSource {
    pub fn new() -> Option<WglSymbolSource> {
        let library = DynamicLibrary::open("opengl32.dll")?;
        let address = library.symbol(c"wglGetProcAddress");
        if address.is_null() {
            return None;
        }
        let get_proc_address =
            unsafe { mem::transmute::<*const c_void, WglGetProcAddressFn>(address) };
        Some(WglSymbolSource { get_proc_address, _library: library })
    }
}

pub(crate) fn is_invalid_wgl_address(address: *const c_void) -> bool {
    matches!(address as isize, -1 | 0 | 1 | 2 | 3)
}

impl SymbolSource for WglSymbolSource {
    fn name(&self) -> &str {
        "wgl"
    }

    fn lookup(&self, symbol_name: &CStr) -> *const c_void {
        let address = unsafe { (self.get_proc_address)(symbol_name.as_ptr()) };
        if is_invalid_wgl_address(address) {
            ptr::null()
        } else {
            address
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_invalid_wgl_address;
    use std::os::raw::c_void;

    #[test]
    fn test_sentinel_addresses() {
        for value in [-1isize, 0, 1, 2, 3] {
            assert!(is_invalid_wgl_address(value as *const c_void));
        }
        assert!(!is_invalid_wgl_address(0x1000 as *const c_void));
    }
}
