// coin-glue/src/platform/generic/osmesa/loader.rs
//
//! OpenGL function pointer loading for OSMesa.

use crate::loader::SymbolSource;
use super::api::OSMesaApi;

use std::ffi::CStr;
use std::os::raw::c_void;
use std::sync::Arc;

/// Resolves symbols through `OSMesaGetProcAddress`.
///
/// OSMesa exposes some entry points, notably the framebuffer-object family, only through this
/// table. Placed last in a loader chain it fills those gaps without shadowing anything.
pub struct OSMesaSymbolSource<A> where A: OSMesaApi {
    api: Arc<A>,
}

impl<A> OSMesaSymbolSource<A> where A: OSMesaApi {
    pub fn new(api: Arc<A>) -> OSMesaSymbolSource<A> {
        OSMesaSymbolSource { api }
    }
}

impl<A> SymbolSource for OSMesaSymbolSource<A> where A: OSMesaApi {
    fn name(&self) -> &str {
        "osmesa"
    }

    fn lookup(&self, symbol_name: &CStr) -> *const c_void {
        self.api.get_proc_address(symbol_name)
    }
}
