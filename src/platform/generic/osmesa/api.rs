// coin-glue/src/platform/generic/osmesa/api.rs
//
//! The subset of the OSMesa API that the offscreen backend and the symbol source need.

use std::ffi::CStr;
use std::os::raw::c_void;

#[cfg(osmesa)]
use osmesa_sys::{OSMESA_CONTEXT_MAJOR_VERSION, OSMESA_CONTEXT_MINOR_VERSION, OSMESA_DEPTH_BITS};
#[cfg(osmesa)]
use osmesa_sys::{OSMESA_FORMAT, OSMESA_PROFILE, OSMESA_COMPAT_PROFILE, OSMESA_STENCIL_BITS};
#[cfg(osmesa)]
use osmesa_sys::{OSMesaContext, OSMesaCreateContextAttribs, OSMesaDestroyContext};
#[cfg(osmesa)]
use osmesa_sys::{OSMesaGetColorBuffer, OSMesaGetCurrentContext, OSMesaGetProcAddress};
#[cfg(osmesa)]
use osmesa_sys::OSMesaMakeCurrent;
#[cfg(osmesa)]
use std::os::raw::c_int;
#[cfg(osmesa)]
use std::ptr;

/// An untyped OSMesa context handle.
pub type OSMesaContextPtr = *mut c_void;

/// What was current on this thread, as reported by OSMesa.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OSMesaBinding {
    pub context: OSMesaContextPtr,
    pub buffer: *mut c_void,
    pub width: i32,
    pub height: i32,
}

/// OSMesa entry points. All buffers are RGBA, one unsigned byte per channel.
pub trait OSMesaApi: Send + Sync {
    /// Creates a compatibility-profile context with a 24-bit depth buffer. Returns null on
    /// failure.
    fn create_context(&self) -> OSMesaContextPtr;

    fn destroy_context(&self, context: OSMesaContextPtr);

    /// Binds `context` to `buffer` on this thread. A null context unbinds.
    fn make_current(&self, context: OSMesaContextPtr, buffer: *mut c_void, width: i32, height: i32)
                    -> bool;

    /// Returns the current context and its colour buffer, or `None` if nothing is current.
    fn current(&self) -> Option<OSMesaBinding>;

    fn get_proc_address(&self, symbol_name: &CStr) -> *const c_void;
}

/// The system OSMesa library.
#[cfg(osmesa)]
pub struct SystemOSMesa;

#[cfg(osmesa)]
impl OSMesaApi for SystemOSMesa {
    fn create_context(&self) -> OSMesaContextPtr {
        let attributes = [
            OSMESA_FORMAT,                  glow::RGBA as c_int,
            OSMESA_DEPTH_BITS,              24,
            OSMESA_STENCIL_BITS,            0,
            OSMESA_PROFILE,                 OSMESA_COMPAT_PROFILE,
            OSMESA_CONTEXT_MAJOR_VERSION,   2,
            OSMESA_CONTEXT_MINOR_VERSION,   1,
            0,
        ];
        unsafe { OSMesaCreateContextAttribs(attributes.as_ptr(), ptr::null_mut()) as *mut c_void }
    }

    fn destroy_context(&self, context: OSMesaContextPtr) {
        unsafe { OSMesaDestroyContext(context as OSMesaContext) }
    }

    fn make_current(&self, context: OSMesaContextPtr, buffer: *mut c_void, width: i32, height: i32)
                    -> bool {
        unsafe {
            OSMesaMakeCurrent(context as OSMesaContext,
                              buffer,
                              glow::UNSIGNED_BYTE,
                              width,
                              height) != 0
        }
    }

    fn current(&self) -> Option<OSMesaBinding> {
        unsafe {
            let context = OSMesaGetCurrentContext();
            if context.is_null() {
                return None;
            }
            let (mut width, mut height, mut format, mut buffer) = (0, 0, 0, ptr::null_mut());
            OSMesaGetColorBuffer(context, &mut width, &mut height, &mut format, &mut buffer);
            Some(OSMesaBinding { context: context as *mut c_void, buffer, width, height })
        }
    }

    fn get_proc_address(&self, symbol_name: &CStr) -> *const c_void {
        unsafe {
            match OSMesaGetProcAddress(symbol_name.as_ptr()) {
                Some(pointer) => pointer as *const c_void,
                None => ptr::null(),
            }
        }
    }
}
