// coin-glue/src/platform/generic/osmesa/context.rs
//
//! Offscreen rendering into client memory with OSMesa.

use crate::debug;
use crate::offscreen::{OffscreenBackend, OffscreenHandle};
use super::api::{OSMesaApi, OSMesaBinding, OSMesaContextPtr};

use euclid::default::Size2D;
use std::os::raw::c_void;
use std::ptr;
use std::sync::Arc;

const BYTES_PER_PIXEL: usize = 4;

/// An offscreen backend that renders into an RGBA buffer in client memory.
pub struct OSMesaBackend<A> where A: OSMesaApi {
    api: Arc<A>,
    debug: bool,
}

/// The state behind an `OffscreenHandle` created by `OSMesaBackend`.
pub struct OSMesaSurface {
    context: OSMesaContextPtr,
    pixels: Vec<u8>,
    size: Size2D<i32>,
    // Only one level is remembered. Making the same surface current twice without reinstating
    // in between loses the older binding.
    previous: Option<OSMesaBinding>,
}

impl OSMesaSurface {
    /// The rendered pixels, bottom row first.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn size(&self) -> Size2D<i32> {
        self.size
    }

    fn buffer(&mut self) -> *mut c_void {
        self.pixels.as_mut_ptr() as *mut c_void
    }
}

impl<A> OSMesaBackend<A> where A: OSMesaApi {
    pub fn new(api: Arc<A>) -> OSMesaBackend<A> {
        OSMesaBackend { api, debug: false }
    }

    /// Reports surface creation and destruction through the debug channel.
    pub fn with_debug(mut self, debug: bool) -> OSMesaBackend<A> {
        self.debug = debug;
        self
    }

    #[inline]
    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    fn allocate_pixels(size: Size2D<i32>) -> Option<Vec<u8>> {
        let length = (size.width as usize).checked_mul(size.height as usize)?
                                          .checked_mul(BYTES_PER_PIXEL)?;
        let mut pixels = Vec::new();
        if pixels.try_reserve_exact(length).is_err() {
            return None;
        }
        pixels.resize(length, 0);
        Some(pixels)
    }
}

impl<A> OffscreenBackend for OSMesaBackend<A> where A: OSMesaApi + 'static {
    fn name(&self) -> &str {
        "osmesa"
    }

    fn create_offscreen(&self, size: Size2D<i32>) -> Option<OffscreenHandle> {
        if size.width <= 0 || size.height <= 0 {
            debug::post_error("OSMesaBackend::create_offscreen",
                              format!("invalid size {}x{}", size.width, size.height));
            return None;
        }

        let pixels = match OSMesaBackend::<A>::allocate_pixels(size) {
            Some(pixels) => pixels,
            None => {
                debug::post_error("OSMesaBackend::create_offscreen",
                                  format!("out of memory allocating a {}x{} buffer",
                                          size.width,
                                          size.height));
                return None;
            }
        };

        let context = self.api.create_context();
        if context.is_null() {
            debug::post_error("OSMesaBackend::create_offscreen",
                              "OSMesaCreateContext failed");
            return None;
        }

        if self.debug {
            debug::post_info("OSMesaBackend::create_offscreen",
                             format!("created {:p} ({}x{})", context, size.width, size.height));
        }

        Some(OffscreenHandle::new(self.name(),
                                  size,
                                  OSMesaSurface { context, pixels, size, previous: None }))
    }

    fn make_current(&self, handle: &mut OffscreenHandle) -> bool {
        let surface = match handle.downcast_mut::<OSMesaSurface>() {
            Ok(surface) => surface,
            Err(_) => return false,
        };

        surface.previous = self.api.current();
        let buffer = surface.buffer();
        let ok = self.api.make_current(surface.context,
                                       buffer,
                                       surface.size.width,
                                       surface.size.height);
        if !ok {
            debug::post_warning("OSMesaBackend::make_current", "OSMesaMakeCurrent failed");
        }
        ok
    }

    fn reinstate_previous(&self, handle: &mut OffscreenHandle) {
        let surface = match handle.downcast_mut::<OSMesaSurface>() {
            Ok(surface) => surface,
            Err(_) => return,
        };

        let ok = match surface.previous.take() {
            Some(previous) => {
                self.api.make_current(previous.context,
                                      previous.buffer,
                                      previous.width,
                                      previous.height)
            }
            None => self.api.make_current(ptr::null_mut(), ptr::null_mut(), 0, 0),
        };
        if !ok {
            debug::post_warning("OSMesaBackend::reinstate_previous",
                                "couldn't restore the previous OSMesa context");
        }
    }

    fn destruct(&self, handle: OffscreenHandle) {
        let surface = match handle.into_inner::<OSMesaSurface>() {
            Ok(surface) => surface,
            Err(handle) => {
                debug::post_error("OSMesaBackend::destruct",
                                  format!("handle belongs to {}", handle.backend_name()));
                return;
            }
        };

        if self.api.current().map_or(false, |current| current.context == surface.context) {
            self.api.make_current(ptr::null_mut(), ptr::null_mut(), 0, 0);
        }
        self.api.destroy_context(surface.context);

        if self.debug {
            debug::post_info("OSMesaBackend::destruct", format!("destroyed {:p}", surface.context));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::generic::osmesa::api::fake::FakeOSMesa;

    fn backend(fake: FakeOSMesa) -> OSMesaBackend<FakeOSMesa> {
        OSMesaBackend::new(Arc::new(fake))
    }

    #[test]
    fn test_create_make_current_and_destruct() {
        let backend = backend(FakeOSMesa::default());
        let mut handle = backend.create_offscreen(Size2D::new(16, 8)).unwrap();
        assert_eq!(handle.size(), Size2D::new(16, 8));
        assert_eq!(handle.downcast_mut::<OSMesaSurface>().unwrap().pixels().len(), 16 * 8 * 4);

        assert!(backend.make_current(&mut handle));
        assert!(!backend.api().current_context().is_null());
        backend.reinstate_previous(&mut handle);
        assert!(backend.api().current_context().is_null());

        backend.destruct(handle);
        assert_eq!(backend.api().live_contexts(), 0);
    }

    #[test]
    fn test_reinstates_outer_context() {
        let backend = backend(FakeOSMesa::default());
        let mut outer = backend.create_offscreen(Size2D::new(4, 4)).unwrap();
        let mut inner = backend.create_offscreen(Size2D::new(2, 2)).unwrap();

        assert!(backend.make_current(&mut outer));
        let outer_context = backend.api().current_context();
        assert!(backend.make_current(&mut inner));
        assert_ne!(backend.api().current_context(), outer_context);
        backend.reinstate_previous(&mut inner);
        assert_eq!(backend.api().current_context(), outer_context);

        backend.reinstate_previous(&mut outer);
        backend.destruct(inner);
        backend.destruct(outer);
        assert_eq!(backend.api().live_contexts(), 0);
    }

    #[test]
    fn test_destruct_clears_current_context() {
        let backend = backend(FakeOSMesa::default());
        let mut handle = backend.create_offscreen(Size2D::new(4, 4)).unwrap();
        assert!(backend.make_current(&mut handle));
        backend.destruct(handle);
        assert!(backend.api().current_context().is_null());
    }

    #[test]
    fn test_creation_failures() {
        let backend = backend(FakeOSMesa::failing_create());
        assert!(backend.create_offscreen(Size2D::new(4, 4)).is_none());
        assert!(backend.create_offscreen(Size2D::new(0, 4)).is_none());
        assert!(OSMesaBackend::<FakeOSMesa>::allocate_pixels(Size2D::new(i32::MAX, i32::MAX))
                    .is_none());
    }

    #[test]
    fn test_make_current_failure_is_reported() {
        let backend = backend(FakeOSMesa::failing_make_current());
        let mut handle = backend.create_offscreen(Size2D::new(4, 4)).unwrap();
        assert!(!backend.make_current(&mut handle));
        backend.destruct(handle);
    }
}
