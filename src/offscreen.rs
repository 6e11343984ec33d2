// coin-glue/src/offscreen.rs
//
//! Pluggable offscreen rendering surfaces.
//!
//! An offscreen backend creates a hidden surface with its own GL state, makes it current on the
//! calling thread, and later puts back whatever was current before. Applications can install
//! their own backend before the runtime starts; otherwise the runtime picks one.

use crate::error::Error;

use euclid::default::Size2D;
use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, Mutex};

/// Creates and manages offscreen GL surfaces.
pub trait OffscreenBackend: Send + Sync {
    /// A short name for diagnostics.
    fn name(&self) -> &str;

    /// Creates an offscreen surface of `size` pixels, or returns `None` if that is not possible.
    fn create_offscreen(&self, size: Size2D<i32>) -> Option<OffscreenHandle>;

    /// Makes the surface current on this thread, remembering what was current before.
    fn make_current(&self, handle: &mut OffscreenHandle) -> bool;

    /// Puts back whatever was current before the last `make_current()`.
    fn reinstate_previous(&self, handle: &mut OffscreenHandle);

    /// Destroys the surface and everything it owns.
    fn destruct(&self, handle: OffscreenHandle);
}

/// A surface created by an `OffscreenBackend`. Only the backend that created it can interpret it.
pub struct OffscreenHandle {
    backend: String,
    size: Size2D<i32>,
    inner: Box<dyn Any>,
}

impl OffscreenHandle {
    pub fn new<T>(backend: &str, size: Size2D<i32>, inner: T) -> OffscreenHandle where T: Any {
        OffscreenHandle { backend: backend.to_owned(), size, inner: Box::new(inner) }
    }

    /// The name of the backend that created this surface.
    #[inline]
    pub fn backend_name(&self) -> &str {
        &self.backend
    }

    #[inline]
    pub fn size(&self) -> Size2D<i32> {
        self.size
    }

    pub fn downcast_mut<T>(&mut self) -> Result<&mut T, Error> where T: Any {
        self.inner.downcast_mut().ok_or(Error::IncompatibleHandle)
    }

    /// Unwraps the backend-specific state, handing the handle back if it is of another type.
    pub fn into_inner<T>(self) -> Result<T, OffscreenHandle> where T: Any {
        let OffscreenHandle { backend, size, inner } = self;
        match inner.downcast() {
            Ok(inner) => Ok(*inner),
            Err(inner) => Err(OffscreenHandle { backend, size, inner }),
        }
    }
}

impl Debug for OffscreenHandle {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.debug_struct("OffscreenHandle")
                 .field("backend", &self.backend)
                 .field("size", &self.size)
                 .finish()
    }
}

struct PendingBackend {
    backend: Option<Arc<dyn OffscreenBackend>>,
    runtime_live: bool,
}

lazy_static! {
    static ref PENDING_BACKEND: Mutex<PendingBackend> =
        Mutex::new(PendingBackend { backend: None, runtime_live: false });
}

/// Installs the backend the next runtime will use for offscreen rendering.
///
/// This must happen before `coin_glue::init()`; afterwards it returns
/// `Error::AlreadyInitialized` and leaves the running backend alone.
pub fn set_offscreen_backend(backend: Arc<dyn OffscreenBackend>) -> Result<(), Error> {
    let mut pending = PENDING_BACKEND.lock().unwrap();
    if pending.runtime_live {
        return Err(Error::AlreadyInitialized);
    }
    if let Some(ref previous) = pending.backend {
        warn!("replacing pending offscreen backend {} with {}", previous.name(), backend.name());
    }
    pending.backend = Some(backend);
    Ok(())
}

/// Called by the global runtime when it starts. Hands over the pending backend, if any.
pub(crate) fn take_pending_backend() -> Option<Arc<dyn OffscreenBackend>> {
    let mut pending = PENDING_BACKEND.lock().unwrap();
    pending.runtime_live = true;
    pending.backend.take()
}

/// Called by the global runtime when it shuts down.
pub(crate) fn release_pending_backend() {
    PENDING_BACKEND.lock().unwrap().runtime_live = false;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A backend with no GL behind it. Counts calls so tests can check pairing.
    #[derive(Default)]
    pub(crate) struct CountingBackend {
        pub(crate) created: AtomicUsize,
        pub(crate) made_current: AtomicUsize,
        pub(crate) reinstated: AtomicUsize,
        pub(crate) destructed: AtomicUsize,
    }

    impl OffscreenBackend for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        fn create_offscreen(&self, size: Size2D<i32>) -> Option<OffscreenHandle> {
            if size.width <= 0 || size.height <= 0 {
                return None;
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Some(OffscreenHandle::new(self.name(), size, 0u32))
        }

        fn make_current(&self, handle: &mut OffscreenHandle) -> bool {
            *handle.downcast_mut::<u32>().unwrap() += 1;
            self.made_current.fetch_add(1, Ordering::SeqCst);
            true
        }

        fn reinstate_previous(&self, _: &mut OffscreenHandle) {
            self.reinstated.fetch_add(1, Ordering::SeqCst);
        }

        fn destruct(&self, handle: OffscreenHandle) {
            handle.into_inner::<u32>().unwrap();
            self.destructed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_handle_downcast() {
        let mut handle = OffscreenHandle::new("test", Size2D::new(4, 4), 7u32);
        assert_eq!(handle.backend_name(), "test");
        assert_eq!(handle.downcast_mut::<String>().err(), Some(Error::IncompatibleHandle));
        assert_eq!(*handle.downcast_mut::<u32>().unwrap(), 7);
        let handle = handle.into_inner::<String>().unwrap_err();
        assert_eq!(handle.into_inner::<u32>().unwrap(), 7);
    }
}
