// coin-glue/src/runtime.rs
//
//! The process-wide runtime.
//!
//! A `Runtime` owns everything this library would otherwise keep in globals: the symbol loader,
//! the driver quirk table, the capability-record cache, the library-wide lock, the teardown
//! registry, the offscreen backend and the lazily loaded GLU library. Applications normally
//! create one with `coin_glue::init()` and tear it down with `coin_glue::shutdown()`; tests and
//! embedders can also build private instances.

use crate::atexit::{AtexitRegistry, Priority};
use crate::config::GlueConfig;
use crate::context::ContextID;
use crate::debug;
use crate::driver_db::DriverDatabase;
use crate::error::Error;
use crate::framebuffer::FramebufferBackend;
use crate::glu::GluWrapper;
use crate::glue::GlueContext;
use crate::loader::{ProcAddressLoader, SymbolSource};
use crate::offscreen::{self, OffscreenBackend, OffscreenHandle};
use crate::platform;
use crate::registry::GlueRegistry;
use crate::sync::{self, LockTiming, ReentrantLock};

use euclid::default::Size2D;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, Mutex, RwLock, Weak};

lazy_static! {
    static ref RUNTIME: RwLock<Option<Arc<Runtime>>> = RwLock::new(None);
}

enum GluState {
    Unloaded,
    Loaded(Arc<GluWrapper>),
    Missing,
}

pub struct Runtime {
    config: GlueConfig,
    global_lock: Arc<ReentrantLock>,
    registry: GlueRegistry,
    atexit: AtexitRegistry,
    offscreen_backend: Option<Arc<dyn OffscreenBackend>>,
    glu: Mutex<GluState>,
}

/// Configures a `Runtime`.
pub struct RuntimeBuilder {
    config: GlueConfig,
    sources: Option<Vec<Box<dyn SymbolSource>>>,
    driver_database: Option<DriverDatabase>,
    offscreen_backend: Option<Arc<dyn OffscreenBackend>>,
}

impl RuntimeBuilder {
    pub fn config(mut self, config: GlueConfig) -> RuntimeBuilder {
        self.config = config;
        self
    }

    /// Replaces the platform's default symbol sources. The OSMesa fallback is not appended to
    /// an explicit chain.
    pub fn sources(mut self, sources: Vec<Box<dyn SymbolSource>>) -> RuntimeBuilder {
        self.sources = Some(sources);
        self
    }

    /// Replaces the built-in driver quirk table.
    pub fn driver_database(mut self, driver_database: DriverDatabase) -> RuntimeBuilder {
        self.driver_database = Some(driver_database);
        self
    }

    /// Uses `backend` for offscreen rendering instead of the platform default.
    pub fn offscreen_backend(mut self, backend: Arc<dyn OffscreenBackend>) -> RuntimeBuilder {
        self.offscreen_backend = Some(backend);
        self
    }

    /// Builds a private runtime. It isn't reachable through `Runtime::current()`.
    pub fn build(self) -> Arc<Runtime> {
        let RuntimeBuilder { config, sources, driver_database, offscreen_backend } = self;

        let loader = match sources {
            Some(sources) => ProcAddressLoader::new(sources),
            None => ProcAddressLoader::platform_default(config.osmesa_fallback),
        };
        debug!("symbol sources: {:?}", loader.source_names());

        let timing = LockTiming {
            enabled: config.mutex_lock_timing,
            max_hold_time: config.mutex_lock_max_time,
        };
        let global_lock = Arc::new(ReentrantLock::new("coin-glue global lock", timing));
        let driver_database = driver_database.unwrap_or_else(DriverDatabase::builtin);
        let registry = GlueRegistry::new(Arc::new(loader),
                                         Arc::new(driver_database),
                                         global_lock.clone(),
                                         config.debug_caching);

        let offscreen_backend = offscreen_backend.or_else(|| {
            platform::default_offscreen_backend(config.debug_osmesa)
        });
        match offscreen_backend {
            Some(ref backend) => debug!("offscreen backend: {}", backend.name()),
            None => debug!("no offscreen backend"),
        }

        let atexit = AtexitRegistry::new();
        atexit.set_trace(config.debug_cleanup);

        let runtime = Arc::new(Runtime {
            config,
            global_lock,
            registry,
            atexit,
            offscreen_backend,
            glu: Mutex::new(GluState::Unloaded),
        });
        runtime.register_teardown();
        runtime
    }

    /// Builds the runtime and installs it as the process-wide one.
    ///
    /// A backend passed to `offscreen::set_offscreen_backend()` is used unless this builder was
    /// given one explicitly.
    pub fn init(mut self) -> Result<Arc<Runtime>, Error> {
        let mut slot = RUNTIME.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.is_some() {
            return Err(Error::AlreadyInitialized);
        }

        if let Some(pending) = offscreen::take_pending_backend() {
            match self.offscreen_backend {
                Some(ref explicit) => {
                    warn!("ignoring pending offscreen backend {} in favor of {}",
                          pending.name(),
                          explicit.name());
                }
                None => self.offscreen_backend = Some(pending),
            }
        }

        let runtime = self.build();
        *slot = Some(runtime.clone());
        info!("coin-glue runtime initialized");
        Ok(runtime)
    }
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder {
            config: GlueConfig::default(),
            sources: None,
            driver_database: None,
            offscreen_backend: None,
        }
    }

    /// The process-wide runtime.
    pub fn current() -> Result<Arc<Runtime>, Error> {
        let slot = RUNTIME.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.clone().ok_or(Error::NotInitialized)
    }

    /// Uninstalls the process-wide runtime and runs its teardown.
    pub(crate) fn shutdown_current() -> Result<(), Error> {
        let runtime = RUNTIME.write()
                             .unwrap_or_else(|poisoned| poisoned.into_inner())
                             .take()
                             .ok_or(Error::NotInitialized)?;
        runtime.shutdown();
        offscreen::release_pending_backend();
        info!("coin-glue runtime shut down");
        Ok(())
    }

    fn register_teardown(self: &Arc<Runtime>) {
        let runtime = Arc::downgrade(self);
        self.atexit.register("capability cache", Priority::NORMAL_LOW_PRIORITY, move || {
            if let Some(runtime) = Weak::upgrade(&runtime) {
                runtime.registry.clear();
            }
        });

        let runtime = Arc::downgrade(self);
        self.atexit.register("glu", Priority::DYNLIBS, move || {
            if let Some(runtime) = Weak::upgrade(&runtime) {
                *runtime.glu_state() = GluState::Unloaded;
            }
        });

        let report = self.config.debug_mutex_count;
        self.atexit.register("mutex count", Priority::THREAD_SUBSYSTEM, move || {
            if report {
                debug::post_info("Runtime::shutdown",
                                 format!("{} library locks alive", sync::live_lock_count()));
            }
        });
    }

    /// Runs this runtime's teardown callbacks.
    ///
    /// # Panics
    ///
    /// Panics if called twice.
    pub fn shutdown(&self) {
        self.atexit.run_teardown();
    }

    /// Returns true once teardown has begun.
    #[inline]
    pub fn is_exiting(&self) -> bool {
        self.atexit.is_exiting()
    }

    #[inline]
    pub fn config(&self) -> &GlueConfig {
        &self.config
    }

    #[inline]
    pub fn loader(&self) -> &Arc<ProcAddressLoader> {
        self.registry.loader()
    }

    #[inline]
    pub fn driver_database(&self) -> &Arc<DriverDatabase> {
        self.registry.driver_db()
    }

    #[inline]
    pub fn registry(&self) -> &GlueRegistry {
        &self.registry
    }

    /// The library-wide lock. It may be locked again by the thread holding it.
    #[inline]
    pub fn global_lock(&self) -> &ReentrantLock {
        &self.global_lock
    }

    #[inline]
    pub fn offscreen_backend(&self) -> Option<&Arc<dyn OffscreenBackend>> {
        self.offscreen_backend.as_ref()
    }

    /// The capability record of context `id`, built from the current context on first use.
    pub fn instance(&self, id: ContextID) -> Result<Arc<GlueContext>, Error> {
        self.registry.instance(id)
    }

    /// Forgets the capability record of a destroyed context.
    pub fn destruct(&self, id: ContextID) -> bool {
        self.registry.destruct(id)
    }

    /// A `glow` context for context `id`, which must be current.
    pub fn glow_context(&self, id: ContextID) -> Result<glow::Context, Error> {
        self.instance(id)?.glow_context()
    }

    /// Registers a client teardown callback.
    ///
    /// # Panics
    ///
    /// Panics if teardown has already begun.
    pub fn atexit<F>(&self, name: &str, priority: Priority, callback: F)
                     where F: FnOnce() + Send + 'static {
        self.atexit.register(name, priority, callback)
    }

    /// The teardown registry, for declaring dependencies between callbacks.
    #[inline]
    pub fn atexit_registry(&self) -> &AtexitRegistry {
        &self.atexit
    }

    fn glu_state(&self) -> std::sync::MutexGuard<GluState> {
        self.glu.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The GLU library, loaded on first request.
    ///
    /// A failed load isn't retried.
    pub fn glu(&self) -> Result<Arc<GluWrapper>, Error> {
        let mut glu = self.glu_state();
        if let GluState::Unloaded = *glu {
            if self.is_exiting() {
                return Err(Error::NotInitialized);
            }
            *glu = match GluWrapper::load(&self.config) {
                Ok(wrapper) => GluState::Loaded(Arc::new(wrapper)),
                Err(error) => {
                    debug::post_warning("Runtime::glu", format!("GLU unavailable: {}", error));
                    GluState::Missing
                }
            };
        }
        match *glu {
            GluState::Loaded(ref wrapper) => Ok(wrapper.clone()),
            _ => Err(Error::NoGLULibraryFound),
        }
    }

    /// Binds GLU through `source` instead of searching for the system library.
    pub fn set_glu_source(&self, source: Box<dyn SymbolSource>) -> Result<Arc<GluWrapper>, Error> {
        let wrapper =
            Arc::new(GluWrapper::from_source(source, self.config.glu_version_override.as_deref())?);
        *self.glu_state() = GluState::Loaded(wrapper.clone());
        Ok(wrapper)
    }

    /// An offscreen backend rendering into framebuffer objects of context `host`, which must be
    /// current.
    pub fn framebuffer_backend(&self, host: ContextID) -> Result<FramebufferBackend, Error> {
        let host = self.instance(host)?;
        Ok(FramebufferBackend::new(host)?.with_debug(self.config.debug_fbo))
    }

    /// Creates an offscreen context with the installed backend and gives it a fresh ID.
    pub fn create_offscreen(&self, size: Size2D<i32>) -> Result<OffscreenContext, Error> {
        let backend = self.offscreen_backend.clone().ok_or(Error::NoOffscreenBackend)?;
        let handle = backend.create_offscreen(size).ok_or(Error::OffscreenCreationFailed)?;
        let id = ContextID::next();
        debug!("created offscreen context {} ({}x{}) with {}",
               id,
               size.width,
               size.height,
               backend.name());
        Ok(OffscreenContext { id, backend, handle: Some(handle) })
    }

    /// Destroys an offscreen context and forgets its capability record.
    pub fn destruct_offscreen(&self, mut context: OffscreenContext) {
        if let Some(handle) = context.handle.take() {
            context.backend.destruct(handle);
        }
        self.registry.destruct(context.id);
    }

    /// Renders into a temporary offscreen context.
    ///
    /// The context is made current, `function` receives its capability record, and afterwards
    /// the previous context is reinstated and the offscreen one destroyed.
    pub fn render_offscreen<F, R>(&self, size: Size2D<i32>, function: F) -> Result<R, Error>
                                  where F: FnOnce(&GlueContext) -> R {
        let mut context = self.create_offscreen(size)?;
        let result = if context.make_current() {
            let result = self.instance(context.id()).map(|glue| function(&*glue));
            context.reinstate_previous();
            result
        } else {
            Err(Error::MakeCurrentFailed)
        };
        self.destruct_offscreen(context);
        result
    }
}

impl Debug for Runtime {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.debug_struct("Runtime")
                 .field("loader", self.loader())
                 .field("contexts", &self.registry.len())
                 .field("offscreen_backend", &self.offscreen_backend.as_ref().map(|b| b.name()))
                 .field("exiting", &self.is_exiting())
                 .finish()
    }
}

/// An offscreen surface together with the context ID its capability record is filed under.
///
/// Must be destroyed with `Runtime::destruct_offscreen()`.
pub struct OffscreenContext {
    id: ContextID,
    backend: Arc<dyn OffscreenBackend>,
    handle: Option<OffscreenHandle>,
}

impl OffscreenContext {
    #[inline]
    pub fn id(&self) -> ContextID {
        self.id
    }

    pub fn handle_mut(&mut self) -> Option<&mut OffscreenHandle> {
        self.handle.as_mut()
    }

    /// Makes the surface current, remembering what was current before.
    pub fn make_current(&mut self) -> bool {
        match self.handle {
            Some(ref mut handle) => self.backend.make_current(handle),
            None => false,
        }
    }

    pub fn reinstate_previous(&mut self) {
        if let Some(ref mut handle) = self.handle {
            self.backend.reinstate_previous(handle);
        }
    }
}

impl Drop for OffscreenContext {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug::post_error("OffscreenContext::drop",
                              format!("offscreen context {} leaked; destroying it", self.id));
            self.backend.destruct(handle);
        }
    }
}

impl Debug for OffscreenContext {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.debug_struct("OffscreenContext")
                 .field("id", &self.id)
                 .field("backend", &self.backend.name())
                 .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_gl::{self, FakeDriver, FakeGlSource};
    use crate::feature::GLFeature;
    use crate::offscreen::tests::CountingBackend;
    use std::sync::atomic::Ordering;

    fn runtime_with(backend: Option<Arc<dyn OffscreenBackend>>) -> Arc<Runtime> {
        let mut builder = Runtime::builder().sources(vec![Box::new(FakeGlSource::new())])
                                            .driver_database(DriverDatabase::empty());
        if let Some(backend) = backend {
            builder = builder.offscreen_backend(backend);
        }
        builder.build()
    }

    #[test]
    fn test_instance_and_destruct() {
        fake_gl::install(FakeDriver::default());
        let runtime = runtime_with(None);
        let id = ContextID::next();
        let glue = runtime.instance(id).unwrap();
        assert!(Arc::ptr_eq(&glue, &runtime.instance(id).unwrap()));
        assert!(glue.has(GLFeature::FramebufferObject));
        assert!(runtime.destruct(id));
        assert_eq!(runtime.instance(id).err(), Some(Error::ContextDestroyed));
    }

    #[test]
    fn test_render_offscreen_pairs_calls() {
        fake_gl::install(FakeDriver::default());
        let backend = Arc::new(CountingBackend::default());
        let runtime = runtime_with(Some(backend.clone()));

        let id = runtime.render_offscreen(Size2D::new(8, 8), |glue| {
            assert!(glue.has_current_context());
            glue.id()
        }).unwrap();

        assert_eq!(backend.created.load(Ordering::SeqCst), 1);
        assert_eq!(backend.made_current.load(Ordering::SeqCst), 1);
        assert_eq!(backend.reinstated.load(Ordering::SeqCst), 1);
        assert_eq!(backend.destructed.load(Ordering::SeqCst), 1);
        assert!(!runtime.registry().contains(id));
    }

    #[test]
    fn test_failed_creation_is_an_error() {
        let backend = Arc::new(CountingBackend::default());
        let runtime = runtime_with(Some(backend.clone()));
        assert_eq!(runtime.create_offscreen(Size2D::new(0, 8)).err(),
                   Some(Error::OffscreenCreationFailed));
        assert_eq!(backend.created.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_leaked_offscreen_context_is_destroyed() {
        let backend = Arc::new(CountingBackend::default());
        let runtime = runtime_with(Some(backend.clone()));
        drop(runtime.create_offscreen(Size2D::new(8, 8)).unwrap());
        assert_eq!(backend.destructed.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[cfg(not(osmesa))]
    fn test_no_backend() {
        let runtime = runtime_with(None);
        assert_eq!(runtime.create_offscreen(Size2D::new(8, 8)).err(),
                   Some(Error::NoOffscreenBackend));
    }

    #[test]
    fn test_teardown_order() {
        fake_gl::install(FakeDriver::default());
        let runtime = runtime_with(None);
        runtime.instance(ContextID::next()).unwrap();

        let seen = Arc::new(Mutex::new(vec![]));
        let (weak, sink) = (Arc::downgrade(&runtime), seen.clone());
        runtime.atexit("client", Priority::CLIENT, move || {
            let runtime = weak.upgrade().unwrap();
            sink.lock().unwrap().push(("client", runtime.registry().len()));
        });
        let (weak, sink) = (Arc::downgrade(&runtime), seen.clone());
        runtime.atexit("late", Priority::DYNLIBS, move || {
            let runtime = weak.upgrade().unwrap();
            sink.lock().unwrap().push(("late", runtime.registry().len()));
        });

        runtime.shutdown();
        assert!(runtime.is_exiting());
        assert_eq!(*seen.lock().unwrap(), [("client", 1), ("late", 0)]);
        assert!(runtime.atexit_registry().is_empty());
    }

    #[test]
    #[should_panic(expected = "tried to attach an atexit function while exiting")]
    fn test_atexit_after_shutdown_panics() {
        let runtime = runtime_with(None);
        runtime.shutdown();
        runtime.atexit("too late", Priority::NORMAL, || ());
    }

    #[test]
    fn test_glu_is_unloaded_at_teardown() {
        use crate::loader::FnSymbolSource;
        use std::os::raw::c_void;

        extern "system" fn placeholder() {}

        let runtime = runtime_with(None);
        let source = FnSymbolSource::new("fake-glu", |symbol_name: &std::ffi::CStr| {
            if symbol_name.to_bytes() == b"gluScaleImage" {
                placeholder as *const c_void
            } else {
                std::ptr::null()
            }
        });
        let glu = runtime.set_glu_source(Box::new(source)).unwrap();
        assert!(Arc::ptr_eq(&glu, &runtime.glu().unwrap()));
        assert!(glu.has_scale_image());

        runtime.shutdown();
        assert_eq!(runtime.glu().err(), Some(Error::NotInitialized));
    }
}
