// coin-glue/src/tests.rs
//
//! Tests that exercise the whole stack: symbol sources, capability records, offscreen backends
//! and the process-wide runtime.

use crate::context::ContextID;
use crate::driver_db::DriverDatabase;
use crate::error::Error;
use crate::fake_gl::{self, FakeDriver, FakeGlSource};
use crate::feature::{Entry, GLFeature};
use crate::framebuffer::FramebufferSurface;
use crate::loader::SymbolSource;
use crate::offscreen::{self, OffscreenBackend};
use crate::platform::generic::osmesa::api::fake::FakeOSMesa;
use crate::platform::generic::osmesa::context::OSMesaBackend;
use crate::platform::generic::osmesa::loader::OSMesaSymbolSource;
use crate::runtime::Runtime;
use crate::GlueConfig;

use euclid::default::Size2D;
use serial_test::serial;
use std::sync::Arc;

// Names the software rasterizer only exposes through `OSMesaGetProcAddress`.
const OSMESA_ONLY: &[&str] = &[
    "glGenFramebuffers",
    "glDeleteFramebuffers",
    "glBindFramebuffer",
    "glIsFramebuffer",
    "glCheckFramebufferStatus",
    "glFramebuffer",
    "glGenRenderbuffers",
    "glDeleteRenderbuffers",
    "glBindRenderbuffer",
    "glIsRenderbuffer",
    "glRenderbufferStorage",
    "glGenerateMipmap",
];

fn osmesa_sources(osmesa: &Arc<FakeOSMesa>, fallback: bool) -> Vec<Box<dyn SymbolSource>> {
    let mut sources: Vec<Box<dyn SymbolSource>> = vec![Box::new(FakeGlSource::hiding(OSMESA_ONLY))];
    if fallback {
        sources.push(Box::new(OSMesaSymbolSource::new(osmesa.clone())));
    }
    sources
}

fn private_runtime(sources: Vec<Box<dyn SymbolSource>>) -> Arc<Runtime> {
    Runtime::builder().sources(sources).driver_database(DriverDatabase::empty()).build()
}

#[test]
fn test_osmesa_fallback_fills_framebuffer_entry_points() {
    fake_gl::install(FakeDriver::default());
    let osmesa = Arc::new(FakeOSMesa::default());

    let without = private_runtime(osmesa_sources(&osmesa, false));
    let glue = without.instance(ContextID::next()).unwrap();
    assert!(glue.has_extension("GL_EXT_framebuffer_object"));
    assert!(!glue.has(GLFeature::FramebufferObject));
    assert!(glue.entry(Entry::GenFramebuffers).is_none());

    let with = private_runtime(osmesa_sources(&osmesa, true));
    let glue = with.instance(ContextID::next()).unwrap();
    assert!(glue.has(GLFeature::FramebufferObject));
    assert_eq!(glue.entry(Entry::GenFramebuffers).map(|entry| entry.name),
               Some("glGenFramebuffersEXT"));
    assert_eq!(with.loader().resolve("glGetString").map(|(_, source)| source), Some("fake"));
    assert_eq!(with.loader().resolve("glGenFramebuffersEXT").map(|(_, source)| source),
               Some("osmesa"));
}

#[test]
fn test_framebuffer_backend_on_fallback_entry_points() {
    fake_gl::install(FakeDriver::default());
    let osmesa = Arc::new(FakeOSMesa::default());
    let runtime = private_runtime(osmesa_sources(&osmesa, true));

    let host = ContextID::next();
    let backend = runtime.framebuffer_backend(host).unwrap();
    let mut handle = backend.create_offscreen(Size2D::new(256, 256)).unwrap();
    assert_ne!(handle.downcast_mut::<FramebufferSurface>().unwrap().framebuffer(), 0);
    backend.destruct(handle);
    assert!(fake_gl::with_state(|state| state.framebuffers.is_empty()));
}

#[test]
fn test_record_without_current_context_is_conservative() {
    fake_gl::uninstall();
    let runtime = private_runtime(vec![Box::new(FakeGlSource::new())]);
    let glue = runtime.instance(ContextID::next()).unwrap();
    assert!(!glue.has_current_context());
    assert!(GLFeature::ALL.iter().all(|&feature| !glue.has(feature)));
    assert!(!glue.is_supported("GL_EXT_framebuffer_object"));
    assert_eq!(glue.glow_context().err(), Some(Error::NoCurrentContext));
}

#[test]
fn test_contexts_on_different_threads_get_their_own_records() {
    let runtime = private_runtime(vec![Box::new(FakeGlSource::new())]);
    let threads: Vec<_> = [("2.1.0", true), ("1.1.0", false)].iter().map(|&(version, fbo)| {
        let runtime = runtime.clone();
        std::thread::spawn(move || {
            fake_gl::install(FakeDriver {
                version,
                extensions: if fbo { vec!["GL_EXT_framebuffer_object"] } else { vec![] },
                ..FakeDriver::default()
            });
            let id = ContextID::next();
            let glue = runtime.instance(id).unwrap();
            (id, glue.has(GLFeature::FramebufferObject))
        })
    }).collect();
    let results: Vec<_> = threads.into_iter().map(|thread| thread.join().unwrap()).collect();

    assert_eq!(results.iter().map(|&(_, fbo)| fbo).collect::<Vec<_>>(), [true, false]);
    assert_eq!(runtime.registry().len(), 2);
    for (id, fbo) in results {
        assert_eq!(runtime.instance(id).unwrap().has(GLFeature::FramebufferObject), fbo);
    }
}

#[test]
#[serial]
fn test_end_to_end_with_osmesa_backend() {
    fake_gl::install(FakeDriver::default());
    let osmesa = Arc::new(FakeOSMesa::default());
    let backend: Arc<dyn OffscreenBackend> = Arc::new(OSMesaBackend::new(osmesa.clone()));
    offscreen::set_offscreen_backend(backend).unwrap();

    let runtime = Runtime::builder().config(GlueConfig::default())
                                    .sources(osmesa_sources(&osmesa, true))
                                    .init()
                                    .unwrap();
    assert!(Arc::ptr_eq(&runtime, &Runtime::current().unwrap()));
    assert_eq!(runtime.offscreen_backend().map(|backend| backend.name()), Some("osmesa"));

    let (supported, current) = runtime.render_offscreen(Size2D::new(512, 512), |glue| {
        (glue.is_supported("GL_EXT_framebuffer_object") && glue.has(GLFeature::FramebufferObject),
         osmesa.current_context())
    }).unwrap();
    assert!(supported);
    assert!(!current.is_null());
    assert!(osmesa.current_context().is_null());
    assert_eq!(osmesa.live_contexts(), 0);

    let late: Arc<dyn OffscreenBackend> = Arc::new(OSMesaBackend::new(osmesa.clone()));
    assert_eq!(offscreen::set_offscreen_backend(late).err(), Some(Error::AlreadyInitialized));
    assert_eq!(crate::init(GlueConfig::default()).err(), Some(Error::AlreadyInitialized));

    crate::shutdown().unwrap();
    assert!(runtime.is_exiting());
    assert_eq!(Runtime::current().err(), Some(Error::NotInitialized));
    assert_eq!(crate::shutdown().err(), Some(Error::NotInitialized));
}

#[test]
#[serial]
fn test_global_instance_is_pointer_stable() {
    fake_gl::install(FakeDriver::default());
    Runtime::builder().sources(vec![Box::new(FakeGlSource::new())]).init().unwrap();

    let id = ContextID::next();
    let first = Runtime::current().unwrap().instance(id).unwrap();
    let second = Runtime::current().unwrap().instance(id).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    crate::shutdown().unwrap();
    // Records handed out before teardown stay usable.
    assert!(first.has(GLFeature::FramebufferObject));
}
