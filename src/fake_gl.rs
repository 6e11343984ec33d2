// coin-glue/src/fake_gl.rs
//
//! A GL driver simulated in process memory, so that loading, capability detection and the
//! framebuffer backend can be tested without a GPU.
//!
//! Each thread has its own driver. "Installing" a driver on a thread plays the role of making a
//! context current there.

use crate::feature::Entry;
use crate::gl::{self, types::*};
use crate::loader::{ProcAddressLoader, SymbolSource};

use fnv::FnvHashMap;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::{CStr, CString};
use std::os::raw::c_void;
use std::ptr;

#[derive(Clone)]
pub(crate) struct FakeDriver {
    pub(crate) vendor: &'static str,
    pub(crate) renderer: &'static str,
    pub(crate) version: &'static str,
    pub(crate) extensions: Vec<&'static str>,
    /// `glGetString(GL_EXTENSIONS)` returns null, as on core profiles.
    pub(crate) core_profile: bool,
    pub(crate) integers: FnvHashMap<GLenum, GLint>,
    pub(crate) framebuffer_status: GLenum,
    /// `glRenderbufferStorage` raises `GL_OUT_OF_MEMORY`.
    pub(crate) out_of_memory: bool,
}

impl Default for FakeDriver {
    fn default() -> FakeDriver {
        let mut integers = FnvHashMap::default();
        integers.insert(gl::MAX_TEXTURE_SIZE, 8192);
        integers.insert(gl::MAX_RENDERBUFFER_SIZE, 4096);
        integers.insert(gl::MAX_TEXTURE_UNITS, 4);
        integers.insert(gl::MAX_LIGHTS, 8);
        FakeDriver {
            vendor: "Coin Test Vendor",
            renderer: "Fake Renderer",
            version: "2.1.0 Fake 1.0",
            extensions: vec![
                "GL_ARB_multitexture",
                "GL_EXT_framebuffer_object",
                "GL_ARB_vertex_buffer_object",
            ],
            core_profile: false,
            integers,
            framebuffer_status: gl::FRAMEBUFFER_COMPLETE,
            out_of_memory: false,
        }
    }
}

#[derive(Default)]
pub(crate) struct DriverState {
    strings: FnvHashMap<GLenum, CString>,
    extension_strings: Vec<CString>,
    next_name: GLuint,
    pub(crate) framebuffers: Vec<GLuint>,
    pub(crate) renderbuffers: Vec<GLuint>,
    pub(crate) buffers: Vec<GLuint>,
    pub(crate) queries: Vec<GLuint>,
    pub(crate) bound_framebuffer: GLuint,
    pub(crate) bound_renderbuffer: GLuint,
    pub(crate) viewport: [GLint; 4],
    pub(crate) active_texture: GLenum,
    pub(crate) polygon_offset: (GLfloat, GLfloat),
    pub(crate) errors: VecDeque<GLenum>,
}

struct Current {
    driver: FakeDriver,
    state: DriverState,
}

thread_local! {
    static CURRENT: RefCell<Option<Current>> = const { RefCell::new(None) };
}

/// Makes `driver` current on this thread, replacing any earlier one.
pub(crate) fn install(driver: FakeDriver) {
    let mut strings = FnvHashMap::default();
    strings.insert(gl::VENDOR, CString::new(driver.vendor).unwrap());
    strings.insert(gl::RENDERER, CString::new(driver.renderer).unwrap());
    strings.insert(gl::VERSION, CString::new(driver.version).unwrap());
    if !driver.core_profile {
        strings.insert(gl::EXTENSIONS, CString::new(driver.extensions.join(" ")).unwrap());
    }
    let extension_strings =
        driver.extensions.iter().map(|extension| CString::new(*extension).unwrap()).collect();
    let state = DriverState {
        strings,
        extension_strings,
        next_name: 1,
        active_texture: gl::TEXTURE0,
        ..DriverState::default()
    };
    CURRENT.with(|current| *current.borrow_mut() = Some(Current { driver, state }));
}

/// Leaves this thread with no current driver.
pub(crate) fn uninstall() {
    CURRENT.with(|current| *current.borrow_mut() = None);
}

/// Inspects or modifies the current driver's object state.
pub(crate) fn with_state<F, R>(function: F) -> R where F: FnOnce(&mut DriverState) -> R {
    CURRENT.with(|current| {
        let mut current = current.borrow_mut();
        function(&mut current.as_mut().expect("no fake driver installed").state)
    })
}

fn with_current<F, R>(default: R, function: F) -> R where F: FnOnce(&mut Current) -> R {
    CURRENT.with(|current| match *current.borrow_mut() {
        Some(ref mut current) => function(current),
        None => default,
    })
}

fn gen_names(current: &mut Current, count: GLsizei, names: *mut GLuint) -> Vec<GLuint> {
    let mut generated = vec![];
    for index in 0..count.max(0) as usize {
        let name = current.state.next_name;
        current.state.next_name += 1;
        unsafe { *names.add(index) = name };
        generated.push(name);
    }
    generated
}

fn read_names(count: GLsizei, names: *const GLuint) -> Vec<GLuint> {
    (0..count.max(0) as usize).map(|index| unsafe { *names.add(index) }).collect()
}

extern "system" fn get_string(name: GLenum) -> *const GLubyte {
    with_current(ptr::null(), |current| {
        current.state.strings.get(&name).map_or(ptr::null(), |string| string.as_ptr() as _)
    })
}

extern "system" fn get_stringi(name: GLenum, index: GLuint) -> *const GLubyte {
    with_current(ptr::null(), |current| {
        if name != gl::EXTENSIONS {
            return ptr::null();
        }
        current.state
               .extension_strings
               .get(index as usize)
               .map_or(ptr::null(), |string| string.as_ptr() as _)
    })
}

extern "system" fn get_integerv(name: GLenum, value: *mut GLint) {
    with_current((), |current| unsafe {
        match name {
            gl::FRAMEBUFFER_BINDING => *value = current.state.bound_framebuffer as GLint,
            gl::RENDERBUFFER_BINDING => *value = current.state.bound_renderbuffer as GLint,
            gl::NUM_EXTENSIONS => *value = current.state.extension_strings.len() as GLint,
            gl::VIEWPORT => {
                for (index, &component) in current.state.viewport.iter().enumerate() {
                    *value.add(index) = component;
                }
            }
            _ => match current.driver.integers.get(&name) {
                Some(&integer) => *value = integer,
                None => current.state.errors.push_back(gl::INVALID_ENUM),
            },
        }
    })
}

extern "system" fn get_error() -> GLenum {
    with_current(gl::NO_ERROR, |current| current.state.errors.pop_front().unwrap_or(gl::NO_ERROR))
}

extern "system" fn viewport(x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
    with_current((), |current| current.state.viewport = [x, y, width, height])
}

extern "system" fn active_texture(texture: GLenum) {
    with_current((), |current| current.state.active_texture = texture)
}

extern "system" fn polygon_offset(factor: GLfloat, units: GLfloat) {
    with_current((), |current| current.state.polygon_offset = (factor, units))
}

extern "system" fn gen_framebuffers(count: GLsizei, names: *mut GLuint) {
    with_current((), |current| {
        let names = gen_names(current, count, names);
        current.state.framebuffers.extend(names);
    })
}

extern "system" fn delete_framebuffers(count: GLsizei, names: *const GLuint) {
    with_current((), |current| {
        for name in read_names(count, names) {
            current.state.framebuffers.retain(|&live| live != name);
            if current.state.bound_framebuffer == name {
                current.state.bound_framebuffer = 0;
            }
        }
    })
}

extern "system" fn bind_framebuffer(_: GLenum, name: GLuint) {
    with_current((), |current| current.state.bound_framebuffer = name)
}

extern "system" fn is_framebuffer(name: GLuint) -> GLboolean {
    with_current(gl::FALSE as GLboolean, |current| {
        current.state.framebuffers.contains(&name) as GLboolean
    })
}

extern "system" fn check_framebuffer_status(_: GLenum) -> GLenum {
    with_current(0, |current| current.driver.framebuffer_status)
}

extern "system" fn framebuffer_renderbuffer(_: GLenum, _: GLenum, _: GLenum, _: GLuint) {}

extern "system" fn gen_renderbuffers(count: GLsizei, names: *mut GLuint) {
    with_current((), |current| {
        let names = gen_names(current, count, names);
        current.state.renderbuffers.extend(names);
    })
}

extern "system" fn delete_renderbuffers(count: GLsizei, names: *const GLuint) {
    with_current((), |current| {
        for name in read_names(count, names) {
            current.state.renderbuffers.retain(|&live| live != name);
            if current.state.bound_renderbuffer == name {
                current.state.bound_renderbuffer = 0;
            }
        }
    })
}

extern "system" fn bind_renderbuffer(_: GLenum, name: GLuint) {
    with_current((), |current| current.state.bound_renderbuffer = name)
}

extern "system" fn is_renderbuffer(name: GLuint) -> GLboolean {
    with_current(gl::FALSE as GLboolean, |current| {
        current.state.renderbuffers.contains(&name) as GLboolean
    })
}

extern "system" fn renderbuffer_storage(_: GLenum, _: GLenum, _: GLsizei, _: GLsizei) {
    with_current((), |current| {
        if current.driver.out_of_memory {
            current.state.errors.push_back(gl::OUT_OF_MEMORY);
        }
    })
}

extern "system" fn gen_buffers(count: GLsizei, names: *mut GLuint) {
    with_current((), |current| {
        let names = gen_names(current, count, names);
        current.state.buffers.extend(names);
    })
}

extern "system" fn delete_buffers(count: GLsizei, names: *const GLuint) {
    with_current((), |current| {
        for name in read_names(count, names) {
            current.state.buffers.retain(|&live| live != name);
        }
    })
}

extern "system" fn gen_queries(count: GLsizei, names: *mut GLuint) {
    with_current((), |current| {
        let names = gen_names(current, count, names);
        current.state.queries.extend(names);
    })
}

extern "system" fn get_query_objectuiv(_: GLuint, _: GLenum, value: *mut GLuint) {
    unsafe { *value = 42 }
}

// Resolvable but never called by the tests.
extern "system" fn unimplemented_entry_point() {}

/// Returns the fake driver's entry point called `symbol_name`, or null.
///
/// Core and extension spellings of an entry point resolve to the same function. Every other name
/// in the wrapped-entry-point catalog resolves to a placeholder.
pub(crate) fn lookup(symbol_name: &str) -> *const c_void {
    let base = symbol_name.trim_end_matches("ARB").trim_end_matches("EXT");
    let address = match base {
        "glGetString" => get_string as *const c_void,
        "glGetStringi" => get_stringi as *const c_void,
        "glGetIntegerv" => get_integerv as *const c_void,
        "glGetError" => get_error as *const c_void,
        "glViewport" => viewport as *const c_void,
        "glActiveTexture" => active_texture as *const c_void,
        "glPolygonOffset" => polygon_offset as *const c_void,
        "glGenFramebuffers" => gen_framebuffers as *const c_void,
        "glDeleteFramebuffers" => delete_framebuffers as *const c_void,
        "glBindFramebuffer" => bind_framebuffer as *const c_void,
        "glIsFramebuffer" => is_framebuffer as *const c_void,
        "glCheckFramebufferStatus" => check_framebuffer_status as *const c_void,
        "glFramebufferRenderbuffer" => framebuffer_renderbuffer as *const c_void,
        "glGenRenderbuffers" => gen_renderbuffers as *const c_void,
        "glDeleteRenderbuffers" => delete_renderbuffers as *const c_void,
        "glBindRenderbuffer" => bind_renderbuffer as *const c_void,
        "glIsRenderbuffer" => is_renderbuffer as *const c_void,
        "glRenderbufferStorage" => renderbuffer_storage as *const c_void,
        "glGenBuffers" => gen_buffers as *const c_void,
        "glDeleteBuffers" => delete_buffers as *const c_void,
        "glGenQueries" => gen_queries as *const c_void,
        "glGetQueryObjectuiv" => get_query_objectuiv as *const c_void,
        _ => ptr::null(),
    };
    if !address.is_null() {
        return address;
    }

    let in_catalog = Entry::ALL.iter().any(|entry| {
        entry.candidates().iter().any(|candidate| candidate.name == symbol_name)
    });
    if in_catalog {
        unimplemented_entry_point as *const c_void
    } else {
        ptr::null()
    }
}

/// A symbol source over the fake driver that can pretend not to export some names.
pub(crate) struct FakeGlSource {
    hidden: Vec<&'static str>,
}

impl FakeGlSource {
    pub(crate) fn new() -> FakeGlSource {
        FakeGlSource { hidden: vec![] }
    }

    /// Hides every name starting with one of `prefixes`.
    pub(crate) fn hiding(prefixes: &[&'static str]) -> FakeGlSource {
        FakeGlSource { hidden: prefixes.to_vec() }
    }
}

impl SymbolSource for FakeGlSource {
    fn name(&self) -> &str {
        "fake"
    }

    fn lookup(&self, symbol_name: &CStr) -> *const c_void {
        let symbol_name = match symbol_name.to_str() {
            Ok(symbol_name) => symbol_name,
            Err(_) => return ptr::null(),
        };
        if self.hidden.iter().any(|prefix| symbol_name.starts_with(prefix)) {
            return ptr::null();
        }
        lookup(symbol_name)
    }
}

pub(crate) fn loader() -> ProcAddressLoader {
    ProcAddressLoader::new(vec![Box::new(FakeGlSource::new())])
}
