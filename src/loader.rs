// coin-glue/src/loader.rs
//
//! OpenGL function pointer loading.
//!
//! A `ProcAddressLoader` asks an ordered chain of `SymbolSource`s for an entry point and returns
//! the first non-null address. The default chain is:
//!
//! 1. the platform extension loader (`glXGetProcAddressARB`, `wglGetProcAddress`), if any;
//! 2. a plain symbol lookup in the already-loaded GL library;
//! 3. `OSMesaGetProcAddress`, when running on OSMesa.
//!
//! The last step rescues entry points that the software rasterizer only exposes through its own
//! table, such as the framebuffer-object functions. It never changes what the first two steps
//! resolve.

use std::ffi::{CStr, CString};
use std::fmt::{self, Debug, Formatter};
use std::os::raw::c_void;
use std::ptr;

/// Something that can look up GL entry points by name.
///
/// Implementations must return null, never panic, for names they cannot resolve.
pub trait SymbolSource: Send + Sync {
    /// A short name for diagnostics, e.g. `"glx"` or `"osmesa"`.
    fn name(&self) -> &str;

    /// Returns the address of `symbol_name`, or null.
    fn lookup(&self, symbol_name: &CStr) -> *const c_void;
}

/// A resolved, non-null entry point address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcAddress(*const c_void);

// Function addresses are process-global and immutable.
unsafe impl Send for ProcAddress {}
unsafe impl Sync for ProcAddress {}

impl ProcAddress {
    #[inline]
    pub fn new(address: *const c_void) -> Option<ProcAddress> {
        if address.is_null() {
            None
        } else {
            Some(ProcAddress(address))
        }
    }

    #[inline]
    pub fn as_ptr(self) -> *const c_void {
        self.0
    }
}

impl Debug for ProcAddress {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "ProcAddress({:p})", self.0)
    }
}

/// An ordered chain of symbol sources.
pub struct ProcAddressLoader {
    sources: Vec<Box<dyn SymbolSource>>,
}

impl ProcAddressLoader {
    /// Creates a loader consulting `sources` in order.
    pub fn new(sources: Vec<Box<dyn SymbolSource>>) -> ProcAddressLoader {
        ProcAddressLoader { sources }
    }

    /// Creates a loader with the platform's default chain.
    ///
    /// `osmesa_fallback` appends the OSMesa proc-address source when the `osmesa` feature is
    /// enabled; otherwise it has no effect.
    pub fn platform_default(osmesa_fallback: bool) -> ProcAddressLoader {
        let mut sources = crate::platform::default_sources();
        if osmesa_fallback {
            sources.extend(crate::platform::osmesa_fallback_source());
        }
        ProcAddressLoader::new(sources)
    }

    /// Appends a source after the existing ones.
    pub fn push_source(&mut self, source: Box<dyn SymbolSource>) {
        self.sources.push(source);
    }

    /// The names of the sources, in lookup order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// Resolves `symbol_name`, returning null if no source knows it.
    pub fn get_proc_address(&self, symbol_name: &str) -> *const c_void {
        match CString::new(symbol_name) {
            Ok(symbol_name) => self.get_proc_address_cstr(&symbol_name),
            Err(_) => ptr::null(),
        }
    }

    pub fn get_proc_address_cstr(&self, symbol_name: &CStr) -> *const c_void {
        for source in &self.sources {
            let address = source.lookup(symbol_name);
            if !address.is_null() {
                trace!("resolved {:?} through {}", symbol_name, source.name());
                return address;
            }
        }
        ptr::null()
    }

    /// Like `get_proc_address()`, but also returns which source resolved the symbol.
    pub fn resolve(&self, symbol_name: &str) -> Option<(ProcAddress, &str)> {
        let symbol_name = CString::new(symbol_name).ok()?;
        self.sources.iter().find_map(|source| {
            ProcAddress::new(source.lookup(&symbol_name)).map(|address| (address, source.name()))
        })
    }
}

impl Debug for ProcAddressLoader {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.debug_struct("ProcAddressLoader").field("sources", &self.source_names()).finish()
    }
}

/// A source backed by a closure. Useful for application-supplied loaders, such as the
/// `get_proc_address` of a windowing library.
pub struct FnSymbolSource<F> where F: Fn(&CStr) -> *const c_void + Send + Sync {
    name: String,
    function: F,
}

impl<F> FnSymbolSource<F> where F: Fn(&CStr) -> *const c_void + Send + Sync {
    pub fn new(name: &str, function: F) -> FnSymbolSource<F> {
        FnSymbolSource { name: name.to_owned(), function }
    }
}

impl<F> SymbolSource for FnSymbolSource<F> where F: Fn(&CStr) -> *const c_void + Send + Sync {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, symbol_name: &CStr) -> *const c_void {
        (self.function)(symbol_name)
    }
}
