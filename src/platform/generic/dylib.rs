// coin-glue/src/platform/generic/dylib.rs
//
//! Symbol lookup in shared libraries and in the process image.

use crate::loader::SymbolSource;

use std::ffi::{CStr, CString};
use std::os::raw::c_void;
use std::ptr;

#[cfg(not(windows))]
use libc::{dlclose, dlopen, dlsym, RTLD_GLOBAL, RTLD_LAZY};
#[cfg(windows)]
use winapi::shared::minwindef::HMODULE;
#[cfg(windows)]
use winapi::um::libloaderapi;

/// A loaded shared library, or the process image itself.
pub struct DynamicLibrary {
    #[cfg(not(windows))]
    handle: *mut c_void,
    #[cfg(windows)]
    handle: HMODULE,
    name: String,
    owned: bool,
}

unsafe impl Send for DynamicLibrary {}
unsafe impl Sync for DynamicLibrary {}

impl DynamicLibrary {
    /// Loads the library called `name`. Returns `None` if the loader can't find it.
    #[cfg(not(windows))]
    pub fn open(name: &str) -> Option<DynamicLibrary> {
        let soname = CString::new(name).ok()?;
        unsafe {
            let handle = dlopen(soname.as_ptr(), RTLD_LAZY | RTLD_GLOBAL);
            if handle.is_null() {
                return None;
            }
            Some(DynamicLibrary { handle, name: name.to_owned(), owned: true })
        }
    }

    #[cfg(windows)]
    pub fn open(name: &str) -> Option<DynamicLibrary> {
        let dll_name = CString::new(name).ok()?;
        unsafe {
            let handle = libloaderapi::LoadLibraryA(dll_name.as_ptr());
            if handle.is_null() {
                return None;
            }
            Some(DynamicLibrary { handle, name: name.to_owned(), owned: true })
        }
    }

    /// Loads the first library in `names` that can be found.
    pub fn open_first<'a, I>(names: I) -> Option<DynamicLibrary> where I: IntoIterator<Item = &'a str> {
        names.into_iter().find_map(|name| {
            let library = DynamicLibrary::open(name);
            if library.is_none() {
                debug!("couldn't load {}", name);
            }
            library
        })
    }

    /// A handle on the global symbol scope of the running process.
    #[cfg(not(windows))]
    pub fn process_image() -> Option<DynamicLibrary> {
        unsafe {
            let handle = dlopen(ptr::null(), RTLD_LAZY);
            if handle.is_null() {
                return None;
            }
            Some(DynamicLibrary { handle, name: "<process>".to_owned(), owned: true })
        }
    }

    #[cfg(windows)]
    pub fn process_image() -> Option<DynamicLibrary> {
        unsafe {
            let handle = libloaderapi::GetModuleHandleA(ptr::null());
            if handle.is_null() {
                return None;
            }
            Some(DynamicLibrary { handle, name: "<process>".to_owned(), owned: false })
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up `symbol_name`, returning null if the library doesn't export it.
    #[cfg(not(windows))]
    pub fn symbol(&self, symbol_name: &CStr) -> *const c_void {
        unsafe { dlsym(self.handle, symbol_name.as_ptr()).cast_const() }
    }

    #[cfg(windows)]
    pub fn symbol(&self, symbol_name: &CStr) -> *const c_void {
        unsafe { libloaderapi::GetProcAddress(self.handle, symbol_name.as_ptr()) as *const c_void }
    }
}

impl Drop for DynamicLibrary {
    #[cfg(not(windows))]
    fn drop(&mut self) {
        if self.owned && !self.handle.is_null() {
            unsafe {
                dlclose(self.handle);
            }
            self.handle = ptr::null_mut();
        }
    }

    #[cfg(windows)]
    fn drop(&mut self) {
        if self.owned && !self.handle.is_null() {
            unsafe {
                libloaderapi::FreeLibrary(self.handle);
            }
            self.handle = ptr::null_mut();
        }
    }
}

/// Resolves symbols by looking them up in a list of libraries, in order.
pub struct LibrarySymbolSource {
    name: String,
    libraries: Vec<DynamicLibrary>,
}

impl LibrarySymbolSource {
    pub fn new(name: &str, libraries: Vec<DynamicLibrary>) -> LibrarySymbolSource {
        LibrarySymbolSource { name: name.to_owned(), libraries }
    }

    pub fn libraries(&self) -> &[DynamicLibrary] {
        &self.libraries
    }
}

impl SymbolSource for LibrarySymbolSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, symbol_name: &CStr) -> *const c_void {
        self.libraries
            .iter()
            .map(|library| library.symbol(symbol_name))
            .find(|address| !address.is_null())
            .unwrap_or(ptr::null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_os = "linux")]
    fn test_process_image_matches_direct_lookup() {
        use crate::loader::ProcAddressLoader;

        let image = DynamicLibrary::process_image().unwrap();
        let loader = ProcAddressLoader::new(vec![
            Box::new(LibrarySymbolSource::new("image", vec![image])),
        ]);
        for name in ["malloc", "free", "dlsym"] {
            let symbol = CString::new(name).unwrap();
            let direct = unsafe { dlsym(libc::RTLD_DEFAULT, symbol.as_ptr()).cast_const() };
            assert!(!direct.is_null());
            assert_eq!(loader.get_proc_address(name), direct, "{}", name);
        }
    }

    #[test]
    fn test_missing_library_and_symbol() {
        assert!(DynamicLibrary::open("libcoin-glue-does-not-exist.so.42").is_none());
        if let Some(image) = DynamicLibrary::process_image() {
            let source = LibrarySymbolSource::new("image", vec![image]);
            let symbol = CString::new("glCoinGlueNoSuchFunction").unwrap();
            assert!(source.lookup(&symbol).is_null());
        }
    }
}
