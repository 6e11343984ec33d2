// coin-glue/src/glue.rs
//
//! The per-context capability record.
//!
//! A `GlueContext` is built once for each GL context, while that context is current. It records
//! what the driver says about itself, resolves every wrapped entry point, and derives which
//! features are usable. Afterwards it is read-only, apart from the extension-lookup cache.

use crate::context::ContextID;
use crate::debug;
use crate::driver_db::{DriverDatabase, DriverInfo, DriverStatus};
use crate::error::Error;
use crate::feature::{Entry, GLFeature, Provider};
use crate::gl::{self, types::*};
use crate::info::{GLApi, GLVersion};
use crate::limits::{GLLimits, IntegerQuery, MAX_PENDING_ERRORS};
use crate::loader::{ProcAddress, ProcAddressLoader};

use fnv::{FnvHashMap, FnvHashSet};
use std::ffi::CStr;
use std::mem;
use std::os::raw::c_void;
use std::sync::{Arc, Mutex};

bitflags! {
    /// Driver vendors with known behavioral differences.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct VendorFlags: u32 {
        const NVIDIA        = 0x0001;
        const ATI           = 0x0002;
        const AMD           = 0x0004;
        const INTEL         = 0x0008;
        const MESA          = 0x0010;
        const THREE_DLABS   = 0x0020;
        const SGI           = 0x0040;
        const APPLE         = 0x0080;
        const MICROSOFT     = 0x0100;
    }
}

impl VendorFlags {
    /// Classifies a driver by its vendor, renderer and version strings.
    pub fn detect(driver: &DriverInfo) -> VendorFlags {
        let mut flags = VendorFlags::empty();
        let vendor = driver.vendor;
        if vendor.contains("NVIDIA") {
            flags |= VendorFlags::NVIDIA;
        }
        if vendor.contains("ATI Technologies") || vendor.contains("AMD") ||
                vendor.contains("Advanced Micro Devices") {
            flags |= VendorFlags::ATI | VendorFlags::AMD;
        }
        if vendor.contains("Intel") {
            flags |= VendorFlags::INTEL;
        }
        if vendor.contains("Mesa") || vendor == "Brian Paul" || driver.renderer.contains("Mesa") ||
                driver.version.contains("Mesa") {
            flags |= VendorFlags::MESA;
        }
        if vendor.contains("3Dlabs") {
            flags |= VendorFlags::THREE_DLABS;
        }
        if vendor.contains("SGI") || vendor.contains("Silicon Graphics") {
            flags |= VendorFlags::SGI;
        }
        if vendor.contains("Apple") {
            flags |= VendorFlags::APPLE;
        }
        if vendor.contains("Microsoft") {
            flags |= VendorFlags::MICROSOFT;
        }
        flags
    }
}

/// An entry point that resolved, and the spelling it resolved under.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedEntry {
    pub address: ProcAddress,
    pub name: &'static str,
}

/// What a capability record knows about one feature.
#[derive(Clone, Debug, PartialEq)]
pub struct Capability {
    /// The entry points the feature needs, with the spelling each resolved under.
    pub entries: Vec<(Entry, Option<&'static str>)>,
    /// The core version or one of the extensions is present.
    pub detected: bool,
    /// What the driver database says about this driver.
    pub status: Option<DriverStatus>,
    /// Detected, every entry point resolved, and not vetoed by the driver database.
    pub available: bool,
}

impl Capability {
    /// Returns true if every entry point the feature needs resolved.
    pub fn functions_available(&self) -> bool {
        self.entries.iter().all(|&(_, name)| name.is_some())
    }
}

/// The capability record of one GL context.
#[derive(Debug)]
pub struct GlueContext {
    id: ContextID,
    has_current_context: bool,
    loader: Arc<ProcAddressLoader>,
    driver_db: Arc<DriverDatabase>,
    api: GLApi,
    version: GLVersion,
    vendor: String,
    renderer: String,
    version_string: String,
    vendor_flags: VendorFlags,
    extensions: Vec<String>,
    extension_cache: Mutex<FnvHashMap<String, bool>>,
    entries: FnvHashMap<Entry, ResolvedEntry>,
    capabilities: FnvHashMap<GLFeature, Capability>,
    limits: GLLimits,
    warned_entries: Mutex<FnvHashSet<Entry>>,
}

fn resolve_entry<F>(loader: &ProcAddressLoader, entry: Entry, eligible: F) -> Option<ResolvedEntry>
                    where F: Fn(Provider) -> bool {
    entry.candidates().iter().filter(|candidate| eligible(candidate.provider)).find_map(|candidate| {
        ProcAddress::new(loader.get_proc_address(candidate.name))
            .map(|address| ResolvedEntry { address, name: candidate.name })
    })
}

unsafe fn string_from_gl(string: *const GLubyte) -> Option<String> {
    if string.is_null() {
        None
    } else {
        Some(CStr::from_ptr(string as *const _).to_string_lossy().into_owned())
    }
}

impl GlueContext {
    /// Builds the record for the context current on this thread.
    ///
    /// If no context is current, the record reports nothing as available and a warning is
    /// posted.
    pub fn build(id: ContextID, loader: Arc<ProcAddressLoader>, driver_db: Arc<DriverDatabase>)
                 -> GlueContext {
        let mut entries = FnvHashMap::default();
        for &entry in Entry::ALL {
            if let Some(resolved) = resolve_entry(&loader, entry, |p| p == Provider::Always) {
                entries.insert(entry, resolved);
            }
        }

        let get_string: Option<gl::PFNGLGETSTRINGPROC> = entries.get(&Entry::GetString)
            .map(|resolved| unsafe { mem::transmute(resolved.address.as_ptr()) });
        let version_string = get_string.and_then(|get_string| unsafe {
            string_from_gl(get_string(gl::VERSION))
        });
        let (get_string, version_string) = match (get_string, version_string) {
            (Some(get_string), Some(version_string)) => (get_string, version_string),
            _ => {
                debug::post_warning("GlueContext::build",
                                    format!("no current GL context while building context {}; \
                                             reporting no capabilities",
                                            id));
                return GlueContext::without_current_context(id, loader, driver_db);
            }
        };

        let (api, version) = match GLVersion::parse(&version_string) {
            Some(parsed) => parsed,
            None => {
                debug::post_warning("GlueContext::build",
                                    format!("couldn't parse GL_VERSION \"{}\"", version_string));
                (GLApi::GL, GLVersion::default())
            }
        };
        let (vendor, renderer) = unsafe {
            (string_from_gl(get_string(gl::VENDOR)).unwrap_or_default(),
             string_from_gl(get_string(gl::RENDERER)).unwrap_or_default())
        };

        let core_eligible = |provider| match provider {
            Provider::Always => true,
            Provider::Core(major, minor) => version.matches_at_least(major, minor, 0),
            Provider::Extension(_) => false,
        };
        if let Some(resolved) = resolve_entry(&loader, Entry::GetStringi, core_eligible) {
            entries.insert(Entry::GetStringi, resolved);
        }

        let mut core_profile = false;
        let mut extensions: Vec<String> = unsafe {
            string_from_gl(get_string(gl::EXTENSIONS))
                .map(|extensions| extensions.split_whitespace().map(str::to_owned).collect())
                .unwrap_or_default()
        };
        if extensions.is_empty() {
            if let (Some(get_stringi), Some(get_integerv)) = (entries.get(&Entry::GetStringi),
                                                              entries.get(&Entry::GetIntegerv)) {
                core_profile = true;
                unsafe {
                    let get_stringi: gl::PFNGLGETSTRINGIPROC =
                        mem::transmute(get_stringi.address.as_ptr());
                    let get_integerv: gl::PFNGLGETINTEGERVPROC =
                        mem::transmute(get_integerv.address.as_ptr());
                    let mut count = 0;
                    get_integerv(gl::NUM_EXTENSIONS, &mut count);
                    extensions = (0..count.max(0) as GLuint)
                        .filter_map(|index| string_from_gl(get_stringi(gl::EXTENSIONS, index)))
                        .collect();
                }
            }
        }

        {
            let extension_set: FnvHashSet<&str> = extensions.iter().map(|e| &e[..]).collect();
            let eligible = |provider| match provider {
                Provider::Extension(extension) => extension_set.contains(extension),
                provider => core_eligible(provider),
            };
            for &entry in Entry::ALL {
                if entries.contains_key(&entry) {
                    continue;
                }
                if let Some(resolved) = resolve_entry(&loader, entry, &eligible) {
                    entries.insert(entry, resolved);
                }
            }
        }

        let driver = DriverInfo { vendor: &vendor, renderer: &renderer, version: &version_string };
        let vendor_flags = VendorFlags::detect(&driver);

        let capabilities = GLFeature::ALL.iter().map(|&feature| {
            let detected = feature.requirement().is_met(version, |extension| {
                extensions.iter().any(|present| present == extension)
            });
            let entries = feature.entries()
                                 .iter()
                                 .map(|entry| (*entry, entries.get(entry).map(|r| r.name)))
                                 .collect();
            let status = driver_db.status(feature.name(), &driver);
            let mut capability = Capability { entries, detected, status, available: false };
            capability.available = detected && capability.functions_available() &&
                !status.map_or(false, DriverStatus::vetoes);
            (feature, capability)
        }).collect::<FnvHashMap<_, _>>();

        let limits = match (entries.get(&Entry::GetIntegerv), entries.get(&Entry::GetError)) {
            (Some(get_integerv), Some(get_error)) => unsafe {
                let query = IntegerQuery {
                    get_integerv: mem::transmute(get_integerv.address.as_ptr()),
                    get_error: mem::transmute(get_error.address.as_ptr()),
                };
                let has_framebuffer_objects = capabilities[&GLFeature::FramebufferObject].available;
                GLLimits::detect(&query, has_framebuffer_objects, core_profile)
            },
            _ => GLLimits::default(),
        };

        debug!("built capability record for context {}: {} {} ({}), {} extensions",
               id,
               vendor,
               renderer,
               version,
               extensions.len());

        GlueContext {
            id,
            has_current_context: true,
            loader,
            driver_db,
            api,
            version,
            vendor,
            renderer,
            version_string,
            vendor_flags,
            extensions,
            extension_cache: Mutex::new(FnvHashMap::default()),
            entries,
            capabilities,
            limits,
            warned_entries: Mutex::new(FnvHashSet::default()),
        }
    }

    fn without_current_context(id: ContextID,
                               loader: Arc<ProcAddressLoader>,
                               driver_db: Arc<DriverDatabase>)
                               -> GlueContext {
        let capabilities = GLFeature::ALL.iter().map(|&feature| {
            let entries = feature.entries().iter().map(|&entry| (entry, None)).collect();
            (feature, Capability { entries, detected: false, status: None, available: false })
        }).collect();

        GlueContext {
            id,
            has_current_context: false,
            loader,
            driver_db,
            api: GLApi::GL,
            version: GLVersion::default(),
            vendor: String::new(),
            renderer: String::new(),
            version_string: String::new(),
            vendor_flags: VendorFlags::empty(),
            extensions: vec![],
            extension_cache: Mutex::new(FnvHashMap::default()),
            entries: FnvHashMap::default(),
            capabilities,
            limits: GLLimits::default(),
            warned_entries: Mutex::new(FnvHashSet::default()),
        }
    }

    #[inline]
    pub fn id(&self) -> ContextID {
        self.id
    }

    /// Returns false if the record was built with no context current.
    #[inline]
    pub fn has_current_context(&self) -> bool {
        self.has_current_context
    }

    #[inline]
    pub fn api(&self) -> GLApi {
        self.api
    }

    #[inline]
    pub fn version(&self) -> GLVersion {
        self.version
    }

    /// Returns true if the driver's GL version is at least `major.minor.release`.
    #[inline]
    pub fn gl_version_matches_at_least(&self, major: u8, minor: u8, release: u8) -> bool {
        self.version.matches_at_least(major, minor, release)
    }

    #[inline]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    #[inline]
    pub fn renderer(&self) -> &str {
        &self.renderer
    }

    /// The raw `GL_VERSION` string.
    #[inline]
    pub fn version_string(&self) -> &str {
        &self.version_string
    }

    #[inline]
    pub fn vendor_flags(&self) -> VendorFlags {
        self.vendor_flags
    }

    #[inline]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    #[inline]
    pub fn limits(&self) -> GLLimits {
        self.limits
    }

    #[inline]
    pub fn loader(&self) -> &Arc<ProcAddressLoader> {
        &self.loader
    }

    fn driver_info(&self) -> DriverInfo {
        DriverInfo { vendor: &self.vendor, renderer: &self.renderer, version: &self.version_string }
    }

    /// Returns true if the driver advertises `extension`. Matches whole tokens only.
    pub fn has_extension(&self, extension: &str) -> bool {
        let mut cache = self.extension_cache.lock().unwrap();
        if let Some(&present) = cache.get(extension) {
            return present;
        }
        let present = self.extensions.iter().any(|candidate| candidate == extension);
        cache.insert(extension.to_owned(), present);
        present
    }

    /// Returns true if `feature` can be used on this context.
    #[inline]
    pub fn has(&self, feature: GLFeature) -> bool {
        self.capabilities.get(&feature).map_or(false, |capability| capability.available)
    }

    pub fn capability(&self, feature: GLFeature) -> Option<&Capability> {
        self.capabilities.get(&feature)
    }

    /// Answers whether an extension (`"GL_..."`) or a symbolic feature (`"COIN_..."`) is usable.
    ///
    /// Both kinds of name are vetoed when the driver database marks them broken or disabled on
    /// this driver. Unknown symbolic names are reported through the debug channel.
    pub fn is_supported(&self, name: &str) -> bool {
        if name.starts_with("GL_") {
            return self.has_extension(name) &&
                !self.driver_status(name).map_or(false, DriverStatus::vetoes);
        }
        match GLFeature::from_name(name) {
            Some(feature) => self.has(feature),
            None => {
                debug::post_warning("GlueContext::is_supported",
                                    format!("unknown feature name \"{}\"", name));
                false
            }
        }
    }

    /// What the driver database says about `name` on this driver.
    pub fn driver_status(&self, name: &str) -> Option<DriverStatus> {
        self.driver_db.status(name, &self.driver_info())
    }

    #[inline]
    pub fn is_slow(&self, name: &str) -> bool {
        self.driver_status(name) == Some(DriverStatus::Slow)
    }

    #[inline]
    pub fn is_fast(&self, name: &str) -> bool {
        self.driver_status(name) == Some(DriverStatus::Fast)
    }

    /// Looks `symbol_name` up through the same chain the record was built with.
    pub fn get_proc_address(&self, symbol_name: &str) -> *const c_void {
        self.loader.get_proc_address(symbol_name)
    }

    /// The resolved entry point, if any.
    pub fn entry(&self, entry: Entry) -> Option<ResolvedEntry> {
        self.entries.get(&entry).copied()
    }

    /// Creates a `glow` context over the same symbol chain.
    ///
    /// The GL context this record was built for must be current.
    pub fn glow_context(&self) -> Result<glow::Context, Error> {
        if !self.has_current_context {
            return Err(Error::NoCurrentContext);
        }
        let loader = self.loader.clone();
        unsafe { Ok(glow::Context::from_loader_function(|name| loader.get_proc_address(name))) }
    }

    fn function<T>(&self, entry: Entry) -> Option<T> where T: Copy {
        debug_assert_eq!(mem::size_of::<T>(), mem::size_of::<*const c_void>());
        match self.entries.get(&entry) {
            Some(resolved) => unsafe { Some(mem::transmute_copy(&resolved.address.as_ptr())) },
            None => {
                if self.warned_entries.lock().unwrap().insert(entry) {
                    debug::post_warning("GlueContext",
                                        format!("{:?} called but not available on context {}",
                                                entry,
                                                self.id));
                }
                None
            }
        }
    }

    // Bootstrap queries

    pub fn get_string(&self, name: GLenum) -> Option<String> {
        let get_string: gl::PFNGLGETSTRINGPROC = self.function(Entry::GetString)?;
        unsafe { string_from_gl(get_string(name)) }
    }

    /// Queries a single integer. Returns zero if the query isn't available.
    pub fn get_integer(&self, pname: GLenum) -> GLint {
        let mut values = [0; 16];
        self.get_integer_v(pname, &mut values);
        values[0]
    }

    /// Queries `pname` into `values`, which must be large enough for the answer.
    pub fn get_integer_v(&self, pname: GLenum, values: &mut [GLint]) {
        if values.is_empty() {
            return;
        }
        if let Some(get_integerv) = self.function::<gl::PFNGLGETINTEGERVPROC>(Entry::GetIntegerv) {
            unsafe { get_integerv(pname, values.as_mut_ptr()) }
        }
    }

    pub fn get_error(&self) -> GLenum {
        match self.function::<gl::PFNGLGETERRORPROC>(Entry::GetError) {
            Some(get_error) => unsafe { get_error() },
            None => gl::NO_ERROR,
        }
    }

    /// Clears and returns the pending GL errors.
    pub fn drain_errors(&self) -> Vec<GLenum> {
        let mut errors = vec![];
        for _ in 0..MAX_PENDING_ERRORS {
            match self.get_error() {
                gl::NO_ERROR => break,
                error => errors.push(error),
            }
        }
        errors
    }

    pub fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        if let Some(viewport) = self.function::<gl::PFNGLVIEWPORTPROC>(Entry::Viewport) {
            unsafe { viewport(x, y, width, height) }
        }
    }

    // Multitexturing and polygon offset

    pub fn active_texture(&self, texture: GLenum) {
        if let Some(active) = self.function::<gl::PFNGLACTIVETEXTUREPROC>(Entry::ActiveTexture) {
            unsafe { active(texture) }
        }
    }

    pub fn client_active_texture(&self, texture: GLenum) {
        let function = self.function::<gl::PFNGLACTIVETEXTUREPROC>(Entry::ClientActiveTexture);
        if let Some(client_active_texture) = function {
            unsafe { client_active_texture(texture) }
        }
    }

    pub fn multi_tex_coord_2f(&self, target: GLenum, s: GLfloat, t: GLfloat) {
        let function = self.function::<gl::PFNGLMULTITEXCOORD2FPROC>(Entry::MultiTexCoord2f);
        if let Some(multi_tex_coord_2f) = function {
            unsafe { multi_tex_coord_2f(target, s, t) }
        }
    }

    pub fn polygon_offset(&self, factor: GLfloat, units: GLfloat) {
        let function = self.function::<gl::PFNGLPOLYGONOFFSETPROC>(Entry::PolygonOffset);
        if let Some(polygon_offset) = function {
            unsafe { polygon_offset(factor, units) }
        }
    }

    // Object helpers shared by the framebuffer, renderbuffer, buffer and query families

    fn gen_object(&self, entry: Entry) -> GLuint {
        let mut name = 0;
        if let Some(gen) = self.function::<gl::PFNGLGENOBJECTSPROC>(entry) {
            unsafe { gen(1, &mut name) }
        }
        name
    }

    fn delete_object(&self, entry: Entry, name: GLuint) {
        if let Some(delete) = self.function::<gl::PFNGLDELETEOBJECTSPROC>(entry) {
            unsafe { delete(1, &name) }
        }
    }

    fn bind_object(&self, entry: Entry, target: GLenum, name: GLuint) {
        if let Some(bind) = self.function::<gl::PFNGLBINDOBJECTPROC>(entry) {
            unsafe { bind(target, name) }
        }
    }

    fn is_object(&self, entry: Entry, name: GLuint) -> bool {
        match self.function::<gl::PFNGLISOBJECTPROC>(entry) {
            Some(is) => unsafe { is(name) != gl::FALSE as GLboolean },
            None => false,
        }
    }

    // Framebuffer objects

    /// Generates a framebuffer name. Returns zero if framebuffer objects are unavailable.
    pub fn gen_framebuffer(&self) -> GLuint {
        self.gen_object(Entry::GenFramebuffers)
    }

    pub fn delete_framebuffer(&self, framebuffer: GLuint) {
        self.delete_object(Entry::DeleteFramebuffers, framebuffer)
    }

    pub fn bind_framebuffer(&self, target: GLenum, framebuffer: GLuint) {
        self.bind_object(Entry::BindFramebuffer, target, framebuffer)
    }

    pub fn is_framebuffer(&self, framebuffer: GLuint) -> bool {
        self.is_object(Entry::IsFramebuffer, framebuffer)
    }

    /// Returns the completeness status, or zero if it can't be checked.
    pub fn check_framebuffer_status(&self, target: GLenum) -> GLenum {
        let function =
            self.function::<gl::PFNGLCHECKFRAMEBUFFERSTATUSPROC>(Entry::CheckFramebufferStatus);
        match function {
            Some(check_framebuffer_status) => unsafe { check_framebuffer_status(target) },
            None => 0,
        }
    }

    pub fn framebuffer_texture_2d(&self,
                                  target: GLenum,
                                  attachment: GLenum,
                                  texture_target: GLenum,
                                  texture: GLuint,
                                  level: GLint) {
        let function =
            self.function::<gl::PFNGLFRAMEBUFFERTEXTURE2DPROC>(Entry::FramebufferTexture2D);
        if let Some(framebuffer_texture_2d) = function {
            unsafe { framebuffer_texture_2d(target, attachment, texture_target, texture, level) }
        }
    }

    pub fn framebuffer_renderbuffer(&self,
                                    target: GLenum,
                                    attachment: GLenum,
                                    renderbuffer_target: GLenum,
                                    renderbuffer: GLuint) {
        let function =
            self.function::<gl::PFNGLFRAMEBUFFERRENDERBUFFERPROC>(Entry::FramebufferRenderbuffer);
        if let Some(framebuffer_renderbuffer) = function {
            unsafe { framebuffer_renderbuffer(target, attachment, renderbuffer_target, renderbuffer) }
        }
    }

    pub fn generate_mipmap(&self, target: GLenum) {
        let function = self.function::<gl::PFNGLGENERATEMIPMAPPROC>(Entry::GenerateMipmap);
        if let Some(generate_mipmap) = function {
            unsafe { generate_mipmap(target) }
        }
    }

    // Renderbuffers

    pub fn gen_renderbuffer(&self) -> GLuint {
        self.gen_object(Entry::GenRenderbuffers)
    }

    pub fn delete_renderbuffer(&self, renderbuffer: GLuint) {
        self.delete_object(Entry::DeleteRenderbuffers, renderbuffer)
    }

    pub fn bind_renderbuffer(&self, target: GLenum, renderbuffer: GLuint) {
        self.bind_object(Entry::BindRenderbuffer, target, renderbuffer)
    }

    pub fn is_renderbuffer(&self, renderbuffer: GLuint) -> bool {
        self.is_object(Entry::IsRenderbuffer, renderbuffer)
    }

    pub fn renderbuffer_storage(&self,
                                target: GLenum,
                                internal_format: GLenum,
                                width: GLsizei,
                                height: GLsizei) {
        let function =
            self.function::<gl::PFNGLRENDERBUFFERSTORAGEPROC>(Entry::RenderbufferStorage);
        if let Some(renderbuffer_storage) = function {
            unsafe { renderbuffer_storage(target, internal_format, width, height) }
        }
    }

    // Buffer objects

    pub fn gen_buffer(&self) -> GLuint {
        self.gen_object(Entry::GenBuffers)
    }

    pub fn delete_buffer(&self, buffer: GLuint) {
        self.delete_object(Entry::DeleteBuffers, buffer)
    }

    pub fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        self.bind_object(Entry::BindBuffer, target, buffer)
    }

    pub fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
        if let Some(buffer_data) = self.function::<gl::PFNGLBUFFERDATAPROC>(Entry::BufferData) {
            unsafe {
                buffer_data(target, data.len() as GLsizeiptr, data.as_ptr() as *const c_void, usage)
            }
        }
    }

    pub fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]) {
        let function = self.function::<gl::PFNGLBUFFERSUBDATAPROC>(Entry::BufferSubData);
        if let Some(buffer_sub_data) = function {
            unsafe {
                buffer_sub_data(target,
                                offset as GLintptr,
                                data.len() as GLsizeiptr,
                                data.as_ptr() as *const c_void)
            }
        }
    }

    // Occlusion queries

    pub fn gen_query(&self) -> GLuint {
        self.gen_object(Entry::GenQueries)
    }

    pub fn delete_query(&self, query: GLuint) {
        self.delete_object(Entry::DeleteQueries, query)
    }

    pub fn begin_query(&self, target: GLenum, query: GLuint) {
        if let Some(begin_query) = self.function::<gl::PFNGLBEGINQUERYPROC>(Entry::BeginQuery) {
            unsafe { begin_query(target, query) }
        }
    }

    pub fn end_query(&self, target: GLenum) {
        if let Some(end_query) = self.function::<gl::PFNGLENDQUERYPROC>(Entry::EndQuery) {
            unsafe { end_query(target) }
        }
    }

    /// Reads `GL_QUERY_RESULT` for `query`. Returns zero if queries are unavailable.
    pub fn query_result(&self, query: GLuint) -> GLuint {
        let mut result = 0;
        let function = self.function::<gl::PFNGLGETQUERYOBJECTUIVPROC>(Entry::GetQueryObjectuiv);
        if let Some(get_query_objectuiv) = function {
            unsafe { get_query_objectuiv(query, gl::QUERY_RESULT, &mut result) }
        }
        result
    }
}
