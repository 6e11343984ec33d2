// coin-glue/src/glu.rs
//
//! Dynamic binding to the GLU library.
//!
//! GLU is optional: every entry point is nullable, and callers check for what they need
//! (`has_tessellator()`, `has_scale_image()`) before using it.

use crate::config::GlueConfig;
use crate::debug;
use crate::error::Error;
use crate::gl::types::*;
use crate::info::GLVersion;
use crate::loader::SymbolSource;
use crate::platform::generic::dylib::{DynamicLibrary, LibrarySymbolSource};

use std::ffi::CStr;
use std::fmt::{self, Debug, Formatter};
use std::mem;
use std::os::raw::{c_char, c_void};

pub const GLU_VERSION: GLenum = 100800;
pub const GLU_EXTENSIONS: GLenum = 100801;

/// An opaque GLU tessellator object.
pub enum GLUtesselator {}

pub type GLUtessCallback = unsafe extern "system" fn();

pub type PFNGLUGETSTRINGPROC = unsafe extern "system" fn(GLenum) -> *const GLubyte;
pub type PFNGLUERRORSTRINGPROC = unsafe extern "system" fn(GLenum) -> *const GLubyte;
pub type PFNGLUSCALEIMAGEPROC = unsafe extern "system" fn(GLenum,
                                                          GLint,
                                                          GLint,
                                                          GLenum,
                                                          *const c_void,
                                                          GLint,
                                                          GLint,
                                                          GLenum,
                                                          *mut c_void)
                                                          -> GLint;
pub type PFNGLUBUILD2DMIPMAPSPROC =
    unsafe extern "system" fn(GLenum, GLint, GLint, GLint, GLenum, GLenum, *const c_void) -> GLint;
pub type PFNGLUNEWTESSPROC = unsafe extern "system" fn() -> *mut GLUtesselator;
pub type PFNGLUDELETETESSPROC = unsafe extern "system" fn(*mut GLUtesselator);
pub type PFNGLUTESSCALLBACKPROC =
    unsafe extern "system" fn(*mut GLUtesselator, GLenum, Option<GLUtessCallback>);
pub type PFNGLUTESSPROPERTYPROC = unsafe extern "system" fn(*mut GLUtesselator, GLenum, GLdouble);
pub type PFNGLUTESSNORMALPROC =
    unsafe extern "system" fn(*mut GLUtesselator, GLdouble, GLdouble, GLdouble);
pub type PFNGLUTESSBEGINPOLYGONPROC = unsafe extern "system" fn(*mut GLUtesselator, *mut c_void);
pub type PFNGLUTESSCONTOURPROC = unsafe extern "system" fn(*mut GLUtesselator);
pub type PFNGLUTESSENDPOLYGONPROC = unsafe extern "system" fn(*mut GLUtesselator);
pub type PFNGLUTESSVERTEXPROC =
    unsafe extern "system" fn(*mut GLUtesselator, *mut GLdouble, *mut c_void);

/// The GLU entry points. `None` means the library doesn't export it.
#[derive(Clone, Copy, Default)]
pub struct GluFunctions {
    pub get_string: Option<PFNGLUGETSTRINGPROC>,
    pub error_string: Option<PFNGLUERRORSTRINGPROC>,
    pub scale_image: Option<PFNGLUSCALEIMAGEPROC>,
    pub build_2d_mipmaps: Option<PFNGLUBUILD2DMIPMAPSPROC>,
    pub new_tess: Option<PFNGLUNEWTESSPROC>,
    pub delete_tess: Option<PFNGLUDELETETESSPROC>,
    pub tess_callback: Option<PFNGLUTESSCALLBACKPROC>,
    pub tess_property: Option<PFNGLUTESSPROPERTYPROC>,
    pub tess_normal: Option<PFNGLUTESSNORMALPROC>,
    pub tess_begin_polygon: Option<PFNGLUTESSBEGINPOLYGONPROC>,
    pub tess_end_polygon: Option<PFNGLUTESSENDPOLYGONPROC>,
    pub tess_begin_contour: Option<PFNGLUTESSCONTOURPROC>,
    pub tess_end_contour: Option<PFNGLUTESSCONTOURPROC>,
    pub tess_vertex: Option<PFNGLUTESSVERTEXPROC>,
}

unsafe fn resolve<F>(source: &dyn SymbolSource, symbol_name: &CStr) -> Option<F> where F: Copy {
    debug_assert_eq!(mem::size_of::<F>(), mem::size_of::<*const c_void>());
    let address = source.lookup(symbol_name);
    if address.is_null() {
        None
    } else {
        Some(mem::transmute_copy::<*const c_void, F>(&address))
    }
}

impl GluFunctions {
    fn load(source: &dyn SymbolSource) -> GluFunctions {
        unsafe {
            GluFunctions {
                get_string: resolve(source, c"gluGetString"),
                error_string: resolve(source, c"gluErrorString"),
                scale_image: resolve(source, c"gluScaleImage"),
                build_2d_mipmaps: resolve(source, c"gluBuild2DMipmaps"),
                new_tess: resolve(source, c"gluNewTess"),
                delete_tess: resolve(source, c"gluDeleteTess"),
                tess_callback: resolve(source, c"gluTessCallback"),
                tess_property: resolve(source, c"gluTessProperty"),
                tess_normal: resolve(source, c"gluTessNormal"),
                tess_begin_polygon: resolve(source, c"gluTessBeginPolygon"),
                tess_end_polygon: resolve(source, c"gluTessEndPolygon"),
                tess_begin_contour: resolve(source, c"gluTessBeginContour"),
                tess_end_contour: resolve(source, c"gluTessEndContour"),
                tess_vertex: resolve(source, c"gluTessVertex"),
            }
        }
    }

    fn resolved_count(&self) -> usize {
        [
            self.get_string.is_some(),
            self.error_string.is_some(),
            self.scale_image.is_some(),
            self.build_2d_mipmaps.is_some(),
            self.new_tess.is_some(),
            self.delete_tess.is_some(),
            self.tess_callback.is_some(),
            self.tess_property.is_some(),
            self.tess_normal.is_some(),
            self.tess_begin_polygon.is_some(),
            self.tess_end_polygon.is_some(),
            self.tess_begin_contour.is_some(),
            self.tess_end_contour.is_some(),
            self.tess_vertex.is_some(),
        ].iter().filter(|&&resolved| resolved).count()
    }
}

#[cfg(linux)]
const DEFAULT_LIBRARY_NAMES: &[&str] = &["libGLU.so.1", "libGLU.so"];
#[cfg(macos)]
const DEFAULT_LIBRARY_NAMES: &[&str] = &[
    "/System/Library/Frameworks/OpenGL.framework/Libraries/libGLU.dylib",
    "/System/Library/Frameworks/OpenGL.framework/OpenGL",
];
#[cfg(windows)]
const DEFAULT_LIBRARY_NAMES: &[&str] = &["glu32.dll"];
#[cfg(not(any(linux, macos, windows)))]
const DEFAULT_LIBRARY_NAMES: &[&str] = &["libGLU.so.1", "libGLU.so"];

/// The library names to try, in order. `libname` comes from `COIN_GLU_LIBNAME`.
pub fn library_names(libname: Option<&str>) -> Vec<&str> {
    libname.into_iter().chain(DEFAULT_LIBRARY_NAMES.iter().copied()).collect()
}

/// A loaded GLU library.
pub struct GluWrapper {
    // Keeps the library loaded for as long as the function pointers are reachable.
    source: Box<dyn SymbolSource>,
    functions: GluFunctions,
    version: GLVersion,
    version_string: String,
}

impl GluWrapper {
    /// Loads the first GLU library found, honoring the configured name and version override.
    pub fn load(config: &GlueConfig) -> Result<GluWrapper, Error> {
        let names = library_names(config.glu_libname.as_deref());
        let source: Box<dyn SymbolSource> = match DynamicLibrary::open_first(names.iter().copied()) {
            Some(library) => {
                let name = library.name().to_owned();
                Box::new(LibrarySymbolSource::new(&name, vec![library]))
            }
            None => {
                // GLU may have been linked into the executable.
                let image = DynamicLibrary::process_image().ok_or(Error::NoGLULibraryFound)?;
                Box::new(LibrarySymbolSource::new("<process>", vec![image]))
            }
        };

        let glu = GluWrapper::from_source(source, config.glu_version_override.as_deref())?;
        if config.debug_glu_info {
            glu.post_debug_info();
        }
        Ok(glu)
    }

    /// Binds GLU through an arbitrary symbol source.
    ///
    /// Fails with `Error::NoGLULibraryFound` if the source exports none of the GLU entry points.
    pub fn from_source(source: Box<dyn SymbolSource>, version_override: Option<&str>)
                       -> Result<GluWrapper, Error> {
        let functions = GluFunctions::load(&*source);
        if functions.resolved_count() == 0 {
            debug!("{} exports no GLU entry points", source.name());
            return Err(Error::NoGLULibraryFound);
        }

        let reported = functions.get_string.and_then(|get_string| unsafe {
            c_string(get_string(GLU_VERSION))
        });
        let version_string = match version_override {
            Some(version_override) => {
                debug!("overriding GLU version {:?} with {}", reported, version_override);
                version_override.to_owned()
            }
            // GLU 1.0 predates gluGetString().
            None => reported.unwrap_or_else(|| "1.0".to_owned()),
        };
        let version = match GLVersion::parse(&version_string) {
            Some((_, version)) => version,
            None => {
                debug::post_warning("GluWrapper::from_source",
                                    format!("couldn't parse GLU version '{}'", version_string));
                GLVersion::default()
            }
        };

        Ok(GluWrapper { source, functions, version, version_string })
    }

    /// The library GLU was loaded from.
    #[inline]
    pub fn library_name(&self) -> &str {
        self.source.name()
    }

    #[inline]
    pub fn functions(&self) -> &GluFunctions {
        &self.functions
    }

    #[inline]
    pub fn version(&self) -> GLVersion {
        self.version
    }

    #[inline]
    pub fn version_string(&self) -> &str {
        &self.version_string
    }

    pub fn version_matches_at_least(&self, major: u8, minor: u8, release: u8) -> bool {
        self.version.matches_at_least(major, minor, release)
    }

    /// Returns true if the whole GLU 1.2 tessellator interface is present.
    pub fn has_tessellator(&self) -> bool {
        let functions = &self.functions;
        functions.new_tess.is_some() && functions.delete_tess.is_some() &&
            functions.tess_callback.is_some() && functions.tess_property.is_some() &&
            functions.tess_normal.is_some() && functions.tess_begin_polygon.is_some() &&
            functions.tess_end_polygon.is_some() && functions.tess_begin_contour.is_some() &&
            functions.tess_end_contour.is_some() && functions.tess_vertex.is_some()
    }

    #[inline]
    pub fn has_scale_image(&self) -> bool {
        self.functions.scale_image.is_some()
    }

    #[inline]
    pub fn has_build_2d_mipmaps(&self) -> bool {
        self.functions.build_2d_mipmaps.is_some()
    }

    /// The space-separated GLU extension list, empty if GLU can't report it.
    pub fn extensions(&self) -> Vec<String> {
        let extensions = self.functions.get_string.and_then(|get_string| unsafe {
            c_string(get_string(GLU_EXTENSIONS))
        });
        extensions.map_or(vec![], |extensions| {
            extensions.split_whitespace().map(|extension| extension.to_owned()).collect()
        })
    }

    /// Describes a GL or GLU error code.
    pub fn error_string(&self, code: GLenum) -> Option<String> {
        self.functions.error_string.and_then(|error_string| unsafe { c_string(error_string(code)) })
    }

    fn post_debug_info(&self) {
        debug::post_info("GluWrapper::load",
                         format!("loaded {} (version {}, tessellator: {}, gluScaleImage: {}, \
                                  gluBuild2DMipmaps: {})",
                                 self.library_name(),
                                 self.version_string,
                                 self.has_tessellator(),
                                 self.has_scale_image(),
                                 self.has_build_2d_mipmaps()));
    }
}

impl Debug for GluWrapper {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.debug_struct("GluWrapper")
                 .field("library", &self.library_name())
                 .field("version", &self.version)
                 .finish()
    }
}

unsafe fn c_string(string: *const GLubyte) -> Option<String> {
    if string.is_null() {
        None
    } else {
        Some(CStr::from_ptr(string as *const c_char).to_string_lossy().into_owned())
    }
}
