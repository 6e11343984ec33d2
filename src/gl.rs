// coin-glue/src/gl.rs
//
//! OpenGL types, the signatures of the wrapped entry points, and the few compatibility-profile
//! enumerants that `glow` doesn't define.

#![allow(non_camel_case_types)]

pub use glow::*;

pub mod types {
    use std::os::raw::{c_char, c_void};

    pub type GLenum = u32;
    pub type GLboolean = u8;
    pub type GLbitfield = u32;
    pub type GLint = i32;
    pub type GLuint = u32;
    pub type GLsizei = i32;
    pub type GLfloat = f32;
    pub type GLdouble = f64;
    pub type GLubyte = u8;
    pub type GLchar = c_char;
    pub type GLsizeiptr = isize;
    pub type GLintptr = isize;
    pub type GLvoid = c_void;
}

use self::types::*;
use std::os::raw::c_void;

pub const MAX_LIGHTS: GLenum = 0x0D31;
pub const MAX_TEXTURE_UNITS: GLenum = 0x84E2;

pub type PFNGLGETSTRINGPROC = unsafe extern "system" fn(GLenum) -> *const GLubyte;
pub type PFNGLGETSTRINGIPROC = unsafe extern "system" fn(GLenum, GLuint) -> *const GLubyte;
pub type PFNGLGETINTEGERVPROC = unsafe extern "system" fn(GLenum, *mut GLint);
pub type PFNGLGETERRORPROC = unsafe extern "system" fn() -> GLenum;
pub type PFNGLVIEWPORTPROC = unsafe extern "system" fn(GLint, GLint, GLsizei, GLsizei);

pub type PFNGLACTIVETEXTUREPROC = unsafe extern "system" fn(GLenum);
pub type PFNGLMULTITEXCOORD2FPROC = unsafe extern "system" fn(GLenum, GLfloat, GLfloat);
pub type PFNGLPOLYGONOFFSETPROC = unsafe extern "system" fn(GLfloat, GLfloat);

pub type PFNGLGENOBJECTSPROC = unsafe extern "system" fn(GLsizei, *mut GLuint);
pub type PFNGLDELETEOBJECTSPROC = unsafe extern "system" fn(GLsizei, *const GLuint);
pub type PFNGLBINDOBJECTPROC = unsafe extern "system" fn(GLenum, GLuint);
pub type PFNGLISOBJECTPROC = unsafe extern "system" fn(GLuint) -> GLboolean;

pub type PFNGLCHECKFRAMEBUFFERSTATUSPROC = unsafe extern "system" fn(GLenum) -> GLenum;
pub type PFNGLFRAMEBUFFERTEXTURE2DPROC =
    unsafe extern "system" fn(GLenum, GLenum, GLenum, GLuint, GLint);
pub type PFNGLFRAMEBUFFERRENDERBUFFERPROC =
    unsafe extern "system" fn(GLenum, GLenum, GLenum, GLuint);
pub type PFNGLRENDERBUFFERSTORAGEPROC =
    unsafe extern "system" fn(GLenum, GLenum, GLsizei, GLsizei);
pub type PFNGLGENERATEMIPMAPPROC = unsafe extern "system" fn(GLenum);

pub type PFNGLBUFFERDATAPROC =
    unsafe extern "system" fn(GLenum, GLsizeiptr, *const c_void, GLenum);
pub type PFNGLBUFFERSUBDATAPROC =
    unsafe extern "system" fn(GLenum, GLintptr, GLsizeiptr, *const c_void);

pub type PFNGLBEGINQUERYPROC = unsafe extern "system" fn(GLenum, GLuint);
pub type PFNGLENDQUERYPROC = unsafe extern "system" fn(GLenum);
pub type PFNGLGETQUERYOBJECTUIVPROC = unsafe extern "system" fn(GLuint, GLenum, *mut GLuint);
