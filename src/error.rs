// coin-glue/src/error.rs
//
//! Various errors that methods can produce.

use std::error;
use std::fmt::{self, Display, Formatter};

/// Various errors that methods can produce.
///
/// Unsupported GL features are never reported through this type; they are ordinary boolean
/// capability queries.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The method failed for a miscellaneous reason.
    Failed,
    /// The platform doesn't support this method.
    UnsupportedOnThisPlatform,
    /// The system OpenGL library couldn't be located.
    NoGLLibraryFound,
    /// The GLU library couldn't be located.
    NoGLULibraryFound,
    /// Looking up an OpenGL function address failed.
    GLFunctionNotFound,
    /// An extension necessary for this operation isn't supported.
    RequiredExtensionUnavailable,
    /// The capability record for this context was already destroyed, and records are never
    /// rebuilt for the same context ID.
    ContextDestroyed,
    /// The process-wide runtime has already been initialized.
    AlreadyInitialized,
    /// The process-wide runtime hasn't been initialized, or it was shut down.
    NotInitialized,
    /// No offscreen backend was installed.
    NoOffscreenBackend,
    /// The offscreen backend couldn't create a surface.
    OffscreenCreationFailed,
    /// The system couldn't make the offscreen context current.
    MakeCurrentFailed,
    /// An offscreen handle was passed to a backend that didn't create it.
    IncompatibleHandle,
    /// No GL context was current when the capability record was built.
    NoCurrentContext,
}

impl Display for Error {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let message = match *self {
            Error::Failed => "operation failed",
            Error::UnsupportedOnThisPlatform => "unsupported on this platform",
            Error::NoGLLibraryFound => "no OpenGL library found",
            Error::NoGLULibraryFound => "no GLU library found",
            Error::GLFunctionNotFound => "OpenGL function not found",
            Error::RequiredExtensionUnavailable => "required OpenGL extension unavailable",
            Error::ContextDestroyed => "the GL context was already destroyed",
            Error::AlreadyInitialized => "the runtime is already initialized",
            Error::NotInitialized => "the runtime is not initialized",
            Error::NoOffscreenBackend => "no offscreen backend installed",
            Error::OffscreenCreationFailed => "couldn't create the offscreen context",
            Error::MakeCurrentFailed => "couldn't make the offscreen context current",
            Error::IncompatibleHandle => "offscreen handle belongs to another backend",
            Error::NoCurrentContext => "no GL context was current",
        };
        formatter.write_str(message)
    }
}

impl error::Error for Error {}
