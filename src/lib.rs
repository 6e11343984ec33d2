// coin-glue/src/lib.rs
//
//! OpenGL capability detection and lifecycle management for a retained-mode scene graph.
//!
//! This crate resolves GL entry points through a chain of symbol sources, builds a capability
//! record per GL context (version, extensions, resolved functions, implementation limits and
//! driver quirks), renders into offscreen contexts through pluggable backends, and tears the
//! library down in a well-defined order at exit.
//!
//! A typical application calls `init()` once, asks `Runtime::instance()` for the record of each
//! context it renders into, and calls `shutdown()` before exiting.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod platform;

pub mod error;
pub use crate::error::Error;

pub mod atexit;
pub use crate::atexit::{AtexitRegistry, Priority};

mod config;
pub use crate::config::GlueConfig;

mod context;
pub use crate::context::ContextID;

pub mod debug;

pub mod driver_db;
pub use crate::driver_db::{DriverDatabase, DriverInfo, DriverStatus, FeatureOverride};

mod feature;
pub use crate::feature::{Candidate, Entry, GLFeature, Provider, Requirement};

pub mod framebuffer;
pub use crate::framebuffer::{FramebufferBackend, FramebufferSurface};

pub mod gl;

pub mod glu;
pub use crate::glu::GluWrapper;

mod glue;
pub use crate::glue::{Capability, GlueContext, ResolvedEntry, VendorFlags};

mod info;
pub use crate::info::{GLApi, GLVersion};

mod limits;
pub use crate::limits::GLLimits;

pub mod loader;
pub use crate::loader::{FnSymbolSource, ProcAddress, ProcAddressLoader, SymbolSource};

pub mod offscreen;
pub use crate::offscreen::{set_offscreen_backend, OffscreenBackend, OffscreenHandle};

mod registry;
pub use crate::registry::GlueRegistry;

mod runtime;
pub use crate::runtime::{OffscreenContext, Runtime, RuntimeBuilder};

pub mod sync;

pub mod thread_storage;
pub use crate::thread_storage::{StorageRegistry, ThreadStorage};

use std::sync::Arc;

/// Creates the process-wide runtime with the platform's default symbol sources.
///
/// Returns `Error::AlreadyInitialized` if a runtime is already installed.
pub fn init(config: GlueConfig) -> Result<Arc<Runtime>, Error> {
    Runtime::builder().config(config).init()
}

/// Tears down the process-wide runtime, running every registered teardown callback.
///
/// Returns `Error::NotInitialized` if no runtime is installed.
pub fn shutdown() -> Result<(), Error> {
    Runtime::shutdown_current()
}

#[cfg(test)]
mod fake_gl;

#[cfg(test)]
mod tests;
