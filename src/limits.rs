// coin-glue/src/limits.rs
//
//! Implementation limits queried once per capability record.

use crate::gl::{self, types::*};

/// Driver limits. Zero means the driver didn't report the limit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GLLimits {
    pub max_texture_size: u32,
    /// Zero when framebuffer objects are unavailable.
    pub max_renderbuffer_size: u32,
    /// Fixed-function texture units. Zero on core profiles.
    pub max_texture_units: u32,
    /// Fixed-function lights. Zero on core profiles.
    pub max_lights: u32,
}

// Some drivers keep reporting an error when no context is current.
pub(crate) const MAX_PENDING_ERRORS: usize = 32;

/// The two entry points limit detection needs.
pub(crate) struct IntegerQuery {
    pub(crate) get_integerv: gl::PFNGLGETINTEGERVPROC,
    pub(crate) get_error: gl::PFNGLGETERRORPROC,
}

impl IntegerQuery {
    /// Queries `pname`, returning `None` if the driver raises an error instead.
    fn fallible_integer(&self, pname: GLenum) -> Option<u32> {
        unsafe {
            // Errors raised before this query aren't ours to report.
            for _ in 0..MAX_PENDING_ERRORS {
                if (self.get_error)() == gl::NO_ERROR {
                    break;
                }
            }
            let mut value = 0;
            (self.get_integerv)(pname, &mut value);
            if (self.get_error)() != gl::NO_ERROR {
                return None;
            }
            Some(value.max(0) as u32)
        }
    }
}

macro_rules! gl_integer {
    ($query:ident, $pname:ident) => {
        $query.fallible_integer(gl::$pname).unwrap_or_else(|| {
            debug!("{} not reported", stringify!($pname));
            0
        })
    }
}

impl GLLimits {
    pub(crate) fn detect(query: &IntegerQuery, has_framebuffer_objects: bool, core_profile: bool)
                         -> GLLimits {
        let max_texture_size = gl_integer!(query, MAX_TEXTURE_SIZE);
        let max_renderbuffer_size =
            if has_framebuffer_objects { gl_integer!(query, MAX_RENDERBUFFER_SIZE) } else { 0 };
        let (max_texture_units, max_lights) = if core_profile {
            (0, 0)
        } else {
            (gl_integer!(query, MAX_TEXTURE_UNITS), gl_integer!(query, MAX_LIGHTS))
        };

        GLLimits { max_texture_size, max_renderbuffer_size, max_texture_units, max_lights }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_gl::{self, FakeDriver};
    use std::mem;

    fn query() -> IntegerQuery {
        unsafe {
            IntegerQuery {
                get_integerv: mem::transmute(fake_gl::lookup("glGetIntegerv")),
                get_error: mem::transmute(fake_gl::lookup("glGetError")),
            }
        }
    }

    #[test]
    fn test_detect() {
        fake_gl::install(FakeDriver::default());
        let limits = GLLimits::detect(&query(), true, false);
        assert_eq!(limits, GLLimits {
            max_texture_size: 8192,
            max_renderbuffer_size: 4096,
            max_texture_units: 4,
            max_lights: 8,
        });
        assert_eq!(GLLimits::detect(&query(), false, true).max_renderbuffer_size, 0);
    }

    #[test]
    fn test_unreported_limit_is_zero() {
        let mut driver = FakeDriver::default();
        driver.integers.remove(&gl::MAX_LIGHTS);
        fake_gl::install(driver);
        fake_gl::with_state(|state| state.errors.push_back(gl::INVALID_OPERATION));
        let limits = GLLimits::detect(&query(), true, false);
        assert_eq!(limits.max_lights, 0);
        assert_eq!(limits.max_texture_size, 8192);
        assert!(fake_gl::with_state(|state| state.errors.is_empty()));
    }
}
