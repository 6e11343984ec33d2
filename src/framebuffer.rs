// coin-glue/src/framebuffer.rs
//
//! Offscreen rendering into a framebuffer object of a host context.
//!
//! The host context must be current whenever the backend is used. Each surface is a framebuffer
//! with an RGBA8 colour renderbuffer and a 24-bit depth renderbuffer.

use crate::debug;
use crate::error::Error;
use crate::feature::GLFeature;
use crate::gl::{self, types::*};
use crate::glue::GlueContext;
use crate::offscreen::{OffscreenBackend, OffscreenHandle};

use euclid::default::Size2D;
use std::sync::Arc;
use std::thread;

pub struct FramebufferBackend {
    host: Arc<GlueContext>,
    debug: bool,
}

struct Renderbuffers {
    color: GLuint,
    depth: GLuint,
}

/// The state behind an `OffscreenHandle` created by `FramebufferBackend`.
pub struct FramebufferSurface {
    framebuffer: GLuint,
    renderbuffers: Renderbuffers,
    size: Size2D<i32>,
    previous: Option<SavedBinding>,
}

#[derive(Clone, Copy)]
struct SavedBinding {
    framebuffer: GLuint,
    viewport: [GLint; 4],
}

impl Drop for FramebufferSurface {
    fn drop(&mut self) {
        if self.framebuffer != 0 && !thread::panicking() {
            debug::post_error("FramebufferSurface::drop",
                              format!("framebuffer {} leaked; surfaces must be destructed by \
                                       their backend",
                                      self.framebuffer));
        }
    }
}

impl FramebufferSurface {
    #[inline]
    pub fn framebuffer(&self) -> GLuint {
        self.framebuffer
    }

    #[inline]
    pub fn color_renderbuffer(&self) -> GLuint {
        self.renderbuffers.color
    }

    #[inline]
    pub fn depth_renderbuffer(&self) -> GLuint {
        self.renderbuffers.depth
    }
}

impl Renderbuffers {
    fn new(glue: &GlueContext, size: Size2D<i32>) -> Renderbuffers {
        let previous = glue.get_integer(gl::RENDERBUFFER_BINDING) as GLuint;
        let color = glue.gen_renderbuffer();
        let depth = glue.gen_renderbuffer();
        for &(renderbuffer, format) in &[(color, gl::RGBA8), (depth, gl::DEPTH_COMPONENT24)] {
            if renderbuffer != 0 {
                glue.bind_renderbuffer(gl::RENDERBUFFER, renderbuffer);
                glue.renderbuffer_storage(gl::RENDERBUFFER, format, size.width, size.height);
            }
        }
        glue.bind_renderbuffer(gl::RENDERBUFFER, previous);
        Renderbuffers { color, depth }
    }

    fn bind_to_current_framebuffer(&self, glue: &GlueContext) {
        glue.framebuffer_renderbuffer(gl::FRAMEBUFFER,
                                      gl::COLOR_ATTACHMENT0,
                                      gl::RENDERBUFFER,
                                      self.color);
        glue.framebuffer_renderbuffer(gl::FRAMEBUFFER,
                                      gl::DEPTH_ATTACHMENT,
                                      gl::RENDERBUFFER,
                                      self.depth);
    }

    // Deleting a bound renderbuffer unbinds it.
    fn destroy(&mut self, glue: &GlueContext) {
        for renderbuffer in [&mut self.depth, &mut self.color] {
            if *renderbuffer != 0 {
                glue.delete_renderbuffer(*renderbuffer);
                *renderbuffer = 0;
            }
        }
    }
}

impl FramebufferBackend {
    /// Creates a backend drawing through `host`, which must support framebuffer objects.
    pub fn new(host: Arc<GlueContext>) -> Result<FramebufferBackend, Error> {
        if !host.has(GLFeature::FramebufferObject) {
            return Err(Error::RequiredExtensionUnavailable);
        }
        Ok(FramebufferBackend { host, debug: false })
    }

    /// Reports surface creation and destruction through the debug channel.
    pub fn with_debug(mut self, debug: bool) -> FramebufferBackend {
        self.debug = debug;
        self
    }

    #[inline]
    pub fn host(&self) -> &Arc<GlueContext> {
        &self.host
    }

    fn current_binding(&self) -> SavedBinding {
        let mut viewport = [0; 4];
        self.host.get_integer_v(gl::VIEWPORT, &mut viewport);
        SavedBinding {
            framebuffer: self.host.get_integer(gl::FRAMEBUFFER_BINDING) as GLuint,
            viewport,
        }
    }

    fn destroy_surface(&self, surface: &mut FramebufferSurface) {
        let glue = &*self.host;
        surface.renderbuffers.destroy(glue);
        if surface.framebuffer != 0 {
            glue.delete_framebuffer(surface.framebuffer);
            surface.framebuffer = 0;
        }
    }
}

impl OffscreenBackend for FramebufferBackend {
    fn name(&self) -> &str {
        "framebuffer"
    }

    fn create_offscreen(&self, size: Size2D<i32>) -> Option<OffscreenHandle> {
        let glue = &*self.host;
        let max_size = glue.limits().max_renderbuffer_size as i32;
        if size.width <= 0 || size.height <= 0 ||
                (max_size > 0 && (size.width > max_size || size.height > max_size)) {
            debug::post_error("FramebufferBackend::create_offscreen",
                              format!("unsupported size {}x{}", size.width, size.height));
            return None;
        }

        let stale_errors = glue.drain_errors();
        if !stale_errors.is_empty() {
            debug!("discarded {} pending GL errors before creating a framebuffer",
                   stale_errors.len());
        }

        let previous = glue.get_integer(gl::FRAMEBUFFER_BINDING) as GLuint;
        let mut surface = FramebufferSurface {
            framebuffer: glue.gen_framebuffer(),
            renderbuffers: Renderbuffers::new(glue, size),
            size,
            previous: None,
        };

        let mut failure = None;
        if surface.framebuffer == 0 || surface.renderbuffers.color == 0 ||
                surface.renderbuffers.depth == 0 {
            failure = Some("couldn't generate framebuffer objects".to_owned());
        } else if glue.drain_errors().contains(&gl::OUT_OF_MEMORY) {
            failure = Some(format!("out of memory allocating {}x{} renderbuffers",
                                   size.width,
                                   size.height));
        } else {
            glue.bind_framebuffer(gl::FRAMEBUFFER, surface.framebuffer);
            surface.renderbuffers.bind_to_current_framebuffer(glue);
            let status = glue.check_framebuffer_status(gl::FRAMEBUFFER);
            if status != gl::FRAMEBUFFER_COMPLETE {
                failure = Some(format!("framebuffer incomplete (status 0x{:x})", status));
            }
        }
        glue.bind_framebuffer(gl::FRAMEBUFFER, previous);

        if let Some(failure) = failure {
            debug::post_error("FramebufferBackend::create_offscreen", failure);
            self.destroy_surface(&mut surface);
            return None;
        }

        if self.debug {
            debug::post_info("FramebufferBackend::create_offscreen",
                             format!("created framebuffer {} ({}x{})",
                                     surface.framebuffer,
                                     size.width,
                                     size.height));
        }
        Some(OffscreenHandle::new(self.name(), size, surface))
    }

    fn make_current(&self, handle: &mut OffscreenHandle) -> bool {
        let previous = self.current_binding();
        let surface = match handle.downcast_mut::<FramebufferSurface>() {
            Ok(surface) => surface,
            Err(_) => return false,
        };
        surface.previous = Some(previous);
        self.host.bind_framebuffer(gl::FRAMEBUFFER, surface.framebuffer);
        self.host.viewport(0, 0, surface.size.width, surface.size.height);
        true
    }

    fn reinstate_previous(&self, handle: &mut OffscreenHandle) {
        let surface = match handle.downcast_mut::<FramebufferSurface>() {
            Ok(surface) => surface,
            Err(_) => return,
        };
        let previous = surface.previous.take().unwrap_or(SavedBinding {
            framebuffer: 0,
            viewport: [0, 0, surface.size.width, surface.size.height],
        });
        self.host.bind_framebuffer(gl::FRAMEBUFFER, previous.framebuffer);
        let [x, y, width, height] = previous.viewport;
        self.host.viewport(x, y, width, height);
    }

    fn destruct(&self, handle: OffscreenHandle) {
        match handle.into_inner::<FramebufferSurface>() {
            Ok(mut surface) => {
                let framebuffer = surface.framebuffer;
                self.destroy_surface(&mut surface);
                if self.debug {
                    debug::post_info("FramebufferBackend::destruct",
                                     format!("destroyed framebuffer {}", framebuffer));
                }
            }
            Err(handle) => {
                debug::post_error("FramebufferBackend::destruct",
                                  format!("handle belongs to {}", handle.backend_name()));
            }
        }
    }
}
