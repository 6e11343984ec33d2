// coin-glue/src/feature.rs
//
//! The catalog of wrapped entry points and the symbolic features built from them.

use crate::info::GLVersion;

use fnv::FnvHashMap;
use std::fmt::{self, Display, Formatter};

/// What makes a candidate entry-point name usable on a given context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Provider {
    /// Resolved before the GL version is known. Only the bootstrap queries use this.
    Always,
    /// Part of core OpenGL since `major.minor`.
    Core(u8, u8),
    /// Exported by the named extension.
    Extension(&'static str),
}

/// One spelling of an entry point, and what has to be present for it to be eligible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub name: &'static str,
    pub provider: Provider,
}

const fn always(name: &'static str) -> Candidate {
    Candidate { name, provider: Provider::Always }
}

const fn core(name: &'static str, major: u8, minor: u8) -> Candidate {
    Candidate { name, provider: Provider::Core(major, minor) }
}

const fn ext(name: &'static str, extension: &'static str) -> Candidate {
    Candidate { name, provider: Provider::Extension(extension) }
}

macro_rules! entries {
    ($($entry:ident => [$($candidate:expr),+ $(,)?];)+) => {
        /// A wrapped GL entry point.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Entry {
            $($entry,)+
        }

        impl Entry {
            /// Every wrapped entry point.
            pub const ALL: &'static [Entry] = &[$(Entry::$entry,)+];

            /// The spellings of this entry point, in order of preference.
            pub fn candidates(self) -> &'static [Candidate] {
                match self {
                    $(Entry::$entry => {
                        const CANDIDATES: &[Candidate] = &[$($candidate),+];
                        CANDIDATES
                    })+
                }
            }
        }
    }
}

entries! {
    // Bootstrap queries.
    GetString => [always("glGetString")];
    GetIntegerv => [always("glGetIntegerv")];
    GetError => [always("glGetError")];
    Viewport => [always("glViewport")];
    GetStringi => [core("glGetStringi", 3, 0)];

    // Multitexturing.
    ActiveTexture => [core("glActiveTexture", 1, 3),
                      ext("glActiveTextureARB", "GL_ARB_multitexture")];
    ClientActiveTexture => [core("glClientActiveTexture", 1, 3),
                            ext("glClientActiveTextureARB", "GL_ARB_multitexture")];
    MultiTexCoord2f => [core("glMultiTexCoord2f", 1, 3),
                        ext("glMultiTexCoord2fARB", "GL_ARB_multitexture")];

    // 3D textures.
    TexImage3D => [core("glTexImage3D", 1, 2), ext("glTexImage3DEXT", "GL_EXT_texture3D")];
    TexSubImage3D => [core("glTexSubImage3D", 1, 2),
                      ext("glTexSubImage3DEXT", "GL_EXT_texture3D")];

    // Compressed textures.
    CompressedTexImage2D => [core("glCompressedTexImage2D", 1, 3),
                             ext("glCompressedTexImage2DARB", "GL_ARB_texture_compression")];
    GetCompressedTexImage => [core("glGetCompressedTexImage", 1, 3),
                              ext("glGetCompressedTexImageARB", "GL_ARB_texture_compression")];

    PolygonOffset => [core("glPolygonOffset", 1, 1),
                      ext("glPolygonOffsetEXT", "GL_EXT_polygon_offset")];

    // Texture objects.
    GenTextures => [core("glGenTextures", 1, 1), ext("glGenTexturesEXT", "GL_EXT_texture_object")];
    BindTexture => [core("glBindTexture", 1, 1), ext("glBindTextureEXT", "GL_EXT_texture_object")];
    DeleteTextures => [core("glDeleteTextures", 1, 1),
                       ext("glDeleteTexturesEXT", "GL_EXT_texture_object")];

    // Vertex arrays.
    VertexPointer => [core("glVertexPointer", 1, 1),
                      ext("glVertexPointerEXT", "GL_EXT_vertex_array")];
    DrawArrays => [core("glDrawArrays", 1, 1), ext("glDrawArraysEXT", "GL_EXT_vertex_array")];
    MultiDrawArrays => [core("glMultiDrawArrays", 1, 4),
                        ext("glMultiDrawArraysEXT", "GL_EXT_multi_draw_arrays")];
    MultiDrawElements => [core("glMultiDrawElements", 1, 4),
                          ext("glMultiDrawElementsEXT", "GL_EXT_multi_draw_arrays")];

    BlendEquation => [core("glBlendEquation", 1, 4),
                      ext("glBlendEquation", "GL_ARB_imaging"),
                      ext("glBlendEquationEXT", "GL_EXT_blend_minmax")];

    // Buffer objects.
    GenBuffers => [core("glGenBuffers", 1, 5),
                   ext("glGenBuffersARB", "GL_ARB_vertex_buffer_object")];
    BindBuffer => [core("glBindBuffer", 1, 5),
                   ext("glBindBufferARB", "GL_ARB_vertex_buffer_object")];
    BufferData => [core("glBufferData", 1, 5),
                   ext("glBufferDataARB", "GL_ARB_vertex_buffer_object")];
    BufferSubData => [core("glBufferSubData", 1, 5),
                      ext("glBufferSubDataARB", "GL_ARB_vertex_buffer_object")];
    DeleteBuffers => [core("glDeleteBuffers", 1, 5),
                      ext("glDeleteBuffersARB", "GL_ARB_vertex_buffer_object")];

    // Framebuffer objects.
    GenFramebuffers => [core("glGenFramebuffers", 3, 0),
                        ext("glGenFramebuffers", "GL_ARB_framebuffer_object"),
                        ext("glGenFramebuffersEXT", "GL_EXT_framebuffer_object")];
    DeleteFramebuffers => [core("glDeleteFramebuffers", 3, 0),
                           ext("glDeleteFramebuffers", "GL_ARB_framebuffer_object"),
                           ext("glDeleteFramebuffersEXT", "GL_EXT_framebuffer_object")];
    BindFramebuffer => [core("glBindFramebuffer", 3, 0),
                        ext("glBindFramebuffer", "GL_ARB_framebuffer_object"),
                        ext("glBindFramebufferEXT", "GL_EXT_framebuffer_object")];
    IsFramebuffer => [core("glIsFramebuffer", 3, 0),
                      ext("glIsFramebuffer", "GL_ARB_framebuffer_object"),
                      ext("glIsFramebufferEXT", "GL_EXT_framebuffer_object")];
    CheckFramebufferStatus => [core("glCheckFramebufferStatus", 3, 0),
                               ext("glCheckFramebufferStatus", "GL_ARB_framebuffer_object"),
                               ext("glCheckFramebufferStatusEXT", "GL_EXT_framebuffer_object")];
    FramebufferTexture2D => [core("glFramebufferTexture2D", 3, 0),
                             ext("glFramebufferTexture2D", "GL_ARB_framebuffer_object"),
                             ext("glFramebufferTexture2DEXT", "GL_EXT_framebuffer_object")];
    FramebufferRenderbuffer => [core("glFramebufferRenderbuffer", 3, 0),
                                ext("glFramebufferRenderbuffer", "GL_ARB_framebuffer_object"),
                                ext("glFramebufferRenderbufferEXT", "GL_EXT_framebuffer_object")];
    GenRenderbuffers => [core("glGenRenderbuffers", 3, 0),
                         ext("glGenRenderbuffers", "GL_ARB_framebuffer_object"),
                         ext("glGenRenderbuffersEXT", "GL_EXT_framebuffer_object")];
    DeleteRenderbuffers => [core("glDeleteRenderbuffers", 3, 0),
                            ext("glDeleteRenderbuffers", "GL_ARB_framebuffer_object"),
                            ext("glDeleteRenderbuffersEXT", "GL_EXT_framebuffer_object")];
    BindRenderbuffer => [core("glBindRenderbuffer", 3, 0),
                         ext("glBindRenderbuffer", "GL_ARB_framebuffer_object"),
                         ext("glBindRenderbufferEXT", "GL_EXT_framebuffer_object")];
    IsRenderbuffer => [core("glIsRenderbuffer", 3, 0),
                       ext("glIsRenderbuffer", "GL_ARB_framebuffer_object"),
                       ext("glIsRenderbufferEXT", "GL_EXT_framebuffer_object")];
    RenderbufferStorage => [core("glRenderbufferStorage", 3, 0),
                            ext("glRenderbufferStorage", "GL_ARB_framebuffer_object"),
                            ext("glRenderbufferStorageEXT", "GL_EXT_framebuffer_object")];
    GenerateMipmap => [core("glGenerateMipmap", 3, 0),
                       ext("glGenerateMipmap", "GL_ARB_framebuffer_object"),
                       ext("glGenerateMipmapEXT", "GL_EXT_framebuffer_object")];

    // Occlusion queries.
    GenQueries => [core("glGenQueries", 1, 5), ext("glGenQueriesARB", "GL_ARB_occlusion_query")];
    DeleteQueries => [core("glDeleteQueries", 1, 5),
                      ext("glDeleteQueriesARB", "GL_ARB_occlusion_query")];
    BeginQuery => [core("glBeginQuery", 1, 5), ext("glBeginQueryARB", "GL_ARB_occlusion_query")];
    EndQuery => [core("glEndQuery", 1, 5), ext("glEndQueryARB", "GL_ARB_occlusion_query")];
    GetQueryObjectuiv => [core("glGetQueryObjectuiv", 1, 5),
                          ext("glGetQueryObjectuivARB", "GL_ARB_occlusion_query")];

    // ARB assembly programs. The vertex and fragment extensions share these entry points.
    GenPrograms => [ext("glGenProgramsARB", "GL_ARB_vertex_program"),
                    ext("glGenProgramsARB", "GL_ARB_fragment_program")];
    BindProgram => [ext("glBindProgramARB", "GL_ARB_vertex_program"),
                    ext("glBindProgramARB", "GL_ARB_fragment_program")];
    ProgramString => [ext("glProgramStringARB", "GL_ARB_vertex_program"),
                      ext("glProgramStringARB", "GL_ARB_fragment_program")];
    DeletePrograms => [ext("glDeleteProgramsARB", "GL_ARB_vertex_program"),
                       ext("glDeleteProgramsARB", "GL_ARB_fragment_program")];
    ProgramEnvParameter4fv => [ext("glProgramEnvParameter4fvARB", "GL_ARB_vertex_program"),
                               ext("glProgramEnvParameter4fvARB", "GL_ARB_fragment_program")];
    VertexAttrib4fv => [core("glVertexAttrib4fv", 2, 0),
                        ext("glVertexAttrib4fvARB", "GL_ARB_vertex_program")];

    // GLSL.
    CreateShader => [core("glCreateShader", 2, 0),
                     ext("glCreateShaderObjectARB", "GL_ARB_shader_objects")];
    ShaderSource => [core("glShaderSource", 2, 0),
                     ext("glShaderSourceARB", "GL_ARB_shader_objects")];
    CompileShader => [core("glCompileShader", 2, 0),
                      ext("glCompileShaderARB", "GL_ARB_shader_objects")];
    CreateProgram => [core("glCreateProgram", 2, 0),
                      ext("glCreateProgramObjectARB", "GL_ARB_shader_objects")];
    AttachShader => [core("glAttachShader", 2, 0),
                     ext("glAttachObjectARB", "GL_ARB_shader_objects")];
    LinkProgram => [core("glLinkProgram", 2, 0), ext("glLinkProgramARB", "GL_ARB_shader_objects")];
    UseProgram => [core("glUseProgram", 2, 0),
                   ext("glUseProgramObjectARB", "GL_ARB_shader_objects")];
    GetUniformLocation => [core("glGetUniformLocation", 2, 0),
                           ext("glGetUniformLocationARB", "GL_ARB_shader_objects")];

    // NVIDIA register combiners.
    CombinerParameteri => [ext("glCombinerParameteriNV", "GL_NV_register_combiners")];
    CombinerInput => [ext("glCombinerInputNV", "GL_NV_register_combiners")];
    CombinerOutput => [ext("glCombinerOutputNV", "GL_NV_register_combiners")];
    FinalCombinerInput => [ext("glFinalCombinerInputNV", "GL_NV_register_combiners")];

    // Color tables and paletted textures.
    ColorTable => [ext("glColorTable", "GL_ARB_imaging"),
                   ext("glColorTableEXT", "GL_EXT_paletted_texture"),
                   ext("glColorTableSGI", "GL_SGI_color_table")];
    ColorSubTable => [ext("glColorSubTable", "GL_ARB_imaging"),
                      ext("glColorSubTableEXT", "GL_EXT_color_subtable"),
                      ext("glColorSubTableEXT", "GL_EXT_paletted_texture")];
    GetColorTable => [ext("glGetColorTable", "GL_ARB_imaging"),
                      ext("glGetColorTableEXT", "GL_EXT_paletted_texture"),
                      ext("glGetColorTableSGI", "GL_SGI_color_table")];

    // Vertex array objects.
    GenVertexArrays => [core("glGenVertexArrays", 3, 0),
                        ext("glGenVertexArrays", "GL_ARB_vertex_array_object"),
                        ext("glGenVertexArraysAPPLE", "GL_APPLE_vertex_array_object")];
    BindVertexArray => [core("glBindVertexArray", 3, 0),
                        ext("glBindVertexArray", "GL_ARB_vertex_array_object"),
                        ext("glBindVertexArrayAPPLE", "GL_APPLE_vertex_array_object")];
    DeleteVertexArrays => [core("glDeleteVertexArrays", 3, 0),
                           ext("glDeleteVertexArrays", "GL_ARB_vertex_array_object"),
                           ext("glDeleteVertexArraysAPPLE", "GL_APPLE_vertex_array_object")];

    SampleCoverage => [core("glSampleCoverage", 1, 3),
                       ext("glSampleCoverageARB", "GL_ARB_multisample")];
}

/// What a context must provide for a feature to be detected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Requirement {
    /// The core version that includes the feature, if any.
    pub core: Option<(u8, u8)>,
    /// Extensions any one of which provides the feature.
    pub extensions: &'static [&'static str],
}

impl Requirement {
    /// Returns true if `version` or any of `has_extension` satisfies the requirement.
    pub fn is_met<F>(&self, version: GLVersion, has_extension: F) -> bool
                     where F: Fn(&str) -> bool {
        let core = self.core.map_or(false, |(major, minor)| version.matches_at_least(major, minor, 0));
        core || self.extensions.iter().any(|extension| has_extension(extension))
    }
}

macro_rules! features {
    ($($feature:ident => $name:literal, $core:expr, [$($extension:literal),*], [$($entry:ident),*];)+) => {
        /// A symbolic feature id, queryable with `GlueContext::has()` or by name with
        /// `GlueContext::is_supported()`.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum GLFeature {
            $($feature,)+
        }

        impl GLFeature {
            /// Every feature, in declaration order.
            pub const ALL: &'static [GLFeature] = &[$(GLFeature::$feature,)+];

            /// The symbolic name, as used in the driver database.
            pub fn name(self) -> &'static str {
                match self {
                    $(GLFeature::$feature => $name,)+
                }
            }

            pub fn requirement(self) -> Requirement {
                match self {
                    $(GLFeature::$feature => Requirement {
                        core: $core,
                        extensions: &[$($extension),*],
                    },)+
                }
            }

            /// The entry points that must all resolve for the feature to be usable.
            pub fn entries(self) -> &'static [Entry] {
                match self {
                    $(GLFeature::$feature => &[$(Entry::$entry),*],)+
                }
            }
        }
    }
}

features! {
    Multitexture => "COIN_multitexture", Some((1, 3)), ["GL_ARB_multitexture"],
        [ActiveTexture, ClientActiveTexture, MultiTexCoord2f];
    Texture3D => "COIN_3d_textures", Some((1, 2)), ["GL_EXT_texture3D"],
        [TexImage3D, TexSubImage3D];
    TextureCompression => "COIN_texture_compression", Some((1, 3)),
        ["GL_ARB_texture_compression"], [CompressedTexImage2D, GetCompressedTexImage];
    PolygonOffset => "COIN_polygon_offset", Some((1, 1)), ["GL_EXT_polygon_offset"],
        [PolygonOffset];
    TextureObjects => "COIN_texture_objects", Some((1, 1)), ["GL_EXT_texture_object"],
        [GenTextures, BindTexture, DeleteTextures];
    VertexArrays => "COIN_vertex_arrays", Some((1, 1)), ["GL_EXT_vertex_array"],
        [VertexPointer, DrawArrays];
    MultiDrawArrays => "COIN_multidraw_vertex_arrays", Some((1, 4)),
        ["GL_EXT_multi_draw_arrays"], [MultiDrawArrays, MultiDrawElements];
    BlendEquation => "COIN_blend_equation", Some((1, 4)),
        ["GL_EXT_blend_minmax", "GL_ARB_imaging"], [BlendEquation];
    VertexBufferObject => "COIN_vertex_buffer_object", Some((1, 5)),
        ["GL_ARB_vertex_buffer_object"],
        [GenBuffers, BindBuffer, BufferData, BufferSubData, DeleteBuffers];
    FramebufferObject => "COIN_framebuffer_object", Some((3, 0)),
        ["GL_ARB_framebuffer_object", "GL_EXT_framebuffer_object"],
        [GenFramebuffers, DeleteFramebuffers, BindFramebuffer, IsFramebuffer,
         CheckFramebufferStatus, FramebufferTexture2D, FramebufferRenderbuffer, GenRenderbuffers,
         DeleteRenderbuffers, BindRenderbuffer, IsRenderbuffer, RenderbufferStorage,
         GenerateMipmap];
    OcclusionQuery => "COIN_occlusion_query", Some((1, 5)), ["GL_ARB_occlusion_query"],
        [GenQueries, DeleteQueries, BeginQuery, EndQuery, GetQueryObjectuiv];
    VertexProgram => "COIN_vertex_program", None, ["GL_ARB_vertex_program"],
        [GenPrograms, BindProgram, ProgramString, DeletePrograms, ProgramEnvParameter4fv,
         VertexAttrib4fv];
    FragmentProgram => "COIN_fragment_program", None, ["GL_ARB_fragment_program"],
        [GenPrograms, BindProgram, ProgramString, DeletePrograms, ProgramEnvParameter4fv];
    ShaderObjects => "COIN_shader_objects", Some((2, 0)), ["GL_ARB_shader_objects"],
        [CreateShader, ShaderSource, CompileShader, CreateProgram, AttachShader, LinkProgram,
         UseProgram, GetUniformLocation];
    RegisterCombiners => "COIN_register_combiners", None, ["GL_NV_register_combiners"],
        [CombinerParameteri, CombinerInput, CombinerOutput, FinalCombinerInput];
    PalettedTextures => "COIN_paletted_textures", None, ["GL_EXT_paletted_texture"],
        [ColorTable, ColorSubTable, GetColorTable];
    ColorTables => "COIN_color_tables", None, ["GL_SGI_color_table", "GL_ARB_imaging"],
        [ColorTable, GetColorTable];
    VertexArrayObject => "COIN_vertex_array_object", Some((3, 0)),
        ["GL_ARB_vertex_array_object", "GL_APPLE_vertex_array_object"],
        [GenVertexArrays, BindVertexArray, DeleteVertexArrays];
    Multisample => "COIN_multisample", Some((1, 3)), ["GL_ARB_multisample"], [SampleCoverage];
    TextureEdgeClamp => "COIN_texture_edge_clamp", Some((1, 2)),
        ["GL_EXT_texture_edge_clamp", "GL_SGIS_texture_edge_clamp"], [];
    NonPowerOfTwoTextures => "COIN_non_power_of_two_textures", Some((2, 0)),
        ["GL_ARB_texture_non_power_of_two"], [];
    AnisotropicFiltering => "COIN_anisotropic_filtering", Some((4, 6)),
        ["GL_EXT_texture_filter_anisotropic", "GL_ARB_texture_filter_anisotropic"], [];
    GenerateMipmapHint => "COIN_generate_mipmap", Some((1, 4)), ["GL_SGIS_generate_mipmap"], [];
    DepthTextures => "COIN_depth_textures", Some((1, 4)), ["GL_ARB_depth_texture"], [];
    ShadowTextures => "COIN_shadow_textures", Some((1, 4)), ["GL_ARB_shadow"], [];
    TextureEnvCombine => "COIN_texture_env_combine", Some((1, 3)),
        ["GL_ARB_texture_env_combine", "GL_EXT_texture_env_combine"], [];
}

lazy_static! {
    static ref FEATURES_BY_NAME: FnvHashMap<&'static str, GLFeature> =
        GLFeature::ALL.iter().map(|&feature| (feature.name(), feature)).collect();
}

impl GLFeature {
    /// Looks a feature up by its symbolic name.
    pub fn from_name(name: &str) -> Option<GLFeature> {
        FEATURES_BY_NAME.get(name).copied()
    }
}

impl Display for GLFeature {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str(self.name())
    }
}
