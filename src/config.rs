// coin-glue/src/config.rs
//
//! Runtime configuration, read from `COIN_*` environment variables.

use std::env;
use std::time::Duration;

/// Settings consumed by `Runtime::init()`.
///
/// Every field defaults to the quiet, production behavior. `from_env()` layers the environment
/// on top of the defaults; fields can be overridden afterwards in code.
#[derive(Clone, Debug, PartialEq)]
pub struct GlueConfig {
    /// `COIN_DEBUG_GLU_INFO`: report the loaded GLU library and version.
    pub debug_glu_info: bool,
    /// `COIN_DEBUG_GLU_VERSION`: pretend GLU reported this version string.
    pub glu_version_override: Option<String>,
    /// `COIN_GLU_LIBNAME`: try this library name before the platform defaults.
    pub glu_libname: Option<String>,
    /// `COIN_DEBUG_FBO`: trace framebuffer-object offscreen contexts.
    pub debug_fbo: bool,
    /// `COIN_DEBUG_OSMESA`: trace OSMesa offscreen contexts.
    pub debug_osmesa: bool,
    /// `COIN_DEBUG_CLEANUP`: trace each teardown callback.
    pub debug_cleanup: bool,
    /// `COIN_DEBUG_MUTEX_COUNT`: report the number of live library locks at teardown.
    pub debug_mutex_count: bool,
    /// `COIN_DEBUG_MUTEXLOCK_MAXTIME`: hold-time threshold in seconds for the lock diagnostic.
    pub mutex_lock_max_time: Duration,
    /// `COIN_DEBUG_MUTEXLOCK_TIMING`: enable the lock hold-time diagnostic.
    pub mutex_lock_timing: bool,
    /// `COIN_DEBUG_CACHING`: trace capability-record builds and cache hits.
    pub debug_caching: bool,
    /// Try `OSMesaGetProcAddress` after the other symbol sources. Turned off by
    /// `COIN_DISABLE_OSMESA_FALLBACK`.
    pub osmesa_fallback: bool,
}

const DEFAULT_MUTEX_LOCK_MAX_TIME: Duration = Duration::from_millis(100);

impl Default for GlueConfig {
    fn default() -> GlueConfig {
        GlueConfig {
            debug_glu_info: false,
            glu_version_override: None,
            glu_libname: None,
            debug_fbo: false,
            debug_osmesa: false,
            debug_cleanup: false,
            debug_mutex_count: false,
            mutex_lock_max_time: DEFAULT_MUTEX_LOCK_MAX_TIME,
            mutex_lock_timing: false,
            debug_caching: false,
            osmesa_fallback: true,
        }
    }
}

impl GlueConfig {
    /// Reads the process environment.
    pub fn from_env() -> GlueConfig {
        GlueConfig::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> GlueConfig where F: Fn(&str) -> Option<String> {
        let flag = |name: &str| lookup(name).map_or(false, |value| parse_flag(&value));
        let string = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let mut config = GlueConfig::default();
        config.debug_glu_info = flag("COIN_DEBUG_GLU_INFO");
        config.glu_version_override = string("COIN_DEBUG_GLU_VERSION");
        config.glu_libname = string("COIN_GLU_LIBNAME");
        config.debug_fbo = flag("COIN_DEBUG_FBO");
        config.debug_osmesa = flag("COIN_DEBUG_OSMESA");
        config.debug_cleanup = flag("COIN_DEBUG_CLEANUP");
        config.debug_mutex_count = flag("COIN_DEBUG_MUTEX_COUNT");
        config.mutex_lock_timing = flag("COIN_DEBUG_MUTEXLOCK_TIMING");
        config.debug_caching = flag("COIN_DEBUG_CACHING");
        config.osmesa_fallback = !flag("COIN_DISABLE_OSMESA_FALLBACK");

        if let Some(value) = string("COIN_DEBUG_MUTEXLOCK_MAXTIME") {
            match value.trim().parse::<f64>() {
                Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => {
                    config.mutex_lock_max_time = Duration::from_secs_f64(seconds);
                }
                _ => {
                    crate::debug::post_warning("GlueConfig::from_env",
                                               format!("ignoring COIN_DEBUG_MUTEXLOCK_MAXTIME \
                                                        value '{}'",
                                                       value));
                }
            }
        }

        config
    }
}

// Matches the usual convention for these variables: any non-zero integer enables the flag.
fn parse_flag(value: &str) -> bool {
    match value.trim().parse::<i64>() {
        Ok(number) => number != 0,
        Err(_) => false,
    }
}
