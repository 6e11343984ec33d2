// coin-glue/src/driver_db.rs
//
//! Known driver quirks.
//!
//! Each row says that a feature, on drivers whose vendor, renderer and version strings match the
//! row's patterns, is broken, slow, fast, or disabled. A pattern is an exact string, `"*"`, or a
//! prefix ending in `*`. When several rows match, the most specific one decides.

use std::borrow::Cow;

/// What the database knows about a feature on a particular driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverStatus {
    /// The driver claims the feature but it misbehaves. Never used.
    Broken,
    /// The feature works but is slower than the fallback path.
    Slow,
    /// The feature is known to be fast.
    Fast,
    /// The feature works, but has been turned off on purpose.
    Disabled,
}

impl DriverStatus {
    /// Returns true if the status vetoes use of the feature.
    #[inline]
    pub fn vetoes(self) -> bool {
        matches!(self, DriverStatus::Broken | DriverStatus::Disabled)
    }
}

/// The strings a driver identifies itself with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverInfo<'a> {
    pub vendor: &'a str,
    pub renderer: &'a str,
    pub version: &'a str,
}

/// A single row of the driver database.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureOverride {
    /// A symbolic feature name such as `"COIN_vertex_buffer_object"`, or an extension name.
    pub feature: Cow<'static, str>,
    pub vendor: Cow<'static, str>,
    pub renderer: Cow<'static, str>,
    pub version: Cow<'static, str>,
    pub status: DriverStatus,
    pub comment: Cow<'static, str>,
}

impl FeatureOverride {
    pub fn new<F, V, R, W>(feature: F, vendor: V, renderer: R, version: W, status: DriverStatus)
                           -> FeatureOverride
                           where F: Into<Cow<'static, str>>,
                                 V: Into<Cow<'static, str>>,
                                 R: Into<Cow<'static, str>>,
                                 W: Into<Cow<'static, str>> {
        FeatureOverride {
            feature: feature.into(),
            vendor: vendor.into(),
            renderer: renderer.into(),
            version: version.into(),
            status,
            comment: Cow::Borrowed(""),
        }
    }

    pub fn with_comment<C>(mut self, comment: C) -> FeatureOverride
                           where C: Into<Cow<'static, str>> {
        self.comment = comment.into();
        self
    }

    /// Returns the row's specificity if it applies to `driver`.
    fn match_driver(&self, driver: &DriverInfo) -> Option<u32> {
        let fields = [
            (Pattern::parse(&self.vendor), driver.vendor),
            (Pattern::parse(&self.renderer), driver.renderer),
            (Pattern::parse(&self.version), driver.version),
        ];
        let mut specificity = 0;
        for (pattern, value) in fields {
            if !pattern.matches(value) {
                return None;
            }
            specificity += pattern.specificity();
        }
        Some(specificity)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Pattern<'a> {
    Any,
    Prefix(&'a str),
    Exact(&'a str),
}

impl<'a> Pattern<'a> {
    fn parse(pattern: &'a str) -> Pattern<'a> {
        if pattern == "*" {
            Pattern::Any
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            Pattern::Prefix(prefix)
        } else {
            Pattern::Exact(pattern)
        }
    }

    fn matches(self, value: &str) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Prefix(prefix) => value.starts_with(prefix),
            Pattern::Exact(exact) => value == exact,
        }
    }

    // Exact outranks any prefix; a longer prefix outranks a shorter one; any prefix outranks
    // the wildcard.
    fn specificity(self) -> u32 {
        const EXACT: u32 = 1 << 16;
        match self {
            Pattern::Any => 0,
            Pattern::Prefix(prefix) => 1 + (prefix.len() as u32).min(EXACT - 2),
            Pattern::Exact(_) => EXACT,
        }
    }
}

/// A table of driver quirks.
#[derive(Clone, Debug, Default)]
pub struct DriverDatabase {
    rows: Vec<FeatureOverride>,
}

const fn row(feature: &'static str,
             vendor: &'static str,
             renderer: &'static str,
             version: &'static str,
             status: DriverStatus,
             comment: &'static str)
             -> FeatureOverride {
    FeatureOverride {
        feature: Cow::Borrowed(feature),
        vendor: Cow::Borrowed(vendor),
        renderer: Cow::Borrowed(renderer),
        version: Cow::Borrowed(version),
        status,
        comment: Cow::Borrowed(comment),
    }
}

static BUILTIN_ROWS: [FeatureOverride; 7] = [
    row("COIN_vertex_buffer_object", "Intel*", "*", "1.4*", DriverStatus::Broken,
        "crashes when buffer objects are deleted while bound"),
    row("COIN_vertex_buffer_object", "NVIDIA Corporation", "*", "*", DriverStatus::Fast,
        ""),
    row("COIN_3d_textures", "ATI Technologies Inc.", "RAGE 128*", "*", DriverStatus::Disabled,
        "advertised but emulated in software"),
    row("COIN_paletted_textures", "*", "*", "*", DriverStatus::Slow,
        "usually expanded to RGBA by the driver"),
    row("COIN_paletted_textures", "NVIDIA Corporation", "*", "*", DriverStatus::Fast,
        ""),
    row("COIN_framebuffer_object", "Brian Paul", "Mesa X11", "1.*", DriverStatus::Broken,
        "incomplete attachments are reported complete"),
    row("GL_EXT_texture_object", "3Dlabs", "*", "*", DriverStatus::Broken,
        "texture object names leak"),
];

impl DriverDatabase {
    /// Creates a database from `rows`. Earlier rows win ties.
    pub fn new(rows: Vec<FeatureOverride>) -> DriverDatabase {
        DriverDatabase { rows }
    }

    /// A database with no rows. Nothing is ever vetoed.
    pub fn empty() -> DriverDatabase {
        DriverDatabase::default()
    }

    /// The table of known driver quirks shipped with this library.
    pub fn builtin() -> DriverDatabase {
        DriverDatabase::new(BUILTIN_ROWS.to_vec())
    }

    #[inline]
    pub fn rows(&self) -> &[FeatureOverride] {
        &self.rows
    }

    /// Returns the row that decides `feature` on `driver`, if any.
    pub fn lookup(&self, feature: &str, driver: &DriverInfo) -> Option<&FeatureOverride> {
        let mut best: Option<(u32, &FeatureOverride)> = None;
        for row in self.rows.iter().filter(|row| row.feature == feature) {
            let specificity = match row.match_driver(driver) {
                Some(specificity) => specificity,
                None => continue,
            };
            // Strictly greater, so that the first of equally specific rows is kept.
            if best.map_or(true, |(best_specificity, _)| specificity > best_specificity) {
                best = Some((specificity, row));
            }
        }
        best.map(|(_, row)| row)
    }

    pub fn status(&self, feature: &str, driver: &DriverInfo) -> Option<DriverStatus> {
        self.lookup(feature, driver).map(|row| row.status)
    }

    #[inline]
    pub fn is_broken(&self, feature: &str, driver: &DriverInfo) -> bool {
        self.status(feature, driver) == Some(DriverStatus::Broken)
    }

    #[inline]
    pub fn is_disabled(&self, feature: &str, driver: &DriverInfo) -> bool {
        self.status(feature, driver) == Some(DriverStatus::Disabled)
    }

    #[inline]
    pub fn is_slow(&self, feature: &str, driver: &DriverInfo) -> bool {
        self.status(feature, driver) == Some(DriverStatus::Slow)
    }

    #[inline]
    pub fn is_fast(&self, feature: &str, driver: &DriverInfo) -> bool {
        self.status(feature, driver) == Some(DriverStatus::Fast)
    }
}
