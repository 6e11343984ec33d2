// coin-glue/src/info.rs
//
//! OpenGL information.

use std::fmt::{self, Display, Formatter};

/// The API (OpenGL or OpenGL ES).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GLApi {
    /// OpenGL (full or desktop OpenGL).
    GL,
    /// OpenGL ES (embedded OpenGL).
    GLES,
}

/// The version triple reported by `glGetString(GL_VERSION)` or `gluGetString(GLU_VERSION)`.
///
/// Ordering is lexicographic on `(major, minor, release)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GLVersion {
    /// The major version (e.g. 4 in 4.6.0).
    pub major: u8,
    /// The minor version (e.g. 6 in 4.6.0).
    pub minor: u8,
    /// The release number (e.g. 0 in 4.6.0). Zero when the driver omits it.
    pub release: u8,
}

impl GLVersion {
    /// Creates a version with the given numbers.
    #[inline]
    pub fn new(major: u8, minor: u8, release: u8) -> GLVersion {
        GLVersion { major, minor, release }
    }

    /// Parses a driver version string.
    ///
    /// The parser is permissive: an `"OpenGL ES"` prefix (optionally followed by a profile
    /// tag such as `"-CM"`) is skipped, the release number is optional, and anything after the
    /// numeric triple (`"4.6.0 NVIDIA 535.54"`, `"3.1 Mesa 23.0.4"`, `"2.1.2-build"`) is
    /// ignored. Returns `None` unless at least `major.minor` is present.
    pub fn parse(version_string: &str) -> Option<(GLApi, GLVersion)> {
        let mut string = version_string.trim_start();
        let mut api = GLApi::GL;
        if let Some(rest) = string.strip_prefix("OpenGL ES") {
            api = GLApi::GLES;
            string = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '-');
            string = string.trim_start();
        }

        // Only the leading run of digits and dots is the version proper.
        let numeric_len = string.find(|c: char| !c.is_ascii_digit() && c != '.')
                                .unwrap_or(string.len());
        let mut numbers = string[..numeric_len].split('.');

        let major = parse_component(numbers.next())?;
        let minor = parse_component(numbers.next())?;
        let release = parse_component(numbers.next()).unwrap_or(0);
        Some((api, GLVersion { major, minor, release }))
    }

    /// Returns true if this version is at least `major.minor.release`.
    #[inline]
    pub fn matches_at_least(&self, major: u8, minor: u8, release: u8) -> bool {
        *self >= GLVersion::new(major, minor, release)
    }
}

fn parse_component(component: Option<&str>) -> Option<u8> {
    match component {
        Some(component) if !component.is_empty() => component.parse().ok(),
        _ => None,
    }
}

impl Display for GLVersion {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}.{}.{}", self.major, self.minor, self.release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vendor_suffixes() {
        let cases = [
            ("4.6.0 NVIDIA 535.54.03", GLVersion::new(4, 6, 0)),
            ("3.1 Mesa 23.0.4", GLVersion::new(3, 1, 0)),
            ("2.1.2", GLVersion::new(2, 1, 2)),
            // A release number that doesn't fit in a byte is dropped, not fatal.
            ("1.5.8870 WinXP Release", GLVersion::new(1, 5, 0)),
            ("4.5 (Core Profile) Mesa 22.3.6", GLVersion::new(4, 5, 0)),
            ("1.2-build", GLVersion::new(1, 2, 0)),
        ];
        for &(string, expected) in &cases[..] {
            let parsed = GLVersion::parse(string).map(|(_, version)| version);
            assert_eq!(parsed, Some(expected), "{}", string);
        }
    }

    #[test]
    fn test_parse_gles() {
        assert_eq!(GLVersion::parse("OpenGL ES 3.2 Mesa 23.0"),
                   Some((GLApi::GLES, GLVersion::new(3, 2, 0))));
        assert_eq!(GLVersion::parse("OpenGL ES-CM 1.1"),
                   Some((GLApi::GLES, GLVersion::new(1, 1, 0))));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(GLVersion::parse(""), None);
        assert_eq!(GLVersion::parse("NVIDIA"), None);
        assert_eq!(GLVersion::parse("4"), None);
        assert_eq!(GLVersion::parse("4."), None);
    }

    #[test]
    fn test_matches_at_least() {
        let version = GLVersion::new(2, 1, 0);
        assert!(version.matches_at_least(1, 5, 0));
        assert!(version.matches_at_least(2, 1, 0));
        assert!(!version.matches_at_least(2, 1, 1));
        assert!(!version.matches_at_least(3, 0, 0));
    }
}
