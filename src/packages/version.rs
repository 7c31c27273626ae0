//! Ordering of package version identifiers.
//!
//! Versions follow Python packaging rules (PEP 440), parsed with
//! `pep440_rs`: `2024.10.0` is newer than `2024.9.1`, `1.0` equals `1.0.0`,
//! `1.0rc1 < 1.0 < 1.0-1` (implicit post-release) and a local build such as
//! `2.1.0+cpu` sorts after `2.1.0`.
//!
//! Text that is not a valid version sorts before every valid one and is
//! compared lexically against other invalid text.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A version identifier as reported by the package manager.
///
/// # Examples
///
/// ```
/// use robotpy_wrapper::packages::Version;
///
/// assert!(Version::parse("2024.10.0") > Version::parse("2024.9.1"));
/// assert!(Version::parse("2024.1.0rc1") < Version::parse("2024.1.0"));
/// assert!(Version::parse("2.1.0+cpu") > Version::parse("2.1.0"));
/// assert_eq!(Version::parse("1.0"), Version::parse("1.0.0"));
/// ```
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parsed: Option<pep440_rs::Version>,
}

impl Version {
    /// Parses a version string. Parsing never fails; invalid text is kept
    /// and ordered as described in the module docs.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let parsed = pep440_rs::Version::from_str(raw)
            .inspect_err(|e| tracing::debug!(version = raw, error = %e, "not a PEP 440 version"))
            .ok();
        Self {
            raw: raw.to_string(),
            parsed,
        }
    }

    /// Returns the original text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if the text is a valid version.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.parsed, &other.parsed) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.raw.cmp(&other.raw),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s)
    }

    #[test]
    fn test_numeric_not_lexical() {
        assert!(v("2024.10.0") > v("2024.9.1"));
        assert!(v("10.0") > v("9.9.9"));
        assert!(v("2024.3.2.1") > v("2024.3.2"));
    }

    #[test]
    fn test_padding() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("2024"), v("2024.0.0.0"));
    }

    #[test]
    fn test_pre_and_post_releases() {
        assert!(v("2024.1.0.dev1") < v("2024.1.0a1"));
        assert!(v("2024.1.0a1") < v("2024.1.0b1"));
        assert!(v("2024.1.0b2") < v("2024.1.0rc1"));
        assert!(v("2024.1.0rc1") < v("2024.1.0rc10"));
        assert!(v("2024.1.0rc10") < v("2024.1.0"));
        assert!(v("2024.1.0") < v("2024.1.0.post1"));
        assert!(v("2024.1.0post1") > v("2024.1.0"));
    }

    #[test]
    fn test_implicit_post_release() {
        assert!(v("1.0-1") > v("1.0"));
        assert_eq!(v("1.0-1"), v("1.0.post1"));
    }

    #[test]
    fn test_local_version_sorts_after_public() {
        assert!(v("2.1.0+cpu") > v("2.1.0"));
        assert!(v("2.1.0+cpu") < v("2.1.1"));
    }

    #[test]
    fn test_invalid_sorts_first() {
        assert!(!v("not-a-version").is_valid());
        assert!(v("not-a-version") < v("0.0.1"));
        assert!(v("abc") < v("abd"));
    }

    #[test]
    fn test_leading_v_and_display() {
        assert_eq!(v("v1.2.3"), v("1.2.3"));
        assert_eq!(v(" 1.2.3 ").to_string(), "1.2.3");
        assert_eq!(v("v1.2").as_str(), "v1.2");
    }
}
