//! Locally installed packages as reported by the package manager.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn pinned_regex() -> &'static Regex {
    static PINNED: OnceLock<Regex> = OnceLock::new();
    PINNED.get_or_init(|| {
        Regex::new(r"^(?P<name>[A-Za-z0-9][A-Za-z0-9._-]*)(?:\[[^\]]*\])?==(?P<version>\S+)$")
            .expect("valid regex")
    })
}

#[allow(clippy::expect_used)]
fn name_regex() -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(r"^\s*(?P<name>[A-Za-z0-9][A-Za-z0-9._-]*)").expect("valid regex"))
}

#[allow(clippy::expect_used)]
fn separator_regex() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[-_.]+").expect("valid regex"))
}

/// Normalizes a distribution name: lower case, with every run of `-`, `_`
/// and `.` replaced by a single `-`.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    separator_regex()
        .replace_all(&name.trim().to_lowercase(), "-")
        .into_owned()
}

/// Extracts the bare package name from a requirement specifier
/// (`robotpy-rev>=2024.0` becomes `robotpy-rev`).
///
/// Returns `None` for specifiers that do not start with a name, such as
/// paths and URLs.
#[must_use]
pub fn requirement_name(spec: &str) -> Option<&str> {
    let caps = name_regex().captures(spec)?;
    let name = caps.name("name")?.as_str();
    let rest = &spec.trim_start()[name.len()..];
    if rest.starts_with(['/', '\\', ':']) {
        return None;
    }
    Some(name)
}

/// Mapping of installed package name to version.
///
/// Built from the package manager's freeze listing. Only `name==version`
/// lines are kept; editable installs and direct references are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledPackages {
    by_name: BTreeMap<String, String>,
}

impl InstalledPackages {
    /// Parses freeze output.
    #[must_use]
    pub fn parse_freeze(output: &str) -> Self {
        let by_name = output
            .lines()
            .filter_map(|line| pinned_regex().captures(line.trim()))
            .map(|caps| (normalize_name(&caps["name"]), caps["version"].to_string()))
            .collect();
        Self { by_name }
    }

    /// Returns the installed version of a package, matching on the
    /// normalized name.
    #[must_use]
    pub fn version(&self, name: &str) -> Option<&str> {
        self.by_name.get(&normalize_name(name)).map(String::as_str)
    }

    /// Returns true if the package is installed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.version(name).is_some()
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if nothing is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
