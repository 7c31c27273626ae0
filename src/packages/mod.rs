//! Package naming, listing and version ordering.
//!
//! Nothing here resolves packages; that is the package manager's job. This
//! module only interprets the names and versions it reports.

pub mod addons;
pub mod installed;
pub mod version;

pub use addons::{expand_addon, expand_all, is_addon};
pub use installed::{InstalledPackages, normalize_name, requirement_name};
pub use version::Version;

/// Name of the base package every project requires.
pub const BASE_PACKAGE: &str = "robotpy";

/// Returns true if `candidate` is newer than `recorded`, or nothing is recorded.
#[must_use]
pub fn is_newer(candidate: &str, recorded: Option<&str>) -> bool {
    recorded.is_none_or(|old| Version::parse(candidate) > Version::parse(old))
}
