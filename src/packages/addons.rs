//! Add-on shorthand expansion.
//!
//! Vendor libraries and optional components are published as `robotpy-*`
//! packages. Users may name them by their short form (`rev`, `navx`, ...).

/// Short names that expand to `robotpy-<name>`.
pub const ADDONS: &[&str] = &[
    "ctre",
    "navx",
    "photonvision",
    "pathplannerlib",
    "rev",
    "apriltag",
    "commands2",
    "commands-v2",
    "cscore",
    "romi",
    "sim",
];

/// Returns true if `name` is an add-on shorthand.
#[must_use]
pub fn is_addon(name: &str) -> bool {
    ADDONS.contains(&name)
}

/// Expands an add-on shorthand to its package name; other names pass through.
#[must_use]
pub fn expand_addon(name: &str) -> String {
    if !is_addon(name) {
        return name.to_string();
    }
    match name {
        "commands2" => "robotpy-commands-v2".to_string(),
        other => format!("robotpy-{other}"),
    }
}

/// Expands every name in `names`.
pub fn expand_all<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|n| expand_addon(n.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_all_keeps_order() {
        let expanded = expand_all(&["rev", "numpy", "commands2"]);
        assert_eq!(expanded, vec!["robotpy-rev", "numpy", "robotpy-commands-v2"]);
    }

    #[test]
    fn test_full_names_pass_through() {
        assert!(!is_addon("robotpy-rev"));
        assert_eq!(expand_addon("robotpy-rev"), "robotpy-rev");
    }
}
