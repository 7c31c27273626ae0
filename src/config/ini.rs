//! Reader and writer for the section/key/value file format.
//!
//! Accepted syntax:
//!
//! ```text
//! # comment
//! ; comment
//! [section]
//! key = value
//! other: value
//!     continued on the next line
//! ```

use crate::config::project::{ProjectConfig, Section};
use crate::error::ConfigError;
use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"^\[(?P<name>.*)\]\s*$").expect("valid regex"))
}

#[allow(clippy::expect_used)]
fn entry_regex() -> &'static Regex {
    static ENTRY: OnceLock<Regex> = OnceLock::new();
    ENTRY.get_or_init(|| {
        Regex::new(r"^(?P<key>[^=:]*?)\s*[=:]\s*(?P<value>.*?)\s*$").expect("valid regex")
    })
}

/// Parses configuration text into a [`ProjectConfig`].
///
/// # Errors
///
/// See [`ProjectConfig::parse`].
pub fn parse(text: &str) -> Result<ProjectConfig, ConfigError> {
    let mut config = ProjectConfig::new();
    let mut current: Option<Section> = None;
    let mut last_key: Option<String> = None;
    let mut blank_run = 0usize;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            if last_key.is_some() {
                blank_run += 1;
            }
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = raw.starts_with(char::is_whitespace);
        if indented
            && let (Some(section), Some(key)) = (current.as_mut(), last_key.as_deref())
        {
            let blanks = "\n".repeat(blank_run);
            let joined = format!("{}\n{blanks}{trimmed}", section.get(key).unwrap_or_default());
            section.set(key, joined);
            blank_run = 0;
            continue;
        }
        blank_run = 0;

        if let Some(caps) = header_regex().captures(trimmed) {
            let name = caps["name"].trim();
            if name.is_empty() {
                return Err(ConfigError::Parse {
                    line: line_no,
                    reason: "empty section name".to_string(),
                });
            }
            let duplicate = config.has_section(name)
                || current.as_ref().is_some_and(|s| s.name() == name);
            if duplicate {
                return Err(ConfigError::DuplicateSection {
                    name: name.to_string(),
                    line: line_no,
                });
            }
            if let Some(done) = current.replace(Section::new(name)) {
                config.push_section(done);
            }
            last_key = None;
            continue;
        }

        let Some(caps) = entry_regex().captures(trimmed) else {
            return Err(ConfigError::Parse {
                line: line_no,
                reason: format!("expected 'key = value', found '{trimmed}'"),
            });
        };
        let key = &caps["key"];
        if key.is_empty() {
            return Err(ConfigError::Parse {
                line: line_no,
                reason: "missing key".to_string(),
            });
        }
        let Some(section) = current.as_mut() else {
            return Err(ConfigError::MissingSectionHeader { line: line_no });
        };
        section.set(key, &caps["value"]);
        last_key = Some(key.to_lowercase());
    }

    if let Some(done) = current {
        config.push_section(done);
    }
    Ok(config)
}

/// Checks that `section.key = value` reads back unchanged after [`render`].
///
/// # Errors
///
/// Returns [`ConfigError::Unrepresentable`] naming the first problem.
pub fn check_entry(section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
    let reject = |reason: &str| {
        Err(ConfigError::Unrepresentable {
            field: format!("{section}.{key}"),
            reason: reason.to_string(),
        })
    };

    if section.is_empty() || key.is_empty() {
        return reject("group and key cannot be empty");
    }
    if section.contains(['\n', '\r']) || key.contains(['\n', '\r']) {
        return reject("group and key must fit on one line");
    }
    if section.trim() != section || key.trim() != key {
        return reject("group and key cannot start or end with whitespace");
    }
    if key.contains(['=', ':']) {
        return reject("keys cannot contain ':' or '='");
    }
    if key.starts_with(['#', ';', '[']) {
        return reject("keys cannot start with '#', ';' or '['");
    }
    if value.trim() != value {
        return reject("values cannot start or end with whitespace or blank lines");
    }
    for line in value.split('\n') {
        if line.trim() != line {
            return reject("value lines cannot start or end with whitespace");
        }
    }
    if value.split('\n').skip(1).any(|line| line.starts_with(['#', ';'])) {
        return reject("continuation lines cannot start with '#' or ';'");
    }
    Ok(())
}

/// Renders a [`ProjectConfig`] in file format.
///
/// Every section is followed by a blank line. Multi-line values are written
/// with tab-indented continuation lines; blank lines inside a value are
/// kept as long as an indented line follows them.
pub fn render(config: &ProjectConfig) -> String {
    let mut output = String::new();
    for section in config.sections() {
        let _ = writeln!(output, "[{}]", section.name());
        for (key, value) in section.iter() {
            let value = value.replace('\n', "\n\t");
            if value.is_empty() {
                let _ = writeln!(output, "{key} =");
            } else {
                let _ = writeln!(output, "{key} = {value}");
            }
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[requirements]
robotpy = 2024.3.2.1
robotpy-rev = 2024.2.3

[requirements.deployed]
robotpy = 2024.1.1.0

[execution]
main = robot.py

";

    #[test]
    fn test_parse_sample() {
        let config = parse(SAMPLE).unwrap();
        assert_eq!(config.get("requirements", "robotpy"), Some("2024.3.2.1"));
        assert_eq!(config.get("requirements.deployed", "robotpy"), Some("2024.1.1.0"));
        assert_eq!(config.get("execution", "main"), Some("robot.py"));
        let names: Vec<_> = config.sections().map(Section::name).collect();
        assert_eq!(names, vec!["requirements", "requirements.deployed", "execution"]);
    }

    #[test]
    fn test_render_matches_sample() {
        let config = parse(SAMPLE).unwrap();
        assert_eq!(render(&config), SAMPLE);
    }

    #[test]
    fn test_comments_and_colon_separator() {
        let text = "# header comment\n[auth]\n; inline\nhostname: 10.0.0.2\n";
        let config = parse(text).unwrap();
        assert_eq!(config.get("auth", "hostname"), Some("10.0.0.2"));
    }

    #[test]
    fn test_value_may_contain_separators() {
        let config = parse("[command]\nsim = python robot.py sim --ws-server=8080\n").unwrap();
        assert_eq!(
            config.get("command", "sim"),
            Some("python robot.py sim --ws-server=8080")
        );
    }

    #[test]
    fn test_continuation_lines() {
        let text = "[command]\nlong = first\n    second\n";
        let config = parse(text).unwrap();
        assert_eq!(config.get("command", "long"), Some("first\nsecond"));
        assert_eq!(render(&config), "[command]\nlong = first\n\tsecond\n\n");
    }

    #[test]
    fn test_blank_line_inside_value() {
        let mut config = ProjectConfig::new();
        config.set("command", "multi", "echo a\n\necho b");
        let text = render(&config);
        assert_eq!(text, "[command]\nmulti = echo a\n\t\n\techo b\n\n");
        assert_eq!(parse(&text).unwrap(), config);
    }

    #[test]
    fn test_blank_line_ends_value_before_key() {
        let config = parse("[command]\na = 1\n\nb = 2\n").unwrap();
        assert_eq!(config.get("command", "a"), Some("1"));
        assert_eq!(config.get("command", "b"), Some("2"));
    }

    #[test]
    fn test_bracket_in_section_name() {
        let mut config = ProjectConfig::new();
        config.set("tool]x", "key", "v");
        let text = render(&config);
        assert_eq!(text, "[tool]x]\nkey = v\n\n");
        assert_eq!(parse(&text).unwrap(), config);
    }

    #[test]
    fn test_check_entry_accepts() {
        assert!(check_entry("command", "sim", "python robot.py sim --ws-server=8080").is_ok());
        assert!(check_entry("tool]x", "key", "").is_ok());
        assert!(check_entry("command", "multi", "echo a\n\necho b").is_ok());
    }

    #[test]
    fn test_check_entry_rejects() {
        for (section, key, value) in [
            ("command", "a:b", "x"),
            ("command", "a=b", "x"),
            ("command", "#a", "x"),
            ("command", ";a", "x"),
            ("command", "[a", "x]"),
            ("command", " a", "x"),
            ("a\nb", "k", "x"),
            ("command", "k", " x"),
            ("command", "k", "x\n"),
            ("command", "k", "a\n  b"),
            ("command", "k", "a\n# b"),
        ] {
            let result = check_entry(section, key, value);
            assert!(
                matches!(result, Err(ConfigError::Unrepresentable { .. })),
                "{section:?}.{key:?} = {value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_value() {
        let config = parse("[auth]\nhostname =\n").unwrap();
        assert_eq!(config.get("auth", "hostname"), Some(""));
        assert_eq!(render(&config), "[auth]\nhostname =\n\n");
    }

    #[test]
    fn test_empty_section_round_trips() {
        let config = parse("[command]\n\n").unwrap();
        assert!(config.has_section("command"));
        assert_eq!(render(&config), "[command]\n\n");
    }

    #[test]
    fn test_entry_before_header() {
        let err = parse("robotpy = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSectionHeader { line: 1 }));
    }

    #[test]
    fn test_line_without_separator() {
        let err = parse("[requirements]\nrobotpy\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_section() {
        let err = parse("[auth]\na = 1\n[auth]\nb = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSection { line: 3, .. }));
    }

    #[test]
    fn test_crlf_input() {
        let config = parse("[execution]\r\nmain = robot.py\r\n").unwrap();
        assert_eq!(config.get("execution", "main"), Some("robot.py"));
    }
}
