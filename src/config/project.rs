//! In-memory model of the project configuration.

use crate::config::ini;
use crate::error::ConfigError;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A named group of key/value entries.
///
/// Entries keep insertion order. Keys are folded to lower case on insert,
/// matching how the file format treats option names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    /// Creates an empty section.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Returns the section name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = fold_key(key);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces a value, keeping the original position on replace.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = fold_key(key);
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let key = fold_key(key);
        let index = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the section has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Ordered mapping of section name to [`Section`].
///
/// # Examples
///
/// ```
/// use robotpy_wrapper::config::ProjectConfig;
///
/// let mut config = ProjectConfig::new();
/// config.set("execution", "main", "robot.py");
/// assert_eq!(config.get("execution", "main"), Some("robot.py"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    sections: Vec<Section>,
}

impl ProjectConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    /// Parses configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error for entries outside a section, lines without a
    /// key/value separator and duplicated section headers.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        ini::parse(text)
    }

    /// Renders the configuration in file format.
    #[must_use]
    pub fn to_ini_string(&self) -> String {
        ini::render(self)
    }

    /// Returns a section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Returns a mutable section, creating it if absent.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    /// Returns true if the section exists.
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Appends a section. Used by the parser, which rejects duplicates itself.
    pub(crate) fn push_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Replaces the contents of a section, keeping its position if it exists.
    pub fn replace_section(&mut self, name: &str, entries: &Section) {
        let section = self.section_mut(name);
        section.entries.clone_from(&entries.entries);
    }

    /// Removes a whole section.
    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        let index = self.sections.iter().position(|s| s.name == name)?;
        Some(self.sections.remove(index))
    }

    /// Looks up `section.key`.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Sets `section.key`, creating the section if needed.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.section_mut(section).set(key, value);
    }

    /// Removes `section.key`, returning the old value.
    pub fn remove(&mut self, section: &str, key: &str) -> Option<String> {
        self.sections
            .iter_mut()
            .find(|s| s.name == section)
            .and_then(|s| s.remove(key))
    }

    /// Iterates over sections in order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Returns true if there are no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Serialize for ProjectConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(&section.name, section)?;
        }
        map.end()
    }
}

fn fold_key(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut config = ProjectConfig::new();
        config.set("auth", "hostname", "roborio-1234-frc.local");
        assert_eq!(config.get("auth", "hostname"), Some("roborio-1234-frc.local"));
        assert_eq!(config.get("auth", "missing"), None);
        assert_eq!(config.get("missing", "hostname"), None);
    }

    #[test]
    fn test_keys_are_case_folded() {
        let mut config = ProjectConfig::new();
        config.set("requirements", "RobotPy-CTRE", "2024.1.1");
        assert_eq!(config.get("requirements", "robotpy-ctre"), Some("2024.1.1"));
        let keys: Vec<_> = config.section("requirements").unwrap().keys().collect();
        assert_eq!(keys, vec!["robotpy-ctre"]);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut section = Section::new("requirements");
        section.set("robotpy", "1");
        section.set("pyfrc", "2");
        section.set("robotpy", "3");
        let entries: Vec<_> = section.iter().collect();
        assert_eq!(entries, vec![("robotpy", "3"), ("pyfrc", "2")]);
    }

    #[test]
    fn test_remove_keeps_empty_section() {
        let mut config = ProjectConfig::new();
        config.set("command", "lint", "ruff check .");
        assert_eq!(config.remove("command", "lint").as_deref(), Some("ruff check ."));
        assert!(config.has_section("command"));
        assert!(config.section("command").unwrap().is_empty());
        assert!(config.remove("command", "lint").is_none());
    }

    #[test]
    fn test_replace_section_copies_entries() {
        let mut config = ProjectConfig::new();
        config.set("requirements", "robotpy", "2024.3.2");
        config.set("requirements", "robotpy-rev", "2024.2.0");
        config.set("requirements.deployed", "stale", "0.1");

        let snapshot = config.section("requirements").unwrap().clone();
        config.replace_section("requirements.deployed", &snapshot);

        let deployed: Vec<_> = config.section("requirements.deployed").unwrap().iter().collect();
        assert_eq!(deployed, vec![("robotpy", "2024.3.2"), ("robotpy-rev", "2024.2.0")]);
    }

    #[test]
    fn test_json_preserves_order() {
        let mut config = ProjectConfig::new();
        config.set("requirements", "robotpy", "2024.3.2");
        config.set("execution", "main", "robot.py");
        config.set("auth", "hostname", "10.0.0.2");

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"requirements":{"robotpy":"2024.3.2"},"execution":{"main":"robot.py"},"auth":{"hostname":"10.0.0.2"}}"#
        );
    }
}
