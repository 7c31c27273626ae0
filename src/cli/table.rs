//! User-defined commands.
//!
//! Every entry of the `[command]` config section becomes a subcommand that
//! runs the stored shell command line with any extra arguments appended.
//! The table is built from the project config before arguments are parsed.

use crate::cli::parser::builtin_names;
use crate::config::{ProjectConfig, sections};
use std::fmt::Write;

/// A single user-defined command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomCommand {
    /// Subcommand name.
    pub name: String,
    /// Shell command line to run.
    pub command_line: String,
}

/// The set of user-defined commands available in this project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTable {
    commands: Vec<CustomCommand>,
}

impl CommandTable {
    /// Builds the table from the `[command]` section. Entries named like a
    /// built-in command are skipped, since the built-in always wins.
    #[must_use]
    pub fn from_config(config: &ProjectConfig) -> Self {
        let Some(section) = config.section(sections::COMMAND) else {
            return Self::default();
        };

        let builtins = builtin_names();
        let commands = section
            .iter()
            .filter(|(name, _)| {
                let shadowed = builtins.iter().any(|b| b.as_str() == *name);
                if shadowed {
                    tracing::warn!(command = *name, "custom command shadows a built-in, ignoring");
                }
                !shadowed
            })
            .map(|(name, line)| CustomCommand {
                name: name.to_string(),
                command_line: line.to_string(),
            })
            .collect();
        Self { commands }
    }

    /// Looks up a command by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&CustomCommand> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Iterates over the commands.
    pub fn iter(&self) -> impl Iterator<Item = &CustomCommand> {
        self.commands.iter()
    }

    /// Returns true if there are no custom commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Help text listing the custom commands, if any.
    #[must_use]
    pub fn help_text(&self) -> Option<String> {
        if self.commands.is_empty() {
            return None;
        }
        let width = self.commands.iter().map(|c| c.name.len()).max().unwrap_or(0);
        let mut help = String::from("Project commands:\n");
        for command in &self.commands {
            let _ = writeln!(
                help,
                "  {:<width$}  {}",
                command.name, command.command_line
            );
        }
        Some(help)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_commands(entries: &[(&str, &str)]) -> ProjectConfig {
        let mut config = ProjectConfig::new();
        for (name, line) in entries {
            config.set(sections::COMMAND, name, *line);
        }
        config
    }

    #[test]
    fn test_empty_without_section() {
        let table = CommandTable::from_config(&ProjectConfig::new());
        assert!(table.is_empty());
        assert!(table.help_text().is_none());
    }

    #[test]
    fn test_lookup() {
        let table = CommandTable::from_config(&config_with_commands(&[
            ("sim", "python robot.py sim"),
            ("test", "python robot.py test"),
        ]));
        assert_eq!(
            table.lookup("sim").map(|c| c.command_line.as_str()),
            Some("python robot.py sim")
        );
        assert!(table.lookup("lint").is_none());
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn test_builtins_are_not_shadowed() {
        let table = CommandTable::from_config(&config_with_commands(&[
            ("deploy", "rm -rf /"),
            ("init", "true"),
            ("sim", "python robot.py sim"),
        ]));
        assert!(table.lookup("deploy").is_none());
        assert!(table.lookup("init").is_none());
        assert!(table.lookup("sim").is_some());
    }

    #[test]
    fn test_help_text_lists_commands() {
        let table = CommandTable::from_config(&config_with_commands(&[
            ("sim", "python robot.py sim"),
            ("coverage", "python robot.py coverage"),
        ]));
        let help = table.help_text().unwrap();
        assert!(help.starts_with("Project commands:\n"));
        assert!(help.contains("  sim       python robot.py sim\n"));
        assert!(help.contains("  coverage  python robot.py coverage\n"));
    }
}
