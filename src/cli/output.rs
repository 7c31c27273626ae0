//! User-facing messages and output formatting.
//!
//! Messages are prefixed with the program name (`robotpy: warning: ...`)
//! and filtered by [`Verbosity`]. Diagnostic logging is separate and goes
//! through `tracing`.

use crate::config::ProjectConfig;
use crate::error::{CommandError, ConfigError, Error, Result};
use serde::Serialize;
use std::io::{self, Write};

/// How much the tool prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Nothing at all, not even fatal errors.
    Silent,
    /// Errors only.
    Quiet,
    /// Progress messages, warnings and errors; child output hidden.
    #[default]
    Normal,
    /// Everything, including child process output.
    Verbose,
}

impl Verbosity {
    /// Builds the level from the global flags. At most one is set.
    #[must_use]
    pub const fn from_flags(verbose: bool, quiet: bool, silent: bool) -> Self {
        if silent {
            Self::Silent
        } else if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Child process output is captured unless running verbose.
    #[must_use]
    pub fn captures_output(self) -> bool {
        self < Self::Verbose
    }
}

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Progress message.
    Info,
    /// Something odd, execution continues.
    Warning,
    /// Non-fatal failure, execution continues.
    Error,
    /// Fatal failure, the process is about to exit.
    Fatal,
}

/// Destination stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// Prints prefixed, filtered messages.
#[derive(Debug, Clone)]
pub struct Reporter {
    program: String,
    verbosity: Verbosity,
}

impl Reporter {
    /// Creates a reporter for `program` (shown as the message prefix).
    #[must_use]
    pub fn new(program: impl Into<String>, verbosity: Verbosity) -> Self {
        Self {
            program: program.into(),
            verbosity,
        }
    }

    /// Returns the verbosity.
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Decides whether and where a message is printed, and how it reads.
    #[must_use]
    pub fn render(&self, level: Level, message: &str) -> Option<(Stream, String)> {
        let (stream, label, minimum) = match level {
            Level::Info => (Stream::Stdout, "", Verbosity::Normal),
            Level::Warning => (Stream::Stdout, "warning: ", Verbosity::Normal),
            Level::Error => (Stream::Stderr, "error: ", Verbosity::Quiet),
            Level::Fatal => (Stream::Stderr, "fatal: ", Verbosity::Quiet),
        };
        (self.verbosity >= minimum).then(|| (stream, format!("{}: {label}{message}", self.program)))
    }

    fn emit(&self, level: Level, message: &str) {
        let Some((stream, line)) = self.render(level, message) else {
            return;
        };
        // Write failures (closed pipe) are ignored.
        let _ = match stream {
            Stream::Stdout => writeln!(io::stdout(), "{line}"),
            Stream::Stderr => writeln!(io::stderr(), "{line}"),
        };
    }

    /// Prints a progress message.
    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(Level::Info, message.as_ref());
    }

    /// Prints a warning.
    pub fn warn(&self, message: impl AsRef<str>) {
        self.emit(Level::Warning, message.as_ref());
    }

    /// Prints a non-fatal error.
    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(Level::Error, message.as_ref());
    }

    /// Prints a fatal error. Exiting is up to the caller.
    pub fn fatal(&self, message: impl AsRef<str>) {
        self.emit(Level::Fatal, message.as_ref());
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats a single config value lookup. Unset values print nothing in
/// text mode and `null` in JSON mode.
pub fn format_value(value: Option<&str>, format: OutputFormat) -> Result<String> {
    match (format, value) {
        (OutputFormat::Text, Some(v)) => Ok(format!("{v}\n")),
        (OutputFormat::Text, None) => Ok(String::new()),
        (OutputFormat::Json, v) => format_json(&v),
    }
}

/// Formats the whole configuration.
pub fn format_config(config: &ProjectConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(config.to_ini_string()),
        OutputFormat::Json => format_json(config),
    }
}

fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).map_err(ConfigError::from)?;
    json.push('\n');
    Ok(json)
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }
            serde_json::to_string(&ErrorOutput {
                error: error.to_string(),
            })
            .unwrap_or_else(|_| error.to_string())
        }
    }
}

/// Rejects an unknown `--format` value.
pub fn validate_format(s: &str) -> Result<OutputFormat> {
    match s.to_lowercase().as_str() {
        "text" | "json" => Ok(OutputFormat::parse(s)),
        other => Err(CommandError::OutputFormat(format!("unknown format '{other}'")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectError;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(false, false, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(true, false, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, true, false), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, false, true), Verbosity::Silent);
    }

    #[test]
    fn test_capture_unless_verbose() {
        assert!(Verbosity::Silent.captures_output());
        assert!(Verbosity::Normal.captures_output());
        assert!(!Verbosity::Verbose.captures_output());
    }

    #[test]
    fn test_render_normal() {
        let reporter = Reporter::new("robotpy", Verbosity::Normal);
        assert_eq!(
            reporter.render(Level::Info, "Installing package 'numpy'"),
            Some((Stream::Stdout, "robotpy: Installing package 'numpy'".to_string()))
        );
        assert_eq!(
            reporter.render(Level::Warning, "odd"),
            Some((Stream::Stdout, "robotpy: warning: odd".to_string()))
        );
        assert_eq!(
            reporter.render(Level::Error, "bad"),
            Some((Stream::Stderr, "robotpy: error: bad".to_string()))
        );
    }

    #[test]
    fn test_render_quiet_keeps_errors() {
        let reporter = Reporter::new("robotpy", Verbosity::Quiet);
        assert!(reporter.render(Level::Info, "x").is_none());
        assert!(reporter.render(Level::Warning, "x").is_none());
        assert!(reporter.render(Level::Error, "x").is_some());
        assert!(reporter.render(Level::Fatal, "x").is_some());
    }

    #[test]
    fn test_render_silent_drops_everything() {
        let reporter = Reporter::new("robotpy", Verbosity::Silent);
        assert!(reporter.render(Level::Fatal, "x").is_none());
        assert!(reporter.render(Level::Error, "x").is_none());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some("robot.py"), OutputFormat::Text).unwrap(), "robot.py\n");
        assert_eq!(format_value(None, OutputFormat::Text).unwrap(), "");
        assert_eq!(format_value(None, OutputFormat::Json).unwrap(), "null\n");
        assert_eq!(
            format_value(Some("robot.py"), OutputFormat::Json).unwrap(),
            "\"robot.py\"\n"
        );
    }

    #[test]
    fn test_format_config_json() {
        let mut config = ProjectConfig::new();
        config.set("execution", "main", "robot.py");
        let json = format_config(&config, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["execution"]["main"], "robot.py");
    }

    #[test]
    fn test_format_error() {
        let err: Error = ProjectError::NotInProject.into();
        assert_eq!(
            format_error(&err, OutputFormat::Text),
            "current directory is not in a robotpy project"
        );
        assert!(format_error(&err, OutputFormat::Json).starts_with("{\"error\":"));
    }

    #[test]
    fn test_validate_format() {
        assert_eq!(validate_format("JSON").unwrap(), OutputFormat::Json);
        assert!(validate_format("yaml").is_err());
    }
}
