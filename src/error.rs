//! Error types for robotpy-wrapper operations.
//!
//! Every fatal condition in the tool is an [`Error`] value propagated up to
//! the binary entry point, which reports it and exits with status 1.
//! Non-fatal conditions never become errors; they are reported through
//! [`crate::cli::output::Reporter`] and execution continues.

use thiserror::Error;

/// Result type alias for robotpy-wrapper operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file errors.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Project layout errors.
    #[error("{0}")]
    Project(#[from] ProjectError),

    /// External process errors.
    #[error("{0}")]
    Process(#[from] ProcessError),

    /// CLI command errors.
    #[error("{0}")]
    Command(#[from] CommandError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

/// Errors raised while reading, editing or writing the project config.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An entry appeared before any `[section]` header.
    #[error("line {line}: entry outside of any section")]
    MissingSectionHeader {
        /// 1-based line number.
        line: usize,
    },

    /// A line could not be parsed.
    #[error("line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// The same section header appeared twice.
    #[error("line {line}: section '{name}' already exists")]
    DuplicateSection {
        /// Section name.
        name: String,
        /// 1-based line number of the second header.
        line: usize,
    },

    /// A `config` field is missing its `group.key` separator.
    #[error("{field} is not a valid config field")]
    InvalidField {
        /// The field as given on the command line.
        field: String,
    },

    /// The requirement sections are managed by install/remove only.
    #[error("cannot change '{group}' using `config`. Use `robotpy install` instead.")]
    ProtectedGroup {
        /// The refused group.
        group: String,
    },

    /// A `config` value or name the file format cannot hold.
    #[error("{field} cannot be stored in the config file: {reason}")]
    Unrepresentable {
        /// The field as given on the command line.
        field: String,
        /// What the file format cannot hold.
        reason: String,
    },

    /// JSON rendering failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors about the project directory itself.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// No `.robotpy` marker between the working directory and the root.
    #[error("current directory is not in a robotpy project")]
    NotInProject,

    /// The initialization target exists as something other than a directory.
    #[error("{path} already exists but is not a directory")]
    NotADirectory {
        /// The offending path.
        path: String,
    },

    /// `execution.main` is not set.
    #[error("no entry point configured. Set one with `robotpy config execution.main <file>`")]
    NoEntryPoint,
}

/// Errors from launching or running external processes.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The child process could not be started at all.
    #[error("failed to launch '{program}': {reason}")]
    Spawn {
        /// Program that was launched.
        program: String,
        /// OS error description.
        reason: String,
    },

    /// No Python interpreter could be found.
    #[error("no Python interpreter found on PATH. Use --python or ROBOTPY_PYTHON")]
    InterpreterNotFound,

    /// A step whose failure is fatal exited unsuccessfully.
    #[error("{0}")]
    Failed(String),

    /// A shell command line could not be tokenized.
    #[error("cannot parse command line: {0}")]
    InvalidCommandLine(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Unknown command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Directory creation or change error.
    #[error("failed to enter directory: {path}: {reason}")]
    DirectoryFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Directory creation error.
    #[error("failed to create directory: {path}: {reason}")]
    CreateDirFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("{0}")]
    Generic(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_error_display() {
        let err: Error = ProjectError::NotInProject.into();
        assert_eq!(
            err.to_string(),
            "current directory is not in a robotpy project"
        );

        let err = ProjectError::NotADirectory {
            path: "robot".to_string(),
        };
        assert_eq!(err.to_string(), "robot already exists but is not a directory");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidField {
            field: "hostname".to_string(),
        };
        assert_eq!(err.to_string(), "hostname is not a valid config field");

        let err = ConfigError::DuplicateSection {
            name: "auth".to_string(),
            line: 7,
        };
        assert_eq!(err.to_string(), "line 7: section 'auth' already exists");

        let err = ConfigError::Unrepresentable {
            field: "command.a:b".to_string(),
            reason: "keys cannot contain ':' or '='".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command.a:b cannot be stored in the config file: keys cannot contain ':' or '='"
        );

        let err: Error = ConfigError::MissingSectionHeader { line: 1 }.into();
        assert!(err.to_string().starts_with("configuration error:"));
    }

    #[test]
    fn test_process_error_is_transparent() {
        let err: Error = ProcessError::Failed("Downloading Python failed unexpectedly".into()).into();
        assert_eq!(err.to_string(), "Downloading Python failed unexpectedly");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(IoError::Generic(_))));
    }

    #[test]
    fn test_directory_errors_name_the_operation() {
        let err = IoError::CreateDirFailed {
            path: "robot".to_string(),
            reason: "denied".to_string(),
        };
        assert_eq!(err.to_string(), "failed to create directory: robot: denied");

        let err = IoError::DirectoryFailed {
            path: "robot".to_string(),
            reason: "denied".to_string(),
        };
        assert_eq!(err.to_string(), "failed to enter directory: robot: denied");
    }

    #[test]
    fn test_from_serde_json_error_to_config_error() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(matches!(err, ConfigError::Serialization(_)));
    }

    #[test]
    fn test_command_error_variants() {
        let err = CommandError::UnknownCommand("foo".to_string());
        assert!(err.to_string().contains("unknown command"));

        let err = CommandError::InvalidArgument("--bad".to_string());
        assert!(err.to_string().contains("invalid argument"));
    }
}
