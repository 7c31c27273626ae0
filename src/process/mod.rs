//! External process adapter.
//!
//! All external work (package manager, remote installer, git, user scripts)
//! goes through the [`ProcessRunner`] trait so command handlers never touch
//! `std::process` directly.

pub mod toolchain;

pub use toolchain::{INSTALLER_MODULE, Toolchain, resolve_python};

use crate::error::{ProcessError, Result};
use std::fmt;
use std::process::Command;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to launch (name on `PATH` or a path).
    pub program: String,
    /// Arguments, not including the program.
    pub args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(words.clone()) {
            Ok(joined) => f.write_str(&joined),
            Err(_) => f.write_str(&words.collect::<Vec<_>>().join(" ")),
        }
    }
}

/// Result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output (empty when streamed).
    pub stdout: String,
    /// Captured standard error (empty when streamed).
    pub stderr: String,
}

impl ProcessOutput {
    /// Returns true if the process exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Launches external processes.
pub trait ProcessRunner {
    /// Runs `invocation` to completion.
    ///
    /// With `capture`, standard output and error are collected into the
    /// returned [`ProcessOutput`]; otherwise they go straight to the console.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Spawn`] if the process cannot be started. A
    /// non-zero exit is not an error at this level.
    fn run(&self, invocation: &Invocation, capture: bool) -> Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, capture: bool) -> Result<ProcessOutput> {
        tracing::debug!(command = %invocation, capture, "running process");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);

        let spawn_error = |e: std::io::Error| ProcessError::Spawn {
            program: invocation.program.clone(),
            reason: e.to_string(),
        };

        let output = if capture {
            let output = command.output().map_err(spawn_error)?;
            ProcessOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
        } else {
            let status = command.status().map_err(spawn_error)?;
            ProcessOutput {
                code: status.code(),
                ..ProcessOutput::default()
            }
        };

        tracing::debug!(command = %invocation, code = ?output.code, "process finished");
        Ok(output)
    }
}

/// Runs a user-defined shell command line with `rest` appended. Output
/// always goes to the console.
///
/// # Errors
///
/// Returns an error if the line cannot be tokenized or the program cannot
/// be launched.
pub fn run_shell(
    runner: &dyn ProcessRunner,
    command_line: &str,
    rest: &[String],
) -> Result<ProcessOutput> {
    let words = shlex::split(command_line)
        .ok_or_else(|| ProcessError::InvalidCommandLine(command_line.to_string()))?;
    let Some((program, args)) = words.split_first() else {
        return Err(ProcessError::InvalidCommandLine(command_line.to_string()).into());
    };
    let invocation = Invocation::new(program)
        .args(args.iter().cloned())
        .args(rest.iter().cloned());
    runner.run(&invocation, false)
}
