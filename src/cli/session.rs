//! Per-invocation state shared by the command handlers.

use crate::cli::output::Reporter;
use crate::error::Result;
use crate::process::Toolchain;
use std::cell::OnceCell;

type ToolchainFactory<'a> = Box<dyn Fn() -> Result<Toolchain> + 'a>;

/// What a command handler gets besides the workspace: the message reporter
/// and the external toolchain.
///
/// The toolchain is built on first use, so commands that never run Python
/// (`config`, `remove`) work without an interpreter on `PATH`.
pub struct Session<'a> {
    reporter: &'a Reporter,
    tools: OnceCell<Toolchain>,
    make_tools: ToolchainFactory<'a>,
}

impl<'a> Session<'a> {
    /// Creates a session whose toolchain is built by `make_tools` when first
    /// needed.
    pub fn new<F>(reporter: &'a Reporter, make_tools: F) -> Self
    where
        F: Fn() -> Result<Toolchain> + 'a,
    {
        Self {
            reporter,
            tools: OnceCell::new(),
            make_tools: Box::new(make_tools),
        }
    }

    /// Creates a session with a ready toolchain.
    pub fn with_toolchain(reporter: &'a Reporter, tools: Toolchain) -> Self {
        Self {
            reporter,
            tools: OnceCell::from(tools),
            make_tools: Box::new(|| {
                Err(crate::error::ProcessError::InterpreterNotFound.into())
            }),
        }
    }

    /// Returns the reporter.
    #[must_use]
    pub const fn reporter(&self) -> &Reporter {
        self.reporter
    }

    /// Returns the toolchain, building it on first call.
    ///
    /// # Errors
    ///
    /// Returns an error if the toolchain cannot be built (no interpreter).
    pub fn tools(&self) -> Result<&Toolchain> {
        if let Some(tools) = self.tools.get() {
            return Ok(tools);
        }
        let tools = (self.make_tools)()?;
        tracing::debug!(python = tools.python_path(), "toolchain ready");
        Ok(self.tools.get_or_init(|| tools))
    }
}
