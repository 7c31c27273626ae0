//! CLI layer for robotpy-wrapper.
//!
//! Provides the command-line interface using clap: the built-in project
//! commands, user-defined commands from the project config and the
//! message reporter shared by all handlers.

pub mod commands;
pub mod output;
pub mod parser;
pub mod session;
pub mod table;

pub use commands::execute;
pub use output::{OutputFormat, Reporter, Verbosity};
pub use parser::{Cli, Commands};
pub use session::Session;
pub use table::{CommandTable, CustomCommand};
