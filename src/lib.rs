//! # robotpy-wrapper
//!
//! Project workspace manager for RobotPy.
//!
//! A project is a directory holding a `.robotpy` config file. The tool
//! records the packages the robot program depends on, installs them
//! locally through pip, downloads them for the robot and pushes only what
//! changed since the last deploy.
//!
//! ## Features
//!
//! - **Requirements tracking**: installed versions recorded per project
//! - **Incremental deploys**: only packages newer than the deployed snapshot
//! - **Add-on shorthand**: `rev`, `navx`, `ctre` and friends
//! - **Project commands**: user-defined subcommands from `[command]`

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod packages;
pub mod process;
pub mod project;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export config types
pub use config::{CONFIG_FILE, ProjectConfig, Section};

// Re-export project types
pub use project::{Workspace, find_root};

// Re-export process types
pub use process::{Invocation, ProcessOutput, ProcessRunner, SystemRunner, Toolchain};

// Re-export CLI types
pub use cli::{Cli, CommandTable, Commands, OutputFormat, Reporter, Verbosity};
