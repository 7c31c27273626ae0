//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros. User-defined
//! commands from the project config are accepted through clap's external
//! subcommand slot and resolved against a [`CommandTable`].

use crate::cli::output::Verbosity;
use crate::cli::table::CommandTable;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Manage RobotPy projects: track requirements and deploy to the robot.
#[derive(Parser, Debug)]
#[command(name = "robotpy")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show progress messages and the output of every tool that runs.
    #[arg(short, long, global = true, conflicts_with_all = ["quiet", "silent"])]
    pub verbose: bool,

    /// Only show errors.
    #[arg(short, long, global = true, conflicts_with = "silent")]
    pub quiet: bool,

    /// Show nothing at all.
    #[arg(long, global = true)]
    pub silent: bool,

    /// Python interpreter used to run pip and the installer.
    #[arg(long, global = true, env = "ROBOTPY_PYTHON", value_name = "PATH")]
    pub python: Option<String>,

    /// Output format for `config` (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project, or refresh an existing one.
    #[command(visible_alias = "init")]
    Initialize {
        /// Project directory (created if missing). Defaults to the current one.
        directory: Option<PathBuf>,

        /// Entry point of the robot program.
        #[arg(short, long, default_value = "robot.py")]
        main: String,

        /// Do not create the entry point file.
        #[arg(long)]
        bare: bool,

        /// Address of the robot (team number or hostname).
        #[arg(long, short = 't', visible_alias = "team")]
        host: Option<String>,

        /// Initialize a git repository (default).
        #[arg(long, overrides_with = "no_git")]
        git: bool,

        /// Do not initialize a git repository.
        #[arg(long, overrides_with = "git")]
        no_git: bool,

        /// Extra packages or add-on short names to install.
        #[arg(long = "with", value_name = "PACKAGE", num_args = 1..)]
        with: Vec<String>,
    },

    /// Install packages locally and download them for the robot.
    Install {
        /// Packages or add-on short names (ctre, navx, rev, ...).
        #[arg(required = true)]
        packages: Vec<String>,

        /// Download packages for the robot (default).
        #[arg(long, overrides_with = "no_download")]
        download: bool,

        /// Only install locally.
        #[arg(long, overrides_with = "download")]
        no_download: bool,
    },

    /// Upgrade tracked packages (all of them if none are named).
    Update {
        /// Tracked packages to upgrade.
        packages: Vec<String>,

        /// Download packages for the robot (default).
        #[arg(long, overrides_with = "no_download")]
        download: bool,

        /// Only upgrade locally.
        #[arg(long, overrides_with = "download")]
        no_download: bool,
    },

    /// Stop tracking packages.
    Remove {
        /// Packages to drop from the requirements.
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Push changed libraries and the robot code to the robot.
    Deploy {
        /// Skip deploying the robot code.
        #[arg(long)]
        no_code: bool,

        /// Skip deploying libraries.
        #[arg(long)]
        no_lib: bool,
    },

    /// Get, set or clear a project setting (`group.key`).
    Config {
        /// Setting name, such as `auth.hostname` or `command.sim`.
        #[arg(required_unless_present = "list")]
        field: Option<String>,

        /// New value. Omit to print the current one.
        #[arg(conflicts_with = "clear")]
        value: Option<String>,

        /// Remove the setting.
        #[arg(long)]
        clear: bool,

        /// Print the whole configuration.
        #[arg(long, conflicts_with_all = ["field", "value", "clear"])]
        list: bool,
    },

    /// A command defined in the `[command]` section of the project config.
    #[command(external_subcommand)]
    Custom(Vec<String>),
}

impl Cli {
    /// Returns the message level selected by the global flags.
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet, self.silent)
    }
}

/// Builds the clap command, listing the custom commands in the help text.
#[must_use]
pub fn build_command(table: &CommandTable) -> clap::Command {
    let command = Cli::command();
    match table.help_text() {
        Some(help) => command.after_help(help),
        None => command,
    }
}

/// Parses `args` (including the program name).
///
/// # Errors
///
/// Returns the clap error for invalid arguments; `--help` and `--version`
/// are reported this way too.
pub fn parse_from<I, T>(table: &CommandTable, args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = build_command(table);
    let matches = command.try_get_matches_from_mut(args)?;
    Cli::from_arg_matches(&matches).map_err(|e| e.format(&mut command))
}

/// Names (and aliases) of the built-in subcommands.
#[must_use]
pub fn builtin_names() -> Vec<String> {
    let command = Cli::command();
    let mut names = vec!["help".to_string()];
    for sub in command.get_subcommands() {
        names.push(sub.get_name().to_string());
        names.extend(sub.get_all_aliases().map(str::to_string));
    }
    names
}
