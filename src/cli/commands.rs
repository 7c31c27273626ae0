//! CLI command implementations.
//!
//! Contains the business logic for each CLI command. Handlers mutate the
//! [`Workspace`] in memory; [`execute`] saves it once after the handler
//! succeeds. A handler returning `Err` is a fatal failure and nothing is
//! saved. Non-fatal failures are reported and the handler carries on.

use crate::cli::output::{OutputFormat, Reporter, format_config, format_value, validate_format};
use crate::cli::parser::{Cli, Commands};
use crate::cli::session::Session;
use crate::cli::table::CommandTable;
use crate::config::{self, ProjectConfig, ini, sections};
use crate::error::{CommandError, ConfigError, IoError, ProcessError, ProjectError, Result};
use crate::packages::{BASE_PACKAGE, expand_addon, expand_all, is_newer, requirement_name};
use crate::process::{ProcessOutput, ProcessRunner, SystemRunner, Toolchain, resolve_python, run_shell};
use crate::project::{self, Workspace};
use std::path::{Path, PathBuf};

/// Entry point written by `initialize` unless `--bare` is given.
pub const ROBOT_TEMPLATE: &str = r#"import wpilib

class Robot(wpilib.TimedRobot):
    def robotInit(self) -> None:
        pass

    def robotPeriodic(self) -> None:
        pass

    def autonomousInit(self) -> None:
        pass

    def autonomousPeriodic(self) -> None:
        pass

    def teleopInit(self) -> None:
        pass

    def teleopPeriodic(self) -> None:
        pass


if __name__ == "__main__":
    wpilib.run(Robot)
"#;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
/// * `table` - Custom commands of the enclosing project.
/// * `loaded` - The enclosing project, if it was already read to build `table`.
/// * `reporter` - Message sink for progress and non-fatal errors.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails fatally.
pub fn execute(
    cli: &Cli,
    table: &CommandTable,
    loaded: Option<Workspace>,
    reporter: &Reporter,
) -> Result<String> {
    let format = validate_format(&cli.format)?;
    let python = cli.python.clone();
    let capture = reporter.verbosity().captures_output();
    let session = Session::new(reporter, move || {
        let python = resolve_python(python.as_deref())?;
        Ok(Toolchain::new(Box::new(SystemRunner), python, capture))
    });

    match &cli.command {
        Commands::Initialize {
            directory,
            main,
            bare,
            host,
            no_git,
            with,
            ..
        } => {
            let root = prepare_directory(directory.as_deref())?;
            let mut workspace = Workspace::reuse_or_open(root, loaded)?;
            let options = InitOptions {
                main: main.clone(),
                bare: *bare,
                host: host.clone(),
                git: !*no_git,
                packages: with.clone(),
            };
            cmd_initialize(&session, &mut workspace, &options)?;
            workspace.save()?;
            Ok(String::new())
        }
        Commands::Install {
            packages,
            no_download,
            ..
        } => in_project(loaded, |ws| {
            cmd_install(&session, ws, &expand_all(packages), !*no_download)?;
            Ok(String::new())
        }),
        Commands::Update {
            packages,
            no_download,
            ..
        } => in_project(loaded, |ws| {
            cmd_update(&session, ws, packages, !*no_download)?;
            Ok(String::new())
        }),
        Commands::Remove { packages } => in_project(loaded, |ws| {
            cmd_remove(reporter, ws, packages);
            Ok(String::new())
        }),
        Commands::Deploy { no_code, no_lib } => in_project(loaded, |ws| {
            cmd_deploy(&session, ws, !*no_lib, !*no_code)?;
            Ok(String::new())
        }),
        Commands::Config {
            field,
            value,
            clear,
            list,
        } => in_project(loaded, |ws| {
            if *list {
                return format_config(ws.config(), format);
            }
            let field = field.as_deref().ok_or_else(|| {
                CommandError::InvalidArgument("missing config field".to_string())
            })?;
            cmd_config(ws, field, value.as_deref(), *clear, format)
        }),
        Commands::Custom(args) => {
            if let Some(name) = args.first()
                && table.lookup(name).is_none()
            {
                return Err(CommandError::UnknownCommand(name.clone()).into());
            }
            in_project(loaded, |_| {
                cmd_custom(reporter, &SystemRunner, table, args)?;
                Ok(String::new())
            })
        }
    }
}

/// Locates the project, runs `f` on it and saves the config afterwards.
fn in_project<F>(loaded: Option<Workspace>, f: F) -> Result<String>
where
    F: FnOnce(&mut Workspace) -> Result<String>,
{
    let mut workspace = Workspace::locate_reusing(loaded)?;
    let output = f(&mut workspace)?;
    workspace.save()?;
    Ok(output)
}

/// Creates the initialization target if needed and makes it the working
/// directory. Returns the absolute project root.
fn prepare_directory(directory: Option<&Path>) -> Result<PathBuf> {
    let target = match directory {
        Some(dir) => {
            if dir.exists() && !dir.is_dir() {
                return Err(ProjectError::NotADirectory {
                    path: dir.display().to_string(),
                }
                .into());
            }
            std::fs::create_dir_all(dir).map_err(|e| IoError::CreateDirFailed {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })?;
            dir.to_path_buf()
        }
        None => PathBuf::from("."),
    };
    project::enter(&target)?;
    Ok(std::env::current_dir()?)
}

/// Turns a failed step into a fatal error.
fn expect_success(output: &ProcessOutput, message: &str) -> Result<()> {
    if output.success() {
        Ok(())
    } else {
        Err(ProcessError::Failed(message.to_string()).into())
    }
}

// ==================== Command Implementations ====================

/// Options for [`cmd_initialize`].
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Entry point file, relative to the project root.
    pub main: String,
    /// Skip creating the entry point.
    pub bare: bool,
    /// Robot address to record and write into the credential files.
    pub host: Option<String>,
    /// Run `git init`.
    pub git: bool,
    /// Extra packages (add-on short names allowed).
    pub packages: Vec<String>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            main: "robot.py".to_string(),
            bare: false,
            host: None,
            git: true,
            packages: Vec::new(),
        }
    }
}

/// Sets up a project in `workspace`.
///
/// Fatal: runtime or base package download failure, base package missing
/// locally and not installable, credential or entry point write failure.
pub fn cmd_initialize(session: &Session, workspace: &mut Workspace, options: &InitOptions) -> Result<()> {
    let reporter = session.reporter();
    let tools = session.tools()?;

    if workspace.is_initialized() {
        reporter.info(format!(
            "{} already exists. If you want to reset, delete the file and re-run `robotpy init`",
            workspace.config_path().display()
        ));
    }

    if workspace.requirement(BASE_PACKAGE).is_none() {
        let version = base_package_version(reporter, tools)?;
        workspace
            .config_mut()
            .set(sections::REQUIREMENTS, BASE_PACKAGE, version);
    }

    workspace
        .config_mut()
        .set(sections::EXECUTION, "main", options.main.as_str());

    if let Some(host) = &options.host {
        config::write_credentials(workspace.root(), host)?;
        workspace
            .config_mut()
            .set(sections::AUTH, "hostname", host.as_str());
    }

    if !options.bare {
        write_entry_point(reporter, workspace.root(), &options.main)?;
    }

    if options.git {
        match tools.git_init() {
            Ok(output) if output.success() => {}
            Ok(_) => reporter.error("Initializing git repository failed"),
            Err(e) => reporter.error(format!("Initializing git repository failed: {e}")),
        }
    }

    reporter.info("Downloading python for robot installation");
    expect_success(&tools.download_python()?, "Downloading Python failed unexpectedly")?;

    reporter.info("Downloading robotpy for robot installations");
    expect_success(
        &tools.download(BASE_PACKAGE)?,
        "Downloading robotpy for remote use failed unexpectedly",
    )?;

    install_packages(session, workspace, &expand_all(&options.packages), true)
}

/// Returns the locally installed base package version, installing the
/// package first if it is missing.
fn base_package_version(reporter: &Reporter, tools: &Toolchain) -> Result<String> {
    if let Some(version) = tools.installed_packages()?.version(BASE_PACKAGE) {
        return Ok(version.to_string());
    }

    reporter.info(format!("Installing package '{BASE_PACKAGE}'"));
    expect_success(
        &tools.pip_install_upgrade(BASE_PACKAGE)?,
        "Installing robotpy failed unexpectedly",
    )?;
    tools
        .installed_packages()?
        .version(BASE_PACKAGE)
        .map(str::to_string)
        .ok_or_else(|| {
            ProcessError::Failed(format!(
                "{BASE_PACKAGE} is not installed in the selected Python environment"
            ))
            .into()
        })
}

fn write_entry_point(reporter: &Reporter, root: &Path, main: &str) -> Result<()> {
    let path = root.join(main);
    if path.exists() {
        reporter.error(format!("{main} already exists. Skipping main file creation."));
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| IoError::CreateDirFailed {
            path: parent.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    std::fs::write(&path, ROBOT_TEMPLATE).map_err(|e| IoError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Installs (upgrades) packages and records their versions.
///
/// `packages` must already be expanded from add-on short names.
pub fn cmd_install(session: &Session, workspace: &mut Workspace, packages: &[String], download: bool) -> Result<()> {
    install_packages(session, workspace, packages, download)
}

/// Upgrades tracked packages; all of them plus the base package when
/// `packages` is empty. Untracked names get a warning and are skipped.
pub fn cmd_update(session: &Session, workspace: &mut Workspace, packages: &[String], download: bool) -> Result<()> {
    let reporter = session.reporter();

    let requested: Vec<String> = if packages.is_empty() {
        let mut all = vec![BASE_PACKAGE.to_string()];
        if let Some(section) = workspace.config().section(sections::REQUIREMENTS) {
            all.extend(section.keys().filter(|k| *k != BASE_PACKAGE).map(str::to_string));
        }
        all
    } else {
        packages
            .iter()
            .map(|p| resolve_tracked(workspace, p))
            .collect()
    };

    let tracked: Vec<String> = requested
        .into_iter()
        .filter(|pkg| {
            let known = workspace.requirement(pkg).is_some();
            if !known {
                reporter.warn(format!(
                    "'{pkg}' is not a registered package. Use `robotpy install {pkg}` instead"
                ));
            }
            known
        })
        .collect();

    install_packages(session, workspace, &tracked, download)
}

/// Stops tracking packages. The base package and untracked names are
/// reported as errors; neither is fatal.
pub fn cmd_remove(reporter: &Reporter, workspace: &mut Workspace, packages: &[String]) {
    for package in packages {
        let name = resolve_tracked(workspace, package);
        if name == BASE_PACKAGE {
            reporter.error(format!("{BASE_PACKAGE} can't be removed from requirements"));
            continue;
        }
        if workspace
            .config_mut()
            .remove(sections::REQUIREMENTS, &name)
            .is_none()
        {
            reporter.error(format!("'{package}' is not installed in this project"));
        }
    }
}

/// Pushes changed libraries and/or the robot code to the robot.
///
/// A failed library push is reported and leaves the deployed snapshot
/// untouched. A failed code deploy is fatal.
pub fn cmd_deploy(session: &Session, workspace: &mut Workspace, deploy_lib: bool, deploy_code: bool) -> Result<()> {
    let reporter = session.reporter();

    if deploy_lib {
        let pending = pending_deploy(workspace.config());
        if !pending.is_empty() {
            reporter.info("Package requirements updated since last deploy");
            reporter.info("Updating packages on remote target");
            let output = session.tools()?.install_on_target(&pending)?;
            if output.success() {
                let snapshot = workspace
                    .config()
                    .section(sections::REQUIREMENTS)
                    .cloned()
                    .unwrap_or_default();
                workspace
                    .config_mut()
                    .replace_section(sections::DEPLOYED, &snapshot);
                tracing::info!(packages = pending.len(), "recorded deployed requirements");
            } else {
                reporter.error("Updating packages on remote target failed unexpectedly");
            }
        }
    }

    if deploy_code {
        let main = workspace
            .entry_point()
            .ok_or(ProjectError::NoEntryPoint)?
            .to_string();
        reporter.info(format!("Deploying robot code (main: {main})"));
        expect_success(
            &session.tools()?.run_script(&main, &["deploy"])?,
            "Deploying robot code failed unexpectedly",
        )?;
    }

    Ok(())
}

/// Tracked requirements that were never deployed or are newer than the
/// deployed version, in requirement order.
#[must_use]
pub fn pending_deploy(config: &ProjectConfig) -> Vec<String> {
    let Some(requirements) = config.section(sections::REQUIREMENTS) else {
        return Vec::new();
    };
    let deployed = config.section(sections::DEPLOYED);
    requirements
        .iter()
        .filter(|(name, version)| is_newer(version, deployed.and_then(|d| d.get(name))))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Gets, sets or clears a `group.key` setting.
///
/// # Errors
///
/// Fails for fields without a `.` separator, for the requirement groups and
/// for settings the config file cannot hold unchanged.
pub fn cmd_config(
    workspace: &mut Workspace,
    field: &str,
    value: Option<&str>,
    clear: bool,
    format: OutputFormat,
) -> Result<String> {
    let invalid = || ConfigError::InvalidField {
        field: field.to_string(),
    };
    let (group, key) = field.rsplit_once('.').ok_or_else(invalid)?;
    if group.is_empty() || key.is_empty() {
        return Err(invalid().into());
    }
    if group == sections::REQUIREMENTS || group == sections::DEPLOYED {
        return Err(ConfigError::ProtectedGroup {
            group: group.to_string(),
        }
        .into());
    }

    let config = workspace.config_mut();
    if clear {
        let removed = config.remove(group, key).is_some();
        if removed && config.section(group).is_some_and(|s| s.is_empty()) {
            config.remove_section(group);
        }
        return Ok(String::new());
    }
    if let Some(value) = value {
        ini::check_entry(group, key, value)?;
        config.set(group, key, value);
        return Ok(String::new());
    }
    format_value(config.get(group, key), format)
}

/// Runs a user-defined command from the project root.
///
/// A non-zero exit is reported, not fatal.
///
/// # Errors
///
/// Fails for unknown command names and unparsable or unlaunchable command
/// lines.
pub fn cmd_custom(
    reporter: &Reporter,
    runner: &dyn ProcessRunner,
    table: &CommandTable,
    args: &[String],
) -> Result<()> {
    let Some((name, rest)) = args.split_first() else {
        return Err(CommandError::UnknownCommand(String::new()).into());
    };
    let command = table
        .lookup(name)
        .ok_or_else(|| CommandError::UnknownCommand(name.clone()))?;

    let output = run_shell(runner, &command.command_line, rest)?;
    if !output.success() {
        let status = output
            .code
            .map_or_else(|| "a signal".to_string(), |c| format!("status {c}"));
        reporter.error(format!("command '{name}' exited with {status}"));
    }
    Ok(())
}

/// Maps a user-supplied name to the tracked key: the name itself when it
/// is tracked, otherwise its add-on expansion.
fn resolve_tracked(workspace: &Workspace, name: &str) -> String {
    if workspace.requirement(name).is_some() {
        name.to_lowercase()
    } else {
        expand_addon(name)
    }
}

/// Installs each package; failures are reported and the rest proceed.
fn install_packages(session: &Session, workspace: &mut Workspace, packages: &[String], download: bool) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    let reporter = session.reporter();
    let tools = session.tools()?;

    for package in packages {
        reporter.info(format!("Installing package '{package}'"));
        if !tools.pip_install_upgrade(package)?.success() {
            reporter.error(format!("Installing package '{package}' failed unexpectedly"));
            continue;
        }

        if download {
            reporter.info(format!("Downloading package '{package}' for robot installations"));
            if !tools.download(package)?.success() {
                reporter.error(format!(
                    "Downloading package '{package}' for remote use failed unexpectedly"
                ));
                continue;
            }
        }

        record_installed(reporter, tools, workspace, package)?;
    }
    Ok(())
}

/// Records the installed version of `spec` if it is newer than the
/// recorded one.
fn record_installed(reporter: &Reporter, tools: &Toolchain, workspace: &mut Workspace, spec: &str) -> Result<()> {
    let Some(name) = requirement_name(spec) else {
        reporter.warn(format!("'{spec}' is not a package name; not tracked in requirements"));
        return Ok(());
    };

    let installed = tools.installed_packages()?;
    let Some(version) = installed.version(name) else {
        reporter.warn(format!("'{name}' is not reported as installed; not tracked in requirements"));
        return Ok(());
    };

    if is_newer(version, workspace.requirement(name)) {
        tracing::info!(package = name, version, "tracking requirement");
        workspace
            .config_mut()
            .set(sections::REQUIREMENTS, name, version);
    }
    Ok(())
}
