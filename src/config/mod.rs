//! Project configuration store.
//!
//! The `.robotpy` file at the project root is a section/key/value file.
//! [`ProjectConfig`] is its in-memory model; [`load`] and [`save`] move it
//! between memory and disk.

pub mod ini;
pub mod project;

pub use project::{ProjectConfig, Section};

use crate::error::{IoError, Result};
use std::path::Path;

/// File name of the project marker and configuration file.
pub const CONFIG_FILE: &str = ".robotpy";

/// Credential files read by the deploy and installer tools.
pub const CREDENTIAL_FILES: [&str; 2] = [".deploy_cfg", ".installer_cfg"];

/// Section names used by the tool.
pub mod sections {
    /// Tracked package requirements (package -> installed version).
    pub const REQUIREMENTS: &str = "requirements";
    /// Snapshot of the requirements at the last library deploy.
    pub const DEPLOYED: &str = "requirements.deployed";
    /// Execution settings (`main`).
    pub const EXECUTION: &str = "execution";
    /// Remote target settings (`hostname`).
    pub const AUTH: &str = "auth";
    /// User-defined commands (name -> shell command).
    pub const COMMAND: &str = "command";
}

/// Loads a config file.
///
/// A missing file yields an empty configuration.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<ProjectConfig> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no config file, starting empty");
        return Ok(ProjectConfig::new());
    }

    let text = std::fs::read_to_string(path).map_err(|e| IoError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(ProjectConfig::parse(&text)?)
}

/// Writes the full configuration to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save(config: &ProjectConfig, path: &Path) -> Result<()> {
    std::fs::write(path, config.to_ini_string()).map_err(|e| IoError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "saved config");
    Ok(())
}

/// Writes the deploy and installer credential files into `dir`.
///
/// # Errors
///
/// Returns an error if either file cannot be written.
pub fn write_credentials(dir: &Path, hostname: &str) -> Result<()> {
    let mut auth = ProjectConfig::new();
    auth.set(sections::AUTH, "hostname", hostname);
    let body = auth.to_ini_string();

    for name in CREDENTIAL_FILES {
        let path = dir.join(name);
        std::fs::write(&path, &body).map_err(|e| IoError::WriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}
