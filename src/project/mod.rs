//! Project root discovery and the per-invocation workspace handle.

use crate::config::{self, CONFIG_FILE, ProjectConfig, sections};
use crate::error::{IoError, ProjectError, Result};
use std::path::{Path, PathBuf};

/// Walks from `start` towards the filesystem root and returns the first
/// directory containing the `.robotpy` marker file.
///
/// # Errors
///
/// Returns [`ProjectError::NotInProject`] if no ancestor holds the marker.
pub fn find_root(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| ProjectError::NotInProject.into())
}

/// Changes the process working directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be entered.
pub fn enter(dir: &Path) -> Result<()> {
    std::env::set_current_dir(dir).map_err(|e| {
        IoError::DirectoryFailed {
            path: dir.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// A project root together with its loaded configuration.
///
/// The configuration is read once when the workspace is opened, mutated in
/// memory by command handlers and written back by [`Workspace::save`].
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: ProjectConfig,
}

impl Workspace {
    /// Opens the workspace rooted at `root`. A missing config file yields
    /// an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config file cannot be read or parsed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = config::load(&root.join(CONFIG_FILE))?;
        Ok(Self { root, config })
    }

    /// Finds the project enclosing the working directory, makes it the
    /// working directory and opens it.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::NotInProject`] outside a project.
    pub fn locate() -> Result<Self> {
        Self::locate_reusing(None)
    }

    /// Like [`Workspace::locate`], but returns `loaded` instead of reading
    /// the config again when it belongs to the located root.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::NotInProject`] outside a project.
    pub fn locate_reusing(loaded: Option<Self>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let root = find_root(&cwd)?;
        enter(&root)?;
        tracing::debug!(root = %root.display(), "located project root");
        Self::reuse_or_open(root, loaded)
    }

    /// Returns `loaded` if it is rooted at `root`, otherwise opens `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config has to be read and cannot be.
    pub fn reuse_or_open(root: impl Into<PathBuf>, loaded: Option<Self>) -> Result<Self> {
        let root = root.into();
        match loaded {
            Some(workspace) if workspace.root == root => Ok(workspace),
            _ => Self::open(root),
        }
    }

    /// Like [`Workspace::locate`] but leaves the working directory alone and
    /// returns `None` when there is no enclosing project or its config
    /// cannot be read.
    pub fn discover(start: &Path) -> Option<Self> {
        let root = find_root(start).ok()?;
        match Self::open(root) {
            Ok(workspace) => Some(workspace),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable project config");
                None
            }
        }
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the config file path.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Returns true if the config file exists on disk.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.config_path().is_file()
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Returns the configuration for editing.
    pub const fn config_mut(&mut self) -> &mut ProjectConfig {
        &mut self.config
    }

    /// Returns the recorded version of a tracked package.
    #[must_use]
    pub fn requirement(&self, package: &str) -> Option<&str> {
        self.config.get(sections::REQUIREMENTS, package)
    }

    /// Returns the configured entry point (`execution.main`).
    #[must_use]
    pub fn entry_point(&self) -> Option<&str> {
        self.config.get(sections::EXECUTION, "main")
    }

    /// Writes the configuration back to the project root.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        config::save(&self.config, &self.config_path())
    }
}
