//! Package manager, remote installer and helper tool invocations.

use crate::error::{ProcessError, Result};
use crate::packages::InstalledPackages;
use crate::process::{Invocation, ProcessOutput, ProcessRunner};

/// Python module implementing the remote installer.
pub const INSTALLER_MODULE: &str = "robotpy_installer";

/// Interpreter names tried, in order, when none is given explicitly.
const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

/// Picks the Python interpreter: `explicit` if given, otherwise the first
/// candidate found on `PATH`.
///
/// # Errors
///
/// Returns [`ProcessError::InterpreterNotFound`] if nothing is found.
pub fn resolve_python(explicit: Option<&str>) -> Result<String> {
    if let Some(python) = explicit {
        return Ok(python.to_string());
    }
    PYTHON_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .map(|path| path.to_string_lossy().into_owned())
        .ok_or_else(|| ProcessError::InterpreterNotFound.into())
}

/// Runs the external tools a project needs.
///
/// Output is captured (hidden) unless the toolchain was built for verbose
/// operation; package listing is always captured since it is parsed.
pub struct Toolchain {
    runner: Box<dyn ProcessRunner>,
    python: String,
    capture: bool,
}

impl Toolchain {
    /// Creates a toolchain.
    pub fn new(runner: Box<dyn ProcessRunner>, python: impl Into<String>, capture: bool) -> Self {
        Self {
            runner,
            python: python.into(),
            capture,
        }
    }

    /// Returns the interpreter in use.
    #[must_use]
    pub fn python_path(&self) -> &str {
        &self.python
    }

    /// Runs the interpreter with `args`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the interpreter cannot be launched.
    pub fn python<I, S>(&self, args: I) -> Result<ProcessOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let invocation = Invocation::new(&self.python).args(args);
        self.runner.run(&invocation, self.capture)
    }

    /// `pip install --upgrade <spec>`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the interpreter cannot be launched.
    pub fn pip_install_upgrade(&self, spec: &str) -> Result<ProcessOutput> {
        self.python(["-m", "pip", "install", "--upgrade", spec])
    }

    /// Lists the locally installed packages.
    ///
    /// # Errors
    ///
    /// Fails if the listing cannot be produced; callers treat this as fatal.
    pub fn installed_packages(&self) -> Result<InstalledPackages> {
        let invocation = Invocation::new(&self.python).args(["-m", "pip", "freeze"]);
        let output = self.runner.run(&invocation, true)?;
        if !output.success() {
            return Err(ProcessError::Failed("Couldn't load installed packages.".to_string()).into());
        }
        Ok(InstalledPackages::parse_freeze(&output.stdout))
    }

    /// Runs the remote installer module with `args`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the interpreter cannot be launched.
    pub fn installer<I, S>(&self, args: I) -> Result<ProcessOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = ["-m".to_string(), INSTALLER_MODULE.to_string()]
            .into_iter()
            .chain(args.into_iter().map(Into::into))
            .collect();
        self.python(args)
    }

    /// Downloads the Python runtime for the remote target.
    ///
    /// # Errors
    ///
    /// Returns an error only if the interpreter cannot be launched.
    pub fn download_python(&self) -> Result<ProcessOutput> {
        self.installer(["download-python"])
    }

    /// Downloads a package for the remote target.
    ///
    /// # Errors
    ///
    /// Returns an error only if the interpreter cannot be launched.
    pub fn download(&self, spec: &str) -> Result<ProcessOutput> {
        self.installer(["download", spec])
    }

    /// Installs packages on the remote target.
    ///
    /// # Errors
    ///
    /// Returns an error only if the interpreter cannot be launched.
    pub fn install_on_target(&self, packages: &[String]) -> Result<ProcessOutput> {
        self.installer(std::iter::once("install").chain(packages.iter().map(String::as_str)))
    }

    /// Runs a Python script with arguments.
    ///
    /// # Errors
    ///
    /// Returns an error only if the interpreter cannot be launched.
    pub fn run_script(&self, script: &str, args: &[&str]) -> Result<ProcessOutput> {
        self.python(std::iter::once(script).chain(args.iter().copied()))
    }

    /// Initializes a git repository in the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be launched.
    pub fn git_init(&self) -> Result<ProcessOutput> {
        self.runner.run(&Invocation::new("git").arg("init"), self.capture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<(String, bool)>>>,
        stdout: String,
        code: i32,
    }

    impl ProcessRunner for Recorder {
        fn run(&self, invocation: &Invocation, capture: bool) -> Result<ProcessOutput> {
            self.calls.borrow_mut().push((invocation.to_string(), capture));
            Ok(ProcessOutput {
                code: Some(self.code),
                stdout: self.stdout.clone(),
                stderr: String::new(),
            })
        }
    }

    fn toolchain(recorder: &Recorder, capture: bool) -> Toolchain {
        Toolchain::new(Box::new(recorder.clone()), "python3", capture)
    }

    #[test]
    fn test_installer_invocations() {
        let recorder = Recorder::default();
        let tools = toolchain(&recorder, true);

        tools.download_python().unwrap();
        tools.download("robotpy").unwrap();
        tools
            .install_on_target(&["robotpy".to_string(), "robotpy-rev".to_string()])
            .unwrap();

        let calls = recorder.calls.borrow();
        assert_eq!(calls[0].0, "python3 -m robotpy_installer download-python");
        assert_eq!(calls[1].0, "python3 -m robotpy_installer download robotpy");
        assert_eq!(
            calls[2].0,
            "python3 -m robotpy_installer install robotpy robotpy-rev"
        );
    }

    #[test]
    fn test_capture_follows_verbosity_except_listing() {
        let recorder = Recorder {
            stdout: "robotpy==2024.3.2\n".to_string(),
            ..Recorder::default()
        };
        let tools = toolchain(&recorder, false);

        tools.pip_install_upgrade("robotpy").unwrap();
        let installed = tools.installed_packages().unwrap();
        assert_eq!(installed.version("robotpy"), Some("2024.3.2"));

        let calls = recorder.calls.borrow();
        assert_eq!(calls[0], ("python3 -m pip install --upgrade robotpy".to_string(), false));
        assert_eq!(calls[1], ("python3 -m pip freeze".to_string(), true));
    }

    #[test]
    fn test_failed_listing_is_error() {
        let recorder = Recorder {
            code: 1,
            ..Recorder::default()
        };
        let tools = toolchain(&recorder, true);
        assert!(tools.installed_packages().is_err());
    }

    #[test]
    fn test_resolve_python_explicit() {
        assert_eq!(resolve_python(Some("/opt/py/bin/python")).unwrap(), "/opt/py/bin/python");
    }
}
