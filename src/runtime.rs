//! The initialized runtime handle and its version-dependent init strategies.
//!
//! Embedding is out-of-process: the handle owns the resolved executable plus
//! the effective argv composed from [`SessionOptions`], and drives the
//! interpreter through one-shot invocations. Releases below
//! [`Thresholds::legacy_before`] additionally get an eager bootstrap run that
//! loads the python binding package up front; newer releases are initialized
//! lazily from the parameterized handle alone.

use semver::Version;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::constants;
use crate::error::{Error, Result};
use crate::options::SessionOptions;
use crate::probe::RuntimeInfo;

/// Version thresholds steering initialization and the compatibility gate.
///
/// These are environment-specific constants, carried as configuration so a
/// suite pinned to an unusual runtime lineage can move them.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Below this version the legacy bootstrap path is taken.
    pub legacy_before: Version,
    /// At or above this version an incompatible python binding is fatal when
    /// the precompilation cache is enabled.
    pub compat_floor: Version,
}

impl Default for Thresholds {
    fn default() -> Self {
        let (lm, ln, lp) = constants::DEFAULT_LEGACY_BEFORE;
        let (cm, cn, cp) = constants::DEFAULT_COMPAT_FLOOR;
        Self {
            legacy_before: Version::new(lm, ln, lp),
            compat_floor: Version::new(cm, cn, cp),
        }
    }
}

/// Loads the python binding package eagerly so its compatibility shims are
/// compiled before the first test runs.
const BOOTSTRAP_EXPR: &str = "using PyCall";

/// Handle to the initialized runtime, session-scoped and shared by all tests.
#[derive(Debug)]
pub struct Runtime {
    executable: PathBuf,
    base_args: Vec<String>,
}

impl Runtime {
    /// Initialize with the strategy selected by the reported version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitFailed`] when the legacy bootstrap run cannot be
    /// spawned or exits non-zero. The structured path performs no spawn.
    pub(crate) fn initialize(
        executable: &Path,
        info: &RuntimeInfo,
        options: &SessionOptions,
        thresholds: &Thresholds,
    ) -> Result<Self> {
        let mut base_args = vec!["--startup-file=no".to_string()];
        base_args.extend(options.as_args());
        let runtime = Self {
            executable: executable.to_path_buf(),
            base_args,
        };

        if info.version < thresholds.legacy_before {
            tracing::info!(version = %info.version, "initializing runtime via legacy bootstrap");
            runtime.bootstrap_legacy()?;
        } else {
            tracing::debug!(version = %info.version, "initializing runtime via structured path");
        }
        Ok(runtime)
    }

    fn bootstrap_legacy(&self) -> Result<()> {
        let output = Command::new(&self.executable)
            .args(&self.base_args)
            .args(["-e", BOOTSTRAP_EXPR])
            .output()
            .map_err(|e| {
                Error::init_failed(format!(
                    "failed to spawn '{}': {e}",
                    self.executable.display()
                ))
            })?;

        if !output.status.success() {
            return Err(Error::init_failed(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        Ok(())
    }

    /// Evaluate a one-shot expression, returning trimmed stdout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the executable cannot be spawned and
    /// [`Error::Eval`] when the expression exits non-zero.
    pub fn eval(&self, expr: &str) -> Result<String> {
        let output = Command::new(&self.executable)
            .args(&self.base_args)
            .args(["-e", expr])
            .output()
            .map_err(|e| Error::io(format!("spawning '{}'", self.executable.display()), e))?;

        if !output.status.success() {
            return Err(Error::Eval {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// The resolved runtime executable.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Effective argv applied to every invocation.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.base_args
    }
}
