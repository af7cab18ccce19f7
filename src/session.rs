//! The session test gate.
//!
//! [`Session`] is an explicit session-context object: gate state, the
//! discovered [`RuntimeInfo`], and the initialized [`Runtime`] handle all
//! live here rather than in process-wide globals. Session start executes
//! exactly once before any test runs; fixtures and per-test checks read the
//! write-once state afterwards.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::constants;
use crate::error::{Error, Result};
use crate::options::SessionOptions;
use crate::probe::RuntimeInfo;
use crate::runtime::{Runtime, Thresholds};
use crate::ui;

/// Session configuration, populated once from command-line input and
/// immutable thereafter.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// False when `--no-julia` was given.
    pub enabled: bool,
    /// Runtime executable (flag, else environment, else the literal default).
    pub runtime: PathBuf,
    pub options: SessionOptions,
    pub thresholds: Thresholds,
}

impl SessionConfig {
    /// Configuration for the named runtime with defaults everywhere else.
    pub fn new(runtime: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            runtime: runtime.into(),
            options: SessionOptions::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(constants::DEFAULT_RUNTIME)
    }
}

/// A non-fatal per-test skip with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    reason: String,
}

impl Skip {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Requirements a test declares toward the gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marks {
    /// The test exercises the embedded runtime.
    pub requires_runtime: bool,
    /// The test assumes no overriding runtime path or options.
    pub requires_default_setup: bool,
}

impl Marks {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            requires_runtime: false,
            requires_default_setup: false,
        }
    }

    #[must_use]
    pub const fn runtime() -> Self {
        Self {
            requires_runtime: true,
            requires_default_setup: false,
        }
    }

    #[must_use]
    pub const fn with_default_setup(self) -> Self {
        Self {
            requires_default_setup: true,
            ..self
        }
    }
}

/// Remediation steps shown when the runtime/python combination is refused.
const INCOMPATIBLE_HINTS: &[&str] = &[
    "Pass `--julia-compiled-modules=no` to disable the precompilation cache.",
    "Use `--julia-runtime` to point at a different Julia executable.",
    "Pass `--no-julia` to run only the tests that do not need Julia.",
];

/// Whether the discovered runtime must be refused outright.
///
/// The combination is fatal only when the precompilation cache is enabled,
/// the runtime reports an incompatible python binding, and the version is at
/// or above the compatibility floor (older releases take the legacy path and
/// sidestep the cache problem).
pub(crate) fn compat_violation(
    info: &RuntimeInfo,
    options: &SessionOptions,
    thresholds: &Thresholds,
) -> bool {
    options.compiled_modules_enabled()
        && !info.is_compatible_python()
        && info.version >= thresholds.compat_floor
}

/// Session-scoped gate state and fixtures.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    using_default_setup: bool,
    info: OnceLock<RuntimeInfo>,
    runtime: OnceLock<Runtime>,
}

impl Session {
    /// Build the session context. The "using default setup" flag is fixed
    /// here: true only when the runtime is the literal default and no
    /// supported option was supplied.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let using_default_setup = config.runtime == Path::new(constants::DEFAULT_RUNTIME)
            && config.options.is_default();
        Self {
            config,
            using_default_setup,
            info: OnceLock::new(),
            runtime: OnceLock::new(),
        }
    }

    /// True unless `--no-julia` was given.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// True when no non-default runtime path or option was supplied.
    #[must_use]
    pub fn using_default_setup(&self) -> bool {
        self.using_default_setup
    }

    /// Run session start: discover the runtime, gate on compatibility, and
    /// initialize the handle. Returns immediately when the gate is disabled.
    /// Idempotent; the discovery and initialization run at most once.
    ///
    /// # Errors
    ///
    /// Probe failures propagate verbatim ([`Error::ProbeSpawn`] and friends).
    /// [`Error::Incompatible`] is the deliberate whole-run abort: the
    /// remediation diagnostic has already been written to stderr and the
    /// caller is expected to exit with [`Error::exit_code`].
    pub fn start(&self) -> Result<()> {
        if !self.config.enabled {
            tracing::info!("runtime tests disabled; skipping discovery");
            return Ok(());
        }
        if self.runtime.get().is_some() {
            return Ok(());
        }

        let info = RuntimeInfo::load(&self.config.runtime)?;

        if compat_violation(&info, &self.config.options, &self.config.thresholds) {
            ui::print_error_box_with_hints(
                "This Julia/python combination is not fully supported",
                INCOMPATIBLE_HINTS,
            );
            return Err(Error::Incompatible {
                version: info.version,
            });
        }

        let runtime = Runtime::initialize(
            &self.config.runtime,
            &info,
            &self.config.options,
            &self.config.thresholds,
        )?;

        // First and only writers; start() is single-threaded per session.
        let _ = self.info.set(info);
        let _ = self.runtime.set(runtime);
        Ok(())
    }

    /// Session-scoped fixture: the initialized runtime handle.
    ///
    /// Skips the requesting test when the gate is disabled; otherwise every
    /// call returns the identical cached instance.
    ///
    /// # Panics
    ///
    /// Panics when called before [`Session::start`] — requesting the fixture
    /// before session start is a programming error.
    pub fn runtime(&self) -> std::result::Result<&Runtime, Skip> {
        if !self.config.enabled {
            return Err(Skip::new("--no-julia is given"));
        }
        Ok(self
            .runtime
            .get()
            .expect("runtime fixture requested before Session::start"))
    }

    /// Session-scoped fixture: the discovered [`RuntimeInfo`]. Depends on
    /// the runtime fixture and shares its skip and panic behavior.
    pub fn info(&self) -> std::result::Result<&RuntimeInfo, Skip> {
        let _ = self.runtime()?;
        Ok(self
            .info
            .get()
            .expect("info fixture requested before Session::start"))
    }

    /// Per-test setup check. Returns the skip to apply, if any.
    #[must_use]
    pub fn check(&self, marks: &Marks) -> Option<Skip> {
        if marks.requires_runtime && !self.config.enabled {
            return Some(Skip::new("--no-julia is given"));
        }
        if marks.requires_default_setup && !self.using_default_setup {
            return Some(Skip::new(
                "using non-default setup (a --julia-<option> or --julia-runtime was given)",
            ));
        }
        None
    }
}
