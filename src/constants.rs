//! Shared constants and environment defaults.

/// Runtime executable used when neither the CLI flag nor the environment
/// variable overrides it.
pub const DEFAULT_RUNTIME: &str = "julia";

/// Environment variable consulted for the runtime executable path before
/// falling back to [`DEFAULT_RUNTIME`].
pub const RUNTIME_ENV_VAR: &str = "JULIA_GATE_RUNTIME";

/// Environment variable naming the python the binding is expected to embed.
/// The probe compares PyCall's configured python against this value; when
/// unset, the runtime is reported as compatible.
pub const PYTHON_ENV_VAR: &str = "JULIA_GATE_PYTHON";

/// Default compatibility floor: at or above this version, an incompatible
/// python binding combined with enabled precompilation aborts the run.
pub const DEFAULT_COMPAT_FLOOR: (u64, u64, u64) = (0, 7, 0);

/// Default legacy-init boundary: below this version, initialization takes the
/// eager bootstrap path instead of the structured one.
pub const DEFAULT_LEGACY_BEFORE: (u64, u64, u64) = (0, 7, 0);
