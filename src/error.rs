//! Typed errors for the session gate.
//!
//! Skips are deliberately not errors; see [`crate::gate::Skip`]. Everything
//! here either aborts session start or propagates verbatim to the caller.

use std::path::PathBuf;

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Session gate errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The runtime/python combination is unsupported. This is the one
    /// deliberate whole-run abort; everything else propagates.
    #[error("incompatible runtimes")]
    Incompatible { version: semver::Version },

    /// The probe process could not be spawned (bad executable path).
    #[error("failed to spawn runtime '{runtime}': {source}")]
    ProbeSpawn {
        runtime: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The probe ran but exited non-zero.
    #[error("runtime probe '{runtime}' exited with {status}: {stderr}")]
    ProbeFailed {
        runtime: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The probe produced output the parser does not understand.
    #[error("malformed probe output: {0}")]
    ProbeOutput(String),

    /// Runtime initialization (legacy bootstrap) failed.
    #[error("runtime initialization failed: {reason}")]
    InitFailed { reason: String },

    /// A one-shot evaluation on the initialized handle failed.
    #[error("runtime evaluation exited with {status}: {stderr}")]
    Eval {
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// A supported-option flag was given a value its descriptor rejects.
    #[error("invalid value '{value}' for option '{option}': {reason}")]
    InvalidOption {
        option: String,
        value: String,
        reason: String,
    },

    /// The runtime reported a version semver cannot parse.
    #[error("unparseable runtime version '{raw}': {source}")]
    Version {
        raw: String,
        #[source]
        source: semver::Error,
    },

    /// IO error with context.
    #[error("IO error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid-option error.
    pub fn invalid_option(
        option: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            option: option.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an init-failed error.
    pub fn init_failed(reason: impl Into<String>) -> Self {
        Self::InitFailed {
            reason: reason.into(),
        }
    }
}

impl Error {
    /// Process exit code for a session-start failure.
    ///
    /// Option/usage problems exit 2 like a CLI parse error would; everything
    /// else, including the compatibility abort, exits 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidOption { .. } => 2,
            Self::Incompatible { .. }
            | Self::ProbeSpawn { .. }
            | Self::ProbeFailed { .. }
            | Self::ProbeOutput(_)
            | Self::InitFailed { .. }
            | Self::Eval { .. }
            | Self::Version { .. }
            | Self::Io { .. } => 1,
        }
    }
}
