//! Runtime discovery.
//!
//! [`RuntimeInfo`] is produced once per session by running the runtime
//! executable with a probe expression that prints `key: value` lines. The
//! probe computes python compatibility on the runtime side (PyCall's
//! configured python against the harness target, see
//! [`crate::constants::PYTHON_ENV_VAR`]) so the host stays a pure consumer
//! of runtime-reported facts.

use semver::Version;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Expression evaluated inside the runtime to report version, paths, and
/// python-binding compatibility.
const PROBE_EXPR: &str = r#"
using Libdl
println("version: ", VERSION)
println("bindir: ", Sys.BINDIR)
println("sysimage: ", unsafe_string(Base.JLOptions().image_file))
println("libjulia: ", abspath(Libdl.dlpath("libjulia")))
expected = get(ENV, "JULIA_GATE_PYTHON", "")
compatible = try
    pycall = Base.require(Base.PkgId(Base.UUID("438e738f-606a-5dbb-bf0a-cddfbfd45ab0"), "PyCall"))
    isempty(expected) || pycall.python == expected
catch
    isempty(expected)
end
println("pycall_compatible: ", compatible)
"#;

/// Facts reported by the runtime executable, read-only after creation and
/// shared by all tests in the session.
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub version: Version,
    pub bindir: PathBuf,
    pub sysimage: Option<PathBuf>,
    pub libjulia: Option<PathBuf>,
    python_compatible: bool,
}

impl RuntimeInfo {
    /// Query the runtime executable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProbeSpawn`] when the executable cannot be started
    /// (bad path), [`Error::ProbeFailed`] when it exits non-zero, and
    /// [`Error::ProbeOutput`]/[`Error::Version`] when the output cannot be
    /// parsed.
    pub fn load(runtime: &Path) -> Result<Self> {
        tracing::debug!(runtime = %runtime.display(), "probing runtime");
        let output = Command::new(runtime)
            .args(["--startup-file=no", "--history-file=no", "-e", PROBE_EXPR])
            .output()
            .map_err(|source| Error::ProbeSpawn {
                runtime: runtime.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::ProbeFailed {
                runtime: runtime.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let info = Self::parse(&stdout)?;
        tracing::debug!(version = %info.version, compatible = info.python_compatible, "probe complete");
        Ok(info)
    }

    /// Parse the probe's `key: value` output.
    pub(crate) fn parse(output: &str) -> Result<Self> {
        let mut version = None;
        let mut bindir = None;
        let mut sysimage = None;
        let mut libjulia = None;
        let mut python_compatible = true;

        for line in output.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(Error::ProbeOutput(line.to_string()));
            };
            let value = value.trim();
            match key.trim() {
                "version" => {
                    let raw = value.trim_start_matches('v');
                    version = Some(Version::parse(raw).map_err(|source| Error::Version {
                        raw: raw.to_string(),
                        source,
                    })?);
                },
                "bindir" => bindir = Some(PathBuf::from(value)),
                "sysimage" => {
                    if !value.is_empty() {
                        sysimage = Some(PathBuf::from(value));
                    }
                },
                "libjulia" => {
                    if !value.is_empty() {
                        libjulia = Some(PathBuf::from(value));
                    }
                },
                "pycall_compatible" => python_compatible = value == "true",
                // Unknown keys from newer probes are ignored.
                _ => {},
            }
        }

        let version =
            version.ok_or_else(|| Error::ProbeOutput("missing 'version' line".to_string()))?;
        let bindir =
            bindir.ok_or_else(|| Error::ProbeOutput("missing 'bindir' line".to_string()))?;

        Ok(Self {
            version,
            bindir,
            sysimage,
            libjulia,
            python_compatible,
        })
    }

    /// Whether the runtime's python binding matches the harness target.
    #[must_use]
    pub fn is_compatible_python(&self) -> bool {
        self.python_compatible
    }

    #[cfg(test)]
    pub(crate) fn for_tests(version: Version, python_compatible: bool) -> Self {
        Self {
            version,
            bindir: PathBuf::from("/usr/bin"),
            sysimage: None,
            libjulia: None,
            python_compatible,
        }
    }
}
