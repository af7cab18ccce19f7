//! Command-line option registration for the test runner surface.
//!
//! One flag disables the gate, one overrides the runtime executable, and the
//! descriptor table in [`crate::options`] contributes one `--julia-<name>`
//! flag each. Registration has no side effects beyond the returned command.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::env;
use std::path::PathBuf;

use crate::constants;
use crate::error::Result;
use crate::options::{SUPPORTED_OPTIONS, SessionOptions};
use crate::runtime::Thresholds;
use crate::session::SessionConfig;

/// Register the gate's flags on an existing command.
pub fn augment_command(cmd: Command) -> Command {
    let mut cmd = cmd
        .arg(
            Arg::new("no-julia")
                .long("no-julia")
                .action(ArgAction::SetTrue)
                .help("Skip tests that require the Julia runtime."),
        )
        .arg(
            Arg::new("julia-runtime")
                .long("julia-runtime")
                .value_name("PATH")
                .help(format!(
                    "Julia executable to use. Defaults to ${}, else '{}'.",
                    constants::RUNTIME_ENV_VAR,
                    constants::DEFAULT_RUNTIME
                )),
        );

    for desc in SUPPORTED_OPTIONS {
        let flag = desc.cli_flag();
        cmd = cmd.arg(
            Arg::new(flag.clone())
                .long(flag)
                .value_name(desc.value_name)
                .help(desc.help),
        );
    }
    cmd
}

/// The standalone command used by harness binaries.
pub fn command() -> Command {
    augment_command(
        Command::new("julia-gate")
            .about("Test runner gating on an embedded Julia runtime")
            .arg(
                Arg::new("filter")
                    .value_name("FILTER")
                    .num_args(0..=1)
                    .help("Run only tests whose name contains this substring."),
            ),
    )
}

/// Runtime executable from the environment override, else the literal default.
#[must_use]
pub fn default_runtime() -> String {
    env::var(constants::RUNTIME_ENV_VAR)
        .unwrap_or_else(|_| constants::DEFAULT_RUNTIME.to_string())
}

/// Read all registered values into a [`SessionConfig`].
///
/// # Errors
///
/// Returns [`crate::error::Error::InvalidOption`] when a supplied value is
/// rejected by its descriptor.
pub fn session_config_from_matches(matches: &ArgMatches) -> Result<SessionConfig> {
    let enabled = !matches.get_flag("no-julia");
    let runtime: PathBuf = matches
        .get_one::<String>("julia-runtime")
        .cloned()
        .unwrap_or_else(default_runtime)
        .into();

    let mut options = SessionOptions::default();
    for desc in SUPPORTED_OPTIONS {
        if let Some(value) = matches.get_one::<String>(&desc.cli_flag()) {
            options.set(desc.name, value)?;
        }
    }

    Ok(SessionConfig {
        enabled,
        runtime,
        options,
        thresholds: Thresholds::default(),
    })
}
