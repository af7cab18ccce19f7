//! Supported runtime initialization options.
//!
//! A fixed table of [`OptionDescriptor`]s drives both CLI registration and
//! value handling: each descriptor contributes one `--julia-<name>` flag and
//! maps to one Julia command-line argument. [`SessionOptions`] holds the
//! values supplied for one test session; it is populated once at session
//! start and immutable thereafter.

use crate::error::{Error, Result};

/// Value syntax accepted by an option.
#[derive(Debug, Clone, Copy)]
pub enum ValueKind {
    /// One of a fixed set of keywords (e.g. `yes`/`no`).
    Choice(&'static [&'static str]),
    /// A filesystem path, passed through untouched.
    Path,
    /// An integer in an inclusive range.
    Int { min: u64, max: u64 },
    /// Free-form, passed through untouched (e.g. `--threads auto`).
    Raw,
}

/// One supported initialization option.
#[derive(Debug)]
pub struct OptionDescriptor {
    /// Option name as it appears after the `--julia-` CLI prefix.
    pub name: &'static str,
    /// The Julia flag the value maps to in `as_args`.
    pub julia_flag: &'static str,
    /// Placeholder shown in `--help`.
    pub value_name: &'static str,
    pub help: &'static str,
    pub kind: ValueKind,
}

const YES_NO: &[&str] = &["yes", "no"];

/// The supported options, consulted uniformly at registration and read time.
pub const SUPPORTED_OPTIONS: &[OptionDescriptor] = &[
    OptionDescriptor {
        name: "sysimage",
        julia_flag: "--sysimage",
        value_name: "PATH",
        help: "System image file to load.",
        kind: ValueKind::Path,
    },
    OptionDescriptor {
        name: "bindir",
        julia_flag: "--home",
        value_name: "DIR",
        help: "Directory containing the runtime executable.",
        kind: ValueKind::Path,
    },
    OptionDescriptor {
        name: "compiled-modules",
        julia_flag: "--compiled-modules",
        value_name: "yes|no",
        help: "Enable or disable the incremental precompilation cache.",
        kind: ValueKind::Choice(YES_NO),
    },
    OptionDescriptor {
        name: "depwarn",
        julia_flag: "--depwarn",
        value_name: "yes|no|error",
        help: "Deprecation warning mode.",
        kind: ValueKind::Choice(&["yes", "no", "error"]),
    },
    OptionDescriptor {
        name: "warn-overwrite",
        julia_flag: "--warn-overwrite",
        value_name: "yes|no",
        help: "Warn on method overwrites.",
        kind: ValueKind::Choice(YES_NO),
    },
    OptionDescriptor {
        name: "optimize",
        julia_flag: "--optimize",
        value_name: "N",
        help: "Optimization level (0-3).",
        kind: ValueKind::Int { min: 0, max: 3 },
    },
    OptionDescriptor {
        name: "min-optlevel",
        julia_flag: "--min-optlevel",
        value_name: "N",
        help: "Lower bound on the optimization level (0-3).",
        kind: ValueKind::Int { min: 0, max: 3 },
    },
    OptionDescriptor {
        name: "inline",
        julia_flag: "--inline",
        value_name: "yes|no",
        help: "Permit inlining.",
        kind: ValueKind::Choice(YES_NO),
    },
    OptionDescriptor {
        name: "check-bounds",
        julia_flag: "--check-bounds",
        value_name: "yes|no|auto",
        help: "Bounds-checking mode.",
        kind: ValueKind::Choice(&["yes", "no", "auto"]),
    },
    OptionDescriptor {
        name: "threads",
        julia_flag: "--threads",
        value_name: "N|auto",
        help: "Number of runtime threads.",
        kind: ValueKind::Raw,
    },
];

impl OptionDescriptor {
    /// Flag name including the `julia-` prefix, as registered on the CLI.
    pub fn cli_flag(&self) -> String {
        format!("julia-{}", self.name)
    }

    /// Validate a user-supplied value against this descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] when the value does not fit the
    /// descriptor's [`ValueKind`].
    pub fn validate(&self, value: &str) -> Result<()> {
        match self.kind {
            ValueKind::Choice(choices) => {
                if choices.contains(&value) {
                    Ok(())
                } else {
                    Err(Error::invalid_option(
                        self.name,
                        value,
                        format!("expected one of: {}", choices.join(", ")),
                    ))
                }
            },
            ValueKind::Int { min, max } => match value.parse::<u64>() {
                Ok(n) if n >= min && n <= max => Ok(()),
                _ => Err(Error::invalid_option(
                    self.name,
                    value,
                    format!("expected an integer in {min}..={max}"),
                )),
            },
            ValueKind::Path | ValueKind::Raw => Ok(()),
        }
    }
}

/// Look up a descriptor by option name.
pub fn descriptor(name: &str) -> Option<&'static OptionDescriptor> {
    SUPPORTED_OPTIONS.iter().find(|d| d.name == name)
}

/// Option values supplied for one session.
///
/// Only options that were explicitly set are stored; an empty set is the
/// default setup.
#[derive(Debug, Default, Clone)]
pub struct SessionOptions {
    values: Vec<(&'static str, String)>,
}

impl SessionOptions {
    /// Set an option after validating the value against its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for an unknown option name or a
    /// value the descriptor rejects.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let desc = descriptor(name)
            .ok_or_else(|| Error::invalid_option(name, value, "unknown option"))?;
        desc.validate(value)?;
        match self.values.iter_mut().find(|(n, _)| *n == desc.name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.values.push((desc.name, value.to_string())),
        }
        Ok(())
    }

    /// Value of an option, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// True if no option was set; part of the default-setup computation.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.values.is_empty()
    }

    /// True unless the precompilation cache was explicitly disabled.
    #[must_use]
    pub fn compiled_modules_enabled(&self) -> bool {
        self.get("compiled-modules") != Some("no")
    }

    /// Runtime argv fragments for the set options, in insertion order.
    #[must_use]
    pub fn as_args(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|(name, value)| {
                // Descriptor lookup cannot fail: `set` only stores known names.
                let flag = descriptor(name).map_or(*name, |d| d.julia_flag);
                format!("{flag}={value}")
            })
            .collect()
    }
}
