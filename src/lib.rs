//! julia-gate: session-level test gate for suites embedding a Julia runtime.
//!
//! The crate decides once per test session whether runtime-dependent tests
//! should run, initializes the runtime with user-supplied options, and
//! exposes the handle and its reported facts as session-scoped fixtures:
//!
//! - [`cli`] — registers `--no-julia`, `--julia-runtime`, and one flag per
//!   supported init option on a `clap::Command`.
//! - [`session`] — [`Session`]: start-once gate state, the `runtime`/`info`
//!   fixtures, and the per-test skip check.
//! - [`probe`] — [`RuntimeInfo`] discovery by querying the executable.
//! - [`runtime`] — the initialized [`Runtime`] handle with its
//!   version-dependent init strategies.
//! - [`harness`] — a minimal runner for `harness = false` test binaries.
//!
//! Skips are per-test and non-fatal; the one deliberate whole-run abort is
//! the incompatible-runtime diagnostic, surfaced on stderr with exit code 1.

pub mod cli;
pub mod constants;
pub mod error;
pub mod harness;
pub mod options;
pub mod probe;
pub mod runtime;
pub mod session;
pub mod ui;

pub use error::{Error, Result};
pub use harness::{Summary, TestCase};
pub use options::SessionOptions;
pub use probe::RuntimeInfo;
pub use runtime::{Runtime, Thresholds};
pub use session::{Marks, Session, SessionConfig, Skip};
