//! Minimal runner for suites consuming the gate.
//!
//! Used from `harness = false` test binaries: declare [`TestCase`]s, hand
//! them to [`run`] together with the process argv, and exit with the
//! returned code. The runner owns the session lifecycle: parse flags, start
//! the session once, apply the per-test check, report a summary.

use std::ffi::OsString;
use std::process::ExitCode;

use crate::cli;
use crate::session::{Marks, Session};

/// One test in a gated suite.
pub struct TestCase {
    pub name: &'static str,
    pub marks: Marks,
    pub run: fn(&Session) -> anyhow::Result<()>,
}

impl TestCase {
    #[must_use]
    pub const fn new(name: &'static str, marks: Marks, run: fn(&Session) -> anyhow::Result<()>) -> Self {
        Self { name, marks, run }
    }
}

/// Outcome counts for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.failed > 0 {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

/// Install the stdout logging subscriber (`RUST_LOG`-style filter, default
/// `info`). Idempotent so in-process tests can call it repeatedly.
pub fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

/// Parse argv, start the session once, and run the cases.
///
/// Exit codes: clap's own for usage/help, the session error's
/// [`crate::error::Error::exit_code`] when start fails (1 for the
/// compatibility abort), otherwise success unless a case failed.
pub fn run<I, T>(args: I, cases: &[TestCase]) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match cli::command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => {
            let code = u8::try_from(err.exit_code()).unwrap_or(2);
            let _ = err.print();
            return ExitCode::from(code);
        },
    };

    init_logging();

    let config = match cli::session_config_from_matches(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(err.exit_code());
        },
    };

    let session = Session::new(config);
    if let Err(err) = session.start() {
        eprintln!("error: {err}");
        return ExitCode::from(err.exit_code());
    }

    let filter = matches.get_one::<String>("filter").map(String::as_str);
    let summary = run_cases(&session, filter, cases);
    println!(
        "\n{} passed, {} failed, {} skipped",
        summary.passed, summary.failed, summary.skipped
    );
    summary.exit_code()
}

/// Run the cases against a started session, honoring an optional name filter.
pub fn run_cases(session: &Session, filter: Option<&str>, cases: &[TestCase]) -> Summary {
    let mut summary = Summary::default();

    for case in cases {
        if let Some(needle) = filter
            && !case.name.contains(needle)
        {
            continue;
        }

        match session.check(&case.marks) {
            Some(skip) => {
                summary.skipped += 1;
                println!("skip {} ({skip})", case.name);
            },
            None => match (case.run)(session) {
                Ok(()) => {
                    summary.passed += 1;
                    println!("ok   {}", case.name);
                },
                Err(err) => {
                    summary.failed += 1;
                    println!("FAIL {}: {err:#}", case.name);
                },
            },
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;

    fn pass(_: &Session) -> anyhow::Result<()> {
        Ok(())
    }

    fn fail(_: &Session) -> anyhow::Result<()> {
        anyhow::bail!("boom")
    }

    fn disabled_session() -> Session {
        let config = SessionConfig {
            enabled: false,
            ..SessionConfig::default()
        };
        let session = Session::new(config);
        session.start().unwrap();
        session
    }

    #[test]
    fn test_runtime_marked_cases_skip_when_disabled() {
        let cases = [
            TestCase::new("needs_runtime", Marks::runtime(), pass),
            TestCase::new("plain", Marks::none(), pass),
        ];
        let summary = run_cases(&disabled_session(), None, &cases);
        assert_eq!(
            summary,
            Summary {
                passed: 1,
                failed: 0,
                skipped: 1
            }
        );
    }

    #[test]
    fn test_failures_counted() {
        let cases = [
            TestCase::new("good", Marks::none(), pass),
            TestCase::new("bad", Marks::none(), fail),
        ];
        let summary = run_cases(&disabled_session(), None, &cases);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_name_filter() {
        let cases = [
            TestCase::new("alpha_one", Marks::none(), pass),
            TestCase::new("beta_two", Marks::none(), pass),
        ];
        let summary = run_cases(&disabled_session(), Some("beta"), &cases);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.skipped, 0);
    }
}
