//! End-to-end gate tests against a fake runtime executable.
//!
//! Each test writes its own shell script standing in for the Julia binary.
//! The script appends its argv to a log file (so tests can observe probe,
//! bootstrap, and eval invocations) and prints a canned probe response with
//! the version and compatibility baked in at write time, keeping the tests
//! parallel-safe.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};

use julia_gate::harness::{self, TestCase};
use julia_gate::{Error, Marks, Session, SessionConfig};
use tempfile::TempDir;

/// Write a fake runtime script into `dir`. Returns the script path and the
/// invocation log path.
fn fake_runtime(dir: &Path, version: &str, compatible: bool) -> (PathBuf, PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let log = dir.join("invocations.log");
    let script = dir.join("julia");
    // One log line per invocation: argv gets space-joined and embedded
    // newlines (the probe expression spans several) are flattened.
    let body = format!(
        "#!/bin/sh\n\
         printf '%s ' \"$@\" | tr '\\n' ' ' >> \"{log}\"\n\
         echo >> \"{log}\"\n\
         cat <<'EOF'\n\
         version: {version}\n\
         bindir: /opt/fake/bin\n\
         sysimage: /opt/fake/lib/julia/sys.so\n\
         libjulia: /opt/fake/lib/libjulia.so\n\
         pycall_compatible: {compatible}\n\
         EOF\n",
        log = log.display(),
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    (script, log)
}

fn invocations(log: &Path) -> Vec<String> {
    if !log.exists() {
        return Vec::new();
    }
    fs::read_to_string(log)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn disabled_gate_never_touches_the_runtime() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_runtime(dir.path(), "1.10.2", true);

    let config = SessionConfig {
        enabled: false,
        ..SessionConfig::new(&script)
    };
    let session = Session::new(config);
    session.start().unwrap();

    assert!(invocations(&log).is_empty(), "no discovery may occur");

    let skip = session.runtime().unwrap_err();
    assert_eq!(skip.reason(), "--no-julia is given");

    let cases = [
        TestCase::new("needs_runtime", Marks::runtime(), |s| {
            s.runtime().map_err(|e| anyhow::anyhow!("{e}"))?;
            Ok(())
        }),
        TestCase::new("standalone", Marks::none(), |_| Ok(())),
    ];
    let summary = harness::run_cases(&session, None, &cases);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 0);
}

#[test]
fn structured_init_probes_exactly_once() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_runtime(dir.path(), "1.10.2", true);

    let session = Session::new(SessionConfig::new(&script));
    session.start().unwrap();

    let calls = invocations(&log);
    assert_eq!(calls.len(), 1, "probe only: {calls:?}");
    assert!(calls[0].contains("--startup-file=no"));

    // Idempotent start does not probe again.
    session.start().unwrap();
    assert_eq!(invocations(&log).len(), 1);
}

#[test]
fn legacy_init_bootstraps_below_threshold() {
    let dir = TempDir::new().unwrap();
    // Incompatible python binding, but the version sits below the floor:
    // the legacy path proceeds regardless of compiled-modules.
    let (script, log) = fake_runtime(dir.path(), "0.6.4", false);

    let session = Session::new(SessionConfig::new(&script));
    session.start().unwrap();

    let calls = invocations(&log);
    assert_eq!(calls.len(), 2, "probe then bootstrap: {calls:?}");
    assert!(calls[1].contains("using PyCall"));
}

#[test]
fn incompatible_runtime_aborts_with_exit_one() {
    let dir = TempDir::new().unwrap();
    let (script, _log) = fake_runtime(dir.path(), "1.10.2", false);

    let session = Session::new(SessionConfig::new(&script));
    let err = session.start().unwrap_err();
    assert!(matches!(err, Error::Incompatible { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn disabling_compiled_modules_clears_the_abort() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_runtime(dir.path(), "1.10.2", false);

    let mut config = SessionConfig::new(&script);
    config.options.set("compiled-modules", "no").unwrap();
    let session = Session::new(config);
    session.start().unwrap();

    // The option travels on every later invocation of the handle.
    let runtime = session.runtime().unwrap();
    runtime.eval("1 + 1").unwrap();
    let calls = invocations(&log);
    assert!(calls.last().unwrap().contains("--compiled-modules=no"));
}

#[test]
fn fixtures_are_cached_per_session() {
    let dir = TempDir::new().unwrap();
    let (script, _log) = fake_runtime(dir.path(), "1.10.2", true);

    let session = Session::new(SessionConfig::new(&script));
    session.start().unwrap();

    let first = session.runtime().unwrap();
    let second = session.runtime().unwrap();
    assert!(std::ptr::eq(first, second));

    let info_a = session.info().unwrap();
    let info_b = session.info().unwrap();
    assert!(std::ptr::eq(info_a, info_b));
    assert_eq!(info_a.version, semver::Version::new(1, 10, 2));
    assert_eq!(info_a.bindir, PathBuf::from("/opt/fake/bin"));
}

#[test]
fn custom_runtime_is_not_default_setup() {
    let dir = TempDir::new().unwrap();
    let (script, _log) = fake_runtime(dir.path(), "1.10.2", true);

    let session = Session::new(SessionConfig::new(&script));
    session.start().unwrap();
    assert!(!session.using_default_setup());

    let cases = [
        TestCase::new("assumes_defaults", Marks::runtime().with_default_setup(), |_| Ok(())),
        TestCase::new("any_setup", Marks::runtime(), |_| Ok(())),
    ];
    let summary = harness::run_cases(&session, None, &cases);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.passed, 1);
}

#[test]
fn eval_runs_through_the_handle() {
    let dir = TempDir::new().unwrap();
    let (script, log) = fake_runtime(dir.path(), "1.10.2", true);

    let session = Session::new(SessionConfig::new(&script));
    session.start().unwrap();

    let out = session.runtime().unwrap().eval("println(42)").unwrap();
    assert!(out.contains("version: 1.10.2"), "fake echoes its canned output");
    assert!(invocations(&log).last().unwrap().contains("println(42)"));
}

#[test]
fn missing_executable_fails_session_start() {
    let missing = Path::new("/nonexistent/julia-gate/julia");
    let session = Session::new(SessionConfig::new(missing));
    let err = session.start().unwrap_err();
    assert!(matches!(err, Error::ProbeSpawn { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn broken_probe_output_is_a_typed_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let script = dir.path().join("julia");
    fs::write(&script, "#!/bin/sh\necho 'complete nonsense'\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let session = Session::new(SessionConfig::new(&script));
    let err = session.start().unwrap_err();
    assert!(matches!(err, Error::ProbeOutput(_)));
}

#[test]
fn failing_probe_surfaces_stderr() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let script = dir.path().join("julia");
    fs::write(&script, "#!/bin/sh\necho 'no libjulia here' >&2\nexit 3\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let session = Session::new(SessionConfig::new(&script));
    let err = session.start().unwrap_err();
    match err {
        Error::ProbeFailed { stderr, .. } => assert!(stderr.contains("no libjulia here")),
        other => panic!("expected ProbeFailed, got {other}"),
    }
}
