//! Terminal output formatting for gate diagnostics.

/// Width of error box separators.
const ERROR_BOX_WIDTH: usize = 60;

/// Print an error box with a title and numbered remediation hints to stderr.
///
/// ```text
/// ============================================================
/// <title>
/// ============================================================
///
/// 1. <hint>
/// ...
/// ```
pub fn print_error_box_with_hints(title: &str, hints: &[&str]) {
    eprintln!("\n{}", "=".repeat(ERROR_BOX_WIDTH));
    eprintln!("{title}");
    eprintln!("{}", "=".repeat(ERROR_BOX_WIDTH));

    for (i, hint) in hints.iter().enumerate() {
        eprintln!("\n{}. {hint}", i + 1);
    }
    eprintln!();
}
