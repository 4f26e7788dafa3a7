use crate::extract::ExtractSummary;
use crate::rewrite::FixSummary;
use chrono::Local;
use std::path::Path;

/// Module tag used in operator-facing log lines.
const TAG: &str = "zig_guide_tools";

fn log_line(level: &str, message: &str) {
    eprintln!(
        "{} [{}] ({}): {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level,
        TAG,
        message
    );
}

/// Prints an always-visible status line to stderr, regardless of log level.
pub fn info(message: &str) {
    log_line("INFO", message);
}

/// Prints an error line to stderr. Used for per-item failures inside a
/// batch; fatal errors are printed by the binary on exit instead.
pub fn error(message: &str) {
    log_line("ERROR", message);
}

/// Prints a warning line to stderr.
pub fn warn(message: &str) {
    log_line("WARN", message);
}

/// Final status line for an extraction run.
pub fn report_extract_summary(summary: &ExtractSummary, output_dir: &Path, dry_run: bool) {
    let mode = if dry_run { " (dry run)" } else { "" };
    info(&format!(
        "Extracted {} example(s) from {} document(s) into {}{}",
        summary.examples,
        summary.documents,
        output_dir.display(),
        mode
    ));
    if summary.errors > 0 {
        error(&format!(
            "{} document(s) could not be processed",
            summary.errors
        ));
    }
}

/// Final status line for a rewrite run.
pub fn report_fix_summary(summary: &FixSummary, dry_run: bool) {
    let verb = if dry_run { "Would fix" } else { "Fixed" };
    info(&format!(
        "{} {}/{} file(s), {} rewrite(s) applied",
        verb, summary.changed, summary.files, summary.applications
    ));
    if summary.warnings > 0 {
        warn(&format!(
            "{} call site(s) skipped as undecidable - see warnings above",
            summary.warnings
        ));
    }
    if summary.errors > 0 {
        error(&format!("{} file(s) could not be processed", summary.errors));
    }
}
