//! Handles all user-facing output for the CLI.
//!
//! Result lines and the final summary go to stdout; notes and diagnostics
//! go to stderr. By centralizing the printing here, the run loop stays free
//! of formatting decisions.

use std::io::{self, Write};
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::discovery::ScriptCase;
use crate::runner::{RunSummary, TestResult};

// ============================================================================
// REPORTER: streaming result lines and the final summary
// ============================================================================

/// Writes per-test result lines, notes, and the final summary.
pub struct Reporter {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl Reporter {
    /// Builds a reporter. Callers decide color enablement (tty detection
    /// happens at configuration time, not here).
    pub fn new(use_colors: bool) -> Self {
        let choice = if use_colors {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    /// Prints one streaming result line: `<script name>: <label>`.
    ///
    /// Under `verbose`, the captured client output of a failing test follows
    /// the result line, indented. Passing tests never echo their output.
    pub fn case(&mut self, result: &TestResult, verbose: bool) -> io::Result<()> {
        write!(self.stdout, "{}: ", result.name())?;
        let _ = self
            .stdout
            .set_color(ColorSpec::new().set_fg(Some(label_color(result))).set_bold(true));
        write!(self.stdout, "{}", result.label())?;
        let _ = self.stdout.reset();
        writeln!(self.stdout)?;

        if verbose {
            if let TestResult::Fail { output, .. } | TestResult::Timeout { output, .. } = result {
                for line in output.lines().filter(|line| !line.trim().is_empty()) {
                    writeln!(self.stdout, "    {}", line)?;
                }
            }
        }
        Ok(())
    }

    /// Prints the final summary: a blank line, then `FINISHED <pass>/<total>: <pct>%`.
    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        writeln!(self.stdout)?;
        let color = if summary.all_passed() {
            Color::Green
        } else {
            Color::Red
        };
        let _ = self
            .stdout
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        writeln!(
            self.stdout,
            "FINISHED {}/{}: {:.2}%",
            summary.passed,
            summary.total(),
            summary.percentage()
        )?;
        let _ = self.stdout.reset();
        Ok(())
    }

    /// Notes an empty suite on stderr.
    pub fn no_scripts(&mut self, dir: &Path, extension: &str) -> io::Result<()> {
        let _ = self
            .stderr
            .set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        writeln!(
            self.stderr,
            "no test scripts found in {} (expected names like 1.0_example.{})",
            dir.display(),
            extension
        )?;
        let _ = self.stderr.reset();
        Ok(())
    }

    /// Prints discovered script names, one per line, in sorted order.
    pub fn listing(&mut self, cases: &[ScriptCase]) -> io::Result<()> {
        for case in cases {
            writeln!(self.stdout, "{}", case.name)?;
        }
        Ok(())
    }
}

fn label_color(result: &TestResult) -> Color {
    match result {
        TestResult::Pass { .. } => Color::Green,
        TestResult::Fail { .. } => Color::Red,
        TestResult::Timeout { .. } => Color::Yellow,
    }
}
