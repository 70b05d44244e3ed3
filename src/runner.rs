//! Suite execution.
//!
//! Ties the pieces together: discover the test scripts, shuffle them into a
//! random order, run each one through the external client, classify the
//! outcome, and stream results to the reporter. Execution is strictly
//! sequential, one client process at a time.
//!
//! All tallying happens in a [`RunSummary`] local to [`run_suite`] and
//! returned to the caller; an `Err` from this module always means the
//! harness itself could not run, never that a test failed.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::cli::output::Reporter;
use crate::client::{ClientOutput, ClientRunner, ClientStatus};
use crate::discovery::{CaseDiscoverer, ScriptCase};
use crate::errors::HarnessError;

// Using a concrete, seedable PRNG so --seed reproduces an order exactly.
type ShuffleRng = Xoshiro256StarStar;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Environment variable consulted when no --client flag is given.
pub const CLIENT_ENV_VAR: &str = "NUTRUNNER_CLIENT";

/// Fallback client location, relative to the harness's working directory.
const DEFAULT_CLIENT: &str = "./client";

/// Configuration for one harness run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory scanned for test scripts; also the client's working directory.
    pub test_dir: PathBuf,
    /// The external client executable.
    pub client: PathBuf,
    /// Test script extension, without the leading dot.
    pub extension: String,
    /// Per-test time limit.
    pub timeout: Duration,
    /// Shuffle seed; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Echo captured client output beneath failing result lines.
    pub verbose: bool,
    pub use_colors: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            test_dir: PathBuf::from("."),
            client: PathBuf::from(DEFAULT_CLIENT),
            extension: "nut".to_string(),
            timeout: Duration::from_secs(300),
            seed: None,
            verbose: false,
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

/// Picks the client executable: the flag wins, then the environment
/// variable, then the default sibling path.
pub fn resolve_client(flag: Option<PathBuf>) -> PathBuf {
    resolve_client_from(flag, env::var_os(CLIENT_ENV_VAR))
}

fn resolve_client_from(flag: Option<PathBuf>, env_value: Option<OsString>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Some(value) = env_value {
        if !value.is_empty() {
            return PathBuf::from(value);
        }
    }
    PathBuf::from(DEFAULT_CLIENT)
}

// =============================================================================
// CORE TYPES
// =============================================================================

/// Outcome of one executed test script.
///
/// Passing tests drop their captured client output here; failures and
/// timeouts keep it so the reporter can echo it under --verbose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Pass { name: String },
    Fail { name: String, output: String },
    Timeout { name: String, output: String },
}

impl TestResult {
    pub fn name(&self) -> &str {
        match self {
            TestResult::Pass { name }
            | TestResult::Fail { name, .. }
            | TestResult::Timeout { name, .. } => name,
        }
    }

    /// The classification printed on the result line.
    pub fn label(&self) -> &'static str {
        match self {
            TestResult::Pass { .. } => "PASS",
            TestResult::Fail { .. } => "FAIL",
            TestResult::Timeout { .. } => "TIMEOUT",
        }
    }
}

/// Aggregate counts for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &TestResult) {
        match result {
            TestResult::Pass { .. } => self.passed += 1,
            TestResult::Fail { .. } => self.failed += 1,
            TestResult::Timeout { .. } => self.timed_out += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.timed_out
    }

    /// Pass rate in percent. Defined as zero for an empty run.
    pub fn percentage(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        100.0 * self.passed as f64 / self.total() as f64
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.timed_out == 0
    }
}

// =============================================================================
// SUITE EXECUTION
// =============================================================================

/// Runs the whole suite: discover, shuffle, execute, report.
///
/// Per-test failures are recorded in the summary and never abort the run.
pub fn run_suite(
    config: &HarnessConfig,
    reporter: &mut Reporter,
) -> Result<RunSummary, HarnessError> {
    let runner = ClientRunner::new(&config.client, &config.test_dir, config.timeout)?;
    let discoverer = CaseDiscoverer::new(&config.extension)?;

    let mut cases = discoverer.discover(&config.test_dir)?;
    let mut summary = RunSummary::default();

    if cases.is_empty() {
        reporter.no_scripts(&config.test_dir, &config.extension)?;
        reporter.summary(&summary)?;
        return Ok(summary);
    }

    shuffle_cases(&mut cases, config.seed);

    for case in &cases {
        let output = runner.run(&case.name)?;
        let result = classify(&case.name, output);
        summary.record(&result);
        reporter.case(&result, config.verbose)?;
    }

    reporter.summary(&summary)?;
    Ok(summary)
}

/// Shuffles the execution order with a uniform permutation.
fn shuffle_cases(cases: &mut [ScriptCase], seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => ShuffleRng::seed_from_u64(seed),
        None => ShuffleRng::from_entropy(),
    };
    cases.shuffle(&mut rng);
}

/// Maps one client invocation onto the test's outcome.
///
/// A client killed by a signal counts as FAIL like any non-zero exit; only
/// the harness's own timeout kill is classified separately.
fn classify(name: &str, output: ClientOutput) -> TestResult {
    match output.status {
        ClientStatus::Exited(0) => TestResult::Pass {
            name: name.to_string(),
        },
        ClientStatus::Exited(_) | ClientStatus::Killed => TestResult::Fail {
            name: name.to_string(),
            output: output.combined,
        },
        ClientStatus::TimedOut => TestResult::Timeout {
            name: name.to_string(),
            output: output.combined,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cases(names: &[&str]) -> Vec<ScriptCase> {
        names
            .iter()
            .map(|name| ScriptCase {
                name: name.to_string(),
                path: PathBuf::from(name),
            })
            .collect()
    }

    fn output(status: ClientStatus) -> ClientOutput {
        ClientOutput {
            status,
            combined: "captured".to_string(),
        }
    }

    #[test]
    fn classify_maps_exit_status_to_outcome() {
        assert_eq!(
            classify("t", output(ClientStatus::Exited(0))),
            TestResult::Pass {
                name: "t".to_string()
            }
        );
        assert_eq!(
            classify("t", output(ClientStatus::Exited(3))),
            TestResult::Fail {
                name: "t".to_string(),
                output: "captured".to_string()
            }
        );
        assert_eq!(
            classify("t", output(ClientStatus::Killed)),
            TestResult::Fail {
                name: "t".to_string(),
                output: "captured".to_string()
            }
        );
        assert_eq!(
            classify("t", output(ClientStatus::TimedOut)),
            TestResult::Timeout {
                name: "t".to_string(),
                output: "captured".to_string()
            }
        );
    }

    #[test]
    fn labels_match_classification() {
        let pass = classify("t", output(ClientStatus::Exited(0)));
        let fail = classify("t", output(ClientStatus::Exited(1)));
        let timeout = classify("t", output(ClientStatus::TimedOut));
        assert_eq!(pass.label(), "PASS");
        assert_eq!(fail.label(), "FAIL");
        assert_eq!(timeout.label(), "TIMEOUT");
    }

    #[test]
    fn summary_records_each_outcome() {
        let mut summary = RunSummary::default();
        summary.record(&classify("a", output(ClientStatus::Exited(0))));
        summary.record(&classify("b", output(ClientStatus::Exited(1))));
        summary.record(&classify("c", output(ClientStatus::TimedOut)));
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.timed_out, 1);
        assert_eq!(summary.total(), 3);
        assert!(!summary.all_passed());
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        let half = RunSummary {
            passed: 1,
            failed: 1,
            timed_out: 0,
        };
        assert_eq!(format!("{:.2}", half.percentage()), "50.00");

        let third = RunSummary {
            passed: 1,
            failed: 2,
            timed_out: 0,
        };
        assert_eq!(format!("{:.2}", third.percentage()), "33.33");

        let two_thirds = RunSummary {
            passed: 2,
            failed: 0,
            timed_out: 1,
        };
        assert_eq!(format!("{:.2}", two_thirds.percentage()), "66.67");
    }

    #[test]
    fn empty_run_has_defined_percentage() {
        let empty = RunSummary::default();
        assert_eq!(empty.total(), 0);
        assert_eq!(format!("{:.2}", empty.percentage()), "0.00");
        assert!(empty.all_passed());
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let original = cases(&["a", "b", "c", "d", "e", "f"]);

        let mut first = original.clone();
        let mut second = original.clone();
        shuffle_cases(&mut first, Some(7));
        shuffle_cases(&mut second, Some(7));
        assert_eq!(first, second);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let original = cases(&["a", "b", "c", "d", "e", "f"]);
        let mut shuffled = original.clone();
        shuffle_cases(&mut shuffled, None);

        shuffled.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(shuffled, original);
    }

    #[test]
    fn client_flag_wins_over_environment() {
        let resolved = resolve_client_from(
            Some(PathBuf::from("/opt/flag-client")),
            Some(OsString::from("/opt/env-client")),
        );
        assert_eq!(resolved, PathBuf::from("/opt/flag-client"));
    }

    #[test]
    fn environment_wins_over_default() {
        let resolved = resolve_client_from(None, Some(OsString::from("/opt/env-client")));
        assert_eq!(resolved, PathBuf::from("/opt/env-client"));
    }

    #[test]
    fn empty_environment_value_falls_back_to_default() {
        assert_eq!(
            resolve_client_from(None, Some(OsString::new())),
            PathBuf::from(DEFAULT_CLIENT)
        );
        assert_eq!(resolve_client_from(None, None), PathBuf::from(DEFAULT_CLIENT));
    }
}
