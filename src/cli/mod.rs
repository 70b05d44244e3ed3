//! The nutrunner command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::Path;
use std::time::Duration;

use clap::Parser;

use crate::cli::args::{Command, NutrunnerArgs};
use crate::cli::output::Reporter;
use crate::discovery::CaseDiscoverer;
use crate::errors::HarnessError;
use crate::runner::{self, HarnessConfig};

pub mod args;
pub mod output;

/// Exit code when every test passed (or none were found).
pub const EXIT_OK: i32 = 0;
/// Exit code when at least one test failed or timed out.
pub const EXIT_SUITE_FAILED: i32 = 1;
/// Exit code when the harness itself could not run.
pub const EXIT_HARNESS_ERROR: i32 = 2;

/// The main entry point for the CLI. Returns the process exit code.
pub fn run() -> i32 {
    let args = NutrunnerArgs::parse();

    let result = match args.command {
        Command::Run {
            dir,
            client,
            seed,
            timeout,
            extension,
            verbose,
        } => {
            let config = HarnessConfig {
                test_dir: dir,
                client: runner::resolve_client(client),
                extension,
                timeout: Duration::from_secs(timeout),
                seed,
                verbose,
                ..HarnessConfig::default()
            };
            handle_run(&config)
        }
        Command::List { dir, extension } => handle_list(&dir, &extension),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            let report = miette::Report::new(error);
            eprintln!("{report:?}");
            EXIT_HARNESS_ERROR
        }
    }
}

/// Handles the `run` subcommand.
fn handle_run(config: &HarnessConfig) -> Result<i32, HarnessError> {
    let mut reporter = Reporter::new(config.use_colors);
    let summary = runner::run_suite(config, &mut reporter)?;
    if summary.all_passed() {
        Ok(EXIT_OK)
    } else {
        Ok(EXIT_SUITE_FAILED)
    }
}

/// Handles the `list` subcommand.
fn handle_list(dir: &Path, extension: &str) -> Result<i32, HarnessError> {
    let mut reporter = Reporter::new(atty::is(atty::Stream::Stdout));
    let cases = CaseDiscoverer::new(extension)?.discover(dir)?;
    reporter.listing(&cases)?;
    Ok(EXIT_OK)
}
