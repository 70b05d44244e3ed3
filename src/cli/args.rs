//! Defines the command-line arguments and subcommands for the nutrunner CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "nutrunner",
    version,
    about = "A black-box test harness that drives an external test client."
)]
pub struct NutrunnerArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover and run all test scripts in a directory.
    Run {
        /// The directory containing the test scripts.
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Path to the test client executable.
        #[arg(long)]
        client: Option<PathBuf>,

        /// Seed for the execution-order shuffle, for reproducible runs.
        #[arg(long)]
        seed: Option<u64>,

        /// Per-test time limit in seconds.
        #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: u64,

        /// Test script extension, without the leading dot.
        #[arg(long, default_value = "nut")]
        extension: String,

        /// Echo the captured client output beneath failing result lines.
        #[arg(short, long)]
        verbose: bool,
    },
    /// List the discovered test scripts without running them.
    List {
        /// The directory containing the test scripts.
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Test script extension, without the leading dot.
        #[arg(long, default_value = "nut")]
        extension: String,
    },
}
