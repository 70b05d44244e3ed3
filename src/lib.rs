pub use crate::errors::HarnessError;

pub mod cli;
pub mod client;
pub mod discovery;
pub mod errors;
pub mod runner;
