//! Command line interface for kodegen_artifact_cache.
//!
//! Argument parsing, colored console output, and the top-level run that ties
//! the manifest, publisher, and batch runner together.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
