//! Core library entry for the `dotlink` CLI.
//!
//! Links the directories and files of an assistant configuration repository
//! into `~/.claude` (and optionally `~/.codex`), moving anything in the way
//! to a timestamped backup that `--undo` can restore.

pub mod adapters;
pub mod binding;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod linker;
pub mod logging;
pub mod manifest;
pub mod ports;
pub mod reconcile;
pub mod report;

pub use error::Error;

/// Run the CLI for already-parsed arguments.
///
/// # Errors
///
/// Returns an error when setup fails or any binding failed.
pub fn run(cli: &cli::Cli) -> Result<(), Error> {
    commands::dispatch(cli)
}
