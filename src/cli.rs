//! CLI argument definitions.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

use crate::report::{Mode, Operation};

/// Top-level CLI parser for `dotlink`.
#[derive(Debug, Parser)]
#[command(
    name = "dotlink",
    version,
    about = "Link a repository's assistant configuration into ~/.claude and ~/.codex"
)]
pub struct Cli {
    /// Show what would change without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,

    /// Remove links and restore the most recent backups.
    #[arg(long)]
    pub undo: bool,

    /// Print the state of every binding and exit.
    #[arg(long, conflicts_with_all = ["dry_run", "undo"])]
    pub status: bool,

    /// Also link discovered skills into ~/.codex/skills.
    #[arg(long, env = "DOTLINK_CODEX", value_parser = BoolishValueParser::new())]
    pub codex: bool,

    /// Repository root holding the configuration [default: current directory].
    #[arg(long, value_name = "DIR", env = "DOTLINK_SOURCE")]
    pub source: Option<PathBuf>,

    /// Manifest to use instead of `<source>/dotlink.yaml` or the built-in one.
    #[arg(long, value_name = "FILE", env = "DOTLINK_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Apply or dry run.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Apply
        }
    }

    /// Establish or undo.
    #[must_use]
    pub fn operation(&self) -> Operation {
        if self.undo {
            Operation::Undo
        } else {
            Operation::Establish
        }
    }
}
