//! Per-binding outcomes and the run report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::binding::Binding;
use crate::error::{ReconcileError, Severity};

/// Whether mutations are carried out or only described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Mutate the filesystem.
    Apply,
    /// Describe what would happen; write nothing.
    DryRun,
}

impl Mode {
    /// `true` when mutations should actually happen.
    #[must_use]
    pub fn applies(self) -> bool {
        self == Self::Apply
    }
}

/// Which operation a run performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Bring targets into line with their sources.
    Establish,
    /// Remove links and restore backups.
    Undo,
}

/// What happened (or would happen) to a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// The target already links to the source.
    AlreadyLinked,
    /// A new symlink was created in an empty slot.
    Linked,
    /// A real entry was moved aside, then the symlink created.
    BackedUpAndLinked {
        /// Where the displaced entry went.
        backup: PathBuf,
    },
    /// A fresh executable copy was written.
    Copied,
    /// The copy target already matches the source byte for byte.
    CopyUpToDate,
    /// The old copy was saved, then replaced with a fresh executable copy.
    BackedUpAndCopied {
        /// Where the old copy went.
        backup: PathBuf,
    },
    /// The symlink was removed and a backup moved back into place.
    Restored {
        /// The backup that was restored.
        backup: PathBuf,
        /// Where the removed link pointed.
        removed_link: PathBuf,
    },
    /// Undo found no symlink at the target.
    NotALink,
}

/// How an action counts in the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tally {
    Changed,
    Unchanged,
    Skipped,
}

impl Action {
    fn tally(&self) -> Tally {
        match self {
            Self::Linked
            | Self::BackedUpAndLinked { .. }
            | Self::Copied
            | Self::BackedUpAndCopied { .. }
            | Self::Restored { .. } => Tally::Changed,
            Self::AlreadyLinked | Self::CopyUpToDate => Tally::Unchanged,
            Self::NotALink => Tally::Skipped,
        }
    }

    /// Report wording for this action.
    #[must_use]
    pub fn describe(&self, mode: Mode, source: &Path) -> String {
        let dry = mode == Mode::DryRun;
        match self {
            Self::AlreadyLinked => "already linked".to_string(),
            Self::Linked if dry => format!("would link -> {}", source.display()),
            Self::Linked => format!("linked -> {}", source.display()),
            Self::BackedUpAndLinked { backup } if dry => {
                format!("would back up to {} and link", backup.display())
            }
            Self::BackedUpAndLinked { backup } => {
                format!("backed up to {}, linked", backup.display())
            }
            Self::Copied if dry => "would copy".to_string(),
            Self::Copied => "copied".to_string(),
            Self::CopyUpToDate => "up to date".to_string(),
            Self::BackedUpAndCopied { backup } if dry => {
                format!("differs, would back up to {} and copy", backup.display())
            }
            Self::BackedUpAndCopied { backup } => {
                format!("differed, backed up to {}, copied", backup.display())
            }
            Self::Restored { backup, removed_link } => {
                let mut line = if dry {
                    format!("would remove link and restore {}", backup.display())
                } else {
                    format!("removed link, restored {}", backup.display())
                };
                if removed_link != source {
                    let _ = write!(line, " (link pointed at {})", removed_link.display());
                }
                line
            }
            Self::NotALink => "not a symlink, skipping".to_string(),
        }
    }
}

/// The outcome of one binding.
#[derive(Debug, Clone, Serialize)]
pub struct BindingReport {
    /// Display name.
    pub name: String,
    /// Source path.
    pub source: PathBuf,
    /// Target path.
    pub target: PathBuf,
    /// What happened.
    pub outcome: Result<Action, ReconcileError>,
}

impl BindingReport {
    /// Pairs a binding with its outcome.
    #[must_use]
    pub fn new(binding: &Binding, outcome: Result<Action, ReconcileError>) -> Self {
        Self {
            name: binding.name(),
            source: binding.source.clone(),
            target: binding.target.clone(),
            outcome,
        }
    }

    fn symbol(&self, mode: Mode) -> &'static str {
        match &self.outcome {
            Ok(action) => match (action.tally(), mode) {
                (Tally::Changed, Mode::Apply) => "✓",
                (Tally::Changed, Mode::DryRun) => "→",
                (Tally::Unchanged, _) => "·",
                (Tally::Skipped, _) => "-",
            },
            Err(err) => match err.severity() {
                Severity::Skip => "-",
                Severity::Warning => "⚠",
                Severity::Failure => "✗",
            },
        }
    }

    /// One human-readable status line.
    #[must_use]
    pub fn line(&self, mode: Mode) -> String {
        let message = match &self.outcome {
            Ok(action) => action.describe(mode, &self.source),
            Err(err) => err.describe(mode),
        };
        format!("  {} {}: {message}", self.symbol(mode), self.name)
    }
}

/// Counts for the closing summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Bindings changed (or that would change).
    pub changed: usize,
    /// Bindings already in the desired state.
    pub unchanged: usize,
    /// Bindings skipped.
    pub skipped: usize,
    /// Bindings needing attention.
    pub warnings: usize,
    /// Bindings that failed.
    pub failed: usize,
}

/// Aggregated outcome of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// What was run.
    pub operation: Operation,
    /// Apply or dry run.
    pub mode: Mode,
    /// One entry per binding, in processing order.
    pub entries: Vec<BindingReport>,
}

impl RunReport {
    /// An empty report.
    #[must_use]
    pub fn new(operation: Operation, mode: Mode) -> Self {
        Self { operation, mode, entries: Vec::new() }
    }

    /// Appends an outcome.
    pub fn push(&mut self, entry: BindingReport) {
        self.entries.push(entry);
    }

    /// Folds the entries into counts.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for entry in &self.entries {
            match &entry.outcome {
                Ok(action) => match action.tally() {
                    Tally::Changed => summary.changed += 1,
                    Tally::Unchanged => summary.unchanged += 1,
                    Tally::Skipped => summary.skipped += 1,
                },
                Err(err) => match err.severity() {
                    Severity::Skip => summary.skipped += 1,
                    Severity::Warning => summary.warnings += 1,
                    Severity::Failure => summary.failed += 1,
                },
            }
        }
        summary
    }

    /// The entry for `target`, if one was recorded.
    #[must_use]
    pub fn entry(&self, target: &Path) -> Option<&BindingReport> {
        self.entries.iter().find(|e| e.target == target)
    }

    /// Status lines plus the summary line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.line(self.mode));
            out.push('\n');
        }
        let s = self.summary();
        let (lead, verb) = match (self.mode, self.operation) {
            (Mode::DryRun, _) => ("Dry run", "would change"),
            (Mode::Apply, Operation::Establish) => ("Done", "changed"),
            (Mode::Apply, Operation::Undo) => ("Undone", "changed"),
        };
        let _ = writeln!(
            out,
            "\n{lead}: {} {verb}, {} unchanged, {} skipped, {} warning(s), {} failed.",
            s.changed, s.unchanged, s.skipped, s.warnings, s.failed
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingKind;

    fn skills() -> Binding {
        Binding::link("/repo/skills", "/home/.claude/skills", BindingKind::Dir)
    }

    #[test]
    fn lines_carry_mode_specific_symbols() {
        let entry = BindingReport::new(&skills(), Ok(Action::Linked));
        assert_eq!(entry.line(Mode::Apply), "  ✓ skills: linked -> /repo/skills");
        assert_eq!(entry.line(Mode::DryRun), "  → skills: would link -> /repo/skills");

        let skipped = BindingReport::new(
            &skills(),
            Err(ReconcileError::MissingSource { path: PathBuf::from("/repo/skills") }),
        );
        assert_eq!(skipped.line(Mode::Apply), "  - skills: /repo/skills not in repo, skipping");
    }

    #[test]
    fn restore_line_flags_foreign_links() {
        let action = Action::Restored {
            backup: PathBuf::from("/home/.claude/skills.backup.20250101-000000"),
            removed_link: PathBuf::from("/other/skills"),
        };
        let line = action.describe(Mode::Apply, Path::new("/repo/skills"));
        assert!(line.contains("link pointed at /other/skills"));

        let own = Action::Restored {
            backup: PathBuf::from("/home/.claude/skills.backup.20250101-000000"),
            removed_link: PathBuf::from("/repo/skills"),
        };
        assert!(!own.describe(Mode::Apply, Path::new("/repo/skills")).contains("pointed at"));
    }

    #[test]
    fn summary_counts_every_entry_once() {
        let mut report = RunReport::new(Operation::Establish, Mode::Apply);
        report.push(BindingReport::new(&skills(), Ok(Action::Linked)));
        report.push(BindingReport::new(&skills(), Ok(Action::AlreadyLinked)));
        report.push(BindingReport::new(
            &skills(),
            Err(ReconcileError::ForeignSymlink { points_to: PathBuf::from("/x") }),
        ));
        report.push(BindingReport::new(
            &skills(),
            Err(ReconcileError::Io {
                operation: "rename".into(),
                path: PathBuf::from("/x"),
                message: "denied".into(),
            }),
        ));

        assert_eq!(
            report.summary(),
            Summary { changed: 1, unchanged: 1, skipped: 0, warnings: 1, failed: 1 }
        );
        assert!(report.render().ends_with(
            "Done: 1 changed, 1 unchanged, 0 skipped, 1 warning(s), 1 failed.\n"
        ));
    }

    #[test]
    fn json_shape_is_tagged() {
        let mut report = RunReport::new(Operation::Undo, Mode::DryRun);
        report.push(BindingReport::new(&skills(), Ok(Action::NotALink)));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["operation"], "undo");
        assert_eq!(json["mode"], "dry-run");
        assert_eq!(json["entries"][0]["outcome"]["Ok"]["action"], "not_a_link");
    }
}
