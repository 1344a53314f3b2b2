//! The link engine: establish, copy and undo for a single binding.
//!
//! Every operation re-reads the target's state before acting and keeps no
//! progress marker, so an interrupted run is finished by simply running
//! again. The [`Mode`] is threaded through each primitive: a dry run still
//! inspects the real state and picks real backup names, it just skips the
//! writes.

pub mod backup;
pub mod discovery;
pub mod plan;

use std::path::Path;

use serde::Serialize;

use crate::binding::{Binding, LinkState, Strategy};
use crate::context::ServiceContext;
use crate::error::ReconcileError;
use crate::ports::filesystem::EntryKind;
use crate::report::{Action, Mode};

use self::plan::{plan_establish, plan_undo, EstablishPlan, UndoPlan};

/// State of a copy binding's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyState {
    /// Nothing at the target.
    Absent,
    /// Same bytes as the source.
    Current,
    /// Something else is there.
    Differs,
}

/// What `--status` shows for one binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingStatus {
    /// The source is not in the repository.
    SourceMissing,
    /// A link binding and its target's state.
    Link {
        /// Observed state.
        state: LinkState,
    },
    /// A copy binding and its target's state.
    Copy {
        /// Observed state.
        state: CopyState,
    },
}

impl std::fmt::Display for BindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceMissing => write!(f, "source missing"),
            Self::Link { state } => write!(f, "{state}"),
            Self::Copy { state: CopyState::Absent } => write!(f, "copy missing"),
            Self::Copy { state: CopyState::Current } => write!(f, "copy current"),
            Self::Copy { state: CopyState::Differs } => write!(f, "copy differs"),
        }
    }
}

/// Brings binding targets into line with their sources.
pub struct LinkManager<'a> {
    ctx: &'a ServiceContext,
    mode: Mode,
}

impl<'a> LinkManager<'a> {
    /// A manager acting through `ctx` in the given mode.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, mode: Mode) -> Self {
        Self { ctx, mode }
    }

    /// The mode this manager runs in.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn require_source(&self, binding: &Binding) -> Result<(), ReconcileError> {
        if binding.source_present(self.ctx.fs.as_ref()) {
            Ok(())
        } else {
            Err(ReconcileError::MissingSource { path: binding.source.clone() })
        }
    }

    fn state(&self, binding: &Binding) -> Result<LinkState, ReconcileError> {
        LinkState::observe(self.ctx.fs.as_ref(), binding)
            .map_err(|e| ReconcileError::io("inspect", &binding.target, &e))
    }

    fn ensure_parent(&self, target: &Path) -> Result<(), ReconcileError> {
        let Some(parent) = target.parent() else {
            return Ok(());
        };
        if self.ctx.fs.is_dir(parent) {
            return Ok(());
        }
        self.ctx
            .fs
            .create_dir_all(parent)
            .map_err(|e| ReconcileError::io("create directory", parent, &e))
    }

    fn next_backup(&self, target: &Path) -> Result<std::path::PathBuf, ReconcileError> {
        backup::next_backup_path(self.ctx.fs.as_ref(), target, self.ctx.clock.now())
            .map_err(|e| ReconcileError::io("pick backup name for", target, &e))
    }

    /// Refuses a target whose real location is the source or lies under it,
    /// as happens when a parent such as `~/.claude` links into the repo.
    fn guard_against_source(&self, binding: &Binding) -> Result<(), ReconcileError> {
        let fs = self.ctx.fs.as_ref();
        let (Some(parent), Some(name)) = (binding.target.parent(), binding.target.file_name()) else {
            return Ok(());
        };
        if fs.entry_kind(parent).map_err(|e| ReconcileError::io("inspect", parent, &e))?.is_none() {
            return Ok(());
        }
        let resolved = fs
            .canonicalize(parent)
            .map_err(|e| ReconcileError::io("resolve", parent, &e))?
            .join(name);
        let source = fs
            .canonicalize(&binding.source)
            .map_err(|e| ReconcileError::io("resolve", &binding.source, &e))?;
        if resolved.starts_with(&source) {
            tracing::warn!(
                target_path = %binding.target.display(),
                resolved = %resolved.display(),
                "target lives inside the source"
            );
            return Err(ReconcileError::TargetInsideSource { resolved });
        }
        Ok(())
    }

    fn link(&self, binding: &Binding) -> Result<(), ReconcileError> {
        self.ctx
            .fs
            .symlink(&binding.source, &binding.target)
            .map_err(|e| ReconcileError::io("symlink", &binding.target, &e))
    }

    /// Makes the target a symlink to the source.
    ///
    /// A real entry in the way is renamed to a backup first. A symlink
    /// pointing anywhere else is left alone.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::MissingSource`], [`ReconcileError::ForeignSymlink`],
    /// or [`ReconcileError::Io`] when a filesystem call fails.
    pub fn establish(&self, binding: &Binding) -> Result<Action, ReconcileError> {
        self.require_source(binding)?;
        let state = self.state(binding)?;
        tracing::debug!(target_path = %binding.target.display(), ?state, "observed");

        match plan_establish(&state) {
            EstablishPlan::Keep => Ok(Action::AlreadyLinked),
            EstablishPlan::Refuse { points_to } => Err(ReconcileError::ForeignSymlink { points_to }),
            EstablishPlan::Displace => {
                self.guard_against_source(binding)?;
                let backup = self.next_backup(&binding.target)?;
                if self.mode.applies() {
                    self.ctx
                        .fs
                        .rename(&binding.target, &backup)
                        .map_err(|e| ReconcileError::io("back up", &binding.target, &e))?;
                    tracing::info!(backup = %backup.display(), "moved existing entry aside");
                    self.link(binding)?;
                }
                Ok(Action::BackedUpAndLinked { backup })
            }
            EstablishPlan::Create => {
                self.guard_against_source(binding)?;
                if self.mode.applies() {
                    self.ensure_parent(&binding.target)?;
                    self.link(binding)?;
                }
                Ok(Action::Linked)
            }
        }
    }

    fn install_copy(&self, binding: &Binding) -> Result<(), ReconcileError> {
        self.ctx
            .fs
            .copy_file(&binding.source, &binding.target)
            .map_err(|e| ReconcileError::io("copy", &binding.target, &e))?;
        self.ctx
            .fs
            .set_executable(&binding.target)
            .map_err(|e| ReconcileError::io("chmod", &binding.target, &e))
    }

    fn copy_state(&self, binding: &Binding) -> Result<(Option<EntryKind>, CopyState), ReconcileError> {
        let fs = self.ctx.fs.as_ref();
        let kind = fs
            .entry_kind(&binding.target)
            .map_err(|e| ReconcileError::io("inspect", &binding.target, &e))?;
        let state = match kind {
            None => CopyState::Absent,
            Some(EntryKind::File) => {
                let ours = fs.read(&binding.source).map_err(|e| ReconcileError::io("read", &binding.source, &e))?;
                let theirs = fs.read(&binding.target).map_err(|e| ReconcileError::io("read", &binding.target, &e))?;
                if ours == theirs {
                    CopyState::Current
                } else {
                    CopyState::Differs
                }
            }
            // A link or directory is never an independent copy.
            Some(EntryKind::Symlink | EntryKind::Dir) => CopyState::Differs,
        };
        Ok((kind, state))
    }

    /// Makes the target an independent executable copy of the source.
    ///
    /// Unlike [`establish`](Self::establish), a differing file is backed up
    /// by copying it, then overwritten in place. A symlink or directory in
    /// the way is moved aside instead, since it cannot be copied as a file.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::MissingSource`] or [`ReconcileError::Io`].
    pub fn establish_copy(&self, binding: &Binding) -> Result<Action, ReconcileError> {
        self.require_source(binding)?;
        self.guard_against_source(binding)?;
        let (kind, state) = self.copy_state(binding)?;

        match state {
            CopyState::Current => Ok(Action::CopyUpToDate),
            CopyState::Absent => {
                if self.mode.applies() {
                    self.ensure_parent(&binding.target)?;
                    self.install_copy(binding)?;
                }
                Ok(Action::Copied)
            }
            CopyState::Differs => {
                let backup = self.next_backup(&binding.target)?;
                if self.mode.applies() {
                    let saved = if kind == Some(EntryKind::File) {
                        self.ctx.fs.copy_file(&binding.target, &backup)
                    } else {
                        self.ctx.fs.rename(&binding.target, &backup)
                    };
                    saved.map_err(|e| ReconcileError::io("back up", &binding.target, &e))?;
                    self.install_copy(binding)?;
                }
                Ok(Action::BackedUpAndCopied { backup })
            }
        }
    }

    /// Removes the target symlink, whatever it points at, and moves the
    /// most recent backup back into place.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::NoBackupAvailable`] when the link was removed but
    /// nothing could be restored, or [`ReconcileError::Io`].
    pub fn undo(&self, binding: &Binding) -> Result<Action, ReconcileError> {
        let state = self.state(binding)?;
        if plan_undo(&state) == UndoPlan::Skip {
            return Ok(Action::NotALink);
        }

        let fs = self.ctx.fs.as_ref();
        let removed_link = fs
            .read_link(&binding.target)
            .map_err(|e| ReconcileError::io("read link", &binding.target, &e))?;
        if let LinkState::SymlinkStale { .. } = state {
            tracing::warn!(
                target_path = %binding.target.display(),
                points_to = %removed_link.display(),
                "undo removes a symlink this binding did not create"
            );
        }
        let latest = backup::latest_backup(fs, &binding.target)
            .map_err(|e| ReconcileError::io("look for backups of", &binding.target, &e))?;

        if self.mode.applies() {
            fs.remove_symlink(&binding.target)
                .map_err(|e| ReconcileError::io("remove link", &binding.target, &e))?;
        }
        let Some(backup) = latest else {
            return Err(ReconcileError::NoBackupAvailable { removed_link });
        };
        if self.mode.applies() {
            fs.rename(&backup, &binding.target)
                .map_err(|e| ReconcileError::io("restore", &backup, &e))?;
        }
        Ok(Action::Restored { backup, removed_link })
    }

    /// Reports a binding's current state without changing anything.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::Io`] if the target cannot be inspected.
    pub fn inspect(&self, binding: &Binding) -> Result<BindingStatus, ReconcileError> {
        if self.require_source(binding).is_err() {
            return Ok(BindingStatus::SourceMissing);
        }
        Ok(match binding.strategy {
            Strategy::Link => BindingStatus::Link { state: self.state(binding)? },
            Strategy::Copy => BindingStatus::Copy { state: self.copy_state(binding)?.1 },
        })
    }
}
