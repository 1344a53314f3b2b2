//! Error types.
//!
//! [`ReconcileError`] covers everything that can go wrong with a single
//! binding; none of it stops a run. [`Error`] is for conditions that end the
//! whole invocation.

use std::io;
use std::path::PathBuf;

use serde::Serialize;

use crate::report::Mode;

/// How serious a per-binding error is for the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Expected and harmless, e.g. a source the repo does not ship.
    Skip,
    /// Needs the operator's attention but nothing was lost.
    Warning,
    /// The binding could not be processed.
    Failure,
}

/// Why a single binding was not brought into the desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ReconcileError {
    /// The binding's source is not in the repository.
    #[error("{} not in repo, skipping", .path.display())]
    MissingSource {
        /// The missing source path.
        path: PathBuf,
    },

    /// The target is a symlink this binding does not own.
    #[error("symlink points to {}, not touching it; fix manually", .points_to.display())]
    ForeignSymlink {
        /// Where the existing link points.
        points_to: PathBuf,
    },

    /// The target resolves, through linked parent directories, to the
    /// source or somewhere inside it.
    #[error("target resolves to {} inside the source, not touching it; fix manually", .resolved.display())]
    TargetInsideSource {
        /// Where the target really lives.
        resolved: PathBuf,
    },

    /// Undo removed the link but found no backup to put back.
    #[error("removed link, no backup to restore")]
    NoBackupAvailable {
        /// Where the removed link pointed.
        removed_link: PathBuf,
    },

    /// A filesystem call failed unexpectedly.
    #[error("failed to {operation} {}: {message}", .path.display())]
    Io {
        /// What was being attempted.
        operation: String,
        /// The path involved.
        path: PathBuf,
        /// The underlying error message.
        message: String,
    },
}

impl ReconcileError {
    /// Wraps an I/O error raised while performing `operation` on `path`.
    pub fn io(operation: &str, path: impl Into<PathBuf>, err: &io::Error) -> Self {
        Self::Io { operation: operation.to_string(), path: path.into(), message: err.to_string() }
    }

    /// Classification used by the run summary.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingSource { .. } => Severity::Skip,
            Self::ForeignSymlink { .. }
            | Self::TargetInsideSource { .. }
            | Self::NoBackupAvailable { .. } => Severity::Warning,
            Self::Io { .. } => Severity::Failure,
        }
    }

    /// Report wording, phrased conditionally for dry runs.
    #[must_use]
    pub fn describe(&self, mode: Mode) -> String {
        match (self, mode) {
            (Self::NoBackupAvailable { .. }, Mode::DryRun) => {
                "would remove link, no backup to restore".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Errors that abort the whole run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host OS is neither Linux nor macOS.
    #[error("unsupported platform `{os}`; link the configuration into ~/.claude manually")]
    UnsupportedPlatform {
        /// The reported OS name.
        os: String,
    },

    /// The source repository root does not exist.
    #[error("source directory {} does not exist", .0.display())]
    MissingSourceRoot(PathBuf),

    /// No home directory could be determined.
    #[error("could not determine the home directory; set HOME")]
    NoHomeDir,

    /// The manifest could not be read or parsed.
    #[error("failed to load manifest {}: {message}", .path.display())]
    Manifest {
        /// The manifest path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The report could not be rendered.
    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    /// Some bindings failed with unexpected I/O errors.
    #[error("{failed} binding(s) failed; see the report above")]
    Incomplete {
        /// Number of failed bindings.
        failed: usize,
    },

    /// An I/O error outside any single binding.
    #[error(transparent)]
    Io(#[from] io::Error),
}
