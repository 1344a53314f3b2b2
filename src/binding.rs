//! Bindings and the observed state of their targets.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ports::filesystem::{EntryKind, FileSystem};

/// What kind of entry a binding's source is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    /// A directory.
    #[serde(alias = "directory")]
    Dir,
    /// A regular file.
    File,
}

/// How a binding's target is brought into line with its source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// The target becomes a symlink to the source.
    #[default]
    Link,
    /// The target becomes an independent, executable copy of the source.
    Copy,
}

/// A declared (source, target) pair managed by the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Absolute path inside the source repository.
    pub source: PathBuf,
    /// Absolute path the source is installed at.
    pub target: PathBuf,
    /// Declared kind of the source.
    pub kind: BindingKind,
    /// Link or copy.
    pub strategy: Strategy,
}

impl Binding {
    /// A symlink binding.
    pub fn link(source: impl Into<PathBuf>, target: impl Into<PathBuf>, kind: BindingKind) -> Self {
        Self { source: source.into(), target: target.into(), kind, strategy: Strategy::Link }
    }

    /// A copy binding for a single file.
    pub fn copy(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: BindingKind::File,
            strategy: Strategy::Copy,
        }
    }

    /// Short display name: the target's final component.
    #[must_use]
    pub fn name(&self) -> String {
        self.target
            .file_name()
            .map_or_else(|| self.target.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Whether the source exists as the declared kind.
    pub fn source_present(&self, fs: &dyn FileSystem) -> bool {
        match self.kind {
            BindingKind::Dir => fs.is_dir(&self.source),
            BindingKind::File => fs.exists(&self.source) && !fs.is_dir(&self.source),
        }
    }

    /// Whether a symlink holding `value` points at this binding's source.
    ///
    /// Paths compare by component, so a trailing slash on either side makes
    /// no difference. Relative link values are taken relative to the
    /// target's directory.
    #[must_use]
    pub fn is_link_to_source(&self, value: &Path) -> bool {
        if value.is_relative() {
            if let Some(parent) = self.target.parent() {
                return parent.join(value) == self.source;
            }
        }
        value == self.source
    }
}

/// Observed relationship between a target path and its binding's source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LinkState {
    /// Nothing exists at the target.
    Absent,
    /// The target is a symlink to the binding's source.
    SymlinkCorrect,
    /// The target is a symlink to somewhere else.
    SymlinkStale {
        /// The link's current value.
        points_to: PathBuf,
    },
    /// The target is a real file or directory.
    RealEntry,
}

impl LinkState {
    /// Inspects the target of `binding`. Always reads the filesystem; never
    /// cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the target exists but cannot be inspected.
    pub fn observe(fs: &dyn FileSystem, binding: &Binding) -> io::Result<Self> {
        Ok(match fs.entry_kind(&binding.target)? {
            None => Self::Absent,
            Some(EntryKind::Symlink) => {
                let points_to = fs.read_link(&binding.target)?;
                if binding.is_link_to_source(&points_to) {
                    Self::SymlinkCorrect
                } else {
                    Self::SymlinkStale { points_to }
                }
            }
            Some(EntryKind::Dir | EntryKind::File) => Self::RealEntry,
        })
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "not linked"),
            Self::SymlinkCorrect => write!(f, "linked"),
            Self::SymlinkStale { points_to } => write!(f, "foreign link -> {}", points_to.display()),
            Self::RealEntry => write!(f, "real entry (will be backed up)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    fn skills() -> Binding {
        Binding::link("/repo/skills", "/home/.claude/skills", BindingKind::Dir)
    }

    #[test]
    fn observes_each_state() {
        let fs = MemoryFileSystem::new();
        let binding = skills();
        assert_eq!(LinkState::observe(&fs, &binding).unwrap(), LinkState::Absent);

        fs.add_symlink("/home/.claude/skills", "/repo/skills");
        assert_eq!(LinkState::observe(&fs, &binding).unwrap(), LinkState::SymlinkCorrect);

        let fs = MemoryFileSystem::new();
        fs.add_symlink("/home/.claude/skills", "/elsewhere/skills");
        assert_eq!(
            LinkState::observe(&fs, &binding).unwrap(),
            LinkState::SymlinkStale { points_to: PathBuf::from("/elsewhere/skills") }
        );

        let fs = MemoryFileSystem::new();
        fs.add_dir("/home/.claude/skills");
        assert_eq!(LinkState::observe(&fs, &binding).unwrap(), LinkState::RealEntry);
    }

    #[test]
    fn trailing_slash_still_counts_as_correct() {
        let binding = skills();
        assert!(binding.is_link_to_source(Path::new("/repo/skills/")));
        assert!(binding.is_link_to_source(Path::new("/repo/skills")));
        assert!(!binding.is_link_to_source(Path::new("/repo/skill")));
    }

    #[test]
    fn relative_link_values_resolve_from_the_target_directory() {
        let sibling = Binding::link("/home/.claude/real-skills", "/home/.claude/skills", BindingKind::Dir);
        assert!(sibling.is_link_to_source(Path::new("real-skills")));
    }

    #[test]
    fn source_presence_respects_declared_kind() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/repo/skills", "not a directory");
        assert!(!skills().source_present(&fs));

        fs.add_file("/repo/settings.json", "{}");
        let settings =
            Binding::link("/repo/settings.json", "/home/.claude/settings.json", BindingKind::File);
        assert!(settings.source_present(&fs));
    }

    #[test]
    fn name_is_the_target_file_name() {
        assert_eq!(skills().name(), "skills");
        assert_eq!(Binding::copy("/repo/statusline.sh", "/home/.claude/statusline.sh").name(), "statusline.sh");
    }
}
