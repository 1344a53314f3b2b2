//! The declared binding list.
//!
//! A manifest names sources relative to the repository root and targets
//! relative to the home directory. The built-in manifest mirrors the layout
//! of the assistant configuration repository; a `dotlink.yaml` in the repo
//! (or `--manifest`) replaces it wholesale.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::binding::{Binding, BindingKind, Strategy};
use crate::error::Error;
use crate::linker::discovery::DiscoverySet;
use crate::ports::filesystem::FileSystem;

/// File name looked up in the source root when no manifest is given.
pub const MANIFEST_FILE: &str = "dotlink.yaml";

/// One fixed binding as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingEntry {
    /// Source, relative to the repository root.
    pub source: PathBuf,
    /// Target; `~/` and relative paths resolve against the home directory.
    pub target: String,
    /// Declared kind of the source.
    pub kind: BindingKind,
    /// Link (default) or copy.
    #[serde(default)]
    pub strategy: Strategy,
}

/// One discovery set as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryEntry {
    /// Directory to enumerate, relative to the repository root.
    pub source: PathBuf,
    /// Directory to link entries into.
    pub target: String,
    /// Deny-list file, relative to the repository root.
    #[serde(default)]
    pub exclude: Option<PathBuf>,
}

/// The full set of declared bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Fixed bindings, processed in order.
    #[serde(default)]
    pub bindings: Vec<BindingEntry>,
    /// Discovery sets, processed after the fixed bindings.
    #[serde(default)]
    pub discover: Vec<DiscoveryEntry>,
}

/// A manifest with every path made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifest {
    /// Fixed bindings.
    pub bindings: Vec<Binding>,
    /// Discovery sets.
    pub discover: Vec<DiscoverySet>,
}

fn entry(source: &str, target: &str, kind: BindingKind, strategy: Strategy) -> BindingEntry {
    BindingEntry { source: source.into(), target: target.into(), kind, strategy }
}

fn resolve_target(home: &Path, raw: &str) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return home.join(rest);
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        home.join(path)
    }
}

impl Manifest {
    /// The layout of the assistant configuration repository.
    #[must_use]
    pub fn builtin() -> Self {
        use BindingKind::{Dir, File};
        use Strategy::{Copy, Link};

        Self {
            bindings: vec![
                entry("skills", "~/.claude/skills", Dir, Link),
                entry("commands", "~/.claude/commands", Dir, Link),
                entry("agents", "~/.claude/agents", Dir, Link),
                entry("hooks", "~/.claude/hooks", Dir, Link),
                entry("scripts", "~/.claude/scripts", Dir, Link),
                entry("settings.json", "~/.claude/settings.json", File, Link),
                entry("statusline.sh", "~/.claude/statusline.sh", File, Copy),
                entry(".mcp.json", "~/.mcp.json", File, Link),
            ],
            discover: vec![DiscoveryEntry {
                source: "skills".into(),
                target: "~/.codex/skills".into(),
                exclude: Some("codex-skills-exclude.txt".into()),
            }],
        }
    }

    /// Parses a YAML manifest.
    ///
    /// # Errors
    ///
    /// Returns the YAML error for malformed input or unknown fields.
    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Reads and parses the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] if the file cannot be read or parsed.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, Error> {
        let text = fs.read_to_string(path).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text)
            .map_err(|e| Error::Manifest { path: path.to_path_buf(), message: e.to_string() })
    }

    /// Picks the manifest for a run: `explicit` if given, else
    /// `<source_root>/dotlink.yaml` if present, else [`Manifest::builtin`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] if the chosen file cannot be loaded.
    pub fn select(
        fs: &dyn FileSystem,
        source_root: &Path,
        explicit: Option<&Path>,
    ) -> Result<Self, Error> {
        if let Some(path) = explicit {
            tracing::info!(manifest = %path.display(), "using explicit manifest");
            return Self::load(fs, path);
        }
        let local = source_root.join(MANIFEST_FILE);
        if fs.exists(&local) {
            tracing::info!(manifest = %local.display(), "using repository manifest");
            return Self::load(fs, &local);
        }
        tracing::debug!("using built-in manifest");
        Ok(Self::builtin())
    }

    /// Makes every path absolute.
    #[must_use]
    pub fn resolve(&self, source_root: &Path, home: &Path) -> ResolvedManifest {
        ResolvedManifest {
            bindings: self
                .bindings
                .iter()
                .map(|b| Binding {
                    source: source_root.join(&b.source),
                    target: resolve_target(home, &b.target),
                    kind: b.kind,
                    strategy: b.strategy,
                })
                .collect(),
            discover: self
                .discover
                .iter()
                .map(|d| DiscoverySet {
                    source: source_root.join(&d.source),
                    target_root: resolve_target(home, &d.target),
                    exclude: d.exclude.as_ref().map(|e| source_root.join(e)),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    #[test]
    fn builtin_resolves_under_claude_and_home() {
        let resolved = Manifest::builtin().resolve(Path::new("/repo"), Path::new("/home/me"));

        let skills = &resolved.bindings[0];
        assert_eq!(skills.source, PathBuf::from("/repo/skills"));
        assert_eq!(skills.target, PathBuf::from("/home/me/.claude/skills"));

        let copies: Vec<_> =
            resolved.bindings.iter().filter(|b| b.strategy == Strategy::Copy).collect();
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0].target, PathBuf::from("/home/me/.claude/statusline.sh"));

        let mcp = resolved.bindings.last().unwrap();
        assert_eq!(mcp.target, PathBuf::from("/home/me/.mcp.json"));

        assert_eq!(resolved.discover[0].target_root, PathBuf::from("/home/me/.codex/skills"));
        assert_eq!(
            resolved.discover[0].exclude,
            Some(PathBuf::from("/repo/codex-skills-exclude.txt"))
        );
    }

    #[test]
    fn parses_yaml_with_defaults() {
        let manifest = Manifest::parse(
            r"
bindings:
  - { source: skills, target: ~/.claude/skills, kind: dir }
  - { source: statusline.sh, target: /opt/statusline.sh, kind: file, strategy: copy }
discover:
  - { source: skills, target: .codex/skills }
",
        )
        .unwrap();

        assert_eq!(manifest.bindings[0].strategy, Strategy::Link);
        assert_eq!(manifest.bindings[1].strategy, Strategy::Copy);
        assert_eq!(manifest.discover[0].exclude, None);

        let resolved = manifest.resolve(Path::new("/repo"), Path::new("/home/me"));
        assert_eq!(resolved.bindings[1].target, PathBuf::from("/opt/statusline.sh"));
        assert_eq!(resolved.discover[0].target_root, PathBuf::from("/home/me/.codex/skills"));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = Manifest::parse("bindings:\n  - { source: a, target: b, kind: dir, mode: x }\n");
        assert!(err.is_err());
    }

    #[test]
    fn select_prefers_explicit_then_repo_then_builtin() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/repo");
        assert_eq!(Manifest::select(&fs, Path::new("/repo"), None).unwrap(), Manifest::builtin());

        fs.add_file("/repo/dotlink.yaml", "bindings: []\n");
        assert!(Manifest::select(&fs, Path::new("/repo"), None).unwrap().bindings.is_empty());

        let err = Manifest::select(&fs, Path::new("/repo"), Some(Path::new("/missing.yaml")));
        assert!(matches!(err, Err(Error::Manifest { .. })));
    }
}
