//! Bindings derived by enumerating a directory, minus a deny-list.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::binding::{Binding, BindingKind};
use crate::error::ReconcileError;
use crate::ports::filesystem::FileSystem;

/// A directory whose subdirectories are each linked under `target_root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoverySet {
    /// Directory to enumerate.
    pub source: PathBuf,
    /// Directory the discovered entries are linked into.
    pub target_root: PathBuf,
    /// Deny-list file, if any.
    pub exclude: Option<PathBuf>,
}

impl DiscoverySet {
    /// A stand-in binding for reporting problems with the set as a whole.
    #[must_use]
    pub fn as_binding(&self) -> Binding {
        Binding::link(&self.source, &self.target_root, BindingKind::Dir)
    }
}

/// Parses a deny-list: one name per line, `#` starts a comment, surrounding
/// whitespace is ignored and blank lines are skipped.
#[must_use]
pub fn parse_deny_list(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(|line| line.split_once('#').map_or(line, |(before, _)| before).trim())
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Loads the deny-list at `path`. A missing file denies nothing.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn load_deny_list(fs: &dyn FileSystem, path: Option<&Path>) -> io::Result<BTreeSet<String>> {
    let Some(path) = path else {
        return Ok(BTreeSet::new());
    };
    if !fs.exists(path) {
        tracing::debug!(path = %path.display(), "no deny-list, nothing excluded");
        return Ok(BTreeSet::new());
    }
    Ok(parse_deny_list(&fs.read_to_string(path)?))
}

/// Expands a discovery set into one directory binding per surviving
/// subdirectory, in name order. Hidden entries and plain files are ignored.
///
/// # Errors
///
/// Returns [`ReconcileError::MissingSource`] if the source directory is
/// absent, or [`ReconcileError::Io`] if it cannot be listed.
pub fn discover(fs: &dyn FileSystem, set: &DiscoverySet) -> Result<Vec<Binding>, ReconcileError> {
    if !fs.is_dir(&set.source) {
        return Err(ReconcileError::MissingSource { path: set.source.clone() });
    }
    let denied = load_deny_list(fs, set.exclude.as_deref())
        .map_err(|e| ReconcileError::io("read deny-list", set.exclude.clone().unwrap_or_default(), &e))?;
    let names = fs.list_dir(&set.source).map_err(|e| ReconcileError::io("list", &set.source, &e))?;

    let mut bindings = Vec::new();
    for name in names {
        if name.starts_with('.') {
            continue;
        }
        let source = set.source.join(&name);
        if !fs.is_dir(&source) {
            continue;
        }
        if denied.contains(&name) {
            tracing::info!(skill = %name, "excluded by deny-list");
            continue;
        }
        bindings.push(Binding::link(source, set.target_root.join(&name), BindingKind::Dir));
    }
    Ok(bindings)
}
