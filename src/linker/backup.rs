//! Backup naming and lookup.
//!
//! A displaced entry at `<target>` moves to `<target>.backup.<stamp>` where
//! the stamp is `YYYYMMDD-HHMMSS` in UTC, so lexicographic order is
//! chronological order. Backups are only ever created and restored here,
//! never pruned.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::ports::filesystem::FileSystem;

/// Separator between the target name and the timestamp.
pub const BACKUP_MARKER: &str = ".backup.";

/// `chrono` format of the timestamp suffix.
pub const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Length of a formatted stamp.
const STAMP_LEN: usize = "YYYYMMDD-HHMMSS".len();

fn prefix_for(target: &Path) -> OsString {
    let mut name = target.file_name().map(OsString::from).unwrap_or_default();
    name.push(BACKUP_MARKER);
    name
}

/// The backup path for `target` taken at `at`.
#[must_use]
pub fn backup_path(target: &Path, at: DateTime<Utc>) -> PathBuf {
    let mut name = prefix_for(target);
    name.push(at.format(STAMP_FORMAT).to_string());
    target.with_file_name(name)
}

/// A backup path for `target` that is not already taken.
///
/// Two displacements within the same second get `-1`, `-2`, ... appended,
/// which still sort after the bare stamp.
///
/// # Errors
///
/// Returns an error if a candidate path cannot be inspected.
pub fn next_backup_path(
    fs: &dyn FileSystem,
    target: &Path,
    at: DateTime<Utc>,
) -> io::Result<PathBuf> {
    let base = backup_path(target, at);
    if fs.entry_kind(&base)?.is_none() {
        return Ok(base);
    }
    let mut n = 1u32;
    loop {
        let mut name = base.file_name().map(OsString::from).unwrap_or_default();
        name.push(format!("-{n}"));
        let candidate = base.with_file_name(name);
        if fs.entry_kind(&candidate)?.is_none() {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Orders suffixes by stamp, then by collision counter as a number, so
/// `-10` comes after `-9`.
fn suffix_order(suffix: &str) -> (&str, u64) {
    if let (Some(stamp), Some(rest)) = (suffix.get(..STAMP_LEN), suffix.get(STAMP_LEN..)) {
        if rest.is_empty() {
            return (stamp, 0);
        }
        if let Some(n) = rest.strip_prefix('-').and_then(|n| n.parse::<u64>().ok()) {
            return (stamp, n);
        }
    }
    (suffix, 0)
}

/// All backups of `target`, oldest first: by stamp, then by counter.
///
/// # Errors
///
/// Returns an error if the target's directory exists but cannot be listed.
pub fn list_backups(fs: &dyn FileSystem, target: &Path) -> io::Result<Vec<PathBuf>> {
    let Some(parent) = target.parent() else {
        return Ok(Vec::new());
    };
    if !fs.is_dir(parent) {
        return Ok(Vec::new());
    }
    let prefix = prefix_for(target).to_string_lossy().into_owned();
    let mut suffixes: Vec<String> = fs
        .list_dir(parent)?
        .into_iter()
        .filter_map(|name| name.strip_prefix(&prefix).map(String::from))
        .filter(|suffix| !suffix.is_empty())
        .collect();
    suffixes.sort_by(|a, b| suffix_order(a).cmp(&suffix_order(b)).then_with(|| a.cmp(b)));
    Ok(suffixes
        .into_iter()
        .map(|suffix| parent.join(format!("{prefix}{suffix}")))
        .collect())
}

/// The backup undo should restore: the newest stamp, highest counter.
///
/// # Errors
///
/// Returns an error if the target's directory cannot be listed.
pub fn latest_backup(fs: &dyn FileSystem, target: &Path) -> io::Result<Option<PathBuf>> {
    Ok(list_backups(fs, target)?.pop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, h, m, s).unwrap()
    }

    #[test]
    fn names_use_the_stamp_format() {
        let path = backup_path(Path::new("/home/.claude/skills"), at(14, 30, 5));
        assert_eq!(path, PathBuf::from("/home/.claude/skills.backup.20250315-143005"));
    }

    #[test]
    fn taken_names_get_a_counter() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/home/.claude/skills.backup.20250315-143005");
        fs.add_dir("/home/.claude/skills.backup.20250315-143005-1");

        let path = next_backup_path(&fs, Path::new("/home/.claude/skills"), at(14, 30, 5)).unwrap();
        assert_eq!(path, PathBuf::from("/home/.claude/skills.backup.20250315-143005-2"));
    }

    #[test]
    fn latest_is_lexicographically_last() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/home/.claude/skills.backup.20240101-000000");
        fs.add_dir("/home/.claude/skills.backup.20990101-000000");
        fs.add_dir("/home/.claude/skills.backup.20250315-143005");
        // Neighbouring names that must not be mistaken for backups.
        fs.add_dir("/home/.claude/skills-old.backup.20991231-235959");
        fs.add_dir("/home/.claude/skills.backup.");

        let latest = latest_backup(&fs, Path::new("/home/.claude/skills")).unwrap();
        assert_eq!(latest, Some(PathBuf::from("/home/.claude/skills.backup.20990101-000000")));
        assert_eq!(list_backups(&fs, Path::new("/home/.claude/skills")).unwrap().len(), 3);
    }

    #[test]
    fn counters_order_numerically() {
        let fs = MemoryFileSystem::new();
        let target = Path::new("/home/.claude/skills");
        fs.add_dir("/home/.claude/skills.backup.20250315-143005");
        for n in 1..=10 {
            fs.add_dir(format!("/home/.claude/skills.backup.20250315-143005-{n}"));
        }
        fs.add_dir("/home/.claude/skills.backup.20250315-143004-99");

        let listed = list_backups(&fs, target).unwrap();
        assert_eq!(listed[0], PathBuf::from("/home/.claude/skills.backup.20250315-143004-99"));
        assert_eq!(listed[1], PathBuf::from("/home/.claude/skills.backup.20250315-143005"));
        assert_eq!(
            latest_backup(&fs, target).unwrap(),
            Some(PathBuf::from("/home/.claude/skills.backup.20250315-143005-10"))
        );
        assert_eq!(
            next_backup_path(&fs, target, at(14, 30, 5)).unwrap(),
            PathBuf::from("/home/.claude/skills.backup.20250315-143005-11")
        );
    }

    #[test]
    fn missing_parent_means_no_backups() {
        let fs = MemoryFileSystem::new();
        assert_eq!(latest_backup(&fs, Path::new("/home/.claude/skills")).unwrap(), None);
    }
}
