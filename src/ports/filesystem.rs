//! Filesystem port for the link engine.

use std::io;
use std::path::{Path, PathBuf};

/// The type of a directory entry, observed without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A real directory.
    Dir,
    /// A regular file.
    File,
    /// A symbolic link, whatever it points at.
    Symlink,
}

/// Provides the filesystem operations the link engine needs.
///
/// Abstracting the filesystem lets the reconcile logic run against an
/// in-memory tree in tests, so idempotence and dry-run purity can be checked
/// without touching the real disk.
pub trait FileSystem: Send + Sync {
    /// Returns the kind of the entry at `path` without following symlinks,
    /// or `None` if nothing is there.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be inspected.
    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    /// Returns `true` if the path exists, following symlinks.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if the path is a directory, following symlinks.
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns the absolute path with every symlink and `..` resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Reads the value of a symlink.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a symlink.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Creates a symlink at `link` pointing at `original`.
    ///
    /// # Errors
    ///
    /// Returns an error if `link` already exists or its parent is missing.
    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()>;

    /// Renames an entry (file, directory or symlink).
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is missing or `to` cannot be created.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Removes a symlink without touching what it points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a symlink.
    fn remove_symlink(&self, path: &Path) -> io::Result<()>;

    /// Copies a regular file's contents, overwriting `to` if present.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is not a readable file.
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Marks a file executable for everyone who can read it.
    ///
    /// # Errors
    ///
    /// Returns an error if the permissions cannot be changed.
    fn set_executable(&self, path: &Path) -> io::Result<()>;

    /// Reads the raw contents of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Lists the entry names in a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Creates a directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if a component exists and is not a directory.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}
