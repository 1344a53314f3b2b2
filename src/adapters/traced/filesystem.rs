//! Tracing decorator for the `FileSystem` port.

use std::io;
use std::path::{Path, PathBuf};

use super::trace_result;
use crate::ports::filesystem::{EntryKind, FileSystem};

/// Logs filesystem interactions while delegating to an inner implementation.
pub struct TracedFileSystem {
    inner: Box<dyn FileSystem>,
}

impl TracedFileSystem {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: Box<dyn FileSystem>) -> Self {
        Self { inner }
    }
}

fn pair(from: &Path, to: &Path) -> String {
    format!("{} -> {}", from.display(), to.display())
}

impl FileSystem for TracedFileSystem {
    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        let subject = path.display().to_string();
        trace_result("fs", "entry_kind", false, &subject, self.inner.entry_kind(path))
    }

    fn exists(&self, path: &Path) -> bool {
        let result = self.inner.exists(path);
        tracing::trace!(port = "fs", method = "exists", subject = %path.display(), result);
        result
    }

    fn is_dir(&self, path: &Path) -> bool {
        let result = self.inner.is_dir(path);
        tracing::trace!(port = "fs", method = "is_dir", subject = %path.display(), result);
        result
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let subject = path.display().to_string();
        trace_result("fs", "canonicalize", false, &subject, self.inner.canonicalize(path))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        let subject = path.display().to_string();
        trace_result("fs", "read_link", false, &subject, self.inner.read_link(path))
    }

    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        let subject = pair(link, original);
        trace_result("fs", "symlink", true, &subject, self.inner.symlink(original, link))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let subject = pair(from, to);
        trace_result("fs", "rename", true, &subject, self.inner.rename(from, to))
    }

    fn remove_symlink(&self, path: &Path) -> io::Result<()> {
        let subject = path.display().to_string();
        trace_result("fs", "remove_symlink", true, &subject, self.inner.remove_symlink(path))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        let subject = pair(from, to);
        trace_result("fs", "copy_file", true, &subject, self.inner.copy_file(from, to))
    }

    fn set_executable(&self, path: &Path) -> io::Result<()> {
        let subject = path.display().to_string();
        trace_result("fs", "set_executable", true, &subject, self.inner.set_executable(path))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let subject = path.display().to_string();
        // Contents can be large; only log the length.
        let result = self.inner.read(path);
        let summary = result.as_ref().map(Vec::len).map_err(|e| io::Error::new(e.kind(), e.to_string()));
        let _ = trace_result("fs", "read", false, &subject, summary);
        result
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let subject = path.display().to_string();
        let result = self.inner.read_to_string(path);
        let summary =
            result.as_ref().map(String::len).map_err(|e| io::Error::new(e.kind(), e.to_string()));
        let _ = trace_result("fs", "read_to_string", false, &subject, summary);
        result
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let subject = path.display().to_string();
        trace_result("fs", "list_dir", false, &subject, self.inner.list_dir(path))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let subject = path.display().to_string();
        trace_result("fs", "create_dir_all", true, &subject, self.inner.create_dir_all(path))
    }
}
