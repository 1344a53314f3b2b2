//! Live filesystem adapter using `std::fs`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::ports::filesystem::{EntryKind, FileSystem};

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        match fs::symlink_metadata(path) {
            Ok(meta) => {
                let file_type = meta.file_type();
                let kind = if file_type.is_symlink() {
                    EntryKind::Symlink
                } else if file_type.is_dir() {
                    EntryKind::Dir
                } else {
                    EntryKind::File
                };
                Ok(Some(kind))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    #[cfg(unix)]
    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(original, link)
    }

    #[cfg(not(unix))]
    fn symlink(&self, _original: &Path, _link: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "symlinks require a unix host"))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_symlink(&self, path: &Path) -> io::Result<()> {
        if !fs::symlink_metadata(path)?.file_type().is_symlink() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a symlink", path.display()),
            ));
        }
        fs::remove_file(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::copy(from, to).map(|_| ())
    }

    #[cfg(unix)]
    fn set_executable(&self, path: &Path) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(path)?.permissions();
        // chmod +x: grant execute wherever read is granted.
        let mode = perms.mode();
        perms.set_mode(mode | ((mode & 0o444) >> 2));
        fs::set_permissions(path, perms)
    }

    #[cfg(not(unix))]
    fn set_executable(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.push(name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn entry_kind_distinguishes_links_from_targets() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        let link = dir.path().join("link");
        fs::create_dir(&real).unwrap();

        let fs = LiveFileSystem;
        fs.symlink(&real, &link).unwrap();

        assert_eq!(fs.entry_kind(&real).unwrap(), Some(EntryKind::Dir));
        assert_eq!(fs.entry_kind(&link).unwrap(), Some(EntryKind::Symlink));
        assert_eq!(fs.entry_kind(&dir.path().join("nope")).unwrap(), None);
        assert!(fs.is_dir(&link));
        assert_eq!(fs.read_link(&link).unwrap(), real);
    }

    #[test]
    fn canonicalize_resolves_parent_links_and_dot_dot() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        fs::create_dir_all(root.join("repo/skills")).unwrap();
        fs::create_dir(root.join("home")).unwrap();
        std::os::unix::fs::symlink(root.join("repo"), root.join("home/.claude")).unwrap();

        let fs = LiveFileSystem;
        assert_eq!(fs.canonicalize(&root.join("home/.claude/skills")).unwrap(), root.join("repo/skills"));
        assert_eq!(fs.canonicalize(&root.join("home/../repo")).unwrap(), root.join("repo"));
        assert!(fs.canonicalize(&root.join("nope")).is_err());
    }

    #[test]
    fn remove_symlink_refuses_real_entries() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "data").unwrap();

        let fs = LiveFileSystem;
        assert!(fs.remove_symlink(&file).is_err());
        assert!(file.exists());
    }

    #[test]
    fn set_executable_adds_execute_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("statusline.sh");
        fs::write(&file, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).unwrap();

        LiveFileSystem.set_executable(&file).unwrap();

        let mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
    }

    #[test]
    fn list_dir_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b", "a", "c"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        assert_eq!(LiveFileSystem.list_dir(dir.path()).unwrap(), vec!["a", "b", "c"]);
    }
}
