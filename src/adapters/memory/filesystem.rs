//! In-memory adapter for the `FileSystem` port.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ports::filesystem::{EntryKind, FileSystem};

/// Maximum symlink hops before resolution gives up, as on Linux.
const MAX_HOPS: usize = 40;

/// A single entry in the in-memory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A directory. Children are the entries whose parent is this path.
    Dir,
    /// A regular file.
    File {
        /// Raw contents.
        contents: Vec<u8>,
        /// Whether the execute bit is set.
        executable: bool,
    },
    /// A symlink holding its raw (unresolved) value.
    Symlink(PathBuf),
}

#[derive(Debug, Default)]
struct Tree {
    nodes: BTreeMap<PathBuf, Node>,
    denied: BTreeSet<PathBuf>,
    mutations: usize,
}

/// A filesystem that lives entirely in memory.
///
/// Clones share the same tree, so a test can hand one clone to a
/// [`ServiceContext`](crate::context::ServiceContext) and keep another to
/// arrange state and inspect the result. All paths should be absolute.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    tree: Arc<Mutex<Tree>>,
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

enum Part {
    Root,
    Parent,
    Name(OsString),
}

fn parts_of(path: &Path) -> Vec<Part> {
    path.components()
        .filter_map(|c| match c {
            Component::RootDir | Component::Prefix(_) => Some(Part::Root),
            Component::ParentDir => Some(Part::Parent),
            Component::CurDir => None,
            Component::Normal(name) => Some(Part::Name(name.to_os_string())),
        })
        .collect()
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{}: no such entry", path.display()))
}

impl Tree {
    /// Resolves symlinks in every component; the last one only when
    /// `follow_last` is set.
    fn resolve(&self, path: &Path, follow_last: bool) -> io::Result<PathBuf> {
        let mut pending: Vec<Part> = parts_of(path);
        pending.reverse();
        let mut current = PathBuf::from("/");
        let mut hops = 0;

        while let Some(part) = pending.pop() {
            match part {
                Part::Root => current = PathBuf::from("/"),
                Part::Parent => {
                    current.pop();
                }
                Part::Name(name) => {
                    let next = current.join(&name);
                    let is_last = pending.is_empty();
                    match self.nodes.get(&next) {
                        Some(Node::Symlink(dest)) if !is_last || follow_last => {
                            hops += 1;
                            if hops > MAX_HOPS {
                                return Err(io::Error::new(
                                    io::ErrorKind::Other,
                                    format!("{}: too many levels of symbolic links", path.display()),
                                ));
                            }
                            let mut expansion = parts_of(dest);
                            expansion.reverse();
                            pending.extend(expansion);
                        }
                        _ => current = next,
                    }
                }
            }
        }
        Ok(current)
    }

    fn get(&self, path: &Path, follow_last: bool) -> Option<(PathBuf, &Node)> {
        let resolved = self.resolve(path, follow_last).ok()?;
        let node = self.nodes.get(&resolved)?;
        Some((resolved, node))
    }

    fn check_writable(&self, path: &Path) -> io::Result<()> {
        if self.denied.iter().any(|denied| path.starts_with(denied)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{}: permission denied", path.display()),
            ));
        }
        Ok(())
    }

    fn require_parent_dir(&self, path: &Path) -> io::Result<()> {
        let parent = path.parent().unwrap_or(Path::new("/"));
        match self.get(parent, true) {
            Some((_, Node::Dir)) => Ok(()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{}: not a directory", parent.display()),
            )),
            None => Err(not_found(parent)),
        }
    }

    fn insert_with_parents(&mut self, path: &Path, node: Node) {
        for ancestor in path.ancestors().skip(1) {
            self.nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
        self.nodes.insert(path.to_path_buf(), node);
    }
}

impl MemoryFileSystem {
    /// Creates an empty tree containing only the root directory.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Tree::default();
        tree.nodes.insert(PathBuf::from("/"), Node::Dir);
        Self { tree: Arc::new(Mutex::new(tree)) }
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().expect("memory filesystem lock poisoned")
    }

    /// Adds a directory, creating missing parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.lock().insert_with_parents(path.as_ref(), Node::Dir);
    }

    /// Adds a regular file, creating missing parents.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        let node = Node::File { contents: contents.as_ref().to_vec(), executable: false };
        self.lock().insert_with_parents(path.as_ref(), node);
    }

    /// Adds a symlink at `link` holding `dest`, creating missing parents.
    pub fn add_symlink(&self, link: impl AsRef<Path>, dest: impl AsRef<Path>) {
        let node = Node::Symlink(dest.as_ref().to_path_buf());
        self.lock().insert_with_parents(link.as_ref(), node);
    }

    /// Makes every mutating call touching `path` (or anything below it)
    /// fail with `PermissionDenied`.
    pub fn deny_writes(&self, path: impl AsRef<Path>) {
        self.lock().denied.insert(path.as_ref().to_path_buf());
    }

    /// Returns the node stored at `path`, without resolving symlinks.
    #[must_use]
    pub fn node(&self, path: impl AsRef<Path>) -> Option<Node> {
        self.lock().nodes.get(path.as_ref()).cloned()
    }

    /// Returns a copy of the whole tree.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Node> {
        self.lock().nodes.clone()
    }

    /// Number of successful mutating calls made so far.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.lock().mutations
    }
}

impl FileSystem for MemoryFileSystem {
    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        let tree = self.lock();
        Ok(tree.get(path, false).map(|(_, node)| match node {
            Node::Dir => EntryKind::Dir,
            Node::File { .. } => EntryKind::File,
            Node::Symlink(_) => EntryKind::Symlink,
        }))
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().get(path, true).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(path, true), Some((_, Node::Dir)))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.lock().get(path, true).map(|(resolved, _)| resolved).ok_or_else(|| not_found(path))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        match self.lock().get(path, false) {
            Some((_, Node::Symlink(dest))) => Ok(dest.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{}: not a symlink", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        let mut tree = self.lock();
        let resolved = tree.resolve(link, false)?;
        tree.check_writable(&resolved)?;
        if tree.nodes.contains_key(&resolved) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{}: already exists", link.display()),
            ));
        }
        tree.require_parent_dir(&resolved)?;
        tree.nodes.insert(resolved, Node::Symlink(original.to_path_buf()));
        tree.mutations += 1;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut tree = self.lock();
        let source = tree.resolve(from, false)?;
        let dest = tree.resolve(to, false)?;
        tree.check_writable(&source)?;
        tree.check_writable(&dest)?;
        if !tree.nodes.contains_key(&source) {
            return Err(not_found(from));
        }
        if tree.nodes.contains_key(&dest) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{}: already exists", to.display()),
            ));
        }
        tree.require_parent_dir(&dest)?;

        let moved: Vec<PathBuf> =
            tree.nodes.keys().filter(|key| key.starts_with(&source)).cloned().collect();
        for key in moved {
            if let Some(node) = tree.nodes.remove(&key) {
                let rest = key.strip_prefix(&source).unwrap_or(Path::new(""));
                let new_key = if rest.as_os_str().is_empty() { dest.clone() } else { dest.join(rest) };
                tree.nodes.insert(new_key, node);
            }
        }
        tree.mutations += 1;
        Ok(())
    }

    fn remove_symlink(&self, path: &Path) -> io::Result<()> {
        let mut tree = self.lock();
        let resolved = tree.resolve(path, false)?;
        tree.check_writable(&resolved)?;
        match tree.nodes.get(&resolved) {
            Some(Node::Symlink(_)) => {
                tree.nodes.remove(&resolved);
                tree.mutations += 1;
                Ok(())
            }
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{}: not a symlink", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut tree = self.lock();
        let (contents, executable) = match tree.get(from, true) {
            Some((_, Node::File { contents, executable })) => (contents.clone(), *executable),
            Some(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{}: not a regular file", from.display()),
                ))
            }
            None => return Err(not_found(from)),
        };
        let dest = tree.resolve(to, true)?;
        tree.check_writable(&dest)?;
        if matches!(tree.nodes.get(&dest), Some(Node::Dir)) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{}: is a directory", to.display()),
            ));
        }
        tree.require_parent_dir(&dest)?;
        tree.nodes.insert(dest, Node::File { contents, executable });
        tree.mutations += 1;
        Ok(())
    }

    fn set_executable(&self, path: &Path) -> io::Result<()> {
        let mut tree = self.lock();
        let resolved = tree.resolve(path, true)?;
        tree.check_writable(&resolved)?;
        match tree.nodes.get_mut(&resolved) {
            Some(Node::File { executable, .. }) => {
                *executable = true;
                tree.mutations += 1;
                Ok(())
            }
            Some(_) => Ok(()),
            None => Err(not_found(path)),
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.lock().get(path, true) {
            Some((_, Node::File { contents, .. })) => Ok(contents.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{}: not a regular file", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let tree = self.lock();
        let dir = match tree.get(path, true) {
            Some((resolved, Node::Dir)) => resolved,
            Some(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{}: not a directory", path.display()),
                ))
            }
            None => return Err(not_found(path)),
        };
        let mut names: Vec<String> = tree
            .nodes
            .keys()
            .filter(|key| key.parent() == Some(dir.as_path()))
            .filter_map(|key| key.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        names.sort();
        Ok(names)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut tree = self.lock();
        let mut created = false;
        let ancestors: Vec<PathBuf> = path.ancestors().map(Path::to_path_buf).collect();
        for ancestor in ancestors.iter().rev() {
            match tree.get(ancestor, true) {
                Some((_, Node::Dir)) => {}
                Some(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{}: exists and is not a directory", ancestor.display()),
                    ))
                }
                None => {
                    let resolved = tree.resolve(ancestor, true)?;
                    tree.check_writable(&resolved)?;
                    tree.nodes.insert(resolved, Node::Dir);
                    created = true;
                }
            }
        }
        if created {
            tree.mutations += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symlinked_directories_resolve_for_reads() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/repo/skills/a/SKILL.md", "hi");
        fs.add_symlink("/home/.claude/skills", "/repo/skills");

        assert_eq!(fs.entry_kind(Path::new("/home/.claude/skills")).unwrap(), Some(EntryKind::Symlink));
        assert!(fs.is_dir(Path::new("/home/.claude/skills")));
        assert_eq!(fs.list_dir(Path::new("/home/.claude/skills")).unwrap(), vec!["a"]);
        assert_eq!(
            fs.read_to_string(Path::new("/home/.claude/skills/a/SKILL.md")).unwrap(),
            "hi"
        );
    }

    #[test]
    fn relative_symlinks_resolve_against_their_parent() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/repo/settings.json", "{}");
        fs.add_symlink("/repo/link.json", "settings.json");

        assert!(fs.exists(Path::new("/repo/link.json")));
    }

    #[test]
    fn dangling_symlink_is_an_entry_but_does_not_exist() {
        let fs = MemoryFileSystem::new();
        fs.add_symlink("/home/.claude/skills", "/gone");

        assert_eq!(fs.entry_kind(Path::new("/home/.claude/skills")).unwrap(), Some(EntryKind::Symlink));
        assert!(!fs.exists(Path::new("/home/.claude/skills")));
    }

    #[test]
    fn rename_moves_whole_subtrees() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/home/.claude/skills/mine/SKILL.md", "content");

        fs.rename(Path::new("/home/.claude/skills"), Path::new("/home/.claude/skills.bak")).unwrap();

        assert!(fs.node("/home/.claude/skills").is_none());
        assert!(fs.node("/home/.claude/skills/mine/SKILL.md").is_none());
        assert_eq!(
            fs.read_to_string(Path::new("/home/.claude/skills.bak/mine/SKILL.md")).unwrap(),
            "content"
        );
        assert_eq!(fs.mutations(), 1);
    }

    #[test]
    fn rename_refuses_to_clobber() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/a");
        fs.add_dir("/b");

        let err = fs.rename(Path::new("/a"), Path::new("/b")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn symlink_requires_parent_and_free_slot() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/repo/skills");

        let missing_parent = fs.symlink(Path::new("/repo/skills"), Path::new("/home/.claude/skills"));
        assert_eq!(missing_parent.unwrap_err().kind(), io::ErrorKind::NotFound);

        fs.add_dir("/home/.claude");
        fs.symlink(Path::new("/repo/skills"), Path::new("/home/.claude/skills")).unwrap();
        let taken = fs.symlink(Path::new("/repo/skills"), Path::new("/home/.claude/skills"));
        assert_eq!(taken.unwrap_err().kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn canonicalize_follows_links_in_every_component() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/repo/skills");
        fs.add_dir("/home");
        fs.add_symlink("/home/.claude", "/repo");

        assert_eq!(fs.canonicalize(Path::new("/home/.claude/skills")).unwrap(), PathBuf::from("/repo/skills"));
        assert_eq!(fs.canonicalize(Path::new("/home/../repo")).unwrap(), PathBuf::from("/repo"));
        assert_eq!(
            fs.canonicalize(Path::new("/home/.claude/missing")).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn denied_paths_reject_mutation() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/home/.claude/skills");
        fs.deny_writes("/home/.claude");

        let err = fs
            .rename(Path::new("/home/.claude/skills"), Path::new("/home/.claude/skills.bak"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(fs.mutations(), 0);
    }

    #[test]
    fn create_dir_all_counts_once_and_is_idempotent() {
        let fs = MemoryFileSystem::new();
        fs.create_dir_all(Path::new("/home/.codex/skills")).unwrap();
        fs.create_dir_all(Path::new("/home/.codex/skills")).unwrap();

        assert!(fs.is_dir(Path::new("/home/.codex")));
        assert_eq!(fs.mutations(), 1);
    }

    #[test]
    fn copy_file_preserves_contents_and_mode() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/repo/statusline.sh", "#!/bin/sh\n");
        fs.add_dir("/home/.claude");

        fs.copy_file(Path::new("/repo/statusline.sh"), Path::new("/home/.claude/statusline.sh"))
            .unwrap();
        fs.set_executable(Path::new("/home/.claude/statusline.sh")).unwrap();

        assert_eq!(
            fs.node("/home/.claude/statusline.sh"),
            Some(Node::File { contents: b"#!/bin/sh\n".to_vec(), executable: true })
        );
    }
}
