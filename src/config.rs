//! Run settings resolved from flags, environment and host.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::Error;
use crate::manifest::{Manifest, ResolvedManifest};
use crate::ports::filesystem::FileSystem;
use crate::ports::host::Host;

/// Operating systems with POSIX symlinks and a `~/.claude` layout.
pub const SUPPORTED_OS: [&str; 2] = ["linux", "macos"];

/// Everything a run needs to know before touching a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Repository root; manifest sources resolve against it.
    pub source_root: PathBuf,
    /// Home directory; manifest targets resolve against it.
    pub home: PathBuf,
    /// Manifest file chosen on the command line, if any.
    pub manifest: Option<PathBuf>,
    /// Whether discovery sets are processed.
    pub codex: bool,
    /// Emit JSON instead of status lines.
    pub json: bool,
}

/// Fails unless the host is Linux or macOS.
///
/// # Errors
///
/// Returns [`Error::UnsupportedPlatform`] naming the host OS.
pub fn ensure_supported_platform(host: &dyn Host) -> Result<(), Error> {
    let os = host.os();
    if SUPPORTED_OS.contains(&os.as_str()) {
        Ok(())
    } else {
        Err(Error::UnsupportedPlatform { os })
    }
}

fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

impl Settings {
    /// Resolves settings for `cli`, with relative paths taken from `cwd`.
    ///
    /// The source root is canonicalized, so link values name the repository
    /// the same way however it was reached.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedPlatform`], [`Error::NoHomeDir`], or
    /// [`Error::MissingSourceRoot`] when the repository root is not a
    /// directory.
    pub fn resolve(cli: &Cli, host: &dyn Host, fs: &dyn FileSystem, cwd: &Path) -> Result<Self, Error> {
        ensure_supported_platform(host)?;
        let home = host.home_dir().ok_or(Error::NoHomeDir)?;
        let source_root = cli.source.as_deref().map_or_else(|| cwd.to_path_buf(), |s| absolutize(s, cwd));
        if !fs.is_dir(&source_root) {
            return Err(Error::MissingSourceRoot(source_root));
        }
        let source_root = fs.canonicalize(&source_root)?;
        tracing::debug!(
            source = %source_root.display(),
            home = %home.display(),
            codex = cli.codex,
            "settings resolved"
        );
        Ok(Self {
            source_root,
            home,
            manifest: cli.manifest.as_deref().map(|m| absolutize(m, cwd)),
            codex: cli.codex,
            json: cli.json,
        })
    }

    /// Loads the manifest for this run and makes its paths absolute.
    /// Discovery sets are dropped unless `codex` is on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Manifest`] if the chosen manifest cannot be loaded.
    pub fn load_manifest(&self, fs: &dyn FileSystem) -> Result<ResolvedManifest, Error> {
        let manifest = Manifest::select(fs, &self.source_root, self.manifest.as_deref())?;
        let mut resolved = manifest.resolve(&self.source_root, &self.home);
        if !self.codex {
            resolved.discover.clear();
        }
        Ok(resolved)
    }
}
