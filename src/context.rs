//! Service context bundling all port trait objects.

use crate::adapters::live::{LiveClock, LiveFileSystem, LiveHost};
use crate::adapters::memory::{FixedClock, FixedHost, MemoryFileSystem};
use crate::adapters::traced::TracedFileSystem;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::host::Host;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors wire
/// up different adapter implementations (live, in-memory).
pub struct ServiceContext {
    /// Clock for backup timestamps.
    pub clock: Box<dyn Clock>,
    /// Filesystem holding sources, targets and backups.
    pub fs: Box<dyn FileSystem>,
    /// Host platform and home directory.
    pub host: Box<dyn Host>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(clock: Box<dyn Clock>, fs: Box<dyn FileSystem>, host: Box<dyn Host>) -> Self {
        Self { clock, fs, host }
    }

    /// Creates a live context over the real machine.
    ///
    /// Filesystem calls go through [`TracedFileSystem`], so `-vv` shows
    /// every syscall the run makes.
    #[must_use]
    pub fn live() -> Self {
        Self::new(
            Box::new(LiveClock),
            Box::new(TracedFileSystem::new(Box::new(LiveFileSystem))),
            Box::new(LiveHost),
        )
    }

    /// Creates a context over in-memory adapters.
    ///
    /// The adapters share state with the handles passed in, so the caller can
    /// keep clones to arrange and inspect the tree.
    #[must_use]
    pub fn in_memory(fs: &MemoryFileSystem, clock: &FixedClock, host: FixedHost) -> Self {
        Self::new(Box::new(clock.clone()), Box::new(fs.clone()), Box::new(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::path::{Path, PathBuf};

    #[test]
    fn in_memory_context_shares_state_with_its_handles() {
        let fs = MemoryFileSystem::new();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap());
        let ctx = ServiceContext::in_memory(&fs, &clock, FixedHost::linux("/home/me"));

        ctx.fs.create_dir_all(Path::new("/home/me/.claude")).unwrap();
        assert!(fs.is_dir(Path::new("/home/me/.claude")));

        clock.advance(chrono::Duration::minutes(1));
        assert_eq!(ctx.clock.now().to_rfc3339(), "2024-06-15T10:31:00+00:00");
        assert_eq!(ctx.host.home_dir(), Some(PathBuf::from("/home/me")));
    }

    #[test]
    fn live_context_reports_this_machine() {
        let ctx = ServiceContext::live();
        assert_eq!(ctx.host.os(), std::env::consts::OS);
        assert!(ctx.fs.is_dir(&std::env::temp_dir()));
    }
}
