//! Host port for platform and home-directory lookups.

use std::path::PathBuf;

/// Describes the machine the tool runs on.
pub trait Host: Send + Sync {
    /// Returns the operating system name in `std::env::consts::OS` form
    /// (`"linux"`, `"macos"`, ...).
    fn os(&self) -> String;

    /// Returns the operator's home directory, if one can be determined.
    fn home_dir(&self) -> Option<PathBuf>;
}
