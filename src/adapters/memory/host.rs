//! Host with a configured OS and home directory.

use std::path::PathBuf;

use crate::ports::host::Host;

/// Host that reports fixed values.
#[derive(Debug, Clone)]
pub struct FixedHost {
    os: String,
    home: Option<PathBuf>,
}

impl FixedHost {
    /// Creates a host reporting `os` and `home`.
    #[must_use]
    pub fn new(os: impl Into<String>, home: Option<PathBuf>) -> Self {
        Self { os: os.into(), home }
    }

    /// A Linux host whose home directory is `home`.
    #[must_use]
    pub fn linux(home: impl Into<PathBuf>) -> Self {
        Self::new("linux", Some(home.into()))
    }
}

impl Host for FixedHost {
    fn os(&self) -> String {
        self.os.clone()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}
