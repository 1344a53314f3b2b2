//! Live host adapter.

use std::path::PathBuf;

use crate::ports::host::Host;

/// Live host that reports the compile-time OS and the `HOME` of the
/// invoking user.
pub struct LiveHost;

impl Host for LiveHost {
    fn os(&self) -> String {
        std::env::consts::OS.to_string()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        home::home_dir().filter(|p| !p.as_os_str().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_the_build_os() {
        assert_eq!(LiveHost.os(), std::env::consts::OS);
    }
}
