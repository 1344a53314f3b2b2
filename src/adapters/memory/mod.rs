//! In-memory adapters for tests and dry experiments.
//!
//! These never touch the real machine: the filesystem is a shared tree,
//! the clock only moves when told to, and the host reports whatever it was
//! built with.

pub mod clock;
pub mod filesystem;
pub mod host;

pub use clock::FixedClock;
pub use filesystem::{MemoryFileSystem, Node};
pub use host::FixedHost;
