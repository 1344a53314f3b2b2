//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the link engine and the outside
//! world (time, disk, host platform). Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod host;

pub use clock::Clock;
pub use filesystem::{EntryKind, FileSystem};
pub use host::Host;
