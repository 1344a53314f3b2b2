//! Pure decisions over an observed [`LinkState`].
//!
//! Nothing here touches the filesystem, which keeps the state machine
//! testable on its own:
//!
//! ```text
//! Absent         --establish--> SymlinkCorrect
//! RealEntry      --establish--> SymlinkCorrect   (backup taken first)
//! SymlinkStale   --establish--> SymlinkStale     (refused)
//! SymlinkCorrect --establish--> SymlinkCorrect   (no-op)
//! any symlink    --undo-------> Absent | RealEntry
//! Absent         --undo-------> Absent           (no-op)
//! ```

use std::path::PathBuf;

use crate::binding::LinkState;

/// What `establish` should do for a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstablishPlan {
    /// Already linked; nothing to do.
    Keep,
    /// Somebody else's symlink; leave it alone.
    Refuse {
        /// Where the foreign link points.
        points_to: PathBuf,
    },
    /// Move the real entry aside, then link.
    Displace,
    /// Link into the empty slot.
    Create,
}

/// What `undo` should do for a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoPlan {
    /// Not a symlink; nothing to undo.
    Skip,
    /// Remove the symlink, then restore the latest backup if any.
    ///
    /// Any symlink qualifies, including one that points somewhere other than
    /// the binding's source.
    Unlink,
}

/// Decide how to establish a binding.
#[must_use]
pub fn plan_establish(state: &LinkState) -> EstablishPlan {
    match state {
        LinkState::SymlinkCorrect => EstablishPlan::Keep,
        LinkState::SymlinkStale { points_to } => {
            EstablishPlan::Refuse { points_to: points_to.clone() }
        }
        LinkState::RealEntry => EstablishPlan::Displace,
        LinkState::Absent => EstablishPlan::Create,
    }
}

/// Decide how to undo a binding.
#[must_use]
pub fn plan_undo(state: &LinkState) -> UndoPlan {
    match state {
        LinkState::SymlinkCorrect | LinkState::SymlinkStale { .. } => UndoPlan::Unlink,
        LinkState::Absent | LinkState::RealEntry => UndoPlan::Skip,
    }
}
