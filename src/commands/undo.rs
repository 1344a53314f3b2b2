//! `--undo`: remove links and restore backups.

use crate::context::ServiceContext;
use crate::manifest::ResolvedManifest;
use crate::reconcile::{expand_discovery, undo_into};
use crate::report::{Mode, Operation, RunReport};

/// Undoes the fixed bindings, then the discovered ones, in establish order.
#[must_use]
pub fn run(ctx: &ServiceContext, manifest: &ResolvedManifest, mode: Mode) -> RunReport {
    let mut report = RunReport::new(Operation::Undo, mode);
    undo_into(ctx, &manifest.bindings, &mut report);
    let discovered = expand_discovery(ctx, &manifest.discover, &mut report);
    undo_into(ctx, &discovered, &mut report);
    report
}
