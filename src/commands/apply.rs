//! Default invocation: establish every binding.

use crate::context::ServiceContext;
use crate::manifest::ResolvedManifest;
use crate::reconcile::{establish_into, expand_discovery};
use crate::report::{Mode, Operation, RunReport};

/// Establishes the fixed bindings, then the discovered ones.
#[must_use]
pub fn run(ctx: &ServiceContext, manifest: &ResolvedManifest, mode: Mode) -> RunReport {
    let mut report = RunReport::new(Operation::Establish, mode);
    establish_into(ctx, &manifest.bindings, &mut report);
    let discovered = expand_discovery(ctx, &manifest.discover, &mut report);
    establish_into(ctx, &discovered, &mut report);
    report
}
