//! Whole-run loops over the binding list.
//!
//! Every binding is processed no matter what happened to the ones before
//! it; the [`RunReport`] is the only place outcomes come together.

use crate::binding::{Binding, Strategy};
use crate::context::ServiceContext;
use crate::linker::discovery::{discover, DiscoverySet};
use crate::linker::LinkManager;
use crate::report::{BindingReport, Mode, Operation, RunReport};

/// Expands discovery sets into bindings.
///
/// A set that cannot be expanded is recorded in `report` and contributes no
/// bindings; the others still do.
pub fn expand_discovery(
    ctx: &ServiceContext,
    sets: &[DiscoverySet],
    report: &mut RunReport,
) -> Vec<Binding> {
    let mut bindings = Vec::new();
    for set in sets {
        match discover(ctx.fs.as_ref(), set) {
            Ok(found) => {
                tracing::info!(source = %set.source.display(), count = found.len(), "discovered");
                bindings.extend(found);
            }
            Err(err) => {
                tracing::warn!(source = %set.source.display(), error = %err, "discovery failed");
                report.push(BindingReport::new(&set.as_binding(), Err(err)));
            }
        }
    }
    bindings
}

fn run_each(
    bindings: &[Binding],
    report: &mut RunReport,
    mut step: impl FnMut(&Binding) -> BindingReport,
) {
    for binding in bindings {
        let entry = step(binding);
        match &entry.outcome {
            Ok(action) => tracing::info!(target_path = %binding.target.display(), ?action, "done"),
            Err(err) => tracing::warn!(target_path = %binding.target.display(), error = %err, "not done"),
        }
        report.push(entry);
    }
}

/// Establishes every binding, appending to `report`.
pub fn establish_into(ctx: &ServiceContext, bindings: &[Binding], report: &mut RunReport) {
    let manager = LinkManager::new(ctx, report.mode);
    run_each(bindings, report, |binding| {
        let outcome = match binding.strategy {
            Strategy::Link => manager.establish(binding),
            Strategy::Copy => manager.establish_copy(binding),
        };
        BindingReport::new(binding, outcome)
    });
}

/// Undoes every binding, appending to `report`.
pub fn undo_into(ctx: &ServiceContext, bindings: &[Binding], report: &mut RunReport) {
    let manager = LinkManager::new(ctx, report.mode);
    run_each(bindings, report, |binding| BindingReport::new(binding, manager.undo(binding)));
}

/// Establishes every binding in order and reports on each.
#[must_use]
pub fn reconcile_all(ctx: &ServiceContext, bindings: &[Binding], mode: Mode) -> RunReport {
    let mut report = RunReport::new(Operation::Establish, mode);
    establish_into(ctx, bindings, &mut report);
    report
}

/// Undoes every binding in order and reports on each.
#[must_use]
pub fn undo_all(ctx: &ServiceContext, bindings: &[Binding], mode: Mode) -> RunReport {
    let mut report = RunReport::new(Operation::Undo, mode);
    undo_into(ctx, bindings, &mut report);
    report
}
