//! `--status`: show every binding's state.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::binding::Binding;
use crate::context::ServiceContext;
use crate::error::{Error, ReconcileError};
use crate::linker::{BindingStatus, LinkManager};
use crate::manifest::ResolvedManifest;
use crate::reconcile::expand_discovery;
use crate::report::{Mode, Operation, RunReport};

/// One row of the status table.
#[derive(Debug, Clone, Serialize)]
pub struct StatusRow {
    /// Display name.
    pub name: String,
    /// Target path.
    pub target: PathBuf,
    /// Observed state, or why it could not be observed.
    pub status: Result<BindingStatus, ReconcileError>,
}

impl StatusRow {
    fn state_text(&self) -> String {
        match &self.status {
            Ok(status) => status.to_string(),
            Err(err) => err.to_string(),
        }
    }
}

/// Inspects every binding, fixed then discovered, without changing anything.
#[must_use]
pub fn collect(ctx: &ServiceContext, manifest: &ResolvedManifest) -> Vec<StatusRow> {
    let manager = LinkManager::new(ctx, Mode::DryRun);
    let row = |binding: &Binding, status| StatusRow {
        name: binding.name(),
        target: binding.target.clone(),
        status,
    };

    let mut rows: Vec<StatusRow> =
        manifest.bindings.iter().map(|b| row(b, manager.inspect(b))).collect();

    let mut problems = RunReport::new(Operation::Establish, Mode::DryRun);
    let discovered = expand_discovery(ctx, &manifest.discover, &mut problems);
    for entry in problems.entries {
        if let Err(err) = entry.outcome {
            rows.push(StatusRow { name: entry.name, target: entry.target, status: Err(err) });
        }
    }
    rows.extend(discovered.iter().map(|b| row(b, manager.inspect(b))));
    rows
}

/// Execute `--status`.
///
/// Prints a NAME / TARGET / STATE table, or the rows as JSON.
///
/// # Errors
///
/// Returns an error if writing the output fails.
pub fn run(
    ctx: &ServiceContext,
    manifest: &ResolvedManifest,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let rows = collect(ctx, manifest);

    if json {
        serde_json::to_writer_pretty(&mut *out, &rows)?;
        writeln!(out)?;
        return Ok(());
    }

    if rows.is_empty() {
        writeln!(out, "No bindings declared.")?;
        return Ok(());
    }

    // Collect cells for column-width calculation.
    let cells: Vec<(String, String, String)> = rows
        .iter()
        .map(|r| (r.name.clone(), r.target.display().to_string(), r.state_text()))
        .collect();

    let name_width = cells.iter().map(|c| c.0.len()).max().unwrap_or(4).max(4);
    let target_width = cells.iter().map(|c| c.1.len()).max().unwrap_or(6).max(6);

    writeln!(out, "{:<name_width$}  {:<target_width$}  STATE", "NAME", "TARGET")?;
    writeln!(out, "{:-<name_width$}  {:-<target_width$}  -----", "", "")?;
    for (name, target, state) in &cells {
        writeln!(out, "{name:<name_width$}  {target:<target_width$}  {state}")?;
    }

    writeln!(out, "\n{} binding(s) total.", cells.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FixedClock, FixedHost, MemoryFileSystem};
    use crate::binding::LinkState;
    use crate::linker::CopyState;
    use crate::manifest::Manifest;
    use chrono::{TimeZone, Utc};
    use std::path::Path;

    fn setup() -> (ServiceContext, MemoryFileSystem, ResolvedManifest) {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/repo/skills/alpha");
        fs.add_dir("/repo/commands");
        fs.add_file("/repo/statusline.sh", "#!/bin/sh\n");
        fs.add_symlink("/home/.claude/skills", "/repo/skills");
        fs.add_dir("/home/.claude/commands");
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 15, 14, 30, 0).unwrap());
        let ctx = ServiceContext::in_memory(&fs, &clock, FixedHost::linux("/home"));
        let manifest = Manifest::builtin().resolve(Path::new("/repo"), Path::new("/home"));
        (ctx, fs, manifest)
    }

    #[test]
    fn collect_reports_each_state_without_mutating() {
        let (ctx, fs, manifest) = setup();

        let rows = collect(&ctx, &manifest);

        assert_eq!(rows[0].status, Ok(BindingStatus::Link { state: LinkState::SymlinkCorrect }));
        assert_eq!(rows[1].status, Ok(BindingStatus::Link { state: LinkState::RealEntry }));
        assert_eq!(rows[2].status, Ok(BindingStatus::SourceMissing));
        assert_eq!(rows[6].status, Ok(BindingStatus::Copy { state: CopyState::Absent }));
        assert_eq!(rows.last().unwrap().name, "alpha");
        assert_eq!(fs.mutations(), 0);
    }

    #[test]
    fn table_has_header_and_total() {
        let (ctx, _, manifest) = setup();
        let mut out = Vec::new();

        run(&ctx, &manifest, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("NAME"));
        assert!(text.contains("STATE"));
        assert!(text.contains("9 binding(s) total."));
    }

    #[test]
    fn empty_manifest_says_so() {
        let (ctx, _, _) = setup();
        let empty = ResolvedManifest { bindings: Vec::new(), discover: Vec::new() };
        let mut out = Vec::new();

        run(&ctx, &empty, false, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "No bindings declared.\n");
    }
}
