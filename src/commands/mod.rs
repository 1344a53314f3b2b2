//! Command dispatch and handlers.

pub mod apply;
pub mod status;
pub mod undo;

use std::io::{self, Write};
use std::path::Path;

use crate::cli::Cli;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::error::Error;
use crate::report::{Operation, RunReport};

/// Runs the invocation described by `cli` against the real machine.
///
/// # Errors
///
/// Returns a fatal [`Error`] for setup problems, or [`Error::Incomplete`]
/// after the report when any binding failed.
pub fn dispatch(cli: &Cli) -> Result<(), Error> {
    let ctx = ServiceContext::live();
    let cwd = std::env::current_dir()?;
    let stdout = io::stdout();
    run_with_context(cli, &ctx, &cwd, &mut stdout.lock())
}

/// Runs the invocation with the given service context, writing the report
/// to `out`.
///
/// # Errors
///
/// See [`dispatch`].
pub fn run_with_context(
    cli: &Cli,
    ctx: &ServiceContext,
    cwd: &Path,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let settings = Settings::resolve(cli, ctx.host.as_ref(), ctx.fs.as_ref(), cwd)?;
    let manifest = settings.load_manifest(ctx.fs.as_ref())?;

    if cli.status {
        return status::run(ctx, &manifest, settings.json, out);
    }

    let report = match cli.operation() {
        Operation::Establish => apply::run(ctx, &manifest, cli.mode()),
        Operation::Undo => undo::run(ctx, &manifest, cli.mode()),
    };
    emit(&settings, &report, out)?;

    let failed = report.summary().failed;
    if failed > 0 {
        return Err(Error::Incomplete { failed });
    }
    Ok(())
}

fn emit(settings: &Settings, report: &RunReport, out: &mut dyn Write) -> Result<(), Error> {
    if settings.json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        return Ok(());
    }
    let verb = match report.operation {
        Operation::Establish => "Linking",
        Operation::Undo => "Unlinking",
    };
    writeln!(out, "{verb} {} into {}", settings.source_root.display(), settings.home.display())?;
    if !report.mode.applies() {
        writeln!(out, "Dry run: nothing will be changed.")?;
    }
    writeln!(out)?;
    write!(out, "{}", report.render())?;
    Ok(())
}
