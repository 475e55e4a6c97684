//! `outpostctl apply` - make remote outposts match the manifest

use super::{Session, summarize};
use crate::Context;
use crate::cli::ApplyArgs;
use crate::progress::{Prompt, TerminalProgress};
use crate::ui;
use anyhow::Result;
use declarative::{ConfirmCallback, ExecuteOptions, ExecuteReport, ProgressCallback};
use gqlkit::Transport;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let mut session = Session::open(ctx, true)?;
    let opts = ExecuteOptions {
        dry_run: args.dry_run,
        jobs: usize::from(args.jobs.max(1)),
    };

    let report = apply(
        &mut session,
        args.target.as_deref(),
        &opts,
        &mut TerminalProgress::new(ctx.quiet),
        &mut Prompt::new(args.yes),
    )?;

    if opts.dry_run && !ctx.quiet {
        println!();
        ui::info("Dry run - no changes made");
    }
    summarize(&report, ctx.quiet)
}

/// Reconcile declared outposts and delete recorded ones no longer declared
///
/// State is written after every non-dry run, including declined ones, so
/// refreshed values are kept.
pub fn apply<T, P, C>(
    session: &mut Session<T>,
    target: Option<&str>,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteReport>
where
    T: Transport + 'static,
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let mut plan = session.plan()?.filter_by_target(target);
    if plan.is_empty() {
        match target {
            Some(t) => ui::warn(&format!("No outpost matches target '{t}'")),
            None => ui::info("Manifest declares no outposts and state is empty"),
        }
        return Ok(ExecuteReport::default());
    }

    let report = declarative::execute(&mut plan, opts, &session.apply_context(), progress, confirm)?;
    if !opts.dry_run {
        session.persist(&plan)?;
    }
    Ok(report)
}
