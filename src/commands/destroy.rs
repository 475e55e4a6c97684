//! `outpostctl destroy` - delete one outpost

use super::{Session, summarize};
use crate::Context;
use crate::cli::DestroyArgs;
use crate::progress::{Prompt, TerminalProgress};
use crate::ui;
use anyhow::Result;
use declarative::{ConfirmCallback, ExecuteOptions, ExecuteReport, ProgressCallback};
use gqlkit::Transport;

pub fn run(ctx: &Context, args: DestroyArgs) -> Result<()> {
    let mut session = Session::open(ctx, false)?;
    let report = destroy(
        &mut session,
        &args.name,
        &mut TerminalProgress::new(ctx.quiet),
        &mut Prompt::new(args.yes),
    )?;

    if report.summary.removed > 0 && session.manifest.get(&args.name).is_some() {
        ui::warn(&format!(
            "'{}' is still declared in the manifest; the next apply will create it again",
            args.name
        ));
    }
    summarize(&report, ctx.quiet)
}

pub fn destroy<T, P, C>(session: &mut Session<T>, name: &str, progress: &mut P, confirm: &mut C) -> Result<ExecuteReport>
where
    T: Transport + 'static,
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let mut plan = session.destroy_plan(name)?;
    let opts = ExecuteOptions {
        dry_run: false,
        jobs: 1,
    };
    let report = declarative::execute(&mut plan, &opts, &session.apply_context(), progress, confirm)?;
    session.persist(&plan)?;
    Ok(report)
}
