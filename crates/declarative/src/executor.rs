//! Execution engine - refreshes, plans and applies instances with parallelism

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback};
use crate::diagnostics::Diagnostics;
use crate::diff::{DiffSummary, PlannedAction, ResourceDiff};
use crate::planner::{ExecutionPlan, Instance};
use crate::resource::Resource;
use crate::state::StateStore;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::Result;
use rayon::prelude::*;

/// Outcome for one instance
#[derive(Debug, Clone)]
pub struct InstanceReport {
    pub address: String,
    pub action: PlannedAction,
    pub result: ApplyResult,
    /// Refresh diagnostics followed by apply diagnostics
    pub diagnostics: Diagnostics,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default)]
pub struct ExecuteReport {
    pub summary: ExecuteSummary,
    /// Planned changes after refresh
    pub diffs: Vec<ResourceDiff>,
    pub instances: Vec<InstanceReport>,
}

impl ExecuteReport {
    /// Whether any instance produced an error diagnostic
    pub fn has_errors(&self) -> bool {
        self.instances.iter().any(|r| r.diagnostics.has_errors())
    }
}

/// Refresh every managed instance from the remote side
///
/// Unmanaged instances (no identifier) are not read. Returns diagnostics
/// aligned with `plan.instances`.
pub fn refresh_all(plan: &mut ExecutionPlan, ctx: &ApplyContext, jobs: usize) -> Result<Vec<Diagnostics>> {
    let resource = plan.resource.as_ref();
    run_instances(&mut plan.instances, jobs, |_, instance| {
        refresh(resource, ctx, instance)
    })
}

/// Refresh one instance
pub fn refresh(resource: &dyn Resource, ctx: &ApplyContext, instance: &mut Instance) -> Diagnostics {
    if instance.data.identifier().is_none() {
        return Diagnostics::new();
    }
    log::debug!("Refreshing {}", instance.address());
    resource.read(ctx, &mut instance.data)
}

/// Execute a plan with the given options and callbacks
///
/// Managed instances are refreshed first; instances whose refresh failed
/// are reported as failed and left alone. The remaining changes are shown
/// to `confirm` once, then applied in parallel on `opts.jobs` threads.
///
/// # Type Parameters
/// * `P` - Progress callback type
/// * `C` - Confirm callback type
pub fn execute<P, C>(
    plan: &mut ExecutionPlan,
    opts: &ExecuteOptions,
    ctx: &ApplyContext,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteReport>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let managed = plan
        .instances
        .iter()
        .filter(|i| i.data.identifier().is_some())
        .count();
    progress.on_refresh_start(managed);
    let refreshed = refresh_all(plan, ctx, opts.jobs)?;

    let mut reports: Vec<InstanceReport> = plan
        .instances
        .iter()
        .zip(refreshed)
        .map(|(instance, diagnostics)| {
            let action = PlannedAction::for_data(&instance.data, instance.desired);
            let result = if diagnostics.has_errors() {
                ApplyResult::Failed {
                    error: diagnostics.error_summary(),
                }
            } else {
                ApplyResult::NoChange
            };
            InstanceReport {
                address: instance.address(),
                action,
                result,
                diagnostics,
            }
        })
        .collect();

    // Instances whose refresh failed are not planned
    let pending: Vec<Option<PlannedAction>> = reports
        .iter()
        .map(|r| (r.result.is_success() && r.action.is_change()).then(|| r.action.clone()))
        .collect();

    let diffs: Vec<ResourceDiff> = plan
        .instances
        .iter()
        .zip(&pending)
        .filter(|(_, action)| action.is_some())
        .filter_map(|(instance, _)| ResourceDiff::from_instance(instance))
        .collect();

    progress.on_plan(&diffs);

    let skip_reason = if diffs.is_empty() {
        None
    } else if opts.dry_run {
        Some("Dry run")
    } else if ctx.is_done() {
        Some("Cancelled")
    } else if !confirm.confirm(&format!("Apply changes? ({})", DiffSummary::from_diffs(&diffs)))? {
        Some("Declined")
    } else {
        None
    };

    if diffs.is_empty() || skip_reason.is_some() {
        let reason = skip_reason.unwrap_or_default();
        for (report, action) in reports.iter_mut().zip(&pending) {
            if action.is_some() {
                report.result = ApplyResult::skipped(reason);
            }
        }
        return Ok(finish(reports, diffs));
    }

    let count = pending.iter().flatten().count();
    progress.on_batch_start(count);
    let applied = apply_batch(plan, &pending, ctx, opts.jobs, progress)?;
    progress.on_batch_complete();

    for (report, outcome) in reports.iter_mut().zip(applied) {
        if let Some((result, diagnostics)) = outcome {
            report.result = result;
            report.diagnostics.extend(diagnostics);
        }
    }

    Ok(finish(reports, diffs))
}

fn finish(instances: Vec<InstanceReport>, diffs: Vec<ResourceDiff>) -> ExecuteReport {
    let mut summary = ExecuteSummary::default();
    for report in &instances {
        summary.add_result(&report.result);
        summary.warnings += report.diagnostics.warnings().count();
    }
    ExecuteReport {
        summary,
        diffs,
        instances,
    }
}

type Outcome = Option<(ApplyResult, Diagnostics)>;

/// Apply the pending action of each instance
fn apply_batch<P: ProgressCallback>(
    plan: &mut ExecutionPlan,
    pending: &[Option<PlannedAction>],
    ctx: &ApplyContext,
    jobs: usize,
    progress: &mut P,
) -> Result<Vec<Outcome>> {
    let resource = plan.resource.as_ref();

    if jobs <= 1 {
        // Sequential execution
        let mut outcomes = Vec::with_capacity(pending.len());
        for (instance, action) in plan.instances.iter_mut().zip(pending) {
            let outcome = action.as_ref().map(|action| {
                let address = instance.address();
                progress.on_resource_start(&address, &action.to_string());
                let (result, diagnostics) = apply_instance(resource, ctx, instance, action);
                progress.on_resource_complete(&address, &result);
                (result, diagnostics)
            });
            outcomes.push(outcome);
        }
        return Ok(outcomes);
    }

    // The progress callback is not thread-safe; report after the batch.
    let outcomes = run_instances(&mut plan.instances, jobs, |index, instance| {
        pending[index]
            .as_ref()
            .map(|action| apply_instance(resource, ctx, instance, action))
    })?;

    for (instance, outcome) in plan.instances.iter().zip(&outcomes) {
        if let Some((result, _)) = outcome {
            progress.on_resource_complete(&instance.address(), result);
        }
    }

    Ok(outcomes)
}

/// Apply one planned action to one instance
pub fn apply_instance(
    resource: &dyn Resource,
    ctx: &ApplyContext,
    instance: &mut Instance,
    action: &PlannedAction,
) -> (ApplyResult, Diagnostics) {
    if ctx.is_done() {
        return (ApplyResult::skipped("Cancelled"), Diagnostics::new());
    }

    let data = &mut instance.data;
    let (diagnostics, success) = match action {
        PlannedAction::NoChange => return (ApplyResult::NoChange, Diagnostics::new()),
        PlannedAction::Create => (resource.create(ctx, data), ApplyResult::Created),
        PlannedAction::Update { .. } => (resource.update(ctx, data), ApplyResult::Modified),
        PlannedAction::Delete => (resource.delete(ctx, data), ApplyResult::Removed),
    };

    let result = if diagnostics.has_errors() {
        ApplyResult::Failed {
            error: diagnostics.error_summary(),
        }
    } else {
        success
    };
    log::info!("{}: {}", instance.address(), result);
    (result, diagnostics)
}

/// Run `f` over every instance, in parallel on a rayon pool when `jobs > 1`.
/// Results keep instance order.
fn run_instances<R, F>(instances: &mut [Instance], jobs: usize, f: F) -> Result<Vec<R>>
where
    R: Send,
    F: Fn(usize, &mut Instance) -> R + Sync,
{
    if jobs <= 1 || instances.len() <= 1 {
        return Ok(instances
            .iter_mut()
            .enumerate()
            .map(|(i, instance)| f(i, instance))
            .collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?;

    Ok(pool.install(|| {
        instances
            .par_iter_mut()
            .enumerate()
            .map(|(i, instance)| f(i, instance))
            .collect()
    }))
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple(plan: &mut ExecutionPlan, opts: &ExecuteOptions) -> Result<ExecuteReport> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, opts, &ApplyContext::default(), &mut NoProgress, &mut AutoConfirm)
}
