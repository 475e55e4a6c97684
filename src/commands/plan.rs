//! `outpostctl plan` - refresh and show what apply would change

use super::{Session, summarize};
use crate::Context;
use crate::cli::PlanArgs;
use crate::progress::TerminalProgress;
use anyhow::Result;
use declarative::{AutoDecline, ExecuteOptions, ExecuteReport, ProgressCallback};
use gqlkit::Transport;

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let session = Session::open(ctx, true)?;
    let report = plan(&session, args.target.as_deref(), &mut TerminalProgress::new(ctx.quiet))?;
    summarize(&report, ctx.quiet)
}

/// Refresh and plan without changing anything, locally or remotely
pub fn plan<T, P>(session: &Session<T>, target: Option<&str>, progress: &mut P) -> Result<ExecuteReport>
where
    T: Transport + 'static,
    P: ProgressCallback,
{
    let mut plan = session.plan()?.filter_by_target(target);
    let opts = ExecuteOptions {
        dry_run: true,
        ..ExecuteOptions::default()
    };
    declarative::execute(&mut plan, &opts, &session.apply_context(), progress, &mut AutoDecline)
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use declarative::{NoProgress, PlannedAction, Resource, ResourceData};
    use gqlkit::{MockTransport, OperationKind};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_plan_new_outpost_is_create() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new();
        let session = session(&dir, MANIFEST, transport.clone());

        let report = plan(&session, None, &mut NoProgress).unwrap();
        assert_eq!(report.diffs.len(), 1);
        assert_eq!(report.diffs[0].action, PlannedAction::Create);
        assert!(transport.requests().is_empty());
        assert!(!session.state_path.exists());
    }

    #[test]
    fn test_plan_detects_remote_deletion() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new();
        transport.push(OperationKind::Read, missing());
        let mut session = session(&dir, MANIFEST, transport.clone());
        let schema = session.resource.schema();
        session.state.record(
            "prod",
            &ResourceData::new(schema)
                .with_state(json!({"name": "prod", "provider": "aws"}).as_object().cloned().unwrap())
                .with_identifier("o-1"),
        );

        let report = plan(&session, Some("outpost.prod"), &mut NoProgress).unwrap();
        assert_eq!(report.diffs[0].action, PlannedAction::Create);
        assert!(!report.has_errors());
        assert_eq!(transport.requests_of(OperationKind::Read).len(), 1);
        assert!(transport.requests_of(OperationKind::Create).is_empty());
        // Plan never writes state
        assert_eq!(session.state.get("prod").map(|s| s.id.as_str()), Some("o-1"));
    }

    #[test]
    fn test_plan_target_filters() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir, MANIFEST, MockTransport::new());
        let report = plan(&session, Some("outpost.other"), &mut NoProgress).unwrap();
        assert!(report.diffs.is_empty());
        assert!(report.instances.is_empty());
    }
}
