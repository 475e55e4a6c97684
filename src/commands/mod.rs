//! Subcommands and the session they share
//!
//! A session ties together client settings, the manifest, the state file
//! next to it and an `OutpostResource` over HTTP.

pub mod apply;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod show;

use crate::Context;
use crate::config::Settings;
use crate::manifest::Manifest;
use crate::state::StateFile;
use crate::ui;
use anyhow::{Context as AnyhowContext, Result, bail};
use colored::Colorize;
use declarative::{ApplyContext, ExecuteReport, ExecutionPlan, Instance, Resource, ResourceData, SharedResource};
use gqlkit::{HttpTransport, Transport};
use outpost::{OutpostResource, RESOURCE_TYPE};
use std::path::PathBuf;
use std::sync::Arc;

pub struct Session<T = HttpTransport> {
    pub state_path: PathBuf,
    pub manifest: Manifest,
    pub state: StateFile,
    pub resource: Arc<OutpostResource<T>>,
    verbose: bool,
}

impl Session<HttpTransport> {
    /// Open a session from the command line context
    ///
    /// Fails before any network call when no endpoint is configured. A
    /// missing manifest is only an error when `require_manifest` is set.
    pub fn open(ctx: &Context, require_manifest: bool) -> Result<Self> {
        let settings = Settings::load(ctx.config.as_deref())?.with_endpoint(ctx.endpoint.clone());
        let mut transport = HttpTransport::new(settings.endpoint()?)
            .with_timeout(settings.timeout())
            .with_retry(settings.retry_config());
        if let Some(token) = &ctx.token {
            transport = transport.with_token(token.clone());
        }
        log::debug!("Using endpoint {}", transport.endpoint());

        let resource = OutpostResource::new(transport).with_delete_strategy(settings.delete_strategy);

        let manifest_path = crate::config::expand_path(&ctx.manifest);
        let manifest = if manifest_path.exists() || require_manifest {
            Manifest::load(&manifest_path)?
        } else {
            log::debug!("No manifest at {}", manifest_path.display());
            Manifest::default()
        };

        let state_path = StateFile::path_for(&manifest_path);
        let state = StateFile::load(&state_path)?;

        Ok(Self::new(resource, manifest, state, state_path, ctx.verbose > 0))
    }
}

impl<T: Transport + 'static> Session<T> {
    pub fn new(
        resource: OutpostResource<T>,
        manifest: Manifest,
        state: StateFile,
        state_path: PathBuf,
        verbose: bool,
    ) -> Self {
        Self {
            state_path,
            manifest,
            state,
            resource: Arc::new(resource),
            verbose,
        }
    }

    pub fn apply_context(&self) -> ApplyContext {
        ApplyContext::new(self.verbose)
    }

    fn shared(&self) -> SharedResource {
        self.resource.clone()
    }

    /// Local data for `name`: declared values from the manifest, recorded
    /// values and identifier from state
    pub fn instance_data(&self, name: &str) -> Result<ResourceData> {
        let mut data = ResourceData::new(self.resource.schema());
        if let Some(spec) = self.manifest.get(name) {
            data = data.with_declared(spec.declared()?);
        }
        if let Some(recorded) = self.state.get(name) {
            data = data
                .with_state(recorded.attributes.clone())
                .with_identifier(recorded.id.clone());
        }
        Ok(data)
    }

    /// Every declared outpost plus every recorded one no longer declared
    pub fn plan(&self) -> Result<ExecutionPlan> {
        let mut plan = ExecutionPlan::new(self.shared());
        for spec in &self.manifest.outposts {
            let data = self.instance_data(&spec.name)?;
            plan.add_instance(Instance::new(RESOURCE_TYPE, &spec.name, data));
        }
        for name in self.state.orphans(|name| self.manifest.get(name).is_some()) {
            let data = self.instance_data(name)?;
            plan.add_instance(Instance::new(RESOURCE_TYPE, name, data).orphaned());
        }
        Ok(plan)
    }

    /// Plan holding a single recorded outpost, marked for deletion
    pub fn destroy_plan(&self, name: &str) -> Result<ExecutionPlan> {
        if self.state.get(name).is_none() {
            bail!("Outpost '{name}' is not in state");
        }
        let mut plan = ExecutionPlan::new(self.shared());
        let data = self.instance_data(name)?;
        plan.add_instance(Instance::new(RESOURCE_TYPE, name, data).orphaned());
        Ok(plan)
    }

    /// Write every instance of `plan` back to the state file
    pub fn persist(&mut self, plan: &ExecutionPlan) -> Result<()> {
        for instance in &plan.instances {
            self.state.record(&instance.name, &instance.data);
        }
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        self.state
            .save(&self.state_path)
            .with_context(|| format!("Failed to save state for {} outposts", self.state.outposts.len()))
    }
}

/// Print per-outpost diagnostics and the run summary
///
/// Fails when any outpost reported an error, so the process exits non-zero.
pub fn summarize(report: &ExecuteReport, quiet: bool) -> Result<()> {
    for instance in &report.instances {
        ui::diagnostics(&instance.address, &instance.diagnostics);
    }

    let summary = &report.summary;
    if !quiet && summary.total_changes() + summary.failed > 0 {
        println!();
        println!(
            "  {} created, {} updated, {} deleted, {} failed",
            summary.created.to_string().green(),
            summary.modified.to_string().yellow(),
            summary.removed.to_string().red(),
            summary.failed.to_string().red().bold()
        );
    }

    let failed = report
        .instances
        .iter()
        .filter(|i| i.diagnostics.has_errors())
        .count();
    if failed > 0 {
        bail!("{failed} outpost(s) reported errors");
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use gqlkit::{GraphQlError, MockTransport, Response};
    use serde_json::json;
    use tempfile::TempDir;

    pub const MANIFEST: &str = r#"
[[outpost]]
name = "prod"
provider = "aws"

[outpost.aws]
roleARN = "arn:aws:iam::123456789012:role/outpost"
"#;

    pub fn created(id: &str) -> Response {
        Response::ok(json!({"createOutpost": {"outpost": {"id": id}}}))
    }

    pub fn outpost(id: &str, name: &str) -> Response {
        Response::ok(json!({"outpost": {
            "id": id,
            "name": name,
            "enabled": true,
            "status": "CONNECTED",
            "config": {"__typename": "OutpostAWSConfig", "roleARN": "arn:aws:iam::123456789012:role/outpost"},
            "clusters": [],
        }}))
    }

    /// Reply the service gives for an unknown identifier
    pub fn missing() -> Response {
        Response::failed(vec![GraphQlError::new("oops! an internal error has occurred")])
    }

    pub fn session(dir: &TempDir, manifest: &str, transport: MockTransport) -> Session<MockTransport> {
        let state_path = dir.path().join("outposts.toml.state.json");
        let state = StateFile::load(&state_path).unwrap();
        Session::new(
            OutpostResource::new(transport),
            Manifest::parse(manifest).unwrap(),
            state,
            state_path,
            false,
        )
    }
}
