//! Lifecycle orchestration of the `outpost` resource type.
//!
//! Create and Update always finish with a Read, so local state only ever
//! holds what the remote side confirmed. Every outcome is reported as
//! diagnostics on the instance.

use crate::attributes::{self, PROVIDER, desired_from_store, write_record};
use crate::drift::{self, ReadOutcome};
use crate::error::{Error, Result};
use crate::mapper;
use crate::model::{ProviderKind, RemoteRecord};
use crate::patch::ChangeSet;
use crate::request::{self, DeleteStrategy, OutpostRequest};
use declarative::{ApplyContext, Diagnostic, Diagnostics, Resource, Schema, StateStore};
use gqlkit::{CancelToken, RequestContext, Response, Transport};
use std::fmt;
use std::sync::Arc;

/// Resource type name used in instance addresses.
pub const RESOURCE_TYPE: &str = "outpost";

/// Result of fetching a single record.
#[derive(Debug)]
pub enum Fetched {
    /// The record no longer exists remotely.
    Gone,
    /// The record came back; `diagnostics` carries the remote errors of a
    /// partial success.
    Found {
        record: RemoteRecord,
        diagnostics: Diagnostics,
    },
}

/// Outpost lifecycle over any GraphQL transport.
pub struct OutpostResource<T> {
    transport: T,
    delete_strategy: DeleteStrategy,
    schema: Arc<Schema>,
}

impl<T> fmt::Debug for OutpostResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutpostResource")
            .field("delete_strategy", &self.delete_strategy)
            .finish_non_exhaustive()
    }
}

/// Request context carrying the caller's cancellation flag and deadline.
fn request_context(ctx: &ApplyContext) -> RequestContext {
    let request_ctx = RequestContext::new().with_cancel(CancelToken::from(ctx.cancel_flag()));
    match ctx.deadline() {
        Some(deadline) => request_ctx.with_deadline(deadline),
        None => request_ctx,
    }
}

fn declared_kind(data: &dyn StateStore) -> Option<ProviderKind> {
    data.get_str(PROVIDER).ok()?.parse().ok()
}

impl<T: Transport> OutpostResource<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            delete_strategy: DeleteStrategy::default(),
            schema: Arc::new(attributes::schema()),
        }
    }

    #[must_use]
    pub fn with_delete_strategy(mut self, strategy: DeleteStrategy) -> Self {
        self.delete_strategy = strategy;
        self
    }

    pub fn delete_strategy(&self) -> DeleteStrategy {
        self.delete_strategy
    }

    fn send(&self, ctx: &ApplyContext, built: &OutpostRequest) -> Result<Response> {
        log::debug!("Sending {} request", built.operation);
        Ok(self
            .transport
            .execute(&request_context(ctx), &built.request, built.operation)?)
    }

    /// Fetch one record without touching any state.
    pub fn fetch(&self, ctx: &ApplyContext, id: &str, hint: Option<ProviderKind>) -> Result<Fetched> {
        let built = request::build_read(id)?;
        let response = self.send(ctx, &built)?;

        let outcome = drift::classify(&response, built.path);
        log::debug!("Read of outpost {id}: {outcome}");
        match outcome {
            ReadOutcome::RecordGone => {
                for error in &response.errors {
                    log::debug!("Remote error while reading {id}: {error}");
                }
                return Ok(Fetched::Gone);
            }
            ReadOutcome::Malformed => {
                return Err(Error::UnexpectedResponse(format!(
                    "read of outpost {id} returned no record and no errors"
                )));
            }
            ReadOutcome::Success | ReadOutcome::GenuineFailure => {}
        }

        let record = mapper::outpost_from_response(&response, built.path, hint)?;
        log::debug!("Mapped outpost record: {:?}", record.redacted());
        let diagnostics = match outcome {
            ReadOutcome::GenuineFailure => Error::remote(&response.errors).into_diagnostics(),
            _ => Diagnostics::new(),
        };
        Ok(Fetched::Found { record, diagnostics })
    }

    fn try_create(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Result<Diagnostics> {
        let desired = desired_from_store(data)?;
        log::info!("Creating {} outpost {}", desired.kind, desired.name);
        let built = request::build_create(&desired)?;
        let response = self.send(ctx, &built)?;

        let id = drift::record_id(&response, built.path).map(str::to_string);
        match (id, response.has_errors()) {
            (Some(id), false) => {
                data.set_identifier(&id);
                log::info!("Created outpost {id}");
                self.read_after_create(ctx, data, &id)
            }
            (Some(id), true) => {
                // The record exists remotely, so keep track of it.
                data.set_identifier(&id);
                Ok(Error::remote(&response.errors).into_diagnostics())
            }
            (None, true) => Ok(Error::remote(&response.errors).into_diagnostics()),
            (None, false) => Err(Error::UnexpectedResponse(
                "create returned no outpost identifier".to_string(),
            )),
        }
    }

    /// Read a freshly created record. The id stays committed whatever the
    /// read reports, so the remote object is never orphaned.
    fn read_after_create(&self, ctx: &ApplyContext, data: &mut dyn StateStore, id: &str) -> Result<Diagnostics> {
        match self.fetch(ctx, id, declared_kind(data))? {
            Fetched::Found { record, diagnostics } => {
                write_record(data, &record)?;
                Ok(diagnostics)
            }
            Fetched::Gone => {
                log::warn!("Outpost {id} was created but could not be read back");
                Ok(Diagnostic::error(format!("Outpost {id} not readable after create"))
                    .with_detail("The identifier is kept in state; the next refresh decides whether it still exists")
                    .into())
            }
        }
    }

    fn try_read(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Result<Diagnostics> {
        let Some(id) = data.identifier().map(str::to_string) else {
            return Ok(Diagnostics::new());
        };
        log::info!("Reading outpost {id}");

        match self.fetch(ctx, &id, declared_kind(data))? {
            Fetched::Gone => {
                log::info!("Resource not found, marking as new");
                data.clear_identifier();
                data.mark_for_recreation();
                Ok(Diagnostics::new())
            }
            Fetched::Found { record, diagnostics } => {
                write_record(data, &record)?;
                Ok(diagnostics)
            }
        }
    }

    fn try_update(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Result<Diagnostics> {
        let Some(id) = data.identifier().map(str::to_string) else {
            return Ok(Diagnostics::new());
        };
        log::info!("Updating outpost {id}");

        let changes = ChangeSet::from_store(data)?;
        let mut diagnostics: Diagnostics = changes
            .unpatchable
            .iter()
            .map(|attribute| {
                Diagnostic::warning(format!("Change to \"{attribute}\" is not applied by update"))
                    .with_detail("Only name and enabled can be patched; recreate the outpost to apply it")
                    .with_attribute(*attribute)
            })
            .collect();

        if changes.is_empty() {
            log::debug!("No patchable change for outpost {id}, skipping the mutation");
        } else {
            let built = request::build_update(&id, &changes)?;
            match self.send(ctx, &built) {
                Ok(response) if response.has_errors() => {
                    diagnostics.extend(Error::remote(&response.errors).into_diagnostics());
                    return Ok(diagnostics);
                }
                Ok(_) => {}
                Err(e) => {
                    diagnostics.extend(e.into_diagnostics());
                    return Ok(diagnostics);
                }
            }
        }

        diagnostics.extend(self.read(ctx, data));
        Ok(diagnostics)
    }

    fn try_delete(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Result<Diagnostics> {
        let Some(id) = data.identifier().map(str::to_string) else {
            return Ok(Diagnostics::new());
        };
        log::info!("Deleting outpost {id} ({})", self.delete_strategy);

        let built = request::build_delete(&id, self.delete_strategy)?;
        let failure = match self.send(ctx, &built) {
            Ok(response) if !response.has_errors() => {
                data.clear_identifier();
                return Ok(Diagnostics::new());
            }
            Ok(response) => Error::remote(&response.errors).into_diagnostics(),
            Err(e) => e.into_diagnostics(),
        };

        let verification = self.read(ctx, data);
        if data.identifier().is_none() {
            log::info!("Outpost {id} was already deleted");
            return Ok(failure.into_iter().map(Diagnostic::downgraded).collect());
        }
        for diagnostic in &verification {
            log::debug!("Verification read after failed delete: {diagnostic}");
        }
        Ok(failure)
    }
}

impl<T: Transport> Resource for OutpostResource<T> {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    fn create(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
        self.try_create(ctx, data).unwrap_or_else(Error::into_diagnostics)
    }

    fn read(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
        self.try_read(ctx, data).unwrap_or_else(Error::into_diagnostics)
    }

    fn update(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
        self.try_update(ctx, data).unwrap_or_else(Error::into_diagnostics)
    }

    fn delete(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
        self.try_delete(ctx, data).unwrap_or_else(Error::into_diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{ENABLED, NAME, STATUS};
    use crate::testing::FakeOutposts;
    use declarative::{
        AutoConfirm, ExecuteOptions, ExecutionPlan, Instance, NoProgress, ResourceData, Severity, SharedResource,
        execute,
    };
    use gqlkit::{GraphQlError, MockTransport, OperationKind};
    use serde_json::{Value, json};

    fn prod_aws() -> Value {
        json!({
            "name": "prod-aws",
            "enabled": true,
            "provider": "aws",
            "aws": {
                "roleARN": "arn:aws:iam::123:role/x",
                "stateBucketName": "b1",
                "settingsRegion": "us-east-1"
            }
        })
    }

    fn data<T: Transport>(resource: &OutpostResource<T>, declared: Value) -> ResourceData {
        ResourceData::new(resource.schema()).with_declared(declared.as_object().cloned().unwrap_or_default())
    }

    fn ctx() -> ApplyContext {
        ApplyContext::default()
    }

    fn read_response(id: &str, name: &str, enabled: bool) -> Response {
        Response::ok(json!({"outpost": {
            "id": id,
            "name": name,
            "enabled": enabled,
            "status": "CONNECTED",
            "config": {"__typename": "OutpostAWSConfig", "roleARN": "arn:aws:iam::123:role/x", "stateBucketName": "b1", "settingsRegion": "us-east-1"}
        }}))
    }

    #[test]
    fn test_create_prod_aws() {
        let resource = OutpostResource::new(FakeOutposts::new());
        let mut data = data(&resource, prod_aws());

        let diags = resource.create(&ctx(), &mut data);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(data.identifier(), Some("o-1"));
        assert_eq!(data.recorded(ENABLED), Some(&json!(true)));
        assert_eq!(
            data.recorded("aws").and_then(|aws| aws.get("roleARN")),
            Some(&json!("arn:aws:iam::123:role/x"))
        );
        assert_eq!(data.recorded(STATUS), Some(&json!("CONNECTED")));
        assert!(data.changed_attributes().is_empty(), "{:?}", data.changed_attributes());
        assert_eq!(resource.transport.calls(), vec![OperationKind::Create, OperationKind::Read]);
    }

    #[test]
    fn test_create_sends_full_config() {
        let transport = MockTransport::new();
        transport.push(
            OperationKind::Create,
            Response::ok(json!({"createOutpost": {"outpost": {"id": "o-9"}}})),
        );
        transport.push(OperationKind::Read, read_response("o-9", "prod-aws", true));
        let resource = OutpostResource::new(transport);
        let mut data = data(&resource, prod_aws());

        assert!(!resource.create(&ctx(), &mut data).has_errors());
        let create = &resource.transport.requests_of(OperationKind::Create)[0];
        assert_eq!(
            create.request.variable("/input/config"),
            Some(&json!({"awsConfig": {
                "roleARN": "arn:aws:iam::123:role/x",
                "stateBucketName": "b1",
                "settingsRegion": "us-east-1"
            }}))
        );
        assert_eq!(
            create.request.variable("/input/managedConfig/manualNetwork"),
            Some(&json!(false))
        );
        assert_eq!(create.op.category, "outpost");
    }

    #[test]
    fn test_create_invalid_variant_sends_nothing() {
        let resource = OutpostResource::new(MockTransport::new());
        let mut data = data(
            &resource,
            json!({"name": "x", "provider": "gcp", "aws": {"roleARN": "r"}}),
        );
        let diags = resource.create(&ctx(), &mut data);
        assert!(diags.has_errors());
        assert_eq!(diags.iter().next().map(|d| d.summary.as_str()), Some("Invalid provider config"));
        assert!(resource.transport.requests().is_empty());
        assert_eq!(data.identifier(), None);
    }

    #[test]
    fn test_create_with_id_and_errors_commits_id() {
        let transport = MockTransport::new();
        transport.push(
            OperationKind::Create,
            Response::failed(vec![GraphQlError::new("cluster provisioning delayed")])
                .with_data(json!({"createOutpost": {"outpost": {"id": "o-3"}}})),
        );
        let resource = OutpostResource::new(transport);
        let mut data = data(&resource, prod_aws());

        let diags = resource.create(&ctx(), &mut data);
        assert!(diags.has_errors());
        assert_eq!(data.identifier(), Some("o-3"));
        assert!(resource.transport.requests_of(OperationKind::Read).is_empty());
    }

    #[test]
    fn test_create_failure_commits_nothing() {
        let transport = MockTransport::new();
        transport.push(OperationKind::Create, Response::failed(vec![GraphQlError::new("quota exceeded")]));
        let resource = OutpostResource::new(transport);
        let mut data = data(&resource, prod_aws());

        let diags = resource.create(&ctx(), &mut data);
        assert_eq!(diags.error_summary(), "Remote API error");
        assert_eq!(data.identifier(), None);
    }

    #[test]
    fn test_read_without_id_is_noop() {
        let resource = OutpostResource::new(MockTransport::new());
        let mut data = data(&resource, prod_aws());
        assert!(resource.read(&ctx(), &mut data).is_empty());
        assert!(resource.transport.requests().is_empty());
    }

    #[test]
    fn test_read_twice_is_idempotent() {
        let resource = OutpostResource::new(FakeOutposts::new());
        let mut data = data(&resource, prod_aws());
        resource.create(&ctx(), &mut data);

        assert!(resource.read(&ctx(), &mut data).is_empty());
        let first = data.state().clone();
        assert!(resource.read(&ctx(), &mut data).is_empty());
        assert_eq!(data.state(), &first);
    }

    #[test]
    fn test_read_detects_remote_deletion() {
        let resource = OutpostResource::new(FakeOutposts::new());
        let mut data = data(&resource, prod_aws());
        resource.create(&ctx(), &mut data);
        resource.transport.remove("o-1");

        let diags = resource.read(&ctx(), &mut data);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(data.identifier(), None);
        assert!(data.is_marked_for_recreation());
    }

    #[test]
    fn test_read_genuine_failure_keeps_id_and_applies_fields() {
        let transport = MockTransport::new();
        transport.push(
            OperationKind::Read,
            Response::failed(vec![GraphQlError::new("clusters unavailable").with_path(["outpost", "clusters"])])
                .with_data(json!({"outpost": {"id": "o-1", "name": "renamed-remotely", "enabled": true}})),
        );
        let resource = OutpostResource::new(transport);
        let mut data = data(&resource, prod_aws()).with_identifier("o-1");

        let diags = resource.read(&ctx(), &mut data);
        assert!(diags.has_errors());
        assert_eq!(
            diags.iter().next().and_then(|d| d.detail.as_deref()),
            Some("clusters unavailable (at outpost.clusters)")
        );
        assert_eq!(data.identifier(), Some("o-1"));
        assert_eq!(data.recorded(NAME), Some(&json!("renamed-remotely")));
    }

    #[test]
    fn test_read_transport_error_keeps_id() {
        let transport = MockTransport::new();
        transport.push_error(OperationKind::Read, gqlkit::Error::http(503, "unavailable"));
        let resource = OutpostResource::new(transport);
        let mut data = data(&resource, prod_aws()).with_identifier("o-1");

        let diags = resource.read(&ctx(), &mut data);
        assert!(diags.has_errors());
        assert_eq!(data.identifier(), Some("o-1"));
        assert!(!data.is_marked_for_recreation());
    }

    #[test]
    fn test_read_missing_record_without_errors_keeps_id() {
        let transport = MockTransport::new();
        transport.push(OperationKind::Read, Response::ok(json!({})));
        let resource = OutpostResource::new(transport);
        let mut data = data(&resource, prod_aws()).with_identifier("o-1");

        let diags = resource.read(&ctx(), &mut data);
        assert!(diags.has_errors());
        assert_eq!(data.identifier(), Some("o-1"));
        assert!(!data.is_marked_for_recreation());
    }

    #[test]
    fn test_create_then_unreadable_record_keeps_id() {
        let transport = MockTransport::new();
        transport.push(
            OperationKind::Create,
            Response::ok(json!({"createOutpost": {"outpost": {"id": "o-5"}}})),
        );
        transport.push(
            OperationKind::Read,
            Response::failed(vec![GraphQlError::new("oops! an internal error has occurred.")]),
        );
        let resource = OutpostResource::new(transport);
        let mut data = data(&resource, prod_aws());

        let diags = resource.create(&ctx(), &mut data);
        assert!(diags.has_errors());
        assert_eq!(diags.error_summary(), "Outpost o-5 not readable after create");
        assert_eq!(data.identifier(), Some("o-5"));
        assert!(!data.is_marked_for_recreation());
    }

    #[test]
    fn test_read_null_data_without_errors() {
        let transport = MockTransport::new();
        transport.push(OperationKind::Read, Response::default());
        let resource = OutpostResource::new(transport);
        let mut data = data(&resource, prod_aws()).with_identifier("o-1");

        assert!(resource.read(&ctx(), &mut data).has_errors());
        assert_eq!(data.identifier(), Some("o-1"));
    }

    #[test]
    fn test_cancelled_context_sends_nothing() {
        let resource = OutpostResource::new(MockTransport::new());
        let mut data = data(&resource, prod_aws()).with_identifier("o-1");
        let ctx = ctx();
        ctx.cancel();

        let diags = resource.read(&ctx, &mut data);
        assert!(diags.has_errors());
        assert!(resource.transport.requests().is_empty());
        assert_eq!(data.identifier(), Some("o-1"));
    }

    #[test]
    fn test_update_patches_only_enabled() {
        let transport = MockTransport::new();
        transport.push(
            OperationKind::Update,
            Response::ok(json!({"updateOutpost": {"outpost": {"id": "o-1"}}})),
        );
        transport.push(OperationKind::Read, read_response("o-1", "prod-aws", true));
        let resource = OutpostResource::new(transport);
        let recorded = json!({
            "name": "prod-aws",
            "enabled": false,
            "provider": "aws",
            "aws": {"roleARN": "arn:aws:iam::123:role/x", "stateBucketName": "b1", "settingsRegion": "us-east-1"}
        });
        let mut data = data(&resource, prod_aws())
            .with_state(recorded.as_object().cloned().unwrap())
            .with_identifier("o-1");

        let diags = resource.update(&ctx(), &mut data);
        assert!(diags.is_empty(), "{diags:?}");
        let update = &resource.transport.requests_of(OperationKind::Update)[0];
        assert_eq!(
            update.request.variables,
            json!({"input": {"id": "o-1", "patch": {"enabled": true}}})
        );
        assert_eq!(data.recorded(ENABLED), Some(&json!(true)));
    }

    #[test]
    fn test_update_failure_leaves_state() {
        let transport = MockTransport::new();
        transport.push(OperationKind::Update, Response::failed(vec![GraphQlError::new("forbidden")]));
        let resource = OutpostResource::new(transport);
        let mut data = data(&resource, json!({"name": "new-name", "provider": "gcp", "gcp": {}}))
            .with_state(json!({"name": "old-name", "enabled": true, "provider": "gcp"}).as_object().cloned().unwrap())
            .with_identifier("o-1");

        let diags = resource.update(&ctx(), &mut data);
        assert!(diags.has_errors());
        assert_eq!(data.recorded(NAME), Some(&json!("old-name")));
        assert_eq!(data.identifier(), Some("o-1"));
        assert!(resource.transport.requests_of(OperationKind::Read).is_empty());
    }

    #[test]
    fn test_update_warns_about_unpatchable_changes() {
        let resource = OutpostResource::new(FakeOutposts::new());
        let mut data = data(&resource, prod_aws());
        resource.create(&ctx(), &mut data);

        let mut declared = prod_aws();
        declared["allowed_regions"] = json!(["eu-west-1"]);
        let mut data = ResourceData::new(resource.schema())
            .with_declared(declared.as_object().cloned().unwrap())
            .with_state(data.state().clone())
            .with_identifier("o-1");

        let diags = resource.update(&ctx(), &mut data);
        assert!(!diags.has_errors());
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(diags.iter().next().and_then(|d| d.attribute.as_deref()), Some("allowed_regions"));
        assert_eq!(
            resource.transport.calls(),
            vec![OperationKind::Create, OperationKind::Read, OperationKind::Read]
        );
    }

    #[test]
    fn test_update_without_id_is_noop() {
        let resource = OutpostResource::new(MockTransport::new());
        let mut data = data(&resource, prod_aws());
        assert!(resource.update(&ctx(), &mut data).is_empty());
        assert!(resource.transport.requests().is_empty());
    }

    #[test]
    fn test_delete_clears_id() {
        let resource = OutpostResource::new(FakeOutposts::new());
        let mut data = data(&resource, prod_aws());
        resource.create(&ctx(), &mut data);

        assert!(resource.delete(&ctx(), &mut data).is_empty());
        assert_eq!(data.identifier(), None);
        assert_eq!(resource.transport.len(), 0);
    }

    #[test]
    fn test_delete_already_removed() {
        let transport = MockTransport::new();
        transport.push(OperationKind::Delete, Response::failed(vec![GraphQlError::new("control not found")]));
        transport.push(
            OperationKind::Read,
            Response::failed(vec![GraphQlError::new("oops! an internal error has occurred.")])
                .with_data(json!({"outpost": null})),
        );
        let resource = OutpostResource::new(transport);
        let mut data = data(&resource, prod_aws()).with_identifier("o-1");

        let diags = resource.delete(&ctx(), &mut data);
        assert!(!diags.has_errors());
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(data.identifier(), None);
    }

    #[test]
    fn test_delete_failure_keeps_id() {
        let transport = MockTransport::new();
        transport.push(OperationKind::Delete, Response::failed(vec![GraphQlError::new("in use")]));
        transport.push(OperationKind::Read, read_response("o-1", "prod-aws", true));
        let resource = OutpostResource::new(transport);
        let mut data = data(&resource, prod_aws()).with_identifier("o-1");

        let diags = resource.delete(&ctx(), &mut data);
        assert!(diags.has_errors());
        assert_eq!(data.identifier(), Some("o-1"));
    }

    #[test]
    fn test_delete_uninstall_strategy() {
        let transport = MockTransport::new();
        transport.push(OperationKind::Delete, Response::ok(json!({"deleteOutpost": {"_stub": null}})));
        let resource = OutpostResource::new(transport).with_delete_strategy(DeleteStrategy::Uninstall);
        let mut data = data(&resource, prod_aws()).with_identifier("o-1");

        assert!(resource.delete(&ctx(), &mut data).is_empty());
        let delete = &resource.transport.requests_of(OperationKind::Delete)[0];
        assert!(delete.request.query.contains("deleteOutpost"));
        assert_eq!(delete.request.variables, json!({"input": {"id": "o-1"}}));
    }

    #[test]
    fn test_import_adopts_existing_record() {
        let transport = MockTransport::new();
        transport.push(OperationKind::Read, read_response("o-7", "legacy", false));
        let resource = OutpostResource::new(transport);
        let mut data = ResourceData::new(resource.schema());

        let diags = resource.import(&ctx(), &mut data, "o-7");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(data.identifier(), Some("o-7"));
        assert_eq!(data.recorded(PROVIDER), Some(&json!("aws")));
        assert_eq!(data.recorded(ENABLED), Some(&json!(false)));
    }

    #[test]
    fn test_fetch_gone() {
        let resource = OutpostResource::new(FakeOutposts::new());
        assert!(matches!(resource.fetch(&ctx(), "o-404", None), Ok(Fetched::Gone)));
    }

    #[test]
    fn test_execute_reconciles_and_converges() {
        let resource = Arc::new(OutpostResource::new(FakeOutposts::new()));
        let shared: SharedResource = resource.clone();
        let mut plan = ExecutionPlan::new(Arc::clone(&shared));
        plan.add_instance(Instance::new(RESOURCE_TYPE, "prod-aws", data(&resource, prod_aws())));
        plan.add_instance(Instance::new(
            RESOURCE_TYPE,
            "edge",
            data(&resource, json!({"name": "edge", "provider": "self_managed"})),
        ));
        plan.add_instance(Instance::new(
            RESOURCE_TYPE,
            "broken",
            data(&resource, json!({"name": "broken", "provider": "azure"})),
        ));

        let opts = ExecuteOptions { dry_run: false, jobs: 2 };
        let report = execute(&mut plan, &opts, &ctx(), &mut NoProgress, &mut AutoConfirm).unwrap();
        assert_eq!(report.summary.created, 2);
        assert_eq!(report.summary.failed, 1);
        assert!(report
            .instances
            .iter()
            .flat_map(|i| i.diagnostics.iter())
            .any(|d| d.severity == Severity::Error && d.summary == "Invalid provider config"));
        assert_eq!(resource.transport.len(), 2);

        let mut plan = plan.filter(|i| i.data.identifier().is_some());
        let report = execute(&mut plan, &opts, &ctx(), &mut NoProgress, &mut AutoConfirm).unwrap();
        assert_eq!(report.summary.no_change, 2);
        assert_eq!(report.summary.total_changes(), 0);
    }
}
