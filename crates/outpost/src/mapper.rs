//! Response mapper: envelope payloads into [`RemoteRecord`].
//!
//! Null members are dropped before decoding, so the unused config fragments
//! of the read query simply disappear. The provider of a polymorphic config
//! is taken from `__typename` when the server sends it, otherwise from the
//! members actually present, and as a last resort from the declared kind.

use crate::error::{Error, Result};
use crate::model::{
    AlibabaClusterConfig, Attribution, AwsClusterConfig, AzureClusterConfig, ClusterConfig, ClusterRecord,
    CustomConfig, GcpClusterConfig, ManagedConfig, NodeGroup, OciClusterConfig, ProviderConfig, ProviderKind,
    ProxyConfig, RemoteRecord, SelfManagedConfig, Status,
};
use chrono::{DateTime, Utc};
use gqlkit::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const TYPENAME: &str = "__typename";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireOutpost {
    id: String,
    name: String,
    enabled: bool,
    service_type: String,
    allowed_regions: Vec<String>,
    self_managed: bool,
    external_internet_access: Option<Value>,
    self_managed_config: Option<SelfManagedConfig>,
    managed_config: ManagedConfig,
    custom_config: CustomConfig,
    config: Option<Value>,
    status: Option<Value>,
    error_code: Option<Value>,
    created_at: Option<String>,
    added_by: Attribution,
    clusters: Vec<WireCluster>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireCluster {
    id: String,
    region: String,
    created_at: Option<String>,
    http_proxy_config: Option<ProxyConfig>,
    node_groups: Vec<NodeGroup>,
    config: Option<Value>,
    added_by: Attribution,
}

/// Remove null object members, recursively.
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(members) => Value::Object(
            members
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

/// Decode the record at `path`.
///
/// `hint` is the declared provider, used only when the returned config does
/// not identify itself.
pub fn outpost_from_response(response: &Response, path: &[&str], hint: Option<ProviderKind>) -> Result<RemoteRecord> {
    let value = response
        .get(path)
        .cloned()
        .ok_or_else(|| Error::UnexpectedResponse(format!("no \"{}\" in response data", path.join("."))))?;
    record_from_value(value, hint)
}

pub fn record_from_value(value: Value, hint: Option<ProviderKind>) -> Result<RemoteRecord> {
    let wire: WireOutpost = decode(strip_nulls(value), "outpost")?;
    let config = wire.config.map(|c| provider_config(c, hint)).transpose()?.flatten();
    let cluster_hint = config.as_ref().map(ProviderConfig::kind).or(hint);
    let clusters = wire
        .clusters
        .into_iter()
        .map(|c| cluster(c, cluster_hint))
        .collect::<Result<Vec<_>>>()?;

    Ok(RemoteRecord {
        id: wire.id,
        name: wire.name,
        enabled: wire.enabled,
        service_type: wire.service_type,
        allowed_regions: wire.allowed_regions,
        self_managed: wire.self_managed,
        external_internet_access: scalar_string(wire.external_internet_access).unwrap_or_default(),
        self_managed_config: wire.self_managed_config,
        managed_config: wire.managed_config,
        custom_config: wire.custom_config,
        config,
        status: Status {
            status: scalar_string(wire.status).unwrap_or_default(),
            error_code: scalar_string(wire.error_code),
        },
        created_at: timestamp(wire.created_at.as_deref()),
        added_by: wire.added_by,
        clusters,
    })
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::UnexpectedResponse(format!("malformed {what}: {e}")))
}

/// Free-form scalar as text; the remote types some of these as `any`.
fn scalar_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            log::debug!("Ignoring unparseable timestamp {raw:?}: {e}");
            None
        }
    }
}

/// Pick the kind of a polymorphic object.
fn resolve_kind(
    typename: Option<&str>,
    members: &Map<String, Value>,
    fields_of: fn(ProviderKind) -> &'static [&'static str],
    hint: Option<ProviderKind>,
) -> Option<ProviderKind> {
    if let Some(kind) = typename.and_then(ProviderKind::from_typename) {
        return Some(kind);
    }
    let candidates: Vec<ProviderKind> = ProviderKind::CONFIGURED
        .into_iter()
        .filter(|kind| members.keys().all(|k| fields_of(*kind).contains(&k.as_str())))
        .collect();
    match (candidates.as_slice(), hint) {
        ([only], _) => Some(*only),
        (_, Some(hint)) if candidates.contains(&hint) => Some(hint),
        _ => None,
    }
}

fn split_typename(value: Value) -> Option<(Option<String>, Map<String, Value>)> {
    let Value::Object(mut members) = value else {
        return None;
    };
    let typename = members
        .remove(TYPENAME)
        .and_then(|t| t.as_str().map(str::to_string));
    Some((typename, members))
}

fn provider_config(value: Value, hint: Option<ProviderKind>) -> Result<Option<ProviderConfig>> {
    let Some((typename, members)) = split_typename(value) else {
        return Err(Error::UnexpectedResponse("config is not an object".to_string()));
    };
    if typename.is_none() && members.is_empty() {
        return Ok(None);
    }
    let kind = resolve_kind(typename.as_deref(), &members, |k| k.config_fields(), hint).ok_or_else(|| {
        Error::UnexpectedResponse(format!(
            "cannot tell the provider of the returned config (typename {typename:?})"
        ))
    })?;
    ProviderConfig::from_fields(kind, &members)
        .map(Some)
        .map_err(|e| Error::UnexpectedResponse(e.to_string()))
}

fn cluster_fields(kind: ProviderKind) -> &'static [&'static str] {
    match kind {
        ProviderKind::Aws => &["clusterName", "sqsURL", "kubernetesServiceAccountName"],
        ProviderKind::Azure => &[
            "clusterName",
            "servicebusQueueName",
            "servicebusNamespace",
            "resourceGroupName",
            "storageAccountNames",
            "subscriptionId",
            "serviceAuthorizedIPRanges",
        ],
        ProviderKind::Gcp => &["clusterName", "projectId", "clusterZone", "topicName", "pubSubSubscription"],
        ProviderKind::Oci => &["clusterName", "streamOCID"],
        ProviderKind::Alibaba => &["clusterName", "queueName"],
        ProviderKind::SelfManaged => &[],
    }
}

fn cluster_config(value: Value, hint: Option<ProviderKind>) -> Result<Option<ClusterConfig>> {
    let Some((typename, members)) = split_typename(value) else {
        return Err(Error::UnexpectedResponse("cluster config is not an object".to_string()));
    };
    if typename.is_none() && members.is_empty() {
        return Ok(None);
    }
    let Some(kind) = resolve_kind(typename.as_deref(), &members, cluster_fields, hint) else {
        log::debug!("Skipping cluster config of unknown provider (typename {typename:?})");
        return Ok(None);
    };
    let value = Value::Object(members);
    let config = match kind {
        ProviderKind::Aws => ClusterConfig::Aws(decode::<AwsClusterConfig>(value, "cluster config")?),
        ProviderKind::Gcp => ClusterConfig::Gcp(decode::<GcpClusterConfig>(value, "cluster config")?),
        ProviderKind::Azure => ClusterConfig::Azure(decode::<AzureClusterConfig>(value, "cluster config")?),
        ProviderKind::Oci => ClusterConfig::Oci(decode::<OciClusterConfig>(value, "cluster config")?),
        ProviderKind::Alibaba => ClusterConfig::Alibaba(decode::<AlibabaClusterConfig>(value, "cluster config")?),
        ProviderKind::SelfManaged => return Ok(None),
    };
    Ok(Some(config))
}

fn cluster(wire: WireCluster, hint: Option<ProviderKind>) -> Result<ClusterRecord> {
    Ok(ClusterRecord {
        config: wire.config.map(|c| cluster_config(c, hint)).transpose()?.flatten(),
        id: wire.id,
        region: wire.region,
        created_at: timestamp(wire.created_at.as_deref()),
        http_proxy: wire.http_proxy_config,
        node_groups: wire.node_groups,
        added_by: wire.added_by,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AlibabaConfig, AlibabaCredentials, AwsConfig, AzureConfig, DesiredState, GcpConfig, OciConfig, OciOrchestrator,
    };
    use crate::request::build_create;
    use gqlkit::GraphQlError;
    use serde_json::json;

    fn full(kind: ProviderKind) -> ProviderConfig {
        match kind {
            ProviderKind::Aws => ProviderConfig::Aws(AwsConfig {
                role_arn: "arn:aws:iam::123:role/x".into(),
                external_id: "ext".into(),
                state_bucket_name: "b1".into(),
                settings_region: "us-east-1".into(),
                access_key: "AKIA".into(),
                secret_key: "secret".into(),
                disable_nat_gateway: true,
                results_bucket_name: "results".into(),
                subscription_id: "sub".into(),
            }),
            ProviderKind::Gcp => ProviderConfig::Gcp(GcpConfig {
                orchestrator_key: "{\"type\":\"service_account\"}".into(),
                worker_account_email: "worker@p.iam.gserviceaccount.com".into(),
                state_bucket_name: "b1".into(),
                disable_nat_gateway: true,
            }),
            ProviderKind::Azure => ProviderConfig::Azure(AzureConfig {
                tenant_id: "t".into(),
                subscription_id: "s".into(),
                key_vault_name: "kv".into(),
                application_key_vault_name: "akv".into(),
                orchestrator_client_id: "oc".into(),
                orchestrator_client_secret: "ocs".into(),
                worker_client_id: "wc".into(),
                worker_client_secret: "wcs".into(),
                scanner_app_id: "scan".into(),
                deploy_premium_service_bus: true,
                enable_private_cluster: true,
                environment: "AzureCloud".into(),
                state_storage_account_name: "acct".into(),
                global_resource_group_name: "rg".into(),
            }),
            ProviderKind::Oci => ProviderConfig::Oci(OciConfig {
                compartment_ocid: "ocid1.compartment".into(),
                vault_ocid: "ocid1.vault".into(),
                key_ocid: "ocid1.key".into(),
                state_bucket_name: "b1".into(),
                orchestrator: OciOrchestrator {
                    fingerprint: "aa:bb".into(),
                    private_key: "-----BEGIN KEY-----".into(),
                },
            }),
            ProviderKind::Alibaba | ProviderKind::SelfManaged => ProviderConfig::Alibaba(AlibabaConfig {
                worker_resources_group_id: "rg".into(),
                state_bucket_name: "b1".into(),
                outpost_credentials: AlibabaCredentials {
                    orchestrator_access_key_id: "id".into(),
                    orchestrator_access_key_secret: "secret".into(),
                },
            }),
        }
    }

    fn desired(config: ProviderConfig) -> DesiredState {
        DesiredState {
            name: "prod".into(),
            enabled: true,
            self_managed: false,
            kind: config.kind(),
            service_type: String::new(),
            allowed_regions: Vec::new(),
            managed: ManagedConfig::default(),
            custom: CustomConfig::default(),
            config: Some(config),
        }
    }

    /// Read payload echoing the create input's config, every other fragment null.
    fn read_payload(kind: ProviderKind, inner: &Value, typename: bool) -> Value {
        let mut config = Map::new();
        for other in ProviderKind::CONFIGURED {
            for field in other.config_fields() {
                config.insert((*field).to_string(), Value::Null);
            }
        }
        if let Value::Object(fields) = inner {
            config.extend(fields.clone());
        }
        if typename {
            config.insert(TYPENAME.to_string(), json!(kind.typename()));
        }
        json!({"outpost": {"id": "o-1", "name": "prod", "enabled": true, "config": config}})
    }

    #[test]
    fn test_config_round_trip_all_kinds() {
        for kind in ProviderKind::CONFIGURED {
            let config = full(kind);
            let built = build_create(&desired(config.clone())).unwrap();
            let key = format!("/input/config/{}", kind.input_key().unwrap());
            let inner = built.request.variable(&key).cloned().unwrap();

            for typename in [true, false] {
                let response = Response::ok(read_payload(kind, &inner, typename));
                let record = outpost_from_response(&response, &["outpost"], Some(kind)).unwrap();
                assert_eq!(record.config.as_ref(), Some(&config), "{kind} typename={typename}");
            }
        }
    }

    #[test]
    fn test_shape_picks_kind_without_hint() {
        let value = json!({"id": "o-1", "config": {"tenantID": "t", "stateStorageAccountName": "a"}});
        let record = record_from_value(value, None).unwrap();
        assert_eq!(record.kind(), Some(ProviderKind::Azure));
    }

    #[test]
    fn test_ambiguous_shape_uses_hint() {
        let value = json!({"id": "o-1", "config": {"stateBucketName": "b1"}});
        assert!(record_from_value(value.clone(), None).is_err());
        let record = record_from_value(value, Some(ProviderKind::Oci)).unwrap();
        assert_eq!(record.config.unwrap().oci().unwrap().state_bucket_name, "b1");
    }

    #[test]
    fn test_full_record() {
        let value = json!({
            "id": "o-1",
            "name": "prod-aws",
            "enabled": true,
            "serviceType": "SAAS",
            "allowedRegions": ["us-east-1", "eu-west-1"],
            "selfManaged": false,
            "externalInternetAccess": "ENABLED",
            "selfManagedConfig": null,
            "managedConfig": {"kubernetesLoggingEnabled": true, "manualNetwork": null, "kubernetesCloudMonitoringEnabled": false},
            "status": "CONNECTED",
            "errorCode": null,
            "createdAt": "2024-05-01T10:00:00Z",
            "addedBy": {"id": "u-1", "name": "Ops", "email": "ops@example.com"},
            "customConfig": {"podAnnotations": {"team": "sec"}, "resourceTags": null, "namespacePrefix": "wiz"},
            "clusters": [{
                "id": "c-1",
                "region": "us-east-1",
                "createdAt": "2024-05-01T11:00:00Z",
                "httpProxyConfig": {"httpProxyURL": "http://proxy", "httpsProxyURL": null, "vpcCIDRs": ["10.0.0.0/16"]},
                "nodeGroups": [{"nodeGroupId": "ng-1", "type": "WORKER", "maxNodeCount": 5, "minNodeCount": 1}],
                "config": {"__typename": "OutpostClusterAWSConfig", "clusterName": "wiz-1", "sqsURL": "https://sqs", "kubernetesServiceAccountName": "wiz-sa"},
                "addedBy": {"id": "u-1", "name": "Ops", "email": "ops@example.com"}
            }],
            "config": {"__typename": "OutpostAWSConfig", "roleARN": "arn", "externalID": null}
        });
        let record = record_from_value(value, None).unwrap();
        assert_eq!(record.allowed_regions, vec!["us-east-1", "eu-west-1"]);
        assert!(record.managed_config.kubernetes_logging_enabled);
        assert_eq!(record.custom_config.pod_annotations.get("team").map(String::as_str), Some("sec"));
        assert_eq!(record.status.status, "CONNECTED");
        assert_eq!(record.status.error_code, None);
        assert_eq!(record.created_at.map(|t| t.to_rfc3339()), Some("2024-05-01T10:00:00+00:00".to_string()));
        assert_eq!(record.added_by.email, "ops@example.com");

        let cluster = &record.clusters[0];
        assert_eq!(cluster.region, "us-east-1");
        assert_eq!(cluster.node_groups[0].node_type, "WORKER");
        assert_eq!(cluster.http_proxy.as_ref().unwrap().vpc_cidrs, vec!["10.0.0.0/16"]);
        assert_eq!(cluster.config.as_ref().map(ClusterConfig::cluster_name), Some("wiz-1"));
        assert_eq!(cluster.config.as_ref().map(ClusterConfig::kind), Some(ProviderKind::Aws));
    }

    #[test]
    fn test_cluster_config_by_shape() {
        let value = json!({"id": "o-1", "clusters": [
            {"id": "c-1", "config": {"clusterName": "k", "streamOCID": "ocid1.stream"}},
            {"id": "c-2", "config": {"clusterName": "k"}}
        ]});
        let record = record_from_value(value, Some(ProviderKind::Alibaba)).unwrap();
        assert_eq!(record.clusters[0].config.as_ref().map(ClusterConfig::kind), Some(ProviderKind::Oci));
        assert_eq!(record.clusters[1].config.as_ref().map(ClusterConfig::kind), Some(ProviderKind::Alibaba));
    }

    #[test]
    fn test_scalar_error_code() {
        let value = json!({"id": "o-1", "status": "ERROR", "errorCode": 42});
        let record = record_from_value(value, None).unwrap();
        assert_eq!(record.status.error_code.as_deref(), Some("42"));
        assert_eq!(record.config, None);
    }

    #[test]
    fn test_partial_success_still_maps() {
        let response = Response::failed(vec![GraphQlError::new("clusters unavailable").with_path(["outpost", "clusters"])])
            .with_data(json!({"outpost": {"id": "o-1", "name": "prod", "enabled": false, "clusters": null}}));
        let record = outpost_from_response(&response, &["outpost"], None).unwrap();
        assert_eq!(record.name, "prod");
        assert!(record.clusters.is_empty());
    }

    #[test]
    fn test_missing_record() {
        let response = Response::ok(json!({"outpost": null}));
        assert!(matches!(
            outpost_from_response(&response, &["outpost"], None),
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_malformed_record() {
        let value = json!({"id": "o-1", "enabled": "yes"});
        assert!(matches!(record_from_value(value, None), Err(Error::UnexpectedResponse(_))));
    }
}
