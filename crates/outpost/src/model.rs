//! Config variant model and the canonical outpost record.
//!
//! Field names on the wire follow the remote casing exactly (`roleARN`,
//! `stateBucketName`, `kubernetesLoggingEnabled`). Optional input fields with
//! an empty or zero value are omitted when serialized.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Placeholder shown instead of secret values.
pub const REDACTED: &str = "(sensitive)";

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

fn mask(value: &mut String) {
    if !value.is_empty() {
        *value = REDACTED.to_string();
    }
}

/// Accept either a single string or a list of strings.
fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if s.is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

/// Cloud platform (or self-managed mode) an outpost is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Aws,
    Gcp,
    Azure,
    Oci,
    Alibaba,
    SelfManaged,
}

impl ProviderKind {
    /// Kinds that carry a provider config.
    pub const CONFIGURED: [Self; 5] = [Self::Aws, Self::Gcp, Self::Azure, Self::Oci, Self::Alibaba];

    /// Name used in manifests and state (`aws`, `self_managed`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Gcp => "gcp",
            Self::Azure => "azure",
            Self::Oci => "oci",
            Self::Alibaba => "alibaba",
            Self::SelfManaged => "self_managed",
        }
    }

    /// Top-level config keys for this kind, in remote casing.
    pub fn config_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Aws => AwsConfig::FIELDS,
            Self::Gcp => GcpConfig::FIELDS,
            Self::Azure => AzureConfig::FIELDS,
            Self::Oci => OciConfig::FIELDS,
            Self::Alibaba => AlibabaConfig::FIELDS,
            Self::SelfManaged => &[],
        }
    }

    /// Config keys holding secrets (nested objects count as a whole).
    pub fn sensitive_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Aws => &["accessKey", "secretKey"],
            Self::Gcp => &["orchestratorKey"],
            Self::Azure => &["orchestratorClientSecret", "workerClientSecret"],
            Self::Oci => &["orchestrator"],
            Self::Alibaba => &["outpostCredentials"],
            Self::SelfManaged => &[],
        }
    }

    /// Member of the create input's `config` object.
    pub fn input_key(&self) -> Option<&'static str> {
        match self {
            Self::Aws => Some("awsConfig"),
            Self::Gcp => Some("gcpConfig"),
            Self::Azure => Some("azureConfig"),
            Self::Oci => Some("ociConfig"),
            Self::Alibaba => Some("alibabaConfig"),
            Self::SelfManaged => None,
        }
    }

    /// GraphQL type name of the provider config.
    pub fn typename(&self) -> Option<&'static str> {
        match self {
            Self::Aws => Some("OutpostAWSConfig"),
            Self::Gcp => Some("OutpostGCPConfig"),
            Self::Azure => Some("OutpostAzureConfig"),
            Self::Oci => Some("OutpostOCIConfig"),
            Self::Alibaba => Some("OutpostAlibabaConfig"),
            Self::SelfManaged => None,
        }
    }

    /// GraphQL type name of the per-cluster config.
    pub fn cluster_typename(&self) -> Option<&'static str> {
        match self {
            Self::Aws => Some("OutpostClusterAWSConfig"),
            Self::Gcp => Some("OutpostClusterGCPConfig"),
            Self::Azure => Some("OutpostClusterAzureConfig"),
            Self::Oci => Some("OutpostClusterOCIConfig"),
            Self::Alibaba => Some("OutpostClusterAlibabaConfig"),
            Self::SelfManaged => None,
        }
    }

    /// Kind named by a config or cluster-config type name.
    pub fn from_typename(typename: &str) -> Option<Self> {
        Self::CONFIGURED
            .into_iter()
            .find(|k| k.typename() == Some(typename) || k.cluster_typename() == Some(typename))
    }

    /// First kind whose config declares `field`.
    pub fn owning(field: &str) -> Option<Self> {
        Self::CONFIGURED
            .into_iter()
            .find(|k| k.config_fields().contains(&field))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Aws => "AWS",
            Self::Gcp => "GCP",
            Self::Azure => "Azure",
            Self::Oci => "OCI",
            Self::Alibaba => "Alibaba",
            Self::SelfManaged => "self-managed",
        };
        f.write_str(label)
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "gcp" => Ok(Self::Gcp),
            "azure" => Ok(Self::Azure),
            "oci" => Ok(Self::Oci),
            "alibaba" => Ok(Self::Alibaba),
            "self_managed" | "self-managed" | "selfmanaged" => Ok(Self::SelfManaged),
            other => Err(Error::InvalidVariant(format!(
                "unknown provider \"{other}\" (expected aws, gcp, azure, oci, alibaba or self_managed)"
            ))),
        }
    }
}

/// AWS outpost configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AwsConfig {
    #[serde(rename = "roleARN", skip_serializing_if = "String::is_empty")]
    pub role_arn: String,
    #[serde(rename = "externalID", skip_serializing_if = "String::is_empty")]
    pub external_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state_bucket_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub settings_region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub access_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_key: String,
    #[serde(skip_serializing_if = "is_false")]
    pub disable_nat_gateway: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub results_bucket_name: String,
    #[serde(rename = "subscriptionID", skip_serializing_if = "String::is_empty")]
    pub subscription_id: String,
}

impl AwsConfig {
    pub const FIELDS: &'static [&'static str] = &[
        "roleARN",
        "externalID",
        "stateBucketName",
        "settingsRegion",
        "accessKey",
        "secretKey",
        "disableNatGateway",
        "resultsBucketName",
        "subscriptionID",
    ];
}

/// GCP outpost configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GcpConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub orchestrator_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_account_email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state_bucket_name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub disable_nat_gateway: bool,
}

impl GcpConfig {
    pub const FIELDS: &'static [&'static str] = &[
        "orchestratorKey",
        "workerAccountEmail",
        "stateBucketName",
        "disableNatGateway",
    ];
}

/// Azure outpost configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzureConfig {
    #[serde(rename = "tenantID", skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
    #[serde(rename = "subscriptionID", skip_serializing_if = "String::is_empty")]
    pub subscription_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key_vault_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub application_key_vault_name: String,
    #[serde(rename = "orchestratorClientID", skip_serializing_if = "String::is_empty")]
    pub orchestrator_client_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub orchestrator_client_secret: String,
    #[serde(rename = "workerClientID", skip_serializing_if = "String::is_empty")]
    pub worker_client_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_client_secret: String,
    #[serde(rename = "scannerAppID", skip_serializing_if = "String::is_empty")]
    pub scanner_app_id: String,
    #[serde(skip_serializing_if = "is_false")]
    pub deploy_premium_service_bus: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub enable_private_cluster: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub environment: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state_storage_account_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub global_resource_group_name: String,
}

impl AzureConfig {
    pub const FIELDS: &'static [&'static str] = &[
        "tenantID",
        "subscriptionID",
        "keyVaultName",
        "applicationKeyVaultName",
        "orchestratorClientID",
        "orchestratorClientSecret",
        "workerClientID",
        "workerClientSecret",
        "scannerAppID",
        "deployPremiumServiceBus",
        "enablePrivateCluster",
        "environment",
        "stateStorageAccountName",
        "globalResourceGroupName",
    ];
}

/// OCI orchestrator signing key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OciOrchestrator {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fingerprint: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub private_key: String,
}

/// OCI outpost configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OciConfig {
    #[serde(rename = "compartmentOCID", skip_serializing_if = "String::is_empty")]
    pub compartment_ocid: String,
    #[serde(rename = "vaultOCID", skip_serializing_if = "String::is_empty")]
    pub vault_ocid: String,
    #[serde(rename = "keyOCID", skip_serializing_if = "String::is_empty")]
    pub key_ocid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state_bucket_name: String,
    #[serde(skip_serializing_if = "is_default")]
    pub orchestrator: OciOrchestrator,
}

impl OciConfig {
    pub const FIELDS: &'static [&'static str] = &[
        "compartmentOCID",
        "vaultOCID",
        "keyOCID",
        "stateBucketName",
        "orchestrator",
    ];
}

/// Alibaba orchestrator access key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlibabaCredentials {
    #[serde(rename = "orchestratorAccessKeyID", skip_serializing_if = "String::is_empty")]
    pub orchestrator_access_key_id: String,
    #[serde(rename = "orchestratorAccessKeySecret", skip_serializing_if = "String::is_empty")]
    pub orchestrator_access_key_secret: String,
}

/// Alibaba outpost configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlibabaConfig {
    #[serde(rename = "workerResourcesGroupID", skip_serializing_if = "String::is_empty")]
    pub worker_resources_group_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state_bucket_name: String,
    #[serde(skip_serializing_if = "is_default")]
    pub outpost_credentials: AlibabaCredentials,
}

impl AlibabaConfig {
    pub const FIELDS: &'static [&'static str] = &[
        "workerResourcesGroupID",
        "stateBucketName",
        "outpostCredentials",
    ];
}

/// Provider configuration, exactly one variant per outpost.
///
/// Serializes as the create-input wrapper: `{"awsConfig": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderConfig {
    #[serde(rename = "awsConfig")]
    Aws(AwsConfig),
    #[serde(rename = "gcpConfig")]
    Gcp(GcpConfig),
    #[serde(rename = "azureConfig")]
    Azure(AzureConfig),
    #[serde(rename = "ociConfig")]
    Oci(OciConfig),
    #[serde(rename = "alibabaConfig")]
    Alibaba(AlibabaConfig),
}

impl ProviderConfig {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Aws(_) => ProviderKind::Aws,
            Self::Gcp(_) => ProviderKind::Gcp,
            Self::Azure(_) => ProviderKind::Azure,
            Self::Oci(_) => ProviderKind::Oci,
            Self::Alibaba(_) => ProviderKind::Alibaba,
        }
    }

    /// Build the variant for `kind` from remote-cased fields.
    ///
    /// Rejects keys that do not belong to `kind`.
    pub fn from_fields(kind: ProviderKind, fields: &Map<String, Value>) -> Result<Self> {
        if let Some(field) = fields.keys().find(|k| !kind.config_fields().contains(&k.as_str())) {
            return Err(Error::wrong_field(kind, field));
        }
        let value = Value::Object(fields.clone());
        let invalid = |e: serde_json::Error| Error::InvalidVariant(format!("{kind} config: {e}"));
        match kind {
            ProviderKind::Aws => serde_json::from_value(value).map(Self::Aws).map_err(invalid),
            ProviderKind::Gcp => serde_json::from_value(value).map(Self::Gcp).map_err(invalid),
            ProviderKind::Azure => serde_json::from_value(value).map(Self::Azure).map_err(invalid),
            ProviderKind::Oci => serde_json::from_value(value).map(Self::Oci).map_err(invalid),
            ProviderKind::Alibaba => serde_json::from_value(value).map(Self::Alibaba).map_err(invalid),
            ProviderKind::SelfManaged => Err(Error::InvalidVariant(
                "self-managed outposts take no provider config".to_string(),
            )),
        }
    }

    /// Remote-cased fields of the inner config, empty values omitted.
    pub fn to_fields(&self) -> Map<String, Value> {
        let value = match self {
            Self::Aws(c) => serde_json::to_value(c),
            Self::Gcp(c) => serde_json::to_value(c),
            Self::Azure(c) => serde_json::to_value(c),
            Self::Oci(c) => serde_json::to_value(c),
            Self::Alibaba(c) => serde_json::to_value(c),
        };
        match value {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        }
    }

    /// Read one remote-cased field.
    ///
    /// Fails with `InvalidVariant` for a field of another kind; an unset
    /// field of this kind is `None`.
    pub fn field(&self, name: &str) -> Result<Option<Value>> {
        let kind = self.kind();
        if !kind.config_fields().contains(&name) {
            return Err(Error::wrong_field(kind, name));
        }
        Ok(self.to_fields().remove(name))
    }

    /// Copy with one remote-cased field replaced.
    pub fn with_field(&self, name: &str, value: Value) -> Result<Self> {
        let mut fields = self.to_fields();
        fields.insert(name.to_string(), value);
        Self::from_fields(self.kind(), &fields)
    }

    pub fn aws(&self) -> Result<&AwsConfig> {
        match self {
            Self::Aws(c) => Ok(c),
            other => Err(other.mismatch(ProviderKind::Aws)),
        }
    }

    pub fn gcp(&self) -> Result<&GcpConfig> {
        match self {
            Self::Gcp(c) => Ok(c),
            other => Err(other.mismatch(ProviderKind::Gcp)),
        }
    }

    pub fn azure(&self) -> Result<&AzureConfig> {
        match self {
            Self::Azure(c) => Ok(c),
            other => Err(other.mismatch(ProviderKind::Azure)),
        }
    }

    pub fn oci(&self) -> Result<&OciConfig> {
        match self {
            Self::Oci(c) => Ok(c),
            other => Err(other.mismatch(ProviderKind::Oci)),
        }
    }

    pub fn alibaba(&self) -> Result<&AlibabaConfig> {
        match self {
            Self::Alibaba(c) => Ok(c),
            other => Err(other.mismatch(ProviderKind::Alibaba)),
        }
    }

    fn mismatch(&self, wanted: ProviderKind) -> Error {
        Error::InvalidVariant(format!("requested {wanted} config from a {} outpost", self.kind()))
    }

    /// Copy with secret values replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        match &mut copy {
            Self::Aws(c) => {
                mask(&mut c.access_key);
                mask(&mut c.secret_key);
            }
            Self::Gcp(c) => mask(&mut c.orchestrator_key),
            Self::Azure(c) => {
                mask(&mut c.orchestrator_client_secret);
                mask(&mut c.worker_client_secret);
            }
            Self::Oci(c) => mask(&mut c.orchestrator.private_key),
            Self::Alibaba(c) => mask(&mut c.outpost_credentials.orchestrator_access_key_secret),
        }
        copy
    }
}

/// Orchestration toggles, independent of provider.
///
/// Always sent in full on create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagedConfig {
    pub kubernetes_logging_enabled: bool,
    pub manual_network: bool,
    pub kubernetes_cloud_monitoring_enabled: bool,
}

impl ManagedConfig {
    pub const FIELDS: &'static [&'static str] = &[
        "kubernetesLoggingEnabled",
        "manualNetwork",
        "kubernetesCloudMonitoringEnabled",
    ];
}

/// Pod annotations, resource tags and namespace prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomConfig {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pod_annotations: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub resource_tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace_prefix: String,
}

impl CustomConfig {
    pub const FIELDS: &'static [&'static str] = &["podAnnotations", "resourceTags", "namespacePrefix"];

    pub fn is_empty(&self) -> bool {
        self.pod_annotations.is_empty() && self.resource_tags.is_empty() && self.namespace_prefix.is_empty()
    }
}

/// Settings reported for self-managed outposts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelfManagedConfig {
    pub disable_automatic_configuration_bucket_sync: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<SelfManagedVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfManagedVersion {
    pub id: String,
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRef {
    pub url: String,
}

/// Who created a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attribution {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Remote lifecycle status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

/// HTTP proxy settings of a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    #[serde(rename = "httpProxyURL")]
    pub http_proxy_url: String,
    #[serde(rename = "httpsProxyURL")]
    pub https_proxy_url: String,
    #[serde(rename = "vpcCIDRs", deserialize_with = "string_or_list")]
    pub vpc_cidrs: Vec<String>,
}

/// Node group descriptor of a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeGroup {
    pub node_group_id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub max_node_count: i64,
    pub min_node_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AwsClusterConfig {
    pub cluster_name: String,
    #[serde(rename = "sqsURL")]
    pub sqs_url: String,
    pub kubernetes_service_account_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzureClusterConfig {
    pub cluster_name: String,
    pub servicebus_queue_name: String,
    pub servicebus_namespace: String,
    pub resource_group_name: String,
    #[serde(deserialize_with = "string_or_list")]
    pub storage_account_names: Vec<String>,
    pub subscription_id: String,
    #[serde(rename = "serviceAuthorizedIPRanges", deserialize_with = "string_or_list")]
    pub service_authorized_ip_ranges: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GcpClusterConfig {
    pub cluster_name: String,
    pub project_id: String,
    pub cluster_zone: String,
    pub topic_name: String,
    pub pub_sub_subscription: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OciClusterConfig {
    pub cluster_name: String,
    #[serde(rename = "streamOCID")]
    pub stream_ocid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlibabaClusterConfig {
    pub cluster_name: String,
    pub queue_name: String,
}

/// Provider-specific cluster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ClusterConfig {
    Aws(AwsClusterConfig),
    Gcp(GcpClusterConfig),
    Azure(AzureClusterConfig),
    Oci(OciClusterConfig),
    Alibaba(AlibabaClusterConfig),
}

impl ClusterConfig {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Aws(_) => ProviderKind::Aws,
            Self::Gcp(_) => ProviderKind::Gcp,
            Self::Azure(_) => ProviderKind::Azure,
            Self::Oci(_) => ProviderKind::Oci,
            Self::Alibaba(_) => ProviderKind::Alibaba,
        }
    }

    pub fn cluster_name(&self) -> &str {
        match self {
            Self::Aws(c) => &c.cluster_name,
            Self::Gcp(c) => &c.cluster_name,
            Self::Azure(c) => &c.cluster_name,
            Self::Oci(c) => &c.cluster_name,
            Self::Alibaba(c) => &c.cluster_name,
        }
    }
}

/// One regional cluster of an outpost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRecord {
    pub id: String,
    pub region: String,
    pub created_at: Option<DateTime<Utc>>,
    pub http_proxy: Option<ProxyConfig>,
    pub node_groups: Vec<NodeGroup>,
    pub config: Option<ClusterConfig>,
    pub added_by: Attribution,
}

/// Canonical read-back shape of an outpost.
///
/// Owned by the remote service; the engine only projects it into local
/// state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRecord {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub service_type: String,
    pub allowed_regions: Vec<String>,
    pub self_managed: bool,
    pub external_internet_access: String,
    pub self_managed_config: Option<SelfManagedConfig>,
    pub managed_config: ManagedConfig,
    pub custom_config: CustomConfig,
    pub config: Option<ProviderConfig>,
    pub status: Status,
    pub created_at: Option<DateTime<Utc>>,
    pub added_by: Attribution,
    pub clusters: Vec<ClusterRecord>,
}

impl RemoteRecord {
    /// Provider kind implied by the record.
    pub fn kind(&self) -> Option<ProviderKind> {
        match &self.config {
            Some(config) => Some(config.kind()),
            None if self.self_managed => Some(ProviderKind::SelfManaged),
            None => None,
        }
    }

    /// Copy safe to print or log.
    pub fn redacted(&self) -> Self {
        Self {
            config: self.config.as_ref().map(ProviderConfig::redacted),
            ..self.clone()
        }
    }
}

/// What the caller wants one outpost to look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    pub name: String,
    pub enabled: bool,
    pub self_managed: bool,
    pub kind: ProviderKind,
    pub service_type: String,
    pub allowed_regions: Vec<String>,
    pub managed: ManagedConfig,
    pub custom: CustomConfig,
    pub config: Option<ProviderConfig>,
}

impl DesiredState {
    /// Check that the provider config matches the provider kind.
    pub fn validate(&self) -> Result<()> {
        match (&self.kind, &self.config) {
            (ProviderKind::SelfManaged, None) => Ok(()),
            (ProviderKind::SelfManaged, Some(config)) => Err(Error::InvalidVariant(format!(
                "self-managed outpost \"{}\" must not carry {} config",
                self.name,
                config.kind()
            ))),
            (kind, None) => Err(Error::InvalidVariant(format!(
                "{kind} outpost \"{}\" has no {} config block",
                self.name,
                kind.name()
            ))),
            (kind, Some(config)) if config.kind() != *kind => Err(Error::InvalidVariant(format!(
                "{kind} outpost \"{}\" carries {} config",
                self.name,
                config.kind()
            ))),
            _ => Ok(()),
        }
    }

    /// Whether the outpost is self-managed, by flag or by kind.
    pub fn is_self_managed(&self) -> bool {
        self.self_managed || self.kind == ProviderKind::SelfManaged
    }
}
