//! Outpost manifest - the desired state, one `[[outpost]]` table per outpost
//!
//! ```toml
//! [[outpost]]
//! name = "prod-aws"
//! provider = "aws"
//! allowed_regions = ["us-east-1"]
//!
//! [outpost.aws]
//! roleARN = "arn:aws:iam::123456789012:role/outpost"
//! externalID = "ext-1"
//! ```

use anyhow::{Context, Result, bail};
use outpost::ProviderKind;
use outpost::attributes::{ALLOWED_REGIONS, CUSTOM, ENABLED, MANAGED, NAME, PROVIDER, SELF_MANAGED, SERVICE_TYPE};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, rename = "outpost")]
    pub outposts: Vec<OutpostSpec>,
}

/// One declared outpost
///
/// Block keys (`managed`, `custom` and the provider tables) use the remote
/// field casing, e.g. `roleARN` or `kubernetesLoggingEnabled`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutpostSpec {
    pub name: String,
    pub provider: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub self_managed: Option<bool>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub allowed_regions: Option<Vec<String>>,
    #[serde(default)]
    pub managed: Option<Map<String, Value>>,
    #[serde(default)]
    pub custom: Option<Map<String, Value>>,
    #[serde(default)]
    pub aws: Option<Map<String, Value>>,
    #[serde(default)]
    pub gcp: Option<Map<String, Value>>,
    #[serde(default)]
    pub azure: Option<Map<String, Value>>,
    #[serde(default)]
    pub oci: Option<Map<String, Value>>,
    #[serde(default)]
    pub alibaba: Option<Map<String, Value>>,
}

impl OutpostSpec {
    pub fn kind(&self) -> Result<ProviderKind> {
        self.provider
            .parse::<ProviderKind>()
            .with_context(|| format!("Outpost '{}': invalid provider", self.name))
    }

    fn block(&self, kind: ProviderKind) -> Option<&Map<String, Value>> {
        match kind {
            ProviderKind::Aws => self.aws.as_ref(),
            ProviderKind::Gcp => self.gcp.as_ref(),
            ProviderKind::Azure => self.azure.as_ref(),
            ProviderKind::Oci => self.oci.as_ref(),
            ProviderKind::Alibaba => self.alibaba.as_ref(),
            ProviderKind::SelfManaged => None,
        }
    }

    /// Declared attribute values for the `outpost` resource type
    ///
    /// Fails when a provider block other than the declared provider's is
    /// present.
    pub fn declared(&self) -> Result<Map<String, Value>> {
        let kind = self.kind()?;
        for other in ProviderKind::CONFIGURED {
            if other != kind && self.block(other).is_some() {
                bail!(
                    "Outpost '{}': [outpost.{}] does not match provider '{}'",
                    self.name,
                    other.name(),
                    kind.name()
                );
            }
        }

        let mut declared = Map::new();
        declared.insert(NAME.into(), Value::String(self.name.clone()));
        declared.insert(PROVIDER.into(), Value::String(kind.name().to_string()));
        if let Some(enabled) = self.enabled {
            declared.insert(ENABLED.into(), Value::Bool(enabled));
        }
        if let Some(self_managed) = self.self_managed {
            declared.insert(SELF_MANAGED.into(), Value::Bool(self_managed));
        }
        if let Some(service_type) = &self.service_type {
            declared.insert(SERVICE_TYPE.into(), Value::String(service_type.clone()));
        }
        if let Some(regions) = &self.allowed_regions {
            declared.insert(
                ALLOWED_REGIONS.into(),
                Value::Array(regions.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(managed) = &self.managed {
            declared.insert(MANAGED.into(), Value::Object(managed.clone()));
        }
        if let Some(custom) = &self.custom {
            declared.insert(CUSTOM.into(), Value::Object(custom.clone()));
        }
        if let Some(block) = self.block(kind) {
            declared.insert(kind.name().into(), Value::Object(block.clone()));
        }
        Ok(declared)
    }
}

impl Manifest {
    /// Load and validate a manifest
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let manifest = Self::parse(&content)
            .with_context(|| format!("Invalid manifest: {}", path.display()))?;
        log::debug!("Loaded {} outposts from {}", manifest.outposts.len(), path.display());
        Ok(manifest)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for spec in &self.outposts {
            if spec.name.trim().is_empty() {
                bail!("Outpost name must not be empty");
            }
            if !seen.insert(spec.name.as_str()) {
                bail!("Duplicate outpost name '{}'", spec.name);
            }
            spec.declared()?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OutpostSpec> {
        self.outposts.iter().find(|o| o.name == name)
    }
}

// ============================================================================
// Tests
// ============================================================================
