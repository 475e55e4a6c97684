//! Outpost attribute schema and the projection between local state and the
//! engine model.
//!
//! Provider blocks (`aws`, `gcp`, ...) and the `managed`/`custom` blocks keep
//! the remote casing for their keys, so a block maps one-to-one onto the
//! matching wire object.

use crate::error::{Error, Result};
use crate::model::{
    CustomConfig, DesiredState, ManagedConfig, ProviderConfig, ProviderKind, REDACTED, RemoteRecord,
};
use declarative::{Attribute, AttributeType, Schema, StateError, StateStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub const NAME: &str = "name";
pub const ENABLED: &str = "enabled";
pub const SELF_MANAGED: &str = "self_managed";
pub const PROVIDER: &str = "provider";
pub const SERVICE_TYPE: &str = "service_type";
pub const ALLOWED_REGIONS: &str = "allowed_regions";
pub const MANAGED: &str = "managed";
pub const CUSTOM: &str = "custom";
pub const STATUS: &str = "status";
pub const ERROR_CODE: &str = "error_code";
pub const EXTERNAL_INTERNET_ACCESS: &str = "external_internet_access";
pub const CREATED_AT: &str = "created_at";
pub const ADDED_BY: &str = "added_by";
pub const CLUSTERS: &str = "clusters";
pub const SELF_MANAGED_CONFIG: &str = "self_managed_config";

/// Changed attributes the update patch cannot carry.
pub const UNPATCHABLE: &[&str] = &[
    SELF_MANAGED,
    PROVIDER,
    SERVICE_TYPE,
    ALLOWED_REGIONS,
    MANAGED,
    CUSTOM,
    "aws",
    "gcp",
    "azure",
    "oci",
    "alibaba",
];

/// Attribute schema of the `outpost` resource type.
pub fn schema() -> Schema {
    let mut schema = Schema::new()
        .with_attribute(Attribute::required(NAME, AttributeType::String).describe("Display name"))
        .with_attribute(Attribute::optional(ENABLED, AttributeType::Bool).with_default(true))
        .with_attribute(Attribute::optional_computed(SELF_MANAGED, AttributeType::Bool))
        .with_attribute(
            Attribute::required(PROVIDER, AttributeType::String)
                .describe("aws, gcp, azure, oci, alibaba or self_managed"),
        )
        .with_attribute(Attribute::optional_computed(SERVICE_TYPE, AttributeType::String))
        .with_attribute(Attribute::optional_computed(ALLOWED_REGIONS, AttributeType::List))
        .with_attribute(Attribute::optional(MANAGED, AttributeType::Object).describe("Orchestration toggles"))
        .with_attribute(
            Attribute::optional(CUSTOM, AttributeType::Object)
                .describe("Pod annotations, resource tags and namespace prefix"),
        );
    for kind in ProviderKind::CONFIGURED {
        schema = schema.with_attribute(Attribute::optional(kind.name(), AttributeType::Object));
    }
    schema
        .with_attribute(Attribute::computed(STATUS, AttributeType::String))
        .with_attribute(Attribute::computed(ERROR_CODE, AttributeType::String))
        .with_attribute(Attribute::computed(EXTERNAL_INTERNET_ACCESS, AttributeType::String))
        .with_attribute(Attribute::computed(CREATED_AT, AttributeType::String))
        .with_attribute(Attribute::computed(ADDED_BY, AttributeType::Object))
        .with_attribute(Attribute::computed(CLUSTERS, AttributeType::Object).describe("Clusters keyed by id"))
        .with_attribute(Attribute::computed(SELF_MANAGED_CONFIG, AttributeType::Object))
}

/// Build the desired state from declared values.
///
/// Only the block matching `provider` is read; declaring a block of another
/// kind is an `InvalidVariant` error.
pub fn desired_from_store(store: &dyn StateStore) -> Result<DesiredState> {
    let name = store.get_str(NAME)?;
    let kind: ProviderKind = store.get_str(PROVIDER)?.parse()?;

    if let Some(other) = ProviderKind::CONFIGURED
        .into_iter()
        .find(|other| *other != kind && store.is_declared(other.name()))
    {
        return Err(Error::InvalidVariant(format!(
            "{kind} outpost \"{name}\" declares a \"{}\" block",
            other.name()
        )));
    }

    let config = match kind {
        ProviderKind::SelfManaged => None,
        _ => store
            .get_object(kind.name())?
            .map(|fields| ProviderConfig::from_fields(kind, &fields))
            .transpose()?,
    };

    let desired = DesiredState {
        enabled: store.get_bool(ENABLED)?,
        self_managed: store.get_bool(SELF_MANAGED)?,
        kind,
        service_type: store.get_str(SERVICE_TYPE)?,
        allowed_regions: store.get_list(ALLOWED_REGIONS)?,
        managed: block::<ManagedConfig>(store, MANAGED, ManagedConfig::FIELDS)?,
        custom: block::<CustomConfig>(store, CUSTOM, CustomConfig::FIELDS)?,
        config,
        name,
    };
    desired.validate()?;
    Ok(desired)
}

fn block<T: DeserializeOwned + Default>(store: &dyn StateStore, attribute: &str, fields: &[&str]) -> Result<T> {
    let Some(members) = store.get_object(attribute)? else {
        return Ok(T::default());
    };
    if let Some(key) = members.keys().find(|k| !fields.contains(&k.as_str())) {
        return Err(Error::InvalidVariant(format!("\"{key}\" is not a field of the {attribute} block")));
    }
    serde_json::from_value(Value::Object(members))
        .map_err(|e| Error::InvalidVariant(format!("{attribute} block: {e}")))
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

/// Project a remote record into the state store.
///
/// Provider blocks of other kinds are cleared.
pub fn write_record(store: &mut dyn StateStore, record: &RemoteRecord) -> std::result::Result<(), StateError> {
    store.set(NAME, Value::String(record.name.clone()))?;
    store.set(ENABLED, Value::Bool(record.enabled))?;
    store.set(SELF_MANAGED, Value::Bool(record.self_managed))?;
    if let Some(kind) = record.kind() {
        store.set(PROVIDER, Value::String(kind.name().to_string()))?;
    }
    store.set(SERVICE_TYPE, Value::String(record.service_type.clone()))?;
    store.set(ALLOWED_REGIONS, to_value(&record.allowed_regions))?;
    store.set(MANAGED, to_value(&record.managed_config))?;
    store.set(CUSTOM, to_value(&record.custom_config))?;
    for kind in ProviderKind::CONFIGURED {
        let block = match &record.config {
            Some(config) if config.kind() == kind => Value::Object(config.to_fields()),
            _ => Value::Null,
        };
        store.set(kind.name(), block)?;
    }

    store.set(STATUS, Value::String(record.status.status.clone()))?;
    store.set(ERROR_CODE, record.status.error_code.clone().map_or(Value::Null, Value::String))?;
    store.set(EXTERNAL_INTERNET_ACCESS, Value::String(record.external_internet_access.clone()))?;
    store.set(
        CREATED_AT,
        record
            .created_at
            .map_or(Value::Null, |t| Value::String(t.to_rfc3339())),
    )?;
    store.set(ADDED_BY, to_value(&record.added_by))?;

    let clusters: Map<String, Value> = record
        .clusters
        .iter()
        .enumerate()
        .map(|(i, cluster)| {
            let key = if cluster.id.is_empty() { format!("#{i}") } else { cluster.id.clone() };
            (key, to_value(cluster))
        })
        .collect();
    store.set(CLUSTERS, Value::Object(clusters))?;
    store.set(
        SELF_MANAGED_CONFIG,
        record.self_managed_config.as_ref().map_or(Value::Null, to_value),
    )?;
    Ok(())
}

/// Copy of an attribute value safe to print.
///
/// Masks the secret members of provider blocks.
pub fn redact_attribute(attribute: &str, value: &Value) -> Value {
    let Some(kind) = ProviderKind::CONFIGURED.into_iter().find(|k| k.name() == attribute) else {
        return value.clone();
    };
    let Value::Object(members) = value else {
        return value.clone();
    };
    let redacted = members
        .iter()
        .map(|(key, member)| {
            let masked = if kind.sensitive_fields().contains(&key.as_str()) {
                mask_value(member)
            } else {
                member.clone()
            };
            (key.clone(), masked)
        })
        .collect();
    Value::Object(redacted)
}

fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.is_empty() => value.clone(),
        Value::Object(members) => Value::Object(members.iter().map(|(k, v)| (k.clone(), mask_value(v))).collect()),
        Value::Null => Value::Null,
        _ => Value::String(REDACTED.to_string()),
    }
}
