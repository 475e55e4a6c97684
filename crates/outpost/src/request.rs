//! Request builder: typed input variables plus the matching document.
//!
//! Inputs carry exactly the members the remote input type declares; empty
//! optional members are omitted.

use crate::error::{Error, Result};
use crate::model::{CustomConfig, DesiredState, ManagedConfig, ProviderConfig};
use crate::patch::ChangeSet;
use crate::queries;
use gqlkit::{Operation, OperationKind, Request};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const OUTPOST: &str = "outpost";
const CONTROL: &str = "control";

/// A ready-to-send request and where its result lives in `data`.
#[derive(Debug, Clone)]
pub struct OutpostRequest {
    pub request: Request,
    pub operation: Operation,
    /// Path of the returned record (or mutation payload) inside `data`.
    pub path: &'static [&'static str],
}

/// Mutation used to delete an outpost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteStrategy {
    /// `deleteControl`, removing the control behind the outpost.
    #[default]
    Control,
    /// `deleteOutpost`, uninstalling the outpost.
    Uninstall,
}

impl fmt::Display for DeleteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control => f.write_str("control"),
            Self::Uninstall => f.write_str("uninstall"),
        }
    }
}

impl FromStr for DeleteStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "control" => Ok(Self::Control),
            "uninstall" => Ok(Self::Uninstall),
            other => Err(format!("unknown delete strategy \"{other}\" (expected control or uninstall)")),
        }
    }
}

#[derive(Serialize)]
struct Input<T> {
    input: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateOutpostInput {
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    service_type: String,
    enabled: bool,
    self_managed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<ProviderConfig>,
    managed_config: ManagedConfig,
    #[serde(skip_serializing_if = "CustomConfig::is_empty")]
    custom_config: CustomConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    allowed_regions: Vec<String>,
}

#[derive(Serialize)]
struct UpdateOutpostInput<'a> {
    id: &'a str,
    patch: &'a ChangeSet,
}

#[derive(Serialize)]
struct IdInput<'a> {
    id: &'a str,
}

/// Create mutation carrying the full provider and managed config.
pub fn build_create(desired: &DesiredState) -> Result<OutpostRequest> {
    desired.validate()?;
    let input = CreateOutpostInput {
        name: desired.name.clone(),
        service_type: desired.service_type.clone(),
        enabled: desired.enabled,
        self_managed: desired.is_self_managed(),
        config: desired.config.clone(),
        managed_config: desired.managed,
        custom_config: desired.custom.clone(),
        allowed_regions: desired.allowed_regions.clone(),
    };
    Ok(OutpostRequest {
        request: Request::new(queries::CREATE_OUTPOST, &Input { input })?,
        operation: Operation::new(OUTPOST, OperationKind::Create),
        path: &["createOutpost", "outpost"],
    })
}

/// Full-record query.
pub fn build_read(id: &str) -> Result<OutpostRequest> {
    Ok(OutpostRequest {
        request: Request::new(queries::READ_OUTPOST, &IdInput { id })?,
        operation: Operation::new(OUTPOST, OperationKind::Read),
        path: &["outpost"],
    })
}

/// Patch mutation with only the changed identity fields.
pub fn build_update(id: &str, changes: &ChangeSet) -> Result<OutpostRequest> {
    if id.is_empty() {
        return Err(Error::UnexpectedResponse("update requested without an identifier".to_string()));
    }
    let input = UpdateOutpostInput { id, patch: changes };
    Ok(OutpostRequest {
        request: Request::new(queries::UPDATE_OUTPOST, &Input { input })?,
        operation: Operation::new(OUTPOST, OperationKind::Update),
        path: &["updateOutpost", "outpost"],
    })
}

pub fn build_delete(id: &str, strategy: DeleteStrategy) -> Result<OutpostRequest> {
    let input = IdInput { id };
    let (query, category, path): (_, _, &'static [&'static str]) = match strategy {
        DeleteStrategy::Control => (queries::DELETE_CONTROL, CONTROL, &["deleteControl"]),
        DeleteStrategy::Uninstall => (queries::DELETE_OUTPOST, OUTPOST, &["deleteOutpost"]),
    };
    Ok(OutpostRequest {
        request: Request::new(query, &Input { input })?,
        operation: Operation::new(category, OperationKind::Delete),
        path,
    })
}
