//! # Outpost
//!
//! Reconciliation engine for remote outposts managed through a GraphQL API.
//!
//! ## Pipeline
//!
//! 1. **Model** ([`model`]): one [`ProviderConfig`] variant per provider kind,
//!    serialized with the exact remote field casing
//! 2. **Request builder** ([`request`]): create/read/update/delete documents
//!    and typed input variables
//! 3. **Response mapper** ([`mapper`]): envelope payload into a
//!    [`RemoteRecord`], resolving polymorphic configs
//! 4. **Patch** ([`patch`]): sparse update payload from the state store's
//!    change tracking
//! 5. **Drift** ([`drift`]): tells a remotely deleted record from a failed read
//! 6. **Lifecycle** ([`lifecycle`]): [`OutpostResource`] implements
//!    [`declarative::Resource`] on top of any [`gqlkit::Transport`]

pub mod attributes;
pub mod drift;
pub mod error;
pub mod lifecycle;
pub mod mapper;
pub mod model;
pub mod patch;
pub mod queries;
pub mod request;

#[cfg(test)]
mod testing;

pub use attributes::{desired_from_store, redact_attribute, schema, write_record};
pub use drift::{ReadOutcome, classify};
pub use error::{Error, Result};
pub use lifecycle::{Fetched, OutpostResource, RESOURCE_TYPE};
pub use model::{
    ClusterConfig, ClusterRecord, CustomConfig, DesiredState, ManagedConfig, ProviderConfig, ProviderKind,
    RemoteRecord,
};
pub use patch::ChangeSet;
pub use request::{DeleteStrategy, OutpostRequest, build_create, build_delete, build_read, build_update};
