//! # Declarative
//!
//! A framework for declarative resource lifecycle management.
//!
//! Callers declare attribute values per named instance; resource types know
//! how to create, read, update and delete the matching remote objects. The
//! executor refreshes recorded state, plans the difference and converges.
//!
//! ## Core Concepts
//!
//! - **Schema**: the attributes a resource type understands, with type, mode
//!   (required/optional/computed), default and sensitivity
//! - **StateStore**: the typed key-value view a lifecycle operation works
//!   against; [`ResourceData`] is the in-memory implementation
//! - **Resource**: create/read/update/delete for one resource type, each
//!   reporting through [`Diagnostics`]
//! - **ExecutionPlan**: instances of one resource type, filterable by
//!   `type.name` target
//! - **Executor**: refresh, plan, confirm, then apply in parallel
//!
//! ## Example
//!
//! ```
//! use declarative::{
//!     ApplyContext, Attribute, AttributeType, Diagnostic, Diagnostics, ExecuteOptions, ExecutionPlan,
//!     Instance, Resource, ResourceData, Schema, StateStore, execute_simple,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Echo;
//!
//! impl Resource for Echo {
//!     fn resource_type(&self) -> &'static str { "echo" }
//!     fn schema(&self) -> Arc<Schema> {
//!         Arc::new(Schema::new().with_attribute(Attribute::required("text", AttributeType::String)))
//!     }
//!     fn create(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
//!         data.set_identifier("echo-1");
//!         self.read(ctx, data)
//!     }
//!     fn read(&self, _: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
//!         let text = data.get("text").cloned().unwrap_or_default();
//!         data.set("text", text).err().map(Diagnostic::from).into_iter().collect()
//!     }
//!     fn update(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
//!         self.read(ctx, data)
//!     }
//!     fn delete(&self, _: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
//!         data.clear_identifier();
//!         Diagnostics::new()
//!     }
//! }
//!
//! let resource = Arc::new(Echo);
//! let mut plan = ExecutionPlan::new(resource.clone());
//! let declared = json!({"text": "hello"}).as_object().cloned().unwrap();
//! plan.add_instance(Instance::new("echo", "greeting", ResourceData::new(resource.schema()).with_declared(declared)));
//!
//! let report = execute_simple(&mut plan, &ExecuteOptions::default()).unwrap();
//! assert_eq!(report.summary.created, 1);
//! ```
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod diagnostics;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod schema;
pub mod state;
pub mod types;

// Re-export main types at crate root
pub use context::{ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use diff::{AttributeChange, DiffSummary, PlannedAction, ResourceDiff, compute_diffs};
pub use executor::{ExecuteReport, InstanceReport, execute, execute_simple, refresh, refresh_all};
pub use planner::{ExecutionPlan, Instance};
pub use resource::{Resource, SharedResource};
pub use schema::{Attribute, AttributeMode, AttributeType, Schema};
pub use state::{ResourceData, StateError, StateStore};
pub use types::{ApplyResult, ExecuteOptions, ExecuteSummary};
