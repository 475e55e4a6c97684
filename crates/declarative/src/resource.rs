//! Resource trait for declarative lifecycle management
//!
//! A resource type knows how to create, read, update and delete remote
//! objects described by its [`Schema`]. The executor decides which of those
//! to call; the resource only talks to the remote side and records what it
//! sees in the [`StateStore`].

use crate::context::ApplyContext;
use crate::diagnostics::Diagnostics;
use crate::schema::Schema;
use crate::state::StateStore;
use std::fmt;
use std::sync::Arc;

/// Core trait for declarative resources
///
/// Every operation reports through [`Diagnostics`]; an error-severity entry
/// means the operation failed. Operations must honour
/// [`ApplyContext::is_done`] before touching the network.
///
/// # Example
///
/// ```
/// use declarative::{
///     ApplyContext, Attribute, AttributeType, Diagnostics, Resource, Schema, StateStore,
/// };
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct Note;
///
/// impl Resource for Note {
///     fn resource_type(&self) -> &'static str {
///         "note"
///     }
///
///     fn schema(&self) -> Arc<Schema> {
///         Arc::new(Schema::new().with_attribute(Attribute::required("text", AttributeType::String)))
///     }
///
///     fn create(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
///         data.set_identifier("note-1");
///         self.read(ctx, data)
///     }
///
///     fn read(&self, _ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
///         let text = data.get("text").cloned().unwrap_or_default();
///         let mut diags = Diagnostics::new();
///         if let Err(e) = data.set("text", text) {
///             diags.push(e.into());
///         }
///         diags
///     }
///
///     fn update(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
///         self.read(ctx, data)
///     }
///
///     fn delete(&self, _ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics {
///         data.clear_identifier();
///         Diagnostics::new()
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Resource type name, the first half of an address (`outpost.prod`)
    fn resource_type(&self) -> &'static str;

    /// Attributes understood by this resource type
    fn schema(&self) -> Arc<Schema>;

    /// Create the remote object and record its identifier
    fn create(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics;

    /// Refresh recorded values from the remote object
    ///
    /// A remote object that no longer exists clears the identifier and marks
    /// the instance for recreation instead of failing.
    fn read(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics;

    /// Push changed attributes to the remote object
    fn update(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics;

    /// Delete the remote object and clear the identifier
    fn delete(&self, ctx: &ApplyContext, data: &mut dyn StateStore) -> Diagnostics;

    /// Adopt an existing remote object by identifier
    fn import(&self, ctx: &ApplyContext, data: &mut dyn StateStore, id: &str) -> Diagnostics {
        data.set_identifier(id);
        self.read(ctx, data)
    }
}

/// A shared resource type for type-erased storage
pub type SharedResource = Arc<dyn Resource>;
