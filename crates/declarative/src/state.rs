//! Typed key-value state store
//!
//! [`StateStore`] is what lifecycle operations see: declared values to read,
//! remote values to record, a change test and the remote identifier.
//! [`ResourceData`] is the in-memory implementation the executor hands out.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::schema::{AttributeMode, AttributeType, Schema};

/// Rejections from the typed setter and getters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("unknown attribute \"{0}\"")]
    UnknownAttribute(String),

    #[error("attribute \"{attribute}\": expected {expected}, got {found}")]
    TypeMismatch {
        attribute: String,
        expected: AttributeType,
        found: &'static str,
    },
}

impl From<StateError> for Diagnostic {
    fn from(err: StateError) -> Self {
        let attribute = match &err {
            StateError::UnknownAttribute(name) => name.clone(),
            StateError::TypeMismatch { attribute, .. } => attribute.clone(),
        };
        Diagnostic::error("Failed to record attribute")
            .with_detail(err.to_string())
            .with_attribute(attribute)
    }
}

/// Local view of one resource instance
///
/// Lifecycle operations use this as the sole source of "what changed" and
/// "what to persist". The identifier is the only value that must survive
/// between runs.
pub trait StateStore {
    /// Effective value of an attribute; null counts as absent
    fn get(&self, attribute: &str) -> Option<&Value>;

    /// Record a value observed on the remote side
    fn set(&mut self, attribute: &str, value: Value) -> Result<(), StateError>;

    /// Whether the declared value differs from the recorded one
    fn has_changed(&self, attribute: &str) -> bool;

    /// Whether the caller declared a non-null value
    fn is_declared(&self, attribute: &str) -> bool;

    /// Remote identifier, `None` when unmanaged
    fn identifier(&self) -> Option<&str>;

    /// Set the remote identifier. An empty string clears it.
    fn set_identifier(&mut self, id: &str);

    fn clear_identifier(&mut self);

    /// Force a create on the next reconciliation
    fn mark_for_recreation(&mut self);

    fn is_marked_for_recreation(&self) -> bool;

    /// String value, empty when absent
    fn get_str(&self, attribute: &str) -> Result<String, StateError> {
        match self.get(attribute) {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(mismatch(attribute, AttributeType::String, other)),
        }
    }

    /// Bool value, false when absent
    fn get_bool(&self, attribute: &str) -> Result<bool, StateError> {
        match self.get(attribute) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(mismatch(attribute, AttributeType::Bool, other)),
        }
    }

    /// List of strings, empty when absent
    fn get_list(&self, attribute: &str) -> Result<Vec<String>, StateError> {
        match self.get(attribute) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(mismatch(attribute, AttributeType::List, other)),
                })
                .collect(),
            Some(other) => Err(mismatch(attribute, AttributeType::List, other)),
        }
    }

    /// String map, empty when absent
    fn get_map(&self, attribute: &str) -> Result<BTreeMap<String, String>, StateError> {
        match self.get(attribute) {
            None => Ok(BTreeMap::new()),
            Some(Value::Object(members)) => members
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => Ok((k.clone(), s.clone())),
                    other => Err(mismatch(attribute, AttributeType::Map, other)),
                })
                .collect(),
            Some(other) => Err(mismatch(attribute, AttributeType::Map, other)),
        }
    }

    /// Nested object, `None` when absent
    fn get_object(&self, attribute: &str) -> Result<Option<Map<String, Value>>, StateError> {
        match self.get(attribute) {
            None => Ok(None),
            Some(Value::Object(members)) => Ok(Some(members.clone())),
            Some(other) => Err(mismatch(attribute, AttributeType::Object, other)),
        }
    }
}

fn mismatch(attribute: &str, expected: AttributeType, found: &Value) -> StateError {
    StateError::TypeMismatch {
        attribute: attribute.to_string(),
        expected,
        found: value_kind(found),
    }
}

/// JSON kind name for messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Whether a value is the zero value of its kind
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(members) => members.values().all(is_zero),
    }
}

/// Drop zero-valued members recursively; a value that is entirely zero
/// becomes null.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(members) => {
            let kept: Map<String, Value> = members
                .iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if kept.is_empty() {
                Value::Null
            } else {
                Value::Object(kept)
            }
        }
        other if is_zero(other) => Value::Null,
        other => other.clone(),
    }
}

/// Equality that treats absent and zero values as the same
pub fn equivalent(a: &Value, b: &Value) -> bool {
    normalize(a) == normalize(b)
}

/// In-memory state for one resource instance
#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Arc<Schema>,
    declared: Map<String, Value>,
    state: Map<String, Value>,
    id: Option<String>,
    recreate: bool,
}

impl ResourceData {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            declared: Map::new(),
            state: Map::new(),
            id: None,
            recreate: false,
        }
    }

    /// Values from the caller's configuration
    pub fn with_declared(mut self, declared: Map<String, Value>) -> Self {
        self.declared = declared;
        self
    }

    /// Values recorded by a previous run
    pub fn with_state(mut self, state: Map<String, Value>) -> Self {
        self.state = state;
        self
    }

    pub fn with_identifier(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.id = (!id.is_empty()).then_some(id);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn declared(&self) -> &Map<String, Value> {
        &self.declared
    }

    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    /// Recorded value only, ignoring declarations and defaults
    pub fn recorded(&self, attribute: &str) -> Option<&Value> {
        self.state.get(attribute).filter(|v| !v.is_null())
    }

    /// Declared value, falling back to the schema default
    pub fn declared_or_default(&self, attribute: &str) -> Option<&Value> {
        self.declared
            .get(attribute)
            .filter(|v| !v.is_null())
            .or_else(|| self.schema.get(attribute)?.default.as_ref())
    }

    /// Names of declarable attributes whose declared value differs from state
    pub fn changed_attributes(&self) -> Vec<&'static str> {
        self.schema
            .declarable()
            .filter(|attr| self.has_changed(attr.name))
            .map(|attr| attr.name)
            .collect()
    }

    /// Check declared values against the schema
    pub fn validate(&self) -> Diagnostics {
        self.schema.validate(&self.declared)
    }
}

impl StateStore for ResourceData {
    fn get(&self, attribute: &str) -> Option<&Value> {
        self.declared_or_default(attribute)
            .or_else(|| self.recorded(attribute))
    }

    fn set(&mut self, attribute: &str, value: Value) -> Result<(), StateError> {
        let attr = self
            .schema
            .get(attribute)
            .ok_or_else(|| StateError::UnknownAttribute(attribute.to_string()))?;
        if !attr.attribute_type.accepts(&value) {
            return Err(mismatch(attribute, attr.attribute_type, &value));
        }
        self.state.insert(attribute.to_string(), value);
        Ok(())
    }

    fn has_changed(&self, attribute: &str) -> bool {
        let Some(attr) = self.schema.get(attribute) else {
            return false;
        };
        let declared = self.declared_or_default(attribute);
        match attr.mode {
            AttributeMode::Computed => false,
            AttributeMode::OptionalComputed if declared.is_none() => false,
            _ => !equivalent(
                declared.unwrap_or(&Value::Null),
                self.state.get(attribute).unwrap_or(&Value::Null),
            ),
        }
    }

    fn is_declared(&self, attribute: &str) -> bool {
        self.declared.get(attribute).is_some_and(|v| !v.is_null())
    }

    fn identifier(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Setting a non-empty identifier also clears the recreation flag.
    fn set_identifier(&mut self, id: &str) {
        if id.is_empty() {
            self.clear_identifier();
        } else {
            self.id = Some(id.to_string());
            self.recreate = false;
        }
    }

    fn clear_identifier(&mut self) {
        self.id = None;
    }

    fn mark_for_recreation(&mut self) {
        self.recreate = true;
    }

    fn is_marked_for_recreation(&self) -> bool {
        self.recreate
    }
}
