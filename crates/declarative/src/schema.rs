//! Attribute schema for declared resources
//!
//! A schema names every attribute a resource understands, its value type,
//! who sets it (the caller, the remote side, or both) and an optional default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::diagnostics::{Diagnostic, Diagnostics};

/// Value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Bool,
    Int,
    /// List of strings
    List,
    /// String-to-string map
    Map,
    /// Nested object with free-form members
    Object,
}

impl AttributeType {
    /// Check whether a value fits this type. Null fits every type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::String, Value::String(_)) => true,
            (Self::Bool, Value::Bool(_)) => true,
            (Self::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::List, Value::Array(items)) => items.iter().all(Value::is_string),
            (Self::Map, Value::Object(members)) => members.values().all(Value::is_string),
            (Self::Object, Value::Object(_)) => true,
            _ => false,
        }
    }

    /// Name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::List => "list of strings",
            Self::Map => "map of strings",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who supplies an attribute's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeMode {
    /// Must be declared by the caller
    Required,
    /// May be declared by the caller
    Optional,
    /// Set only from remote state
    Computed,
    /// Declared when the caller cares, otherwise filled in from remote state
    OptionalComputed,
}

impl AttributeMode {
    /// Whether the caller may declare a value
    pub fn is_declarable(&self) -> bool {
        !matches!(self, Self::Computed)
    }
}

/// A single attribute definition
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: &'static str,
    pub attribute_type: AttributeType,
    pub mode: AttributeMode,
    pub default: Option<Value>,
    pub sensitive: bool,
    pub description: &'static str,
}

impl Attribute {
    fn new(name: &'static str, attribute_type: AttributeType, mode: AttributeMode) -> Self {
        Self {
            name,
            attribute_type,
            mode,
            default: None,
            sensitive: false,
            description: "",
        }
    }

    pub fn required(name: &'static str, attribute_type: AttributeType) -> Self {
        Self::new(name, attribute_type, AttributeMode::Required)
    }

    pub fn optional(name: &'static str, attribute_type: AttributeType) -> Self {
        Self::new(name, attribute_type, AttributeMode::Optional)
    }

    pub fn computed(name: &'static str, attribute_type: AttributeType) -> Self {
        Self::new(name, attribute_type, AttributeMode::Computed)
    }

    pub fn optional_computed(name: &'static str, attribute_type: AttributeType) -> Self {
        Self::new(name, attribute_type, AttributeMode::OptionalComputed)
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Mark as sensitive (redacted from display)
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

/// Ordered set of attributes for one resource type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, replacing any previous definition with the same name
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.retain(|a| a.name != attribute.name);
        self.attributes.push(attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Attributes the caller may declare, in schema order
    pub fn declarable(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.mode.is_declarable())
    }

    /// Check declared values: unknown names, computed-only names, wrong
    /// types and missing required attributes.
    pub fn validate(&self, declared: &Map<String, Value>) -> Diagnostics {
        let mut diags = Diagnostics::new();

        for (name, value) in declared {
            match self.get(name) {
                None => diags.push(
                    Diagnostic::error(format!("Unsupported attribute \"{name}\""))
                        .with_attribute(name),
                ),
                Some(attr) if !attr.mode.is_declarable() => diags.push(
                    Diagnostic::error(format!("Attribute \"{name}\" is computed and cannot be set"))
                        .with_attribute(name),
                ),
                Some(attr) if !attr.attribute_type.accepts(value) => diags.push(
                    Diagnostic::error(format!("Invalid value for \"{name}\""))
                        .with_detail(format!("expected {}", attr.attribute_type))
                        .with_attribute(name),
                ),
                Some(_) => {}
            }
        }

        for attr in &self.attributes {
            if attr.mode == AttributeMode::Required
                && declared.get(attr.name).is_none_or(Value::is_null)
            {
                diags.push(
                    Diagnostic::error(format!("Missing required attribute \"{}\"", attr.name))
                        .with_attribute(attr.name),
                );
            }
        }

        diags
    }
}
