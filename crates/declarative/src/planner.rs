//! Execution planner - the set of instances a run reconciles

use crate::resource::SharedResource;
use crate::state::ResourceData;

/// One named instance of a resource type
#[derive(Debug, Clone)]
pub struct Instance {
    /// Resource type name (first half of the address)
    pub resource_type: String,
    /// Instance name, unique within its type
    pub name: String,
    pub data: ResourceData,
    /// `false` for instances that exist in state but are no longer declared
    pub desired: bool,
}

impl Instance {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>, data: ResourceData) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            data,
            desired: true,
        }
    }

    /// Mark as no longer declared, so reconciliation deletes it
    pub fn orphaned(mut self) -> Self {
        self.desired = false;
        self
    }

    /// Address in `type.name` form
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }
}

/// An execution plan: one resource implementation and its instances
#[derive(Debug)]
pub struct ExecutionPlan {
    pub resource: SharedResource,
    pub instances: Vec<Instance>,
}

impl ExecutionPlan {
    pub fn new(resource: SharedResource) -> Self {
        Self {
            resource,
            instances: Vec::new(),
        }
    }

    pub fn add_instance(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    /// Filter plan to only include instances matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&Instance) -> bool,
    {
        Self {
            resource: self.resource,
            instances: self.instances.into_iter().filter(|i| predicate(i)).collect(),
        }
    }

    /// Filter plan to only include instances matching a target pattern
    ///
    /// Target format: "type" or "type.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                self.filter(|i| matches_filter(i, resource_type.as_deref(), name.as_deref()))
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.name == name)
    }

    pub fn total_instances(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Parse a target string like "type.name" into (type, name)
///
/// Only the first dot separates; instance names may contain dots.
fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    match target.split_once('.') {
        None => (Some(target.to_string()), None),
        Some((resource_type, name)) => (Some(resource_type.to_string()), Some(name.to_string())),
    }
}

/// Check if an instance matches the filter criteria
fn matches_filter(instance: &Instance, resource_type: Option<&str>, name: Option<&str>) -> bool {
    if let Some(rt) = resource_type
        && instance.resource_type != rt
    {
        return false;
    }

    if let Some(n) = name
        && instance.name != n
    {
        return false;
    }

    true
}
