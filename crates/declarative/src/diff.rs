//! Plan computation for instances

use crate::planner::Instance;
use crate::state::{ResourceData, StateStore, is_zero};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What reconciliation will do to one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedAction {
    Create,
    Update { attributes: Vec<String> },
    Delete,
    NoChange,
}

impl PlannedAction {
    /// Decide the action from local state.
    ///
    /// No identifier or a recreation flag means create; declared values that
    /// differ from recorded ones mean update.
    pub fn for_data(data: &ResourceData, desired: bool) -> Self {
        if !desired {
            return if data.identifier().is_some() {
                Self::Delete
            } else {
                Self::NoChange
            };
        }
        if data.identifier().is_none() || data.is_marked_for_recreation() {
            return Self::Create;
        }
        let attributes: Vec<String> = data
            .changed_attributes()
            .into_iter()
            .map(String::from)
            .collect();
        if attributes.is_empty() {
            Self::NoChange
        } else {
            Self::Update { attributes }
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoChange)
    }

    /// Terminal marker used in plan listings
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Create => "+",
            Self::Update { .. } => "~",
            Self::Delete => "-",
            Self::NoChange => " ",
        }
    }
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update { .. } => write!(f, "update in-place"),
            Self::Delete => write!(f, "delete"),
            Self::NoChange => write!(f, "no change"),
        }
    }
}

/// One attribute's before/after values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub name: String,
    pub before: Value,
    pub after: Value,
    /// Values must not be printed
    pub sensitive: bool,
}

/// Planned change for one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Instance address, `type.name`
    pub address: String,
    pub action: PlannedAction,
    pub changes: Vec<AttributeChange>,
}

impl ResourceDiff {
    /// Diff for an instance, `None` when nothing would change
    pub fn from_instance(instance: &Instance) -> Option<Self> {
        let action = PlannedAction::for_data(&instance.data, instance.desired);
        if !action.is_change() {
            return None;
        }

        let data = &instance.data;
        let changes = data
            .schema()
            .declarable()
            .filter_map(|attr| {
                let before = data.recorded(attr.name).cloned().unwrap_or(Value::Null);
                let after = data
                    .declared_or_default(attr.name)
                    .cloned()
                    .unwrap_or(Value::Null);
                let (before, after) = match &action {
                    PlannedAction::Create if !is_zero(&after) => (Value::Null, after),
                    PlannedAction::Update { attributes }
                        if attributes.iter().any(|a| a == attr.name) =>
                    {
                        (before, after)
                    }
                    PlannedAction::Delete if !is_zero(&before) => (before, Value::Null),
                    _ => return None,
                };
                Some(AttributeChange {
                    name: attr.name.to_string(),
                    before,
                    after,
                    sensitive: attr.sensitive,
                })
            })
            .collect();

        Some(Self {
            address: instance.address(),
            action,
            changes,
        })
    }

    pub fn is_addition(&self) -> bool {
        self.action == PlannedAction::Create
    }

    pub fn is_removal(&self) -> bool {
        self.action == PlannedAction::Delete
    }

    pub fn is_modification(&self) -> bool {
        matches!(self.action, PlannedAction::Update { .. })
    }
}

/// Compute diffs for a list of instances
///
/// Returns only instances whose plan is not [`PlannedAction::NoChange`].
pub fn compute_diffs(instances: &[Instance]) -> Vec<ResourceDiff> {
    instances.iter().filter_map(ResourceDiff::from_instance).collect()
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub additions: usize,
    pub removals: usize,
    pub modifications: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            if diff.is_addition() {
                summary.additions += 1;
            } else if diff.is_removal() {
                summary.removals += 1;
            } else if diff.is_modification() {
                summary.modifications += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to add, {} to change, {} to destroy",
            self.additions, self.modifications, self.removals
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, AttributeType, Schema};
    use serde_json::json;
    use std::sync::Arc;

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::new()
                .with_attribute(Attribute::required("name", AttributeType::String))
                .with_attribute(Attribute::optional("enabled", AttributeType::Bool))
                .with_attribute(Attribute::optional("secret", AttributeType::String).sensitive())
                .with_attribute(Attribute::computed("status", AttributeType::String)),
        )
    }

    fn data(declared: Value, state: Value, id: &str) -> ResourceData {
        ResourceData::new(schema())
            .with_declared(declared.as_object().cloned().unwrap_or_default())
            .with_state(state.as_object().cloned().unwrap_or_default())
            .with_identifier(id)
    }

    #[test]
    fn test_action_without_identifier_is_create() {
        let data = data(json!({"name": "a"}), json!({}), "");
        assert_eq!(PlannedAction::for_data(&data, true), PlannedAction::Create);
        assert_eq!(PlannedAction::for_data(&data, false), PlannedAction::NoChange);
    }

    #[test]
    fn test_action_recreation_flag_is_create() {
        let mut data = data(json!({"name": "a"}), json!({"name": "a"}), "o-1");
        data.mark_for_recreation();
        assert_eq!(PlannedAction::for_data(&data, true), PlannedAction::Create);
    }

    #[test]
    fn test_action_update_lists_changed_attributes() {
        let data = data(
            json!({"name": "a", "enabled": true}),
            json!({"name": "a", "enabled": false, "status": "ACTIVE"}),
            "o-1",
        );
        assert_eq!(
            PlannedAction::for_data(&data, true),
            PlannedAction::Update {
                attributes: vec!["enabled".into()]
            }
        );
    }

    #[test]
    fn test_action_delete() {
        let data = data(json!({}), json!({"name": "a"}), "o-1");
        assert_eq!(PlannedAction::for_data(&data, false), PlannedAction::Delete);
    }

    #[test]
    fn test_diff_create_lists_declared_values() {
        let instance = Instance::new("outpost", "a", data(json!({"name": "a", "secret": "s"}), json!({}), ""));
        let diff = ResourceDiff::from_instance(&instance).unwrap();
        assert_eq!(diff.address, "outpost.a");
        assert!(diff.is_addition());
        let names: Vec<_> = diff.changes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["name", "secret"]);
        assert!(diff.changes[1].sensitive);
    }

    #[test]
    fn test_diff_none_when_unchanged() {
        let instance = Instance::new("outpost", "a", data(json!({"name": "a"}), json!({"name": "a"}), "o-1"));
        assert!(ResourceDiff::from_instance(&instance).is_none());
    }

    #[test]
    fn test_summary() {
        let instances = vec![
            Instance::new("outpost", "a", data(json!({"name": "a"}), json!({}), "")),
            Instance::new("outpost", "b", data(json!({"name": "c"}), json!({"name": "b"}), "o-2")),
            Instance::new("outpost", "d", data(json!({}), json!({"name": "d"}), "o-3")).orphaned(),
        ];
        let summary = DiffSummary::from_diffs(&compute_diffs(&instances));
        assert_eq!(summary, DiffSummary { additions: 1, removals: 1, modifications: 1 });
        assert_eq!(summary.to_string(), "1 to add, 1 to change, 1 to destroy");
    }
}
