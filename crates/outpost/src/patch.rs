//! Sparse update payloads.

use crate::attributes::{ENABLED, NAME, UNPATCHABLE};
use declarative::{StateError, StateStore};
use serde::Serialize;

/// Fields flagged as changed by the state store, and nothing else.
///
/// `None` means "leave unchanged"; `Some(false)` is sent as an explicit
/// `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Changed attributes that the patch cannot carry.
    #[serde(skip)]
    pub unpatchable: Vec<&'static str>,
}

impl ChangeSet {
    /// Collect the patch from the store's change tracking.
    pub fn from_store(store: &dyn StateStore) -> Result<Self, StateError> {
        let name = if store.has_changed(NAME) {
            Some(store.get_str(NAME)?)
        } else {
            None
        };
        let enabled = if store.has_changed(ENABLED) {
            Some(store.get_bool(ENABLED)?)
        } else {
            None
        };
        let unpatchable = UNPATCHABLE
            .iter()
            .copied()
            .filter(|attribute| store.has_changed(attribute))
            .collect();
        Ok(Self {
            name,
            enabled,
            unpatchable,
        })
    }

    /// Whether there is nothing to send.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.enabled.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::schema;
    use declarative::ResourceData;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn data(declared: Value, state: Value) -> ResourceData {
        ResourceData::new(Arc::new(schema()))
            .with_declared(declared.as_object().cloned().unwrap_or_default())
            .with_state(state.as_object().cloned().unwrap_or_default())
            .with_identifier("o-1")
    }

    #[test]
    fn test_only_enabled_changed() {
        let data = data(
            json!({"name": "prod-aws", "enabled": true, "provider": "aws"}),
            json!({"name": "prod-aws", "enabled": false, "provider": "aws"}),
        );
        let changes = ChangeSet::from_store(&data).unwrap();
        assert_eq!(serde_json::to_value(&changes).unwrap(), json!({"enabled": true}));
        assert!(changes.unpatchable.is_empty());
    }

    #[test]
    fn test_explicit_false_is_sent() {
        let data = data(
            json!({"name": "prod", "enabled": false, "provider": "aws"}),
            json!({"name": "prod", "enabled": true, "provider": "aws"}),
        );
        let changes = ChangeSet::from_store(&data).unwrap();
        assert_eq!(changes.enabled, Some(false));
        assert_eq!(serde_json::to_value(&changes).unwrap(), json!({"enabled": false}));
    }

    #[test]
    fn test_unchanged_is_empty() {
        let data = data(
            json!({"name": "prod", "provider": "aws"}),
            json!({"name": "prod", "enabled": true, "provider": "aws"}),
        );
        let changes = ChangeSet::from_store(&data).unwrap();
        assert!(changes.is_empty());
        assert_eq!(serde_json::to_value(&changes).unwrap(), json!({}));
    }

    #[test]
    fn test_unpatchable_changes_listed() {
        let data = data(
            json!({"name": "renamed", "provider": "aws", "aws": {"stateBucketName": "b2"}, "allowed_regions": ["eu-west-1"]}),
            json!({"name": "prod", "enabled": true, "provider": "aws", "aws": {"stateBucketName": "b1"}, "allowed_regions": []}),
        );
        let changes = ChangeSet::from_store(&data).unwrap();
        assert_eq!(changes.name.as_deref(), Some("renamed"));
        assert_eq!(changes.enabled, None);
        assert_eq!(changes.unpatchable, vec!["allowed_regions", "aws"]);
    }
}
