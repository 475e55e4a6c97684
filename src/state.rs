//! Local state - what outpostctl last saw of each managed outpost
//!
//! Stored as JSON next to the manifest (`outposts.toml.state.json`).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::{ResourceData, StateStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFile {
    /// Last time any outpost was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    /// Managed outposts by name
    #[serde(default)]
    pub outposts: BTreeMap<String, OutpostState>,
}

/// One managed outpost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutpostState {
    /// Remote identifier
    pub id: String,
    /// Attribute values as last confirmed by the remote side
    #[serde(default)]
    pub attributes: Map<String, Value>,
    pub last_updated: DateTime<Utc>,
}

impl StateFile {
    /// State file belonging to a manifest
    pub fn path_for(manifest: &Path) -> PathBuf {
        let mut name = manifest
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "outposts.toml".into());
        name.push(".state.json");
        manifest.with_file_name(name)
    }

    /// Load state, or return an empty state if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using empty state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize state")?;
        fs::write(path, content + "\n")
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OutpostState> {
        self.outposts.get(name)
    }

    /// Record the outcome of a lifecycle operation
    ///
    /// An instance without an identifier is no longer managed and is
    /// dropped from state.
    pub fn record(&mut self, name: &str, data: &ResourceData) {
        let now = Utc::now();
        match data.identifier() {
            Some(id) => {
                self.outposts.insert(
                    name.to_string(),
                    OutpostState {
                        id: id.to_string(),
                        attributes: data.state().clone(),
                        last_updated: now,
                    },
                );
            }
            None => {
                if self.outposts.remove(name).is_some() {
                    log::debug!("Dropped {name} from state");
                }
            }
        }
        self.last_updated = Some(now);
    }

    /// Outposts in state that `is_declared` does not know about
    pub fn orphans<'a>(&'a self, is_declared: impl Fn(&str) -> bool + 'a) -> impl Iterator<Item = &'a str> + 'a {
        self.outposts
            .keys()
            .map(String::as_str)
            .filter(move |name| !is_declared(name))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Attribute, AttributeType, Schema};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn data(id: Option<&str>) -> ResourceData {
        let schema = Arc::new(Schema::new().with_attribute(Attribute::required("name", AttributeType::String)));
        let data = ResourceData::new(schema).with_state(json!({"name": "prod"}).as_object().cloned().unwrap());
        match id {
            Some(id) => data.with_identifier(id),
            None => data,
        }
    }

    #[test]
    fn test_path_for_manifest() {
        assert_eq!(
            StateFile::path_for(Path::new("infra/outposts.toml")),
            PathBuf::from("infra/outposts.toml.state.json")
        );
        assert_eq!(
            StateFile::path_for(Path::new("prod.toml")),
            PathBuf::from("prod.toml.state.json")
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let state = StateFile::load(&dir.path().join("none.state.json")).unwrap();
        assert!(state.outposts.is_empty());
        assert!(state.last_updated.is_none());
    }

    #[test]
    fn test_record_save_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("outposts.toml.state.json");

        let mut state = StateFile::default();
        state.record("prod", &data(Some("o-1")));
        state.save(&path).unwrap();

        let loaded = StateFile::load(&path).unwrap();
        let prod = loaded.get("prod").unwrap();
        assert_eq!(prod.id, "o-1");
        assert_eq!(prod.attributes["name"], json!("prod"));
        assert!(loaded.last_updated.is_some());
    }

    #[test]
    fn test_record_without_identifier_drops_entry() {
        let mut state = StateFile::default();
        state.record("prod", &data(Some("o-1")));
        state.record("prod", &data(None));
        assert!(state.get("prod").is_none());
    }

    #[test]
    fn test_orphans() {
        let mut state = StateFile::default();
        state.record("kept", &data(Some("o-1")));
        state.record("gone", &data(Some("o-2")));
        let orphans: Vec<&str> = state.orphans(|name| name == "kept").collect();
        assert_eq!(orphans, vec!["gone"]);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.state.json");
        fs::write(&path, "{not json").unwrap();
        let err = StateFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse state file"));
    }
}
