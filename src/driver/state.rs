use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Error;

/// Per-instance record the host keeps between `create` and `destroy`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chef_container: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_container: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner_container: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_platform_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_prefix: Option<String>,
}

impl State {
    /// Read a JSON state file. A missing or empty file is an empty record.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = State::load(&dir.path().join("web01.json")).unwrap();
        assert_eq!(state, State::default());
    }

    #[test]
    fn save_then_load_preserves_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web01.json");
        let state = State {
            work_image: Some("web01".into()),
            runner_container: Some(json!({ "Id": "abc" })),
            ..State::default()
        };
        state.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("chef_container"));

        assert_eq!(State::load(&path).unwrap(), state);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web01.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(State::load(&path), Err(Error::State(_))));
    }
}
