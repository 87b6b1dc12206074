use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::EngineError;
use crate::config::TlsConfig;

/// Engine connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub host: String,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub tls: TlsConfig,
}

/// Host port for a published container port. An empty `host_port` lets the
/// engine pick one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    #[serde(rename = "HostPort")]
    pub host_port: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    pub privileged: bool,
    pub volumes_from: Vec<String>,
    pub port_bindings: BTreeMap<String, Vec<PortBinding>>,
    pub publish_all_ports: bool,
}

/// Parameters for creating one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub cmd: Vec<String>,
    pub image: String,
    pub host_config: HostConfig,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>, cmd: Vec<String>) -> Self {
        Self {
            name: name.into(),
            cmd,
            image: image.into(),
            host_config: HostConfig::default(),
        }
    }
}

/// A container as reported by the engine. `raw` is the full inspect document.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: String,
    pub raw: Value,
}

impl Container {
    /// Build from a single inspect object (`docker inspect` prints an array
    /// of these).
    pub fn from_inspect(raw: Value) -> Result<Self, EngineError> {
        let raw = match raw {
            Value::Array(mut items) if items.len() == 1 => items.remove(0),
            Value::Array(items) => {
                return Err(EngineError::UnexpectedResponse(format!(
                    "expected one container, got {}",
                    items.len()
                )));
            }
            other => other,
        };
        let id = raw
            .get("Id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| EngineError::UnexpectedResponse("container has no Id".into()))?
            .to_string();
        Ok(Self { id, raw })
    }
}
