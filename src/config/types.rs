use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::docker::Connection;

pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";
pub const DEFAULT_PID_ONE_COMMAND: &str =
    r#"sh -c "trap exit 0 SIGTERM; while :; do sleep 1; done""#;

/// TLS settings for a TCP engine endpoint. Scoped to one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    pub verify: bool,
    /// Directory holding `ca.pem`, `cert.pem` and `key.pem`.
    pub cert_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pid_one_command: String,
    pub privileged: bool,
    pub image_prefix: Option<String>,
    pub chef_version: String,
    pub data_image: String,
    pub docker_host_url: String,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub api_retries: u32,
    pub image: String,
    pub intermediate_instructions: Vec<String>,
    pub tls: TlsConfig,
    /// Surface non-conflict errors from the chef container ensure step
    /// instead of logging them.
    pub strict_chef_container: bool,
    /// Also remove `<instance>-data` on destroy.
    pub remove_data_container: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pid_one_command: DEFAULT_PID_ONE_COMMAND.to_string(),
            privileged: false,
            image_prefix: None,
            chef_version: "12.5.1".to_string(),
            data_image: "someara/kitchen-cache:latest".to_string(),
            docker_host_url: default_docker_host(),
            read_timeout: 3600,
            write_timeout: 3600,
            api_retries: 20,
            image: String::new(),
            intermediate_instructions: Vec::new(),
            tls: TlsConfig::default(),
            strict_chef_container: false,
            remove_data_container: false,
        }
    }
}

impl Config {
    /// Check the options that have no usable default.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.image.trim().is_empty() {
            anyhow::bail!("`image` must name the platform image");
        }
        if self.chef_version.trim().is_empty() {
            anyhow::bail!("`chef_version` must not be empty");
        }
        Ok(())
    }

    /// Engine connection parameters derived from this config.
    pub fn connection(&self) -> Connection {
        Connection {
            host: self.docker_host_url.clone(),
            read_timeout: Duration::from_secs(self.read_timeout),
            write_timeout: Duration::from_secs(self.write_timeout),
            tls: self.tls.clone(),
        }
    }
}

fn default_docker_host() -> String {
    std::env::var("DOCKER_HOST")
        .ok()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_DOCKER_HOST.to_string())
}

/// Identity of the instance being provisioned, as handed over by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub name: String,
    pub platform_name: String,
}

impl Instance {
    pub fn new(name: impl Into<String>, platform_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            platform_name: platform_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.chef_version, "12.5.1");
        assert_eq!(cfg.api_retries, 20);
        assert_eq!(cfg.read_timeout, 3600);
        assert_eq!(cfg.write_timeout, 3600);
        assert!(!cfg.privileged);
        assert!(cfg.image_prefix.is_none());
        assert!(cfg.intermediate_instructions.is_empty());
        assert!(!cfg.tls.verify);
        assert!(!cfg.docker_host_url.is_empty());
    }

    #[test]
    fn validate_requires_platform_image() {
        let cfg = Config::default();
        assert!(cfg.validate().is_err());

        let cfg = Config {
            image: "ubuntu:22.04".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn connection_carries_timeouts_and_tls() {
        let cfg = Config {
            docker_host_url: "tcp://10.0.0.5:2376".into(),
            read_timeout: 30,
            write_timeout: 90,
            tls: TlsConfig {
                verify: true,
                cert_path: Some("/certs".into()),
            },
            ..Config::default()
        };
        let conn = cfg.connection();
        assert_eq!(conn.host, "tcp://10.0.0.5:2376");
        assert_eq!(conn.read_timeout, Duration::from_secs(30));
        assert_eq!(conn.write_timeout, Duration::from_secs(90));
        assert!(conn.tls.verify);
    }

    #[test]
    fn deserialize_partial_yaml_keeps_defaults() {
        let yaml = "image: centos:7\nprivileged: true\nintermediate_instructions:\n  - RUN yum -y install which\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.image, "centos:7");
        assert!(cfg.privileged);
        assert_eq!(cfg.intermediate_instructions, vec!["RUN yum -y install which"]);
        assert_eq!(cfg.chef_version, "12.5.1");
        assert_eq!(cfg.pid_one_command, DEFAULT_PID_ONE_COMMAND);
    }
}
