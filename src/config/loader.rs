use std::path::Path;

use anyhow::Context;

use super::types::Config;

/// Load driver config from a YAML file. A missing file yields the defaults.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("invalid driver config in {}", path.display()))?;
    Ok(config)
}
