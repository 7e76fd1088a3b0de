use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Optional TOML overrides, every key may be omitted.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub song_data: Option<String>,
    pub log_data: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
