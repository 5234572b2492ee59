use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_SITE: &str = "datadoghq.com";

/// Connection settings for the Datadog API, read from the `[doglog]` table
/// of the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    pub api_key: String,
    pub application_key: String,
    #[serde(default = "default_site")]
    pub site: String,
}

fn default_site() -> String {
    DEFAULT_SITE.to_owned()
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    doglog: ServerConfig,
}

pub trait ConfigLoader {
    fn load(&self, path: &Path) -> Result<ServerConfig>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileConfigLoader;

impl ConfigLoader for FileConfigLoader {
    fn load(&self, path: &Path) -> Result<ServerConfig> {
        log::debug!("load config from {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        parse(&text)
    }
}

pub fn parse(text: &str) -> Result<ServerConfig> {
    let file: ConfigFile = toml::from_str(text).context("invalid config file")?;
    Ok(file.doglog)
}
