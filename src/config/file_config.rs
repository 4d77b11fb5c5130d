//! Optional TOML configuration file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// All fields are optional; anything present overrides the corresponding
/// CLI value during resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub guest_store_dir: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub metadata_api_url: Option<String>,
    pub disable_enrichment: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {:?}", path))?;
        let config: FileConfig = toml::from_str(&raw)
            .with_context(|| format!("Could not parse config file {:?}", path))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_partial_file() {
        let config: FileConfig = toml::from_str(
            r#"
            port = 8080
            disable_enrichment = true
            "#,
        )
        .unwrap();
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.disable_enrichment, Some(true));
        assert!(config.db_path.is_none());
    }
}
