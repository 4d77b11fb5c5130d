mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that participate in config resolution. Mirrors the values
/// a TOML config file can override.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub guest_store_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub metadata_api_url: Option<String>,
    pub disable_enrichment: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub guest_store_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub metadata_api_url: String,
    pub disable_enrichment: bool,
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and an optional TOML file.
    /// File values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file: Option<FileConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified via --db-path or in the config file")
            })?;

        if db_path.is_dir() {
            bail!("db_path points at a directory: {:?}", db_path);
        }

        // Guest data defaults to a directory next to the database.
        let guest_store_dir = file
            .guest_store_dir
            .map(PathBuf::from)
            .or_else(|| cli.guest_store_dir.clone())
            .unwrap_or_else(|| {
                db_path
                    .parent()
                    .map(|p| p.join("guest_store"))
                    .unwrap_or_else(|| PathBuf::from("guest_store"))
            });

        let logging_level = file
            .logging_level
            .as_deref()
            .and_then(parse_logging_level)
            .unwrap_or_else(|| cli.logging_level.clone());

        Ok(AppConfig {
            db_path,
            guest_store_dir,
            port: file.port.unwrap_or(cli.port),
            logging_level,
            frontend_dir_path: file
                .frontend_dir_path
                .or_else(|| cli.frontend_dir_path.clone()),
            metadata_api_url: file
                .metadata_api_url
                .or_else(|| cli.metadata_api_url.clone())
                .unwrap_or_else(|| crate::enrichment::GOOGLE_BOOKS_API_BASE.to_string()),
            disable_enrichment: file.disable_enrichment.unwrap_or(cli.disable_enrichment),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> CliConfig {
        CliConfig {
            db_path: Some(PathBuf::from("/tmp/shelfmark/books.db")),
            port: 3001,
            ..Default::default()
        }
    }

    #[test]
    fn file_values_override_cli_values() {
        let file = FileConfig {
            port: Some(9000),
            disable_enrichment: Some(true),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli(), Some(file)).unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.disable_enrichment);
    }

    #[test]
    fn guest_store_defaults_next_to_the_database() {
        let config = AppConfig::resolve(&cli(), None).unwrap();
        assert_eq!(config.guest_store_dir, PathBuf::from("/tmp/shelfmark/guest_store"));
    }

    #[test]
    fn db_path_is_required() {
        let err = AppConfig::resolve(&CliConfig::default(), None).unwrap_err();
        assert!(err.to_string().contains("db_path"));
    }
}
