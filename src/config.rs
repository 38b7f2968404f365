use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::ValidatorError;
use crate::schema::DEFAULT_SCHEMA_URL;
use crate::taxonomy::DEFAULT_TAXONOMY_URL;

pub const DEFAULT_CONFIG_FILE: &str = "submission-validator.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub taxonomy_url: Option<String>,
    #[serde(default)]
    pub schema_url: Option<String>,
    #[serde(default)]
    pub checksums_url: Option<String>,
    #[serde(default)]
    pub checksums_root: Option<Utf8PathBuf>,
    #[serde(default)]
    pub schema_dir: Option<Utf8PathBuf>,
}

/// Where the checksum manifest for an upload area lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumLocation {
    Http(String),
    Directory(Utf8PathBuf),
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub taxonomy_url: String,
    pub schema_url: String,
    pub checksums: Option<ChecksumLocation>,
    pub schema_dir: Option<Utf8PathBuf>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path`, or `submission-validator.json` when no path is given.
    /// Only an explicitly named file has to exist.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ValidatorError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ValidatorError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| ValidatorError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, ValidatorError> {
        let checksums = match (config.checksums_url, config.checksums_root) {
            (Some(_), Some(_)) => {
                return Err(ValidatorError::ConfigParse(
                    "checksums_url and checksums_root are mutually exclusive".to_string(),
                ));
            }
            (Some(url), None) => Some(ChecksumLocation::Http(url)),
            (None, Some(root)) => Some(ChecksumLocation::Directory(root)),
            (None, None) => None,
        };

        Ok(ResolvedConfig {
            taxonomy_url: config
                .taxonomy_url
                .unwrap_or_else(|| DEFAULT_TAXONOMY_URL.to_string()),
            schema_url: config
                .schema_url
                .unwrap_or_else(|| DEFAULT_SCHEMA_URL.to_string()),
            checksums,
            schema_dir: config.schema_dir,
        })
    }
}
