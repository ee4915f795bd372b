//! Application configuration loading from config.toml
//!
//! Every setting has a default, so a missing file is not an error. A file that
//! exists but cannot be parsed is.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Storage key used by the original web client, kept so exported records match.
pub const DEFAULT_STORAGE_KEY: &str = "igrow_app_data_v1";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Where and how the journal is stored
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[storage]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Database URL; `DATABASE_URL` overrides it
    pub database_url: Option<String>,
    /// Key the journal record is stored under
    pub key: String,
    /// Whether an empty database starts with the example dataset
    pub seed_on_first_run: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            key: DEFAULT_STORAGE_KEY.to_string(),
            seed_on_first_run: true,
        }
    }
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid, a field has the wrong type,
/// an unknown field is present, or the storage key is blank.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if config.storage.key.trim().is_empty() {
        return Err(Error::Config {
            message: "storage.key cannot be empty".to_string(),
        });
    }

    Ok(config)
}

/// Loads configuration from a TOML file, falling back to defaults when the
/// file does not exist.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No config file at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [storage]
            database_url = "sqlite://journal.sqlite?mode=rwc"
            key = "my_journal"
            seed_on_first_run = false
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(
            config.storage.database_url.as_deref(),
            Some("sqlite://journal.sqlite?mode=rwc")
        );
        assert_eq!(config.storage.key, "my_journal");
        assert!(!config.storage.seed_on_first_run);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_config("[storage]\nseed_on_first_run = false\n").unwrap();
        assert_eq!(config.storage.key, DEFAULT_STORAGE_KEY);
        assert!(config.storage.database_url.is_none());

        assert_eq!(parse_config("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            parse_config("[storage]\nkey = 42\n"),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            parse_config("[storage]\nkey = \"  \"\n"),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            parse_config("[storage]\nkeyy = \"typo\"\n"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\nkey = \"from_file\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.storage.key, "from_file");
        assert!(config.storage.seed_on_first_run);
    }
}
