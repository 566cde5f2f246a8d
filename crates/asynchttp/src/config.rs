//! Client configuration

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default cap on buffered response bodies (10 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Prefix for environment overrides, e.g. `ASYNCHTTP_MAX_BODY_SIZE`
pub const ENV_PREFIX: &str = "ASYNCHTTP";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Largest body `data()` will buffer, in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Accept streamed responses that produce no chunks at all
    #[serde(default)]
    pub allow_empty_stream: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_body_size: default_max_body_size(),
            allow_empty_stream: false,
        }
    }
}

impl ClientConfig {
    /// Create a new client config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the buffered body cap
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Accept or reject streams without chunks
    pub fn with_allow_empty_stream(mut self, allow: bool) -> Self {
        self.allow_empty_stream = allow;
        self
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> Result<()> {
        if self.max_body_size == 0 {
            return Err(Error::Config(
                "max_body_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: ClientConfig =
            toml::from_str(source).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file, then apply `ASYNCHTTP_*` environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let config: ClientConfig = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.max_body_size, 10 * 1024 * 1024);
        assert!(!config.allow_empty_stream);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::new()
            .with_max_body_size(1024)
            .with_allow_empty_stream(true);

        assert_eq!(config.max_body_size, 1024);
        assert!(config.allow_empty_stream);
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let config = ClientConfig::new().with_max_body_size(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_toml_str() {
        let config = ClientConfig::from_toml_str("max_body_size = 2048\n").unwrap();
        assert_eq!(config.max_body_size, 2048);
        assert!(!config.allow_empty_stream);

        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());

        assert!(ClientConfig::from_toml_str("max_body_size = 0").is_err());
        assert!(ClientConfig::from_toml_str("max_body_size = \"big\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("asynchttp.toml");
        std::fs::write(&path, "max_body_size = 4096\nallow_empty_stream = true\n").unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.max_body_size, 4096);
        assert!(config.allow_empty_stream);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
    }
}
