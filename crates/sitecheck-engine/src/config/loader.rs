use super::schema::{Credentials, SitecheckConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const ENV_CONFIG_PATH: &str = "SITECHECK_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid URL for sites.{key}: {value} ({reason})")]
    InvalidUrl {
        key: String,
        value: String,
        reason: String,
    },
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. $SITECHECK_CONFIG
    /// 2. ./sitecheck.yaml
    /// 3. ~/.sitecheck/config.yaml
    /// 4. Default configuration
    ///
    /// Credentials are always taken from the environment.
    pub async fn load_default() -> Result<SitecheckConfig, ConfigError> {
        let mut config = match Self::locate() {
            Some(path) => Self::read(&path).await?,
            None => {
                debug!("No config file found, using defaults");
                SitecheckConfig::default()
            }
        };
        config.credentials = Credentials::from_env();
        Ok(config)
    }

    pub async fn load_from(path: &Path) -> Result<SitecheckConfig, ConfigError> {
        let mut config = Self::read(path).await?;
        config.credentials = Credentials::from_env();
        Ok(config)
    }

    fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
            return Some(PathBuf::from(path));
        }

        let local_config = PathBuf::from("./sitecheck.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::home_dir()
            .map(|home| home.join(".sitecheck").join("config.yaml"))
            .filter(|path| path.exists())
    }

    async fn read(path: &Path) -> Result<SitecheckConfig, ConfigError> {
        info!("Loading config from {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        // An empty document is valid and means "all defaults".
        let config: SitecheckConfig = if content.trim().is_empty() {
            SitecheckConfig::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &SitecheckConfig) -> Result<(), ConfigError> {
        for (key, value) in config.sites.entries() {
            url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
                key: key.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}
