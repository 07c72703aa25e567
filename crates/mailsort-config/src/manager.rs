use crate::{AppConfig, ConfigError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const ORG: &str = "io";
const AUTHOR: &str = "Mailsort";
const APP: &str = "Mailsort";

/// Overrides `backend.api_base_url` when set.
pub const API_URL_ENV: &str = "MAILSORT_API_URL";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    data_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from(ORG, AUTHOR, APP).ok_or(ConfigError::MissingDirectories)?;
        Self::in_dirs(dirs.config_dir(), dirs.data_dir())
    }

    /// Uses explicit directories, creating them and a default config file as needed.
    pub fn in_dirs(config_dir: &Path, data_dir: &Path) -> Result<Self, ConfigError> {
        fs::create_dir_all(config_dir)?;
        fs::create_dir_all(data_dir)?;

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            let initial = AppConfig::default();
            let content = toml::to_string_pretty(&initial)?;
            fs::write(&config_path, content)?;
            tracing::info!(path = %config_path.display(), "wrote default config");
        }

        Ok(Self {
            config_path,
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let content = fs::read_to_string(&self.config_path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        apply_env_overrides(&mut config, std::env::var(API_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content)?;
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn apply_env_overrides(config: &mut AppConfig, api_url: Option<String>) {
    if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
        tracing::debug!(%url, "api base url taken from environment");
        config.backend.api_base_url = url;
    }
}
