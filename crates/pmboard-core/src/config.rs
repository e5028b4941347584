//! pmboard configuration
//!
//! Stored as TOML in `<config_dir>/pmboard/config.toml`. Every field has a
//! default, so a partial (or missing) file is fine.

use crate::error::CoreError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PmboardConfig {
    /// REST backend root, e.g. `http://localhost:5000/api`
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub default_page_size: u64,
    /// Stale time for list queries
    pub list_stale_secs: u64,
    /// Stale time for dashboard aggregates
    pub dashboard_stale_secs: u64,
    /// TTL of cached select options (projects, users in dropdowns)
    pub options_ttl_secs: u64,
}

impl Default for PmboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 30,
            default_page_size: crate::list::DEFAULT_PAGE_SIZE,
            list_stale_secs: 30,
            dashboard_stale_secs: 60,
            options_ttl_secs: 300,
        }
    }
}

impl PmboardConfig {
    /// `<config_dir>/pmboard` for the current user
    pub fn default_dir() -> Result<PathBuf, CoreError> {
        dirs::config_dir()
            .map(|dir| dir.join("pmboard"))
            .ok_or(CoreError::ConfigDirNotFound)
    }

    /// Load `<dir>/config.toml`. A missing file yields defaults; an
    /// unreadable or malformed one is an error.
    pub fn load(dir: &Path) -> Result<Self, CoreError> {
        let path = dir.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(CoreError::FileRead { path, source }),
        };

        let config: Self = toml::from_str(&content).map_err(|e| CoreError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Persist to `<dir>/config.toml`
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).context("Failed to create config directory")?;
        let path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::InvalidConfig {
                message: format!("api_base_url must be an http(s) URL, got '{}'", url),
            });
        }
        if self.default_page_size == 0 {
            return Err(CoreError::InvalidConfig {
                message: "default_page_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim().trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn list_stale_time(&self) -> Duration {
        Duration::from_secs(self.list_stale_secs)
    }

    pub fn dashboard_stale_time(&self) -> Duration {
        Duration::from_secs(self.dashboard_stale_secs)
    }

    pub fn options_ttl(&self) -> Duration {
        Duration::from_secs(self.options_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = PmboardConfig::load(dir.path()).unwrap();
        assert_eq!(config, PmboardConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "api_base_url = \"https://pm.example.com/api/\"\ndefault_page_size = 25\n",
        )
        .unwrap();

        let config = PmboardConfig::load(dir.path()).unwrap();
        assert_eq!(config.api_base(), "https://pm.example.com/api");
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.list_stale_secs, 30);
    }

    #[test]
    fn test_malformed_file_is_invalid_config() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "api_base_url = [").unwrap();
        assert!(matches!(
            PmboardConfig::load(dir.path()),
            Err(CoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_non_http_url_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "api_base_url = \"ftp://x\"").unwrap();
        assert!(PmboardConfig::load(dir.path()).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let config = PmboardConfig {
            options_ttl_secs: 10,
            ..Default::default()
        };
        config.save(&dir.path().join("nested")).unwrap();
        let loaded = PmboardConfig::load(&dir.path().join("nested")).unwrap();
        assert_eq!(loaded.options_ttl_secs, 10);
    }
}
