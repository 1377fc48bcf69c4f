//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! where the auth service lives, which routes the session lifecycle
//! navigates to, and the last used username.
//!
//! Configuration is stored at `~/.config/sessionward/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "sessionward";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_LOGIN_ENDPOINT: &str = "aooms/rbac/loginService/login";
const DEFAULT_LOGOUT_ENDPOINT: &str = "aooms/rbac/loginService/logout";
const DEFAULT_TOKEN_HEADER: &str = "AoomsToken";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const DEFAULT_HOME_PATH: &str = "/index";
const DEFAULT_LOGIN_PATH: &str = "/login";

/// Where a successful login navigates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectPolicy {
    /// Always go to the home path; the stored redirect marker is discarded.
    #[default]
    Home,
    /// Go to the stored redirect marker when one exists, else home.
    Stored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: Option<String>,
    pub login_endpoint: String,
    pub logout_endpoint: String,
    pub token_header: String,
    pub request_timeout_secs: u64,
    pub home_path: String,
    pub login_path: String,
    pub redirect_policy: RedirectPolicy,
    /// Show a notification for network failures during login (logged either way)
    pub notify_transport_errors: bool,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            login_endpoint: DEFAULT_LOGIN_ENDPOINT.to_string(),
            logout_endpoint: DEFAULT_LOGOUT_ENDPOINT.to_string(),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            home_path: DEFAULT_HOME_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            redirect_policy: RedirectPolicy::default(),
            notify_transport_errors: false,
            last_username: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding persisted settings
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.home_path, "/index");
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.redirect_policy, RedirectPolicy::Home);
        assert!(!config.notify_transport_errors);
        assert_eq!(config.token_header, "AoomsToken");
    }

    #[test]
    fn test_data_dir_is_per_application() {
        if let Ok(dir) = Config::data_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "base_url": "http://svc.local", "redirect_policy": "stored" }"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://svc.local"));
        assert_eq!(config.redirect_policy, RedirectPolicy::Stored);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            last_username: Some("alice".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.last_username.as_deref(), Some("alice"));
    }
}
