use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::SettingsDomain;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persisted<T> {
    pub data: T,
    pub saved_at: DateTime<Utc>,
}

impl<T> Persisted<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            saved_at: Utc::now(),
        }
    }
}

/// JSON-file storage for settings, one file per domain.
pub struct SettingsDb {
    dir: PathBuf,
}

impl SettingsDb {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create settings directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path(&self, domain: SettingsDomain) -> PathBuf {
        self.dir.join(format!("{}.json", domain.as_str()))
    }

    pub fn load<T: DeserializeOwned>(&self, domain: SettingsDomain) -> Result<Option<Persisted<T>>> {
        let path = self.path(domain);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {}", domain))?;

        let persisted: Persisted<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", domain))?;

        debug!(%domain, saved_at = %persisted.saved_at, "Settings read");
        Ok(Some(persisted))
    }

    pub fn save<T: Serialize>(&self, domain: SettingsDomain, data: &T) -> Result<()> {
        let persisted = Persisted::new(data);
        let contents = serde_json::to_string_pretty(&persisted)?;
        std::fs::write(self.path(domain), contents)
            .with_context(|| format!("Failed to write settings file: {}", domain))?;
        Ok(())
    }
}
