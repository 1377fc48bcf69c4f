use std::sync::{Arc, PoisonError, RwLock};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::{HydrateError, Hydrator, SettingsDb, SettingsDomain};

/// In-memory value for one settings domain, mirrored to a [`SettingsDb`].
pub struct SettingSlot<T> {
    domain: SettingsDomain,
    db: Arc<SettingsDb>,
    value: RwLock<T>,
}

impl<T> SettingSlot<T>
where
    T: Clone + Default + Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(domain: SettingsDomain, db: Arc<SettingsDb>) -> Self {
        Self {
            domain,
            db,
            value: RwLock::new(T::default()),
        }
    }

    pub fn get(&self) -> T {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Update memory, then persist. Memory keeps the new value even if the write fails.
    pub fn set(&self, value: T) -> Result<(), HydrateError> {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = value.clone();
        self.db
            .save(self.domain, &value)
            .map_err(|e| HydrateError::Save {
                domain: self.domain,
                message: format!("{:#}", e),
            })
    }

    /// Read the persisted value into memory and return it.
    ///
    /// Missing storage resets to the default; unreadable storage leaves memory untouched.
    pub(crate) fn reload(&self) -> Result<T, HydrateError> {
        let persisted = self
            .db
            .load::<T>(self.domain)
            .map_err(|e| HydrateError::Load {
                domain: self.domain,
                message: format!("{:#}", e),
            })?;

        let value = match persisted {
            Some(p) => p.data,
            None => {
                debug!(domain = %self.domain, "No persisted settings, using defaults");
                T::default()
            }
        };
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = value.clone();
        Ok(value)
    }
}

impl<T> Hydrator for SettingSlot<T>
where
    T: Clone + Default + Serialize + DeserializeOwned + Send + Sync,
{
    fn domain(&self) -> SettingsDomain {
        self.domain
    }

    fn load(&self) -> Result<(), HydrateError> {
        self.reload().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ThemeSetting;
    use tempfile::TempDir;

    fn slot<T>(domain: SettingsDomain) -> (TempDir, Arc<SettingsDb>, SettingSlot<T>)
    where
        T: Clone + Default + Serialize + DeserializeOwned + Send + Sync,
    {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(SettingsDb::new(dir.path().to_path_buf()).unwrap());
        let slot = SettingSlot::new(domain, db.clone());
        (dir, db, slot)
    }

    #[test]
    fn test_load_without_storage_gives_default() {
        let (_dir, _db, slot) = slot::<ThemeSetting>(SettingsDomain::Theme);
        slot.load().unwrap();
        assert_eq!(slot.get(), ThemeSetting::default());
    }

    #[test]
    fn test_load_picks_up_value_written_elsewhere() {
        let (_dir, db, slot) = slot::<bool>(SettingsDomain::SidebarCollapse);
        assert!(!slot.get());

        db.save(SettingsDomain::SidebarCollapse, &true).unwrap();
        slot.load().unwrap();
        assert!(slot.get());
    }

    #[test]
    fn test_set_persists() {
        let (_dir, db, slot) = slot::<ThemeSetting>(SettingsDomain::Theme);
        slot.set(ThemeSetting::named("violet")).unwrap();

        let other = SettingSlot::<ThemeSetting>::new(SettingsDomain::Theme, db);
        other.load().unwrap();
        assert_eq!(other.get().name, "violet");
    }

    #[test]
    fn test_corrupt_storage_keeps_memory_and_reports_domain() {
        let (dir, _db, slot) = slot::<ThemeSetting>(SettingsDomain::Theme);
        slot.set(ThemeSetting::named("violet")).unwrap();
        std::fs::write(dir.path().join("theme.json"), "garbage").unwrap();

        let err = slot.load().unwrap_err();
        assert_eq!(err.domain(), SettingsDomain::Theme);
        assert_eq!(slot.get().name, "violet");
    }
}
