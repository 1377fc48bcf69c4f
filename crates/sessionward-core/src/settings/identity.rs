use std::sync::Arc;

use crate::auth::Identity;

use super::{HydrateError, Hydrator, SettingSlot, SettingsDb, SettingsDomain};

/// Capability set the session lifecycle needs from the identity domain.
pub trait IdentityHydrator: Send + Sync {
    /// Replace the in-memory identity and persist it.
    fn set(&self, identity: &Identity) -> Result<(), HydrateError>;

    /// Repopulate memory from storage and return what was loaded.
    fn load(&self) -> Result<Identity, HydrateError>;

    /// Reset to the empty identity.
    fn clear(&self) -> Result<(), HydrateError>;

    fn current(&self) -> Identity;
}

/// File-backed identity domain.
pub struct IdentityStore {
    slot: SettingSlot<Identity>,
}

impl IdentityStore {
    pub fn new(db: Arc<SettingsDb>) -> Self {
        Self {
            slot: SettingSlot::new(SettingsDomain::Identity, db),
        }
    }
}

impl IdentityHydrator for IdentityStore {
    fn set(&self, identity: &Identity) -> Result<(), HydrateError> {
        self.slot.set(identity.clone())
    }

    fn load(&self) -> Result<Identity, HydrateError> {
        self.slot.reload()
    }

    fn clear(&self) -> Result<(), HydrateError> {
        self.slot.set(Identity::default())
    }

    fn current(&self) -> Identity {
        self.slot.get()
    }
}

impl Hydrator for IdentityStore {
    fn domain(&self) -> SettingsDomain {
        SettingsDomain::Identity
    }

    fn load(&self) -> Result<(), HydrateError> {
        self.slot.reload().map(|_| ())
    }
}
