//! Settings hydration.
//!
//! Each settings domain (identity, theme, transition effect, open pages,
//! sidebar collapse, size) owns a slice of in-memory state that can be
//! repopulated from durable storage with `load()`. After a successful login
//! the session lifecycle runs every non-identity domain through a
//! [`HydrationCascade`], which isolates failures per domain.

pub mod cascade;
pub mod db;
pub mod identity;
pub mod slot;
pub mod values;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

pub use cascade::{CascadeReport, HydrationCascade};
pub use db::{Persisted, SettingsDb};
pub use identity::{IdentityHydrator, IdentityStore};
pub use slot::SettingSlot;
pub use values::{ComponentSize, OpenedPage, OpenedPages, ThemeSetting, TransitionSetting};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsDomain {
    Identity,
    Theme,
    Transition,
    OpenedPages,
    SidebarCollapse,
    Size,
}

impl SettingsDomain {
    /// Domains hydrated by the post-login cascade, in order.
    pub const CASCADE: [SettingsDomain; 5] = [
        SettingsDomain::Theme,
        SettingsDomain::Transition,
        SettingsDomain::OpenedPages,
        SettingsDomain::SidebarCollapse,
        SettingsDomain::Size,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsDomain::Identity => "identity",
            SettingsDomain::Theme => "theme",
            SettingsDomain::Transition => "transition",
            SettingsDomain::OpenedPages => "opened_pages",
            SettingsDomain::SidebarCollapse => "sidebar_collapse",
            SettingsDomain::Size => "size",
        }
    }
}

impl fmt::Display for SettingsDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum HydrateError {
    #[error("Failed to load {domain} settings: {message}")]
    Load {
        domain: SettingsDomain,
        message: String,
    },

    #[error("Failed to save {domain} settings: {message}")]
    Save {
        domain: SettingsDomain,
        message: String,
    },
}

impl HydrateError {
    pub fn domain(&self) -> SettingsDomain {
        match self {
            HydrateError::Load { domain, .. } | HydrateError::Save { domain, .. } => *domain,
        }
    }
}

/// A settings domain that can repopulate its in-memory state from storage.
pub trait Hydrator: Send + Sync {
    fn domain(&self) -> SettingsDomain;
    fn load(&self) -> Result<(), HydrateError>;
}

/// Every file-backed settings domain, sharing one [`SettingsDb`].
#[derive(Clone)]
pub struct SettingsBundle {
    pub identity: Arc<IdentityStore>,
    pub theme: Arc<SettingSlot<ThemeSetting>>,
    pub transition: Arc<SettingSlot<TransitionSetting>>,
    pub opened_pages: Arc<SettingSlot<OpenedPages>>,
    pub sidebar_collapsed: Arc<SettingSlot<bool>>,
    pub size: Arc<SettingSlot<ComponentSize>>,
}

impl SettingsBundle {
    pub fn new(db: Arc<SettingsDb>) -> Self {
        Self {
            identity: Arc::new(IdentityStore::new(db.clone())),
            theme: Arc::new(SettingSlot::new(SettingsDomain::Theme, db.clone())),
            transition: Arc::new(SettingSlot::new(SettingsDomain::Transition, db.clone())),
            opened_pages: Arc::new(SettingSlot::new(SettingsDomain::OpenedPages, db.clone())),
            sidebar_collapsed: Arc::new(SettingSlot::new(SettingsDomain::SidebarCollapse, db.clone())),
            size: Arc::new(SettingSlot::new(SettingsDomain::Size, db)),
        }
    }

    /// The post-login cascade over the non-identity domains
    pub fn cascade(&self) -> HydrationCascade {
        HydrationCascade::new()
            .with(self.theme.clone())
            .with(self.transition.clone())
            .with(self.opened_pages.clone())
            .with(self.sidebar_collapsed.clone())
            .with(self.size.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cascade_domains_exclude_identity() {
        assert!(!SettingsDomain::CASCADE.contains(&SettingsDomain::Identity));
        assert_eq!(SettingsDomain::CASCADE.len(), 5);
    }

    #[test]
    fn test_bundle_cascade_follows_domain_order() {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(SettingsDb::new(dir.path().to_path_buf()).unwrap());
        let bundle = SettingsBundle::new(db);
        assert_eq!(bundle.cascade().domains(), SettingsDomain::CASCADE.to_vec());
    }
}
