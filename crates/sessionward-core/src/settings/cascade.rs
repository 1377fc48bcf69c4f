use std::sync::Arc;

use tracing::{debug, warn};

use super::{HydrateError, Hydrator, SettingsDomain};

/// Outcome of one cascade run.
#[derive(Debug, Default)]
pub struct CascadeReport {
    pub loaded: Vec<SettingsDomain>,
    pub failed: Vec<HydrateError>,
}

impl CascadeReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ordered set of hydrators run after login.
///
/// Each hydrator runs regardless of earlier failures.
#[derive(Clone, Default)]
pub struct HydrationCascade {
    hydrators: Vec<Arc<dyn Hydrator>>,
}

impl HydrationCascade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hydrator: Arc<dyn Hydrator>) -> Self {
        self.hydrators.push(hydrator);
        self
    }

    pub fn domains(&self) -> Vec<SettingsDomain> {
        self.hydrators.iter().map(|h| h.domain()).collect()
    }

    pub fn run(&self) -> CascadeReport {
        let mut report = CascadeReport::default();
        for hydrator in &self.hydrators {
            let domain = hydrator.domain();
            match hydrator.load() {
                Ok(()) => {
                    debug!(%domain, "Settings hydrated");
                    report.loaded.push(domain);
                }
                Err(e) => {
                    warn!(%domain, error = %e, "Settings hydration failed");
                    report.failed.push(e);
                }
            }
        }
        report
    }
}
