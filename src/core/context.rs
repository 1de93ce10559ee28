//! Capabilities injected into every structure
//!
//! A structure receives its reference data and its change observer
//! through one shared context instead of looking them up globally.

use std::sync::Arc;

use crate::catalog::{
    AllianceMembership, CelestialCatalog, ItemCatalog, ResourceCatalog, SolarSystemCatalog,
    SovereigntyLookup, StaticCatalog, StructureCatalog,
};
use crate::core::config::TrackerConfig;
use crate::structure::monitor::{NoopObserver, StructureObserver};

#[derive(Clone)]
pub struct TrackerContext {
    pub config: TrackerConfig,
    pub resources: Arc<dyn ResourceCatalog>,
    pub structures: Arc<dyn StructureCatalog>,
    pub items: Arc<dyn ItemCatalog>,
    pub celestials: Arc<dyn CelestialCatalog>,
    pub solar_systems: Arc<dyn SolarSystemCatalog>,
    pub sovereignty: Arc<dyn SovereigntyLookup>,
    pub membership: Arc<dyn AllianceMembership>,
    pub observer: Arc<dyn StructureObserver>,
}

impl TrackerContext {
    /// Context backed entirely by one static catalog
    pub fn from_catalog(
        config: TrackerConfig,
        catalog: Arc<StaticCatalog>,
        observer: Arc<dyn StructureObserver>,
    ) -> Self {
        Self {
            config,
            resources: catalog.clone(),
            structures: catalog.clone(),
            items: catalog.clone(),
            celestials: catalog.clone(),
            solar_systems: catalog.clone(),
            sovereignty: catalog.clone(),
            membership: catalog,
            observer,
        }
    }

    /// Same context with a different observer
    pub fn with_observer(mut self, observer: Arc<dyn StructureObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Static catalog with default config and no observer
    pub fn standalone(catalog: Arc<StaticCatalog>) -> Self {
        Self::from_catalog(TrackerConfig::default(), catalog, Arc::new(NoopObserver))
    }
}

impl std::fmt::Debug for TrackerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
