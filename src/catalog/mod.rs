//! Reference data - static game data and live ownership lookups
//!
//! The structure only ever talks to these traits. [`StaticCatalog`]
//! implements all of them from a TOML file, which is what the report
//! binary and the tests use.

pub mod static_catalog;

pub use static_catalog::{CatalogLoadError, StaticCatalog};

use serde::{Deserialize, Serialize};

use crate::core::types::{AllianceId, CelestialId, FactionId, FuelPurpose, ItemTypeId, OwnerId, SystemId};

/// One fuel a structure type burns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    pub resource_type_id: ItemTypeId,
    /// Base units drawn per cycle
    pub quantity: i64,
    pub purpose: FuelPurpose,
    /// Volume of a single unit (m3)
    pub volume: f64,
    pub type_name: String,
    /// Faction whose space requires this fuel (starbase charters)
    #[serde(default)]
    pub faction_id: Option<FactionId>,
    #[serde(default)]
    pub min_security_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureTypeInfo {
    pub type_name: String,
    /// Fuel bay capacity (m3)
    pub capacity: f64,
    /// Strontium bay capacity (m3)
    pub reserve_capacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTypeInfo {
    pub type_name: String,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarSystemInfo {
    pub name: String,
    pub region_name: String,
    pub security: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SovereigntyInfo {
    pub alliance_id: Option<AllianceId>,
    pub faction_id: Option<FactionId>,
}

pub trait ResourceCatalog: Send + Sync {
    fn requirements_for(&self, structure_type: ItemTypeId) -> Vec<ResourceRequirement>;
}

pub trait StructureCatalog: Send + Sync {
    fn structure_type(&self, type_id: ItemTypeId) -> Option<StructureTypeInfo>;
}

pub trait ItemCatalog: Send + Sync {
    fn item_type(&self, type_id: ItemTypeId) -> Option<ItemTypeInfo>;
}

pub trait CelestialCatalog: Send + Sync {
    fn celestial_name(&self, celestial_id: CelestialId) -> Option<String>;
}

pub trait SolarSystemCatalog: Send + Sync {
    fn solar_system(&self, system_id: SystemId) -> Option<SolarSystemInfo>;
}

pub trait SovereigntyLookup: Send + Sync {
    fn sovereignty_at(&self, system_id: SystemId) -> Option<SovereigntyInfo>;
}

pub trait AllianceMembership: Send + Sync {
    /// Alliance a corporation belongs to
    fn alliance_of(&self, owner: OwnerId) -> Option<AllianceId>;

    /// Whether the owner is itself an alliance
    fn is_alliance(&self, owner: OwnerId) -> bool;
}
