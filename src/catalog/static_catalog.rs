//! Static catalog - reference data loaded from TOML
//!
//! Holds structure types, their fuel requirements, item types, map data,
//! sovereignty and alliance membership in flat tables.

use ahash::AHashMap;
use serde::Deserialize;

use super::{
    AllianceMembership, CelestialCatalog, ItemCatalog, ItemTypeInfo, ResourceCatalog,
    ResourceRequirement, SolarSystemCatalog, SolarSystemInfo, SovereigntyInfo, SovereigntyLookup,
    StructureCatalog, StructureTypeInfo,
};
use crate::core::types::{AllianceId, CelestialId, FactionId, ItemTypeId, OwnerId, SystemId};

/// In-memory implementation of every reference data trait
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    structures: AHashMap<ItemTypeId, StructureTypeInfo>,
    requirements: AHashMap<ItemTypeId, Vec<ResourceRequirement>>,
    items: AHashMap<ItemTypeId, ItemTypeInfo>,
    celestials: AHashMap<CelestialId, String>,
    solar_systems: AHashMap<SystemId, SolarSystemInfo>,
    sovereignty: AHashMap<SystemId, SovereigntyInfo>,
    /// corporation -> alliance
    corporations: AHashMap<OwnerId, AllianceId>,
    alliances: AHashMap<AllianceId, Vec<OwnerId>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_structure_type(&mut self, type_id: ItemTypeId, info: StructureTypeInfo) {
        self.structures.insert(type_id, info);
    }

    pub fn add_requirement(&mut self, structure_type: ItemTypeId, requirement: ResourceRequirement) {
        self.requirements
            .entry(structure_type)
            .or_default()
            .push(requirement);
    }

    pub fn add_item_type(&mut self, type_id: ItemTypeId, info: ItemTypeInfo) {
        self.items.insert(type_id, info);
    }

    pub fn add_celestial(&mut self, id: CelestialId, name: impl Into<String>) {
        self.celestials.insert(id, name.into());
    }

    pub fn add_solar_system(&mut self, id: SystemId, info: SolarSystemInfo) {
        self.solar_systems.insert(id, info);
    }

    pub fn set_sovereignty(&mut self, system: SystemId, info: Option<SovereigntyInfo>) {
        match info {
            Some(info) => {
                self.sovereignty.insert(system, info);
            }
            None => {
                self.sovereignty.remove(&system);
            }
        }
    }

    /// Register an alliance and its member corporations
    pub fn add_alliance(&mut self, alliance: AllianceId, member_corps: Vec<OwnerId>) {
        for corp in &member_corps {
            self.corporations.insert(*corp, alliance);
        }
        self.alliances.insert(alliance, member_corps);
    }

    /// Load a catalog from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, CatalogLoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogLoadError::IoError(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse a catalog from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, CatalogLoadError> {
        let data: TomlCatalog = toml::from_str(content)
            .map_err(|e| CatalogLoadError::ParseError(e.to_string()))?;

        let mut catalog = Self::new();
        for structure in data.structures {
            catalog.add_structure_type(
                structure.type_id,
                StructureTypeInfo {
                    type_name: structure.type_name,
                    capacity: structure.capacity,
                    reserve_capacity: structure.reserve_capacity,
                },
            );
        }
        for resource in data.resources {
            if !catalog.structures.contains_key(&resource.structure_type_id) {
                return Err(CatalogLoadError::UnknownStructureType(resource.structure_type_id));
            }
            if resource.requirement.quantity < 0 {
                return Err(CatalogLoadError::InvalidQuantity(resource.requirement.resource_type_id));
            }
            catalog.add_requirement(resource.structure_type_id, resource.requirement);
        }
        for item in data.items {
            catalog.add_item_type(
                item.type_id,
                ItemTypeInfo { type_name: item.type_name, volume: item.volume },
            );
        }
        for celestial in data.celestials {
            catalog.add_celestial(celestial.id, celestial.name);
        }
        for system in data.solar_systems {
            catalog.add_solar_system(
                system.id,
                SolarSystemInfo {
                    name: system.name,
                    region_name: system.region_name,
                    security: system.security,
                },
            );
        }
        for sov in data.sovereignty {
            catalog.set_sovereignty(
                sov.system_id,
                Some(SovereigntyInfo { alliance_id: sov.alliance_id, faction_id: sov.faction_id }),
            );
        }
        for alliance in data.alliances {
            catalog.add_alliance(alliance.id, alliance.member_corps);
        }
        Ok(catalog)
    }
}

impl ResourceCatalog for StaticCatalog {
    fn requirements_for(&self, structure_type: ItemTypeId) -> Vec<ResourceRequirement> {
        self.requirements
            .get(&structure_type)
            .cloned()
            .unwrap_or_default()
    }
}

impl StructureCatalog for StaticCatalog {
    fn structure_type(&self, type_id: ItemTypeId) -> Option<StructureTypeInfo> {
        self.structures.get(&type_id).cloned()
    }
}

impl ItemCatalog for StaticCatalog {
    fn item_type(&self, type_id: ItemTypeId) -> Option<ItemTypeInfo> {
        self.items.get(&type_id).cloned()
    }
}

impl CelestialCatalog for StaticCatalog {
    fn celestial_name(&self, celestial_id: CelestialId) -> Option<String> {
        self.celestials.get(&celestial_id).cloned()
    }
}

impl SolarSystemCatalog for StaticCatalog {
    fn solar_system(&self, system_id: SystemId) -> Option<SolarSystemInfo> {
        self.solar_systems.get(&system_id).cloned()
    }
}

impl SovereigntyLookup for StaticCatalog {
    fn sovereignty_at(&self, system_id: SystemId) -> Option<SovereigntyInfo> {
        self.sovereignty.get(&system_id).copied()
    }
}

impl AllianceMembership for StaticCatalog {
    fn alliance_of(&self, owner: OwnerId) -> Option<AllianceId> {
        self.corporations.get(&owner).copied()
    }

    fn is_alliance(&self, owner: OwnerId) -> bool {
        self.alliances.contains_key(&AllianceId(owner.0))
    }
}

/// Error type for catalog loading
#[derive(Debug, Clone)]
pub enum CatalogLoadError {
    IoError(String),
    ParseError(String),
    UnknownStructureType(ItemTypeId),
    InvalidQuantity(ItemTypeId),
}

impl std::fmt::Display for CatalogLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogLoadError::IoError(e) => write!(f, "IO error: {}", e),
            CatalogLoadError::ParseError(e) => write!(f, "Parse error: {}", e),
            CatalogLoadError::UnknownStructureType(id) => {
                write!(f, "Resource listed for unknown structure type: {}", id)
            }
            CatalogLoadError::InvalidQuantity(id) => {
                write!(f, "Negative quantity for resource: {}", id)
            }
        }
    }
}

impl std::error::Error for CatalogLoadError {}

/// TOML representation of a catalog file
#[derive(Debug, Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    structures: Vec<TomlStructure>,
    #[serde(default)]
    resources: Vec<TomlResource>,
    #[serde(default)]
    items: Vec<TomlItem>,
    #[serde(default)]
    celestials: Vec<TomlCelestial>,
    #[serde(default)]
    solar_systems: Vec<TomlSolarSystem>,
    #[serde(default)]
    sovereignty: Vec<TomlSovereignty>,
    #[serde(default)]
    alliances: Vec<TomlAlliance>,
}

#[derive(Debug, Deserialize)]
struct TomlStructure {
    type_id: ItemTypeId,
    type_name: String,
    capacity: f64,
    #[serde(default)]
    reserve_capacity: f64,
}

#[derive(Debug, Deserialize)]
struct TomlResource {
    structure_type_id: ItemTypeId,
    #[serde(flatten)]
    requirement: ResourceRequirement,
}

#[derive(Debug, Deserialize)]
struct TomlItem {
    type_id: ItemTypeId,
    type_name: String,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct TomlCelestial {
    id: CelestialId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlSolarSystem {
    id: SystemId,
    name: String,
    region_name: String,
    security: f64,
}

#[derive(Debug, Deserialize)]
struct TomlSovereignty {
    system_id: SystemId,
    #[serde(default)]
    alliance_id: Option<AllianceId>,
    #[serde(default)]
    faction_id: Option<FactionId>,
}

#[derive(Debug, Deserialize)]
struct TomlAlliance {
    id: AllianceId,
    #[serde(default)]
    member_corps: Vec<OwnerId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{self, CATALOG_TOML};

    #[test]
    fn test_parse_fixture() {
        let catalog = StaticCatalog::parse_toml(CATALOG_TOML).unwrap();
        let tower = catalog
            .structure_type(ItemTypeId(fixtures::AMARR_TOWER))
            .unwrap();
        assert_eq!(tower.capacity, 140000.0);
        assert_eq!(tower.reserve_capacity, 50000.0);

        let requirements = catalog.requirements_for(ItemTypeId(fixtures::AMARR_TOWER));
        assert_eq!(requirements.len(), 3);
        let charter = requirements
            .iter()
            .find(|r| r.resource_type_id == ItemTypeId(fixtures::CHARTER))
            .unwrap();
        assert_eq!(charter.faction_id, Some(FactionId(500003)));
        assert_eq!(charter.min_security_level, 0.4);
    }

    #[test]
    fn test_unknown_structure_type_has_no_requirements() {
        let catalog = StaticCatalog::parse_toml(CATALOG_TOML).unwrap();
        assert!(catalog.requirements_for(ItemTypeId(1)).is_empty());
        assert!(catalog.structure_type(ItemTypeId(1)).is_none());
    }

    #[test]
    fn test_alliance_membership() {
        let catalog = StaticCatalog::parse_toml(CATALOG_TOML).unwrap();
        assert_eq!(
            catalog.alliance_of(OwnerId(fixtures::CORP)),
            Some(AllianceId(fixtures::ALLIANCE))
        );
        assert!(catalog.is_alliance(OwnerId(fixtures::ALLIANCE)));
        assert!(!catalog.is_alliance(OwnerId(fixtures::CORP)));
        assert_eq!(catalog.alliance_of(OwnerId(fixtures::OTHER_CORP)), None);
    }

    #[test]
    fn test_resource_for_unknown_structure_rejected() {
        let toml = r#"
[[resources]]
structure_type_id = 1
resource_type_id = 4247
quantity = 40
purpose = 1
volume = 5.0
type_name = "Amarr Fuel Block"
"#;
        let err = StaticCatalog::parse_toml(toml).unwrap_err();
        assert!(matches!(err, CatalogLoadError::UnknownStructureType(ItemTypeId(1))));
    }

    #[test]
    fn test_parse_error() {
        let err = StaticCatalog::parse_toml("structures = 3").unwrap_err();
        assert!(matches!(err, CatalogLoadError::ParseError(_)));
    }
}
