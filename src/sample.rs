//! Starbase samples as delivered by an external importer
//!
//! A listing describes a structure (what `/corp/StarbaseList` reports);
//! a detail carries one fuel/state sample for it.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{
    CelestialId, ItemId, ItemTypeId, OwnerId, ResourceLevels, StructureState, SystemId, Timestamp,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarbaseListing {
    pub item_id: ItemId,
    pub type_id: ItemTypeId,
    pub location_id: SystemId,
    pub moon_id: CelestialId,
    pub state: StructureState,
    #[serde(default)]
    pub state_timestamp: Option<Timestamp>,
    #[serde(default)]
    pub online_timestamp: Option<Timestamp>,
    pub standing_owner_id: OwnerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelLevel {
    pub type_id: ItemTypeId,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarbaseDetail {
    pub item_id: ItemId,
    /// Raw state code, validated when applied
    pub state: u8,
    #[serde(default)]
    pub state_timestamp: Option<Timestamp>,
    /// Server time the sample is current to
    pub sampled_at: Timestamp,
    #[serde(default)]
    pub fuel: Vec<FuelLevel>,
}

impl StarbaseDetail {
    pub fn levels(&self) -> ResourceLevels {
        self.fuel.iter().map(|f| (f.type_id, f.quantity)).collect()
    }
}

/// A batch of listings and the details sampled for them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    #[serde(default)]
    pub listings: Vec<StarbaseListing>,
    #[serde(default)]
    pub details: Vec<StarbaseDetail>,
}

impl SampleSet {
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Details sampled for `item_id`, oldest first
    pub fn details_for(&self, item_id: ItemId) -> Vec<&StarbaseDetail> {
        let mut details: Vec<&StarbaseDetail> =
            self.details.iter().filter(|d| d.item_id == item_id).collect();
        details.sort_by_key(|d| d.sampled_at);
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &str = r#"
[[listings]]
item_id = 1000001
type_id = 12235
location_id = 30004608
moon_id = 40291202
state = 4
state_timestamp = 1325376000
online_timestamp = 1306886400
standing_owner_id = 498125261

[[details]]
item_id = 1000001
state = 4
state_timestamp = 1325379600
sampled_at = 1325379000
fuel = [
    { type_id = 4247, quantity = 2000 },
    { type_id = 16275, quantity = 4000 },
]

[[details]]
item_id = 1000001
state = 4
state_timestamp = 1325376000
sampled_at = 1325375000
"#;

    #[test]
    fn test_parse_samples() {
        let samples = SampleSet::parse_toml(SAMPLES).unwrap();
        assert_eq!(samples.listings.len(), 1);
        assert_eq!(samples.listings[0].state, StructureState::Online);

        let details = samples.details_for(ItemId(1000001));
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].sampled_at, 1325375000);
        assert!(details[0].fuel.is_empty());

        let levels = details[1].levels();
        assert_eq!(levels.get(&ItemTypeId(4247)), Some(&2000));
        assert_eq!(levels.get(&ItemTypeId(16275)), Some(&4000));
    }

    #[test]
    fn test_invalid_listing_state_rejected() {
        let toml = SAMPLES.replacen("state = 4", "state = 7", 1);
        assert!(SampleSet::parse_toml(&toml).is_err());
    }
}
