//! Point-in-time structure summary

use std::collections::BTreeMap;

use serde::Serialize;

use super::Structure;
use crate::core::types::{ItemId, ItemTypeId, StructureState, Timestamp};

/// Everything an operator wants to know about a structure at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureReport {
    pub item_id: ItemId,
    pub type_name: String,
    pub celestial_name: String,
    pub solar_system_name: String,
    pub region_name: String,
    pub timestamp: Timestamp,
    pub state: StructureState,
    pub state_name: &'static str,
    pub offline_timestamp: Timestamp,
    pub time_remaining: i64,
    pub sov: bool,
    pub resources: BTreeMap<ItemTypeId, i64>,
    pub silo_levels: BTreeMap<ItemTypeId, i64>,
    pub ideal_fueling_amount: BTreeMap<ItemTypeId, i64>,
    pub reinforcement_length: i64,
}

impl Structure {
    pub fn report(&self, ts: Timestamp) -> StructureReport {
        let state = self.state_at(ts);
        StructureReport {
            item_id: self.item_id,
            type_name: self.type_name.clone(),
            celestial_name: self.celestial_name.clone(),
            solar_system_name: self.solar_system_name.clone(),
            region_name: self.region_name.clone(),
            timestamp: ts,
            state,
            state_name: state.name(),
            offline_timestamp: self.offline_timestamp(),
            time_remaining: self.time_remaining(ts),
            sov: self.sov,
            resources: self.resources(ts),
            silo_levels: self.silo_levels(ts),
            ideal_fueling_amount: self.ideal_fueling_amount(ts),
            reinforcement_length: self.reinforcement_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::fixtures;
    use crate::core::types::{ItemTypeId, StructureState};
    use crate::structure::reconcile::ResourceUpdate;
    use crate::structure::test_support::*;

    #[test]
    fn test_report_summarizes_structure() {
        let mut tower = lowsec_tower(StructureState::Online, Some(0));
        let values = [
            (ItemTypeId(fixtures::FUEL_BLOCK), 4000),
            (ItemTypeId(fixtures::STRONTIUM), 9600),
        ]
        .into_iter()
        .collect();
        tower.update_resources(ResourceUpdate::new(values, 0));

        let report = tower.report(3600);
        assert_eq!(report.state, StructureState::Online);
        assert_eq!(report.state_name, "online");
        assert_eq!(report.offline_timestamp, 360_000);
        assert_eq!(report.time_remaining, 356_400);
        assert_eq!(report.resources[&ItemTypeId(fixtures::FUEL_BLOCK)], 3960);
        assert_eq!(report.ideal_fueling_amount[&ItemTypeId(fixtures::FUEL_BLOCK)], 24040);
        assert_eq!(report.reinforcement_length, 86_400);
        assert_eq!(report.solar_system_name, "Hedion");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["state"], 4);
        assert_eq!(json["resources"]["4247"], 3960);
    }
}
