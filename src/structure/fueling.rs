//! Fueling projections

use super::Structure;
use crate::buffer::FuelBuffer;
use crate::core::error::{Result, TrackerError};
use crate::core::types::{ResourceLevels, Timestamp};

impl Structure {
    /// Stock of each normal fuel that fills the bay in whole cycles
    pub fn ideal_fuel_ratio(&self) -> ResourceLevels {
        let normal: Vec<_> = self
            .fuels
            .iter()
            .filter_map(|(type_id, slot)| slot.buffer().map(|buffer| (*type_id, buffer)))
            .filter(|(_, buffer)| buffer.is_normal_fuel())
            .collect();

        let cycle_volume: f64 = normal
            .iter()
            .map(|(_, buffer)| buffer.unit_volume() * buffer.delta() as f64)
            .sum();
        if cycle_volume <= 0.0 {
            return ResourceLevels::new();
        }

        let ideal_cycles = (self.capacity / cycle_volume).floor() as i64;
        normal
            .into_iter()
            .map(|(type_id, buffer)| (type_id, buffer.delta() * ideal_cycles))
            .collect()
    }

    /// Amount of each normal fuel to add at `ts` to reach the ideal
    /// ratio. Negative amounts mean overstocked.
    pub fn ideal_fueling_amount(&self, ts: Timestamp) -> ResourceLevels {
        let current = self.resources(ts);
        self.ideal_fuel_ratio()
            .into_iter()
            .map(|(type_id, ideal)| (type_id, ideal - current.get(&type_id).copied().unwrap_or(0)))
            .collect()
    }

    /// Seconds of reinforcement the reserve bay currently buys. A reserve
    /// burning nothing per cycle buys no reinforcement.
    pub fn reinforcement_length(&self) -> i64 {
        self.fuel(self.context.config.reserve_type_id)
            .filter(|reserve| reserve.delta() > 0)
            .map_or(0, |reserve| reserve.cycles_possible().saturating_mul(reserve.period()))
    }

    fn reserve(&self) -> Result<&FuelBuffer> {
        let reserve_type = self.context.config.reserve_type_id;
        self.fuel(reserve_type)
            .ok_or(TrackerError::UntrackedResource(reserve_type))
    }

    /// Reinforcement cycles to aim for; a full reserve bay by default
    pub fn target_reserve_cycles(&self, target: Option<i64>) -> Result<i64> {
        let reserve = self.reserve()?;
        if let Some(target) = target {
            return Ok(target);
        }
        let cycle_volume = reserve.delta() as f64 * reserve.unit_volume();
        if cycle_volume <= 0.0 {
            return Ok(0);
        }
        Ok((self.reserve_capacity / cycle_volume).floor() as i64)
    }

    pub fn target_reserve_amount(&self, target: Option<i64>) -> Result<i64> {
        let reserve = self.reserve()?;
        Ok(reserve.delta() * self.target_reserve_cycles(target)?)
    }

    /// Reserve to add (or remove, when negative) to reach the target
    pub fn target_reserve_difference(&self, target: Option<i64>) -> Result<i64> {
        let reserve = self.reserve()?;
        Ok(self.target_reserve_amount(target)? - reserve.value())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{fixtures, StaticCatalog};
    use crate::core::context::TrackerContext;
    use crate::core::types::{ItemTypeId, StructureState};
    use crate::structure::reconcile::ResourceUpdate;
    use crate::structure::test_support::*;

    const BLOCK: ItemTypeId = ItemTypeId(fixtures::FUEL_BLOCK);
    const STRONT: ItemTypeId = ItemTypeId(fixtures::STRONTIUM);
    const CHARTER: ItemTypeId = ItemTypeId(fixtures::CHARTER);

    fn tower_with(system: u32, pairs: &[(ItemTypeId, i64)]) -> Structure {
        let mut tower = Structure::new(
            &listing(system, fixtures::OTHER_CORP, StructureState::Online, Some(0)),
            context(),
        );
        tower.update_resources(ResourceUpdate::new(pairs.iter().copied().collect(), 0));
        tower
    }

    #[test]
    fn test_ideal_ratio_without_charter() {
        let tower = tower_with(fixtures::LOWSEC, &[(BLOCK, 10000), (STRONT, 9600)]);
        let ratio = tower.ideal_fuel_ratio();
        assert_eq!(ratio.len(), 1);
        assert_eq!(ratio[&BLOCK], 28000);
    }

    #[test]
    fn test_ideal_ratio_with_charter() {
        let tower = tower_with(
            fixtures::HIGHSEC,
            &[(BLOCK, 10000), (STRONT, 9600), (CHARTER, 250)],
        );
        let ratio = tower.ideal_fuel_ratio();
        assert_eq!(ratio[&BLOCK], 27960);
        assert_eq!(ratio[&CHARTER], 699);
        assert!(!ratio.contains_key(&STRONT));
    }

    #[test]
    fn test_ideal_ratio_empty_without_fuel() {
        let tower = lowsec_tower(StructureState::Online, Some(0));
        assert!(tower.ideal_fuel_ratio().is_empty());
        assert!(tower.ideal_fueling_amount(0).is_empty());
    }

    #[test]
    fn test_ideal_fueling_amount() {
        let tower = tower_with(fixtures::LOWSEC, &[(BLOCK, 10000), (STRONT, 9600)]);
        assert_eq!(tower.ideal_fueling_amount(0)[&BLOCK], 18000);
        assert_eq!(tower.ideal_fueling_amount(36000)[&BLOCK], 18400);

        let stocked = tower_with(fixtures::LOWSEC, &[(BLOCK, 30000), (STRONT, 9600)]);
        assert_eq!(stocked.ideal_fueling_amount(0)[&BLOCK], -2000);
    }

    #[test]
    fn test_reinforcement_length() {
        let tower = tower_with(fixtures::LOWSEC, &[(BLOCK, 10000), (STRONT, 9600)]);
        assert_eq!(tower.reinforcement_length(), 24 * 3600);

        let untracked = lowsec_tower(StructureState::Online, Some(0));
        assert_eq!(untracked.reinforcement_length(), 0);
    }

    #[test]
    fn test_reinforcement_length_without_reserve_rate() {
        let catalog = fixtures::CATALOG_TOML.replace("quantity = 400", "quantity = 0");
        let context = Arc::new(TrackerContext::standalone(Arc::new(
            StaticCatalog::parse_toml(&catalog).unwrap(),
        )));
        let mut tower = Structure::new(
            &listing(fixtures::LOWSEC, fixtures::OTHER_CORP, StructureState::Online, Some(0)),
            context,
        );
        tower.update_resources(ResourceUpdate::new(
            [(BLOCK, 10000), (STRONT, 9600)].into_iter().collect(),
            0,
        ));
        assert_eq!(tower.fuel(STRONT).unwrap().delta(), 0);
        assert_eq!(tower.reinforcement_length(), 0);
        assert_eq!(tower.report(0).reinforcement_length, 0);
    }

    #[test]
    fn test_target_reserve() {
        let tower = tower_with(fixtures::LOWSEC, &[(BLOCK, 10000), (STRONT, 9600)]);
        // 50000 m3 of 3 m3 units at 400 per cycle
        assert_eq!(tower.target_reserve_cycles(None).unwrap(), 41);
        assert_eq!(tower.target_reserve_amount(None).unwrap(), 16400);
        assert_eq!(tower.target_reserve_difference(None).unwrap(), 6800);

        assert_eq!(tower.target_reserve_cycles(Some(12)).unwrap(), 12);
        assert_eq!(tower.target_reserve_difference(Some(12)).unwrap(), -4800);
    }

    #[test]
    fn test_target_reserve_untracked() {
        let tower = lowsec_tower(StructureState::Online, Some(0));
        assert!(matches!(
            tower.target_reserve_amount(None),
            Err(TrackerError::UntrackedResource(id)) if id == STRONT
        ));
    }
}
