//! Silo registration and queries

use super::Structure;
use crate::buffer::silo::{SiloBuffer, SiloSpec, SiloUpdate};
use crate::core::error::{Result, TrackerError};
use crate::core::types::{ItemTypeId, ResourceLevels, Timestamp};

impl Structure {
    /// Start tracking a silo holding `type_id`
    pub fn add_silo_buffer(
        &mut self,
        type_id: ItemTypeId,
        spec: SiloSpec,
        ts: Timestamp,
    ) -> Result<()> {
        if self.silos.contains_key(&type_id) {
            return Err(TrackerError::DuplicateSilo(type_id));
        }
        let item = self
            .context
            .items
            .item_type(type_id)
            .ok_or(TrackerError::UnknownType(type_id))?;

        let silo = SiloBuffer::new(item.type_name, item.volume, spec, self.silo_pulse_timestamp(ts));
        tracing::debug!(
            "Structure {} tracking silo {} ({})",
            self.item_id,
            type_id,
            silo.type_name()
        );
        self.silos.insert(type_id, silo);
        Ok(())
    }

    /// Replace a tracked silo, keeping every field `update` leaves unset
    pub fn update_silo_buffer(
        &mut self,
        type_id: ItemTypeId,
        update: SiloUpdate,
        ts: Timestamp,
    ) -> Result<()> {
        let baseline = self.silo_pulse_timestamp(ts);
        let silo = self
            .silos
            .get(&type_id)
            .ok_or(TrackerError::UnknownSilo(type_id))?
            .updated(update, baseline);
        self.silos.insert(type_id, silo);
        Ok(())
    }

    /// Stop tracking a silo, returning its last snapshot
    pub fn del_silo_buffer(&mut self, type_id: ItemTypeId) -> Option<SiloBuffer> {
        let removed = self.silos.remove(&type_id);
        if removed.is_some() {
            tracing::debug!("Structure {} dropped silo {}", self.item_id, type_id);
        }
        removed
    }

    pub fn silo_levels(&self, ts: Timestamp) -> ResourceLevels {
        let owner = self.as_owner();
        self.silos
            .iter()
            .map(|(type_id, silo)| (*type_id, silo.get_current(ts, owner).value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use crate::core::types::StructureState;
    use crate::structure::reconcile::ResourceUpdate;
    use crate::structure::test_support::*;

    const TECHNETIUM: ItemTypeId = ItemTypeId(16649);
    const PLATINUM: ItemTypeId = ItemTypeId(16644);
    const PLATINUM_TECHNITE: ItemTypeId = ItemTypeId(16662);

    fn fueled_tower() -> Structure {
        let mut tower = lowsec_tower(StructureState::Online, Some(0));
        let values = [
            (ItemTypeId(fixtures::FUEL_BLOCK), 28000),
            (ItemTypeId(fixtures::STRONTIUM), 9600),
        ]
        .into_iter()
        .collect();
        tower.update_resources(ResourceUpdate::new(values, 0));
        tower
    }

    #[test]
    fn test_add_silo_uses_item_catalog() {
        let mut tower = fueled_tower();
        tower
            .add_silo_buffer(TECHNETIUM, SiloSpec::default().with_delta(100).with_full(75000), 0)
            .unwrap();
        let silo = &tower.silos()[&TECHNETIUM];
        assert_eq!(silo.type_name(), "Technetium");
        assert_eq!(silo.unit_volume(), 0.8);
        assert_eq!(tower.silo_levels(36000)[&TECHNETIUM], 1000);
    }

    #[test]
    fn test_add_silo_rejects_duplicate_and_unknown() {
        let mut tower = fueled_tower();
        tower.add_silo_buffer(TECHNETIUM, SiloSpec::default(), 0).unwrap();
        assert!(matches!(
            tower.add_silo_buffer(TECHNETIUM, SiloSpec::default(), 0),
            Err(TrackerError::DuplicateSilo(id)) if id == TECHNETIUM
        ));
        assert!(matches!(
            tower.add_silo_buffer(ItemTypeId(1), SiloSpec::default(), 0),
            Err(TrackerError::UnknownType(_))
        ));
    }

    #[test]
    fn test_silo_baseline_rounds_down_to_pulse() {
        let mut tower = lowsec_tower(StructureState::Online, Some(1200));
        tower.add_silo_buffer(TECHNETIUM, SiloSpec::default(), 7200 + 1000).unwrap();
        assert_eq!(tower.silos()[&TECHNETIUM].timestamp(), 3600 + 1200);
    }

    #[test]
    fn test_update_silo_honors_explicit_resets() {
        let mut tower = fueled_tower();
        tower
            .add_silo_buffer(
                TECHNETIUM,
                SiloSpec::default()
                    .with_products(vec![PLATINUM_TECHNITE])
                    .with_delta(100)
                    .with_value(1000)
                    .with_full(25000),
                0,
            )
            .unwrap();
        tower
            .update_silo_buffer(
                TECHNETIUM,
                SiloUpdate { value: Some(0), products: Some(Vec::new()), ..Default::default() },
                3600,
            )
            .unwrap();

        let silo = &tower.silos()[&TECHNETIUM];
        assert_eq!(silo.value(), 0);
        assert!(silo.products().is_empty());
        assert_eq!(silo.delta(), 100);
        assert_eq!(silo.full(), 25000);

        assert!(matches!(
            tower.update_silo_buffer(PLATINUM, SiloUpdate::default(), 0),
            Err(TrackerError::UnknownSilo(_))
        ));
    }

    #[test]
    fn test_del_silo() {
        let mut tower = fueled_tower();
        tower.add_silo_buffer(TECHNETIUM, SiloSpec::default(), 0).unwrap();
        assert!(tower.del_silo_buffer(TECHNETIUM).is_some());
        assert!(tower.del_silo_buffer(TECHNETIUM).is_none());
        assert!(tower.silo_levels(0).is_empty());
    }

    #[test]
    fn test_reaction_throttled_by_slowest_reactant() {
        let mut tower = fueled_tower();
        tower
            .add_silo_buffer(
                TECHNETIUM,
                SiloSpec::default()
                    .with_products(vec![PLATINUM_TECHNITE])
                    .with_delta(100)
                    .with_value(1000)
                    .with_full(25000),
                0,
            )
            .unwrap();
        tower
            .add_silo_buffer(
                PLATINUM,
                SiloSpec::default()
                    .with_products(vec![PLATINUM_TECHNITE])
                    .with_delta(100)
                    .with_value(300)
                    .with_full(20000),
                0,
            )
            .unwrap();
        tower
            .add_silo_buffer(
                PLATINUM_TECHNITE,
                SiloSpec::default()
                    .with_reactants(vec![PLATINUM, TECHNETIUM])
                    .with_delta(100)
                    .with_full(25000),
                0,
            )
            .unwrap();

        let levels = tower.silo_levels(36000);
        assert_eq!(levels[&PLATINUM_TECHNITE], 300);
        assert_eq!(levels[&TECHNETIUM], 700);
        assert_eq!(levels[&PLATINUM], 0);
    }
}
