//! Sample reconciliation
//!
//! Sampled fuel levels are compared against the extrapolated buffers and
//! only the disagreeing buffers are rebuilt, so stable data never picks
//! up phase error.

use std::sync::Arc;

use ahash::AHashMap;

use super::{FuelSlot, Structure, TrackedField};
use crate::buffer::FuelBuffer;
use crate::catalog::ResourceRequirement;
use crate::core::error::Result;
use crate::core::types::{
    BufferGroup, ItemTypeId, OwnerId, ResourceLevels, Timestamp, CYCLE_PERIOD, NO_HORIZON,
};

/// A batch of sampled fuel levels to reconcile
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceUpdate {
    pub values: ResourceLevels,
    /// Time the values are current to
    pub timestamp: Timestamp,
    /// Authoritative state timestamp reported with the sample
    pub state_timestamp: Option<Timestamp>,
    /// Rebuild every supplied resource, matched or not
    pub force: bool,
    /// When false, resources absent from `values` are taken as 0
    pub omit_missing: bool,
}

impl ResourceUpdate {
    pub fn new(values: ResourceLevels, timestamp: Timestamp) -> Self {
        Self {
            values,
            timestamp,
            state_timestamp: None,
            force: false,
            omit_missing: true,
        }
    }

    pub fn with_state_timestamp(mut self, state_timestamp: Option<Timestamp>) -> Self {
        self.state_timestamp = state_timestamp;
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn with_missing_as_zero(mut self) -> Self {
        self.omit_missing = false;
        self
    }
}

impl Structure {
    /// Register an untracked slot for every fuel this structure burns at
    /// its location. Faction charters are only needed in the faction's
    /// own space, and not below their minimum security level.
    pub fn init_resources(&mut self) {
        let faction = self
            .context
            .sovereignty
            .sovereignty_at(self.location_id)
            .and_then(|sov| sov.faction_id);
        let security = self
            .context
            .solar_systems
            .solar_system(self.location_id)
            .map_or(0.0, |system| system.security);

        for requirement in self.context.resources.requirements_for(self.type_id) {
            match requirement.faction_id {
                Some(required) if Some(required) != faction => continue,
                Some(_) if security < requirement.min_security_level => continue,
                _ => {}
            }
            self.fuels
                .entry(requirement.resource_type_id)
                .or_insert(FuelSlot::Untracked);
        }
    }

    /// Catalog requirements of this structure type by resource id
    fn requirements(&self) -> AHashMap<ItemTypeId, ResourceRequirement> {
        self.context
            .resources
            .requirements_for(self.type_id)
            .into_iter()
            .map(|r| (r.resource_type_id, r))
            .collect()
    }

    /// Per-cycle rate for a resource under the current sovereignty status
    pub fn canonical_rate(&self, type_id: ItemTypeId) -> Option<i64> {
        self.context
            .resources
            .requirements_for(self.type_id)
            .into_iter()
            .find(|r| r.resource_type_id == type_id)
            .map(|r| self.context.config.discounted_rate(r.quantity, self.sov))
    }

    /// Resource ids whose buffers disagree with `values` at `ts`, either in
    /// level or in rate. Untracked slots always disagree.
    pub fn verify_resources(&self, values: &ResourceLevels, ts: Timestamp) -> Vec<ItemTypeId> {
        let requirements = self.requirements();
        self.verify_against(&requirements, values, ts)
    }

    fn verify_against(
        &self,
        requirements: &AHashMap<ItemTypeId, ResourceRequirement>,
        values: &ResourceLevels,
        ts: Timestamp,
    ) -> Vec<ItemTypeId> {
        let owner = self.as_owner();
        let mut mismatches: Vec<ItemTypeId> = self
            .fuels
            .iter()
            .filter(|&(type_id, slot)| match slot {
                FuelSlot::Untracked => true,
                FuelSlot::Tracked(buffer) => {
                    let Some(&expected) = values.get(type_id) else {
                        return false;
                    };
                    let rate = requirements
                        .get(type_id)
                        .map(|r| self.context.config.discounted_rate(r.quantity, self.sov));
                    buffer.get_current(ts, owner).value() != expected
                        || rate.map_or(false, |rate| rate != buffer.delta())
                }
            })
            .map(|(type_id, _)| *type_id)
            .collect();
        mismatches.sort();
        mismatches
    }

    /// Reconcile sampled levels, returning the ids of rebuilt buffers
    pub fn update_resources(&mut self, update: ResourceUpdate) -> Vec<ItemTypeId> {
        self.watched(&[TrackedField::StateTimestamp], |s| s.reconcile(update))
    }

    pub(crate) fn reconcile(&mut self, update: ResourceUpdate) -> Vec<ItemTypeId> {
        let ResourceUpdate {
            mut values,
            timestamp,
            state_timestamp,
            force,
            omit_missing,
        } = update;
        let requirements = self.requirements();

        if !omit_missing {
            for type_id in requirements.keys() {
                values.entry(*type_id).or_insert(0);
            }
        }

        let update_all = self.fuels.is_empty();
        if update_all {
            self.init_resources();
        }
        let mismatches = self.verify_against(&requirements, &values, timestamp);

        let mut update_values = ResourceLevels::new();
        if update_all {
            update_values.extend(mismatches.iter().map(|id| (*id, 0)));
        }
        update_values.extend(values);

        // consistent levels let state timestamp jitter slide
        if state_timestamp.is_some() && !mismatches.is_empty() {
            self.apply_state_timestamp(state_timestamp);
        }

        // samples reported ahead of the sampling time are already settled
        let apply_at = match state_timestamp {
            Some(st) if st > timestamp => st,
            _ => timestamp,
        };
        let baseline = self.resource_pulse_timestamp(apply_at);

        let mut updated = Vec::new();
        for (type_id, value) in update_values {
            if !force && mismatches.binary_search(&type_id).is_err() {
                continue;
            }
            let Some(requirement) = requirements.get(&type_id) else {
                tracing::warn!(
                    "Structure {} has no requirement for resource {}, skipped",
                    self.item_id,
                    type_id
                );
                continue;
            };

            let buffer = FuelBuffer::new(
                self.context.config.discounted_rate(requirement.quantity, self.sov),
                baseline,
                requirement.purpose,
                value,
                requirement.type_name.clone(),
                requirement.volume,
            );
            tracing::debug!(
                "Structure {} rebuilt fuel {} at {} with {}",
                self.item_id,
                type_id,
                baseline,
                value
            );
            let observer = Arc::clone(&self.context.observer);
            observer.fuel_buffer_set(self, type_id, &buffer);
            self.fuels.insert(type_id, FuelSlot::Tracked(buffer));
            updated.push(type_id);
        }
        updated
    }

    /// Round `ts` up to the next resource pulse
    pub fn resource_pulse_timestamp(&self, ts: Timestamp) -> Timestamp {
        let offset = ts.rem_euclid(CYCLE_PERIOD);
        let carry = if offset > self.resource_pulse { CYCLE_PERIOD } else { 0 };
        ts - offset + carry + self.resource_pulse
    }

    /// Round `ts` down to the previous resource pulse
    pub fn silo_pulse_timestamp(&self, ts: Timestamp) -> Timestamp {
        let offset = ts.rem_euclid(CYCLE_PERIOD);
        let borrow = if offset < self.resource_pulse { CYCLE_PERIOD } else { 0 };
        ts - offset - borrow + self.resource_pulse
    }

    /// Fuel levels at `ts`. Nothing is defined past the offline
    /// timestamp, so later queries read the levels at going offline.
    pub fn resources(&self, ts: Timestamp) -> ResourceLevels {
        let offline_at = self.offline_timestamp();
        let ts = if offline_at == NO_HORIZON { ts } else { ts.min(offline_at) };
        let owner = self.as_owner();
        self.fuels
            .iter()
            .map(|(type_id, slot)| {
                let value = slot
                    .buffer()
                    .map_or(0, |buffer| buffer.get_current(ts, owner).value());
                (*type_id, value)
            })
            .collect()
    }

    /// Levels of one buffer group at `ts`
    pub fn levels(&self, group: BufferGroup, ts: Timestamp) -> ResourceLevels {
        match group {
            BufferGroup::Fuels => self.resources(ts),
            BufferGroup::Silos => self.silo_levels(ts),
        }
    }

    /// Levels of a buffer group given by name
    pub fn levels_by_name(&self, group: &str, ts: Timestamp) -> Result<ResourceLevels> {
        Ok(self.levels(group.parse()?, ts))
    }

    /// Refresh ownership and sovereignty. A sovereignty flip changes every
    /// rate, so all fuel is rebuilt from the levels at `ts`.
    pub fn update_sov_owner(&mut self, ts: Timestamp, standing_owner: Option<OwnerId>) {
        self.watched(
            &[TrackedField::StandingOwner, TrackedField::Sovereignty],
            |s| {
                if let Some(owner) = standing_owner {
                    s.standing_owner_id = owner;
                }
                s.alliance_id = s.query_alliance_id();

                let sov = s.query_sov_status();
                if sov != s.sov {
                    let values = s.resources(ts);
                    s.sov = sov;
                    tracing::debug!(
                        "Structure {} sovereignty now {}, rebuilding fuel",
                        s.item_id,
                        sov
                    );
                    s.reconcile(ResourceUpdate::new(values, ts).forced());
                }
            },
        );
    }
}
