//! Structure state machine
//!
//! The categorical state is the last one observed. The operative state
//! is derived from it, the state timestamp and the fuel horizon.

use super::reconcile::ResourceUpdate;
use super::{Structure, TrackedField};
use crate::core::error::{Result, TrackerError};
use crate::core::types::{StructureState, Timestamp, NO_HORIZON};
use crate::buffer::silo::SiloUpdate;

impl Structure {
    /// Operative state at `ts`
    pub fn state_at(&self, ts: Timestamp) -> StructureState {
        // out of fuel overrides everything
        if ts > self.offline_timestamp() {
            return StructureState::Anchored;
        }

        // the state timestamp marks the moment the structure comes online
        if matches!(self.state, StructureState::Onlining | StructureState::Reinforced)
            && self.state_timestamp.map_or(true, |st| ts >= st)
        {
            return StructureState::Online;
        }

        self.state
    }

    pub fn state_name(&self, ts: Timestamp) -> &'static str {
        self.state_at(ts).name()
    }

    /// Timestamp at which the first normal fuel can no longer pay for a
    /// cycle, or `NO_HORIZON` while no normal fuel is tracked.
    pub fn offline_timestamp(&self) -> Timestamp {
        self.fuels
            .values()
            .filter_map(|slot| slot.buffer())
            .filter(|fuel| fuel.is_normal_fuel())
            .map(|fuel| fuel.exhausted_at())
            .min()
            .unwrap_or(NO_HORIZON)
    }

    /// Seconds until the structure goes offline, 0 without a horizon
    pub fn time_remaining(&self, ts: Timestamp) -> i64 {
        let offline_at = self.offline_timestamp();
        if offline_at == NO_HORIZON {
            return 0;
        }
        offline_at.saturating_sub(ts).max(0)
    }

    /// Update the state timestamp, re-anchoring the resource pulse
    pub fn set_state_timestamp(&mut self, state_timestamp: Option<Timestamp>) {
        self.watched(&[TrackedField::StateTimestamp], |s| {
            s.apply_state_timestamp(state_timestamp)
        });
    }

    /// Apply an observed state.
    ///
    /// On a transition, fuel and silo levels are taken at `ts` under the
    /// old state before the new one is applied, then every fuel is
    /// rebuilt under the new state. Leaving ONLINE also takes every silo
    /// offline. `resource_update` overrides the snapshot values.
    pub fn set_state(
        &mut self,
        state: StructureState,
        state_timestamp: Option<Timestamp>,
        ts: Timestamp,
        resource_update: Option<ResourceUpdate>,
    ) {
        self.watched(&[TrackedField::State, TrackedField::StateTimestamp], |s| {
            s.transition(state, state_timestamp, ts, resource_update)
        });
    }

    /// Apply an observed state given as a raw code
    pub fn set_state_code(
        &mut self,
        code: u8,
        state_timestamp: Option<Timestamp>,
        ts: Timestamp,
        resource_update: Option<ResourceUpdate>,
    ) -> Result<()> {
        let state = StructureState::try_from(code)?;
        self.set_state(state, state_timestamp, ts, resource_update);
        Ok(())
    }

    fn transition(
        &mut self,
        state: StructureState,
        state_timestamp: Option<Timestamp>,
        ts: Timestamp,
        resource_update: Option<ResourceUpdate>,
    ) {
        if self.state == state {
            if let Some(update) = resource_update {
                self.reconcile(update);
            }
            return;
        }

        let resources = self.resources(ts);
        let silo_levels = self.silo_levels(ts);

        tracing::debug!(
            "Structure {} state {} -> {} at {}",
            self.item_id,
            self.state,
            state,
            ts
        );
        self.state = state;
        if state_timestamp.is_some() {
            self.apply_state_timestamp(state_timestamp);
        }

        // tracked fuels only, so resources this instance never held are
        // not injected
        let mut update = ResourceUpdate::new(resources, ts)
            .with_state_timestamp(self.state_timestamp)
            .forced();
        if let Some(supplied) = resource_update {
            update.values = supplied.values;
            update.timestamp = supplied.timestamp;
            if supplied.state_timestamp.is_some() {
                update.state_timestamp = supplied.state_timestamp;
            }
            update.omit_missing = supplied.omit_missing;
            // filling blanks from tracked levels, not forcing everything
            update.force = supplied.omit_missing;
        }
        self.reconcile(update);

        if self.state != StructureState::Online {
            for (type_id, value) in silo_levels {
                let update = SiloUpdate {
                    value: Some(value),
                    online: Some(false),
                    ..Default::default()
                };
                if let Some(silo) = self.silos.get(&type_id) {
                    let silo = silo.updated(update, self.silo_pulse_timestamp(ts));
                    self.silos.insert(type_id, silo);
                }
            }
        }
    }

    /// Record the start of a reinforcement ending at `exit_at`. The whole
    /// reserve bay is consumed at once.
    pub fn enter_reinforcement(&mut self, exit_at: Timestamp, ts: Timestamp) {
        self.set_state(StructureState::Reinforced, Some(exit_at), ts, None);

        let reserve = self.context.config.reserve_type_id;
        let mut resources = self.resources(ts);
        resources.insert(reserve, 0);
        self.update_resources(ResourceUpdate::new(resources, ts));
    }

    /// Record the end of a reinforcement with the reserve left in the bay
    pub fn exit_reinforcement(&mut self, reserve_amount: i64, ts: Timestamp) -> Result<()> {
        if let Some(exit_at) = self.state_timestamp {
            if ts < exit_at {
                return Err(TrackerError::ReinforcementTiming {
                    exit_at,
                    remaining: exit_at - ts,
                });
            }
        }

        self.set_state(StructureState::Online, None, ts, None);
        let reserve = self.context.config.reserve_type_id;
        let values = [(reserve, reserve_amount)].into_iter().collect();
        self.update_resources(ResourceUpdate::new(values, ts));
        Ok(())
    }
}
