//! Structure layer - the tracked tower and its buffers
//!
//! A [`Structure`] owns one fuel slot per resource its type burns and any
//! number of silo buffers. It reconciles samples against its buffers,
//! derives its operative state, and projects fueling needs.

pub mod fueling;
pub mod monitor;
pub mod reconcile;
pub mod report;
pub mod silos;
pub mod state;

pub use monitor::{
    LoggingObserver, NoopObserver, ObservedEvent, RecordingObserver, StructureObserver,
    TrackedField,
};
pub use reconcile::ResourceUpdate;
pub use report::StructureReport;

use std::sync::Arc;

use ahash::AHashMap;

use crate::buffer::{BufferOwner, FuelBuffer, SiloBuffer};
use crate::core::context::TrackerContext;
use crate::core::types::{
    AllianceId, CelestialId, ItemId, ItemTypeId, OwnerId, StructureState, SystemId, Timestamp,
    CYCLE_PERIOD,
};
use crate::sample::StarbaseListing;
use monitor::FieldSnapshot;

/// Fuel bay entry for one resource type
#[derive(Debug, Clone, PartialEq)]
pub enum FuelSlot {
    /// Registered for this structure but not sampled yet
    Untracked,
    Tracked(FuelBuffer),
}

impl FuelSlot {
    pub fn buffer(&self) -> Option<&FuelBuffer> {
        match self {
            FuelSlot::Untracked => None,
            FuelSlot::Tracked(buffer) => Some(buffer),
        }
    }
}

/// A player owned structure
#[derive(Clone)]
pub struct Structure {
    item_id: ItemId,
    type_id: ItemTypeId,
    location_id: SystemId,
    moon_id: CelestialId,

    // last observed sample
    state: StructureState,
    state_timestamp: Option<Timestamp>,
    online_timestamp: Option<Timestamp>,
    standing_owner_id: OwnerId,

    /// Second of the hour all buffers cycle on
    resource_pulse: i64,

    // reference data cache
    type_name: String,
    celestial_name: String,
    solar_system_name: String,
    region_name: String,
    capacity: f64,
    reserve_capacity: f64,
    alliance_id: Option<AllianceId>,
    /// Sovereignty status as of the last owner update
    sov: bool,

    fuels: AHashMap<ItemTypeId, FuelSlot>,
    silos: AHashMap<ItemTypeId, SiloBuffer>,

    context: Arc<TrackerContext>,
}

impl Structure {
    /// Create the tracked structure for a listing. Called once per
    /// physical structure.
    pub fn new(listing: &StarbaseListing, context: Arc<TrackerContext>) -> Self {
        let missing = context.config.missing_name.clone();
        let structure_type = context.structures.structure_type(listing.type_id);
        let system = context.solar_systems.solar_system(listing.location_id);

        let mut structure = Self {
            item_id: listing.item_id,
            type_id: listing.type_id,
            location_id: listing.location_id,
            moon_id: listing.moon_id,
            state: listing.state,
            state_timestamp: None,
            online_timestamp: listing.online_timestamp,
            standing_owner_id: listing.standing_owner_id,
            resource_pulse: 0,
            type_name: structure_type
                .as_ref()
                .map_or_else(|| missing.clone(), |t| t.type_name.clone()),
            celestial_name: context
                .celestials
                .celestial_name(listing.moon_id)
                .unwrap_or_else(|| missing.clone()),
            solar_system_name: system
                .as_ref()
                .map_or_else(|| missing.clone(), |s| s.name.clone()),
            region_name: system.map_or(missing, |s| s.region_name),
            capacity: structure_type.as_ref().map_or(0.0, |t| t.capacity),
            reserve_capacity: structure_type.map_or(0.0, |t| t.reserve_capacity),
            alliance_id: None,
            sov: false,
            fuels: AHashMap::new(),
            silos: AHashMap::new(),
            context,
        };
        structure.apply_state_timestamp(listing.state_timestamp);
        structure.alliance_id = structure.query_alliance_id();
        structure.sov = structure.query_sov_status();
        structure
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn type_id(&self) -> ItemTypeId {
        self.type_id
    }

    pub fn location_id(&self) -> SystemId {
        self.location_id
    }

    pub fn moon_id(&self) -> CelestialId {
        self.moon_id
    }

    /// Last observed categorical state
    pub fn state(&self) -> StructureState {
        self.state
    }

    pub fn state_timestamp(&self) -> Option<Timestamp> {
        self.state_timestamp
    }

    pub fn online_timestamp(&self) -> Option<Timestamp> {
        self.online_timestamp
    }

    pub fn standing_owner_id(&self) -> OwnerId {
        self.standing_owner_id
    }

    pub fn resource_pulse(&self) -> i64 {
        self.resource_pulse
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn celestial_name(&self) -> &str {
        &self.celestial_name
    }

    pub fn solar_system_name(&self) -> &str {
        &self.solar_system_name
    }

    pub fn region_name(&self) -> &str {
        &self.region_name
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn reserve_capacity(&self) -> f64 {
        self.reserve_capacity
    }

    pub fn alliance_id(&self) -> Option<AllianceId> {
        self.alliance_id
    }

    /// Cached sovereignty flag, refreshed by `update_sov_owner`
    pub fn sov(&self) -> bool {
        self.sov
    }

    pub fn fuels(&self) -> &AHashMap<ItemTypeId, FuelSlot> {
        &self.fuels
    }

    pub fn fuel(&self, type_id: ItemTypeId) -> Option<&FuelBuffer> {
        self.fuels.get(&type_id).and_then(FuelSlot::buffer)
    }

    pub fn silos(&self) -> &AHashMap<ItemTypeId, SiloBuffer> {
        &self.silos
    }

    pub fn context(&self) -> &TrackerContext {
        &self.context
    }

    /// Alliance of the standing owner: the owner itself when it is an
    /// alliance, otherwise the alliance its corporation belongs to.
    pub fn query_alliance_id(&self) -> Option<AllianceId> {
        let membership = &self.context.membership;
        if membership.is_alliance(self.standing_owner_id) {
            Some(AllianceId(self.standing_owner_id.0))
        } else {
            membership.alliance_of(self.standing_owner_id)
        }
    }

    /// Live sovereignty status of the structure's system
    pub fn query_sov_status(&self) -> bool {
        match (self.context.sovereignty.sovereignty_at(self.location_id), self.alliance_id) {
            (Some(sov), Some(alliance)) => sov.alliance_id == Some(alliance),
            _ => false,
        }
    }

    /// Set the state timestamp and the resource pulse derived from it.
    /// An absent timestamp (long offline structures) pulses on the hour.
    pub(crate) fn apply_state_timestamp(&mut self, state_timestamp: Option<Timestamp>) {
        self.resource_pulse = state_timestamp.map_or(0, |ts| ts.rem_euclid(CYCLE_PERIOD));
        self.state_timestamp = state_timestamp;
    }

    /// Run `mutate`, then notify the observer once if any of `fields`
    /// changed.
    pub(crate) fn watched<R>(
        &mut self,
        fields: &[TrackedField],
        mutate: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let before = FieldSnapshot::capture(self, fields);
        let result = mutate(self);
        let changed = before.changed(self);
        if !changed.is_empty() {
            let observer = Arc::clone(&self.context.observer);
            observer.structure_updated(self, &changed);
        }
        result
    }

    fn as_owner(&self) -> Option<&dyn BufferOwner> {
        Some(self)
    }
}

impl BufferOwner for Structure {
    fn operative_state(&self, ts: Timestamp) -> StructureState {
        self.state_at(ts)
    }

    fn offline_timestamp(&self) -> Timestamp {
        Structure::offline_timestamp(self)
    }

    fn silo(&self, type_id: ItemTypeId) -> Option<&SiloBuffer> {
        self.silos.get(&type_id)
    }
}

impl std::fmt::Debug for Structure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Structure")
            .field("item_id", &self.item_id)
            .field("type_id", &self.type_id)
            .field("state", &self.state)
            .field("state_timestamp", &self.state_timestamp)
            .field("resource_pulse", &self.resource_pulse)
            .field("sov", &self.sov)
            .field("fuels", &self.fuels)
            .field("silos", &self.silos)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::Structure;
    use crate::catalog::fixtures;
    use crate::core::context::TrackerContext;
    use crate::core::types::{CelestialId, ItemId, ItemTypeId, OwnerId, StructureState, SystemId, Timestamp};
    use crate::sample::StarbaseListing;
    use crate::structure::monitor::StructureObserver;

    pub fn listing(
        system: u32,
        owner: u64,
        state: StructureState,
        state_timestamp: Option<Timestamp>,
    ) -> StarbaseListing {
        StarbaseListing {
            item_id: ItemId(1000001),
            type_id: ItemTypeId(fixtures::AMARR_TOWER),
            location_id: SystemId(system),
            moon_id: CelestialId(40291202),
            state,
            state_timestamp,
            online_timestamp: Some(0),
            standing_owner_id: OwnerId(owner),
        }
    }

    pub fn context() -> Arc<TrackerContext> {
        Arc::new(TrackerContext::standalone(fixtures::catalog()))
    }

    pub fn observed_context(observer: Arc<dyn StructureObserver>) -> Arc<TrackerContext> {
        Arc::new(TrackerContext::standalone(fixtures::catalog()).with_observer(observer))
    }

    /// Online tower in sovereignty-free low security space
    pub fn lowsec_tower(state: StructureState, state_timestamp: Option<Timestamp>) -> Structure {
        Structure::new(
            &listing(fixtures::LOWSEC, fixtures::OTHER_CORP, state, state_timestamp),
            context(),
        )
    }
}
