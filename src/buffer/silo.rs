//! Silo buffer - moon harvesting and reaction chains
//!
//! A silo either accumulates (no products declared), is drawn down as a
//! reactant for the declared products, or accumulates a product built
//! from the declared reactants. Intermediate products that are both
//! built and consumed are not modelled.

use serde::{Deserialize, Serialize};

use super::timed::TimedCounter;
use super::BufferOwner;
use crate::core::types::{ItemTypeId, StructureState, Timestamp, CYCLE_PERIOD, UNBOUNDED_CYCLES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiloBuffer {
    counter: TimedCounter,
    type_name: String,
    unit_volume: f64,
    products: Vec<ItemTypeId>,
    reactants: Vec<ItemTypeId>,
    online: bool,
}

/// Field values for a new silo buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiloSpec {
    pub products: Vec<ItemTypeId>,
    pub reactants: Vec<ItemTypeId>,
    pub online: bool,
    pub delta: i64,
    pub value: i64,
    pub full: i64,
}

impl Default for SiloSpec {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            reactants: Vec::new(),
            online: true,
            delta: 1,
            value: 0,
            full: 100,
        }
    }
}

impl SiloSpec {
    pub fn with_products(mut self, products: Vec<ItemTypeId>) -> Self {
        self.products = products;
        self
    }

    pub fn with_reactants(mut self, reactants: Vec<ItemTypeId>) -> Self {
        self.reactants = reactants;
        self
    }

    pub fn with_online(mut self, online: bool) -> Self {
        self.online = online;
        self
    }

    pub fn with_delta(mut self, delta: i64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    pub fn with_full(mut self, full: i64) -> Self {
        self.full = full;
        self
    }
}

/// Partial update of a silo buffer; `None` keeps the current field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiloUpdate {
    pub products: Option<Vec<ItemTypeId>>,
    pub reactants: Option<Vec<ItemTypeId>>,
    pub online: Option<bool>,
    pub delta: Option<i64>,
    pub value: Option<i64>,
    pub full: Option<i64>,
}

impl SiloBuffer {
    pub fn new(
        type_name: impl Into<String>,
        unit_volume: f64,
        spec: SiloSpec,
        timestamp: Timestamp,
    ) -> Self {
        let consumed = !spec.products.is_empty();
        let full = spec.full.max(0);
        Self {
            counter: TimedCounter {
                value: spec.value.clamp(0, full),
                timestamp,
                period: CYCLE_PERIOD,
                delta: spec.delta,
                // reactants are drawn down, everything else accumulates
                delta_factor: if consumed { -1 } else { 1 },
                // partial product accumulation, no partial reactants
                delta_min: i64::from(consumed),
                empty: 0,
                full,
            },
            type_name: type_name.into(),
            unit_volume,
            products: spec.products,
            reactants: spec.reactants,
            online: spec.online,
        }
    }

    /// Build the replacement for this silo, keeping every unset field
    pub fn updated(&self, update: SiloUpdate, timestamp: Timestamp) -> Self {
        let spec = SiloSpec {
            products: update.products.unwrap_or_else(|| self.products.clone()),
            reactants: update.reactants.unwrap_or_else(|| self.reactants.clone()),
            online: update.online.unwrap_or(self.online),
            delta: update.delta.unwrap_or(self.counter.delta),
            value: update.value.unwrap_or(self.counter.value),
            full: update.full.unwrap_or(self.counter.full),
        };
        Self::new(self.type_name.clone(), self.unit_volume, spec, timestamp)
    }

    pub fn value(&self) -> i64 {
        self.counter.value
    }

    pub fn timestamp(&self) -> Timestamp {
        self.counter.timestamp
    }

    pub fn delta(&self) -> i64 {
        self.counter.delta
    }

    pub fn full(&self) -> i64 {
        self.counter.full
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn unit_volume(&self) -> f64 {
        self.unit_volume
    }

    pub fn products(&self) -> &[ItemTypeId] {
        &self.products
    }

    pub fn reactants(&self) -> &[ItemTypeId] {
        &self.reactants
    }

    pub fn online(&self) -> bool {
        self.online
    }

    pub fn is_reactant(&self) -> bool {
        !self.products.is_empty()
    }

    pub fn is_product(&self) -> bool {
        self.products.is_empty() && !self.reactants.is_empty()
    }

    /// Orphaned silos are assumed online.
    pub fn is_online(&self, owner: Option<&dyn BufferOwner>, ts: Timestamp) -> bool {
        self.online
            && owner.map_or(true, |o| o.operative_state(ts) == StructureState::Online)
    }

    /// Cycles left before the owner runs out of fuel
    pub fn cycles_until_offline(&self, owner: Option<&dyn BufferOwner>) -> i64 {
        let Some(owner) = owner else {
            return UNBOUNDED_CYCLES;
        };
        // truncated toward zero, like a whole-cycle count
        let remaining = owner.offline_timestamp().saturating_sub(self.counter.timestamp);
        (remaining / self.counter.period).max(0)
    }

    /// Cycles this silo could run on its own stock and the owner's fuel
    pub fn independent_cycles_possible(&self, owner: Option<&dyn BufferOwner>) -> i64 {
        if !self.is_online(owner, self.counter.timestamp) {
            return 0;
        }
        self.counter
            .cycles_possible()
            .min(self.cycles_until_offline(owner))
    }

    /// Timestamp of the last cycle this silo can run on its own
    pub fn independent_horizon(&self, owner: Option<&dyn BufferOwner>) -> Timestamp {
        self.independent_cycles_possible(owner)
            .saturating_mul(self.counter.period)
            .saturating_add(self.counter.timestamp)
    }

    /// For a product: timestamp of the last cycle the slowest reactant
    /// can sustain, `Timestamp::MAX` when nothing limits it
    pub fn reactant_horizon(&self, owner: Option<&dyn BufferOwner>) -> Timestamp {
        let Some(structure) = owner else {
            return Timestamp::MAX;
        };
        if !self.is_product() {
            return Timestamp::MAX;
        }
        self.reactants
            .iter()
            .filter_map(|id| structure.silo(*id))
            .map(|silo| silo.independent_horizon(owner))
            .min()
            .unwrap_or(Timestamp::MAX)
    }

    /// Whole cycles from this baseline up to `horizon`
    fn cycles_until(&self, horizon: Timestamp) -> i64 {
        if horizon == Timestamp::MAX {
            return UNBOUNDED_CYCLES;
        }
        (horizon.saturating_sub(self.counter.timestamp) / self.counter.period).max(0)
    }

    /// For a product: how long the slowest reactant can sustain the reaction
    pub fn cycles_from_reactants(&self, owner: Option<&dyn BufferOwner>) -> i64 {
        self.cycles_until(self.reactant_horizon(owner))
    }

    /// For a reactant: how long the products can keep drawing it down
    pub fn cycles_from_products(&self, owner: Option<&dyn BufferOwner>) -> i64 {
        let Some(structure) = owner else {
            return UNBOUNDED_CYCLES;
        };
        if !self.is_reactant() || !self.reactants.is_empty() {
            return UNBOUNDED_CYCLES;
        }
        self.products
            .iter()
            .filter_map(|id| structure.silo(*id))
            .map(|silo| self.cycles_until(silo.reactant_horizon(owner)))
            .min()
            .unwrap_or(UNBOUNDED_CYCLES)
    }

    pub fn cycles_possible(&self, owner: Option<&dyn BufferOwner>) -> i64 {
        self.independent_cycles_possible(owner)
            .min(self.cycles_from_products(owner))
            .min(self.cycles_from_reactants(owner))
    }

    /// Snapshot of this silo at `ts`
    pub fn get_current(&self, ts: Timestamp, owner: Option<&dyn BufferOwner>) -> Self {
        let frozen = !self.is_online(owner, self.counter.timestamp);
        let limit = self.cycles_possible(owner);
        Self {
            counter: self.counter.advance(ts, frozen, limit),
            ..self.clone()
        }
    }
}
