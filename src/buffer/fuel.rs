//! Fuel bay buffer
//!
//! Normal fuel drains one delta per cycle while the structure is online
//! or reinforced. Reserve fuel (strontium) never drains per cycle; the
//! whole bay is swallowed when reinforcement starts, which the structure
//! applies by replacing the buffer.

use serde::{Deserialize, Serialize};

use super::timed::TimedCounter;
use super::BufferOwner;
use crate::core::types::{FuelPurpose, Timestamp, CYCLE_PERIOD, NO_HORIZON, UNBOUNDED_CYCLES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelBuffer {
    counter: TimedCounter,
    purpose: FuelPurpose,
    resource_type_name: String,
    unit_volume: f64,
}

impl FuelBuffer {
    pub fn new(
        delta: i64,
        timestamp: Timestamp,
        purpose: FuelPurpose,
        value: i64,
        resource_type_name: impl Into<String>,
        unit_volume: f64,
    ) -> Self {
        Self {
            counter: TimedCounter {
                value: value.max(0),
                timestamp,
                period: CYCLE_PERIOD,
                delta,
                delta_factor: -1,
                delta_min: 1,
                empty: 0,
                // fuel bays accept more than their nominal capacity
                full: i64::MAX,
            },
            purpose,
            resource_type_name: resource_type_name.into(),
            unit_volume,
        }
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

    pub fn period(&self) -> i64 {
        self.counter.period
    }

    pub fn purpose(&self) -> FuelPurpose {
        self.purpose
    }

    pub fn resource_type_name(&self) -> &str {
        &self.resource_type_name
    }

    pub fn unit_volume(&self) -> f64 {
        self.unit_volume
    }

    pub fn expiry(&self) -> Timestamp {
        self.counter.expiry()
    }

    pub fn is_normal_fuel(&self) -> bool {
        self.purpose.is_normal()
    }

    /// Orphaned buffers are assumed to be consuming.
    pub fn is_consuming_fuel(&self, owner: Option<&dyn BufferOwner>, ts: Timestamp) -> bool {
        owner.map_or(true, |o| o.operative_state(ts).consumes_fuel())
    }

    pub fn is_frozen(&self, owner: Option<&dyn BufferOwner>, ts: Timestamp) -> bool {
        !self.is_consuming_fuel(owner, ts) || !self.is_normal_fuel()
    }

    pub fn cycles_possible(&self) -> i64 {
        self.counter.cycles_possible()
    }

    /// Timestamp at which this bay can no longer pay for a cycle
    pub fn exhausted_at(&self) -> Timestamp {
        self.counter.exhausted_at()
    }

    /// Cycles the owner stays energized past this baseline. A bay that
    /// outlasts its structure stops burning when the first one runs dry.
    pub fn cycles_until_offline(&self, owner: Option<&dyn BufferOwner>) -> i64 {
        let Some(owner) = owner else {
            return UNBOUNDED_CYCLES;
        };
        let offline_at = owner.offline_timestamp();
        if offline_at == NO_HORIZON {
            return UNBOUNDED_CYCLES;
        }
        (offline_at.saturating_sub(self.counter.timestamp) / self.counter.period).max(0)
    }

    /// Snapshot of this bay at `ts`
    pub fn get_current(&self, ts: Timestamp, owner: Option<&dyn BufferOwner>) -> Self {
        let frozen = self.is_frozen(owner, self.counter.timestamp);
        let limit = self
            .counter
            .cycles_possible()
            .min(self.cycles_until_offline(owner));
        Self {
            counter: self.counter.advance(ts, frozen, limit),
            ..self.clone()
        }
    }
}
