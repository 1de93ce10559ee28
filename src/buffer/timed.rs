//! Timed counter - a quantity stepping by a fixed delta every period
//!
//! A counter is an immutable snapshot. Advancing it produces a new
//! snapshot whose baseline moves forward by whole periods only, so the
//! phase of the first baseline is kept no matter when it is queried.

use serde::{Deserialize, Serialize};

use crate::core::types::{Timestamp, UNBOUNDED_CYCLES};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedCounter {
    /// Quantity at the baseline timestamp
    pub value: i64,
    /// Baseline timestamp
    pub timestamp: Timestamp,
    /// Seconds per cycle
    pub period: i64,
    /// Magnitude of change per cycle
    pub delta: i64,
    /// Direction of change: -1 depletes, +1 fills
    pub delta_factor: i64,
    /// Non-zero when a cycle needs a full delta of room to run
    pub delta_min: i64,
    pub empty: i64,
    pub full: i64,
}

impl TimedCounter {
    /// Whole cycles elapsed between the baseline and `ts`
    pub fn elapsed_cycles(&self, ts: Timestamp) -> i64 {
        if ts <= self.timestamp || self.period <= 0 {
            return 0;
        }
        ts.saturating_sub(self.timestamp) / self.period
    }

    /// Maximum whole cycles before the counter hits its bound
    pub fn cycles_possible(&self) -> i64 {
        if self.delta <= 0 {
            return UNBOUNDED_CYCLES;
        }
        let room = if self.delta_factor < 0 {
            self.value.saturating_sub(self.empty)
        } else {
            self.full.saturating_sub(self.value)
        };
        if room <= 0 {
            return 0;
        }
        if self.delta_min > 0 {
            room / self.delta
        } else {
            // partial final cycle allowed
            room / self.delta + i64::from(room % self.delta != 0)
        }
    }

    /// Moment the last deduction of this snapshot applied
    pub fn expiry(&self) -> Timestamp {
        self.timestamp
    }

    /// Timestamp at which `cycles_possible` cycles will have run
    pub fn exhausted_at(&self) -> Timestamp {
        self.cycles_possible()
            .saturating_mul(self.period)
            .saturating_add(self.expiry())
    }

    /// Snapshot at `ts`, applying at most `limit` cycles of change
    pub fn advance(&self, ts: Timestamp, frozen: bool, limit: i64) -> Self {
        let cycles = if frozen { 0 } else { self.elapsed_cycles(ts) };
        let applied = cycles.min(limit.max(0));
        let change = applied
            .saturating_mul(self.delta)
            .saturating_mul(self.delta_factor);

        Self {
            value: self.value.saturating_add(change).clamp(self.empty, self.full),
            timestamp: self
                .timestamp
                .saturating_add(cycles.saturating_mul(self.period)),
            ..self.clone()
        }
    }

    /// Snapshot at `ts` with no external constraints
    pub fn get_current(&self, ts: Timestamp) -> Self {
        self.advance(ts, false, self.cycles_possible())
    }
}
