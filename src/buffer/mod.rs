//! Resource buffers - time-windowed counters for fuel bays and silos
//!
//! Buffers are immutable snapshots. A structure owns its buffers and
//! replaces them wholesale on every update; buffers only ever look back
//! at their structure through [`BufferOwner`], passed in per query.

pub mod fuel;
pub mod silo;
pub mod timed;

pub use fuel::FuelBuffer;
pub use silo::SiloBuffer;
pub use timed::TimedCounter;

use crate::core::types::{ItemTypeId, StructureState, Timestamp};

/// Lookup-only view of the structure owning a buffer
pub trait BufferOwner {
    /// Operative state derived at `ts`
    fn operative_state(&self, ts: Timestamp) -> StructureState;

    /// Timestamp at which the first normal fuel runs dry
    fn offline_timestamp(&self) -> Timestamp;

    /// Sibling silo tracking `type_id`
    fn silo(&self, type_id: ItemTypeId) -> Option<&SiloBuffer>;
}
