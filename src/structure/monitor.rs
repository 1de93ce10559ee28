//! Change monitoring for structures
//!
//! Mutators snapshot a set of watched fields, run, and compare. The
//! observer hears about a call only when one of its watched fields
//! actually changed, and at most once per call.

use std::sync::Mutex;

use super::Structure;
use crate::buffer::FuelBuffer;
use crate::core::types::ItemTypeId;

/// Structure attributes a mutator can be watched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedField {
    State,
    StateTimestamp,
    StandingOwner,
    Sovereignty,
}

impl TrackedField {
    fn read(&self, structure: &Structure) -> Option<i64> {
        match self {
            TrackedField::State => Some(i64::from(u8::from(structure.state()))),
            TrackedField::StateTimestamp => structure.state_timestamp(),
            TrackedField::StandingOwner => Some(structure.standing_owner_id().0 as i64),
            TrackedField::Sovereignty => Some(i64::from(structure.sov())),
        }
    }
}

/// Values of the watched fields before a mutation
#[derive(Debug, Clone)]
pub(crate) struct FieldSnapshot {
    values: Vec<(TrackedField, Option<i64>)>,
}

impl FieldSnapshot {
    pub(crate) fn capture(structure: &Structure, fields: &[TrackedField]) -> Self {
        Self {
            values: fields.iter().map(|f| (*f, f.read(structure))).collect(),
        }
    }

    /// Fields whose value differs on `structure` now
    pub(crate) fn changed(&self, structure: &Structure) -> Vec<TrackedField> {
        self.values
            .iter()
            .filter(|(field, before)| field.read(structure) != *before)
            .map(|(field, _)| *field)
            .collect()
    }
}

/// Receiver of structure changes, typically a persistence or audit layer
pub trait StructureObserver: Send + Sync {
    /// A watched mutator changed `changed` on `structure`
    fn structure_updated(&self, _structure: &Structure, _changed: &[TrackedField]) {}

    /// A fuel buffer was rebuilt
    fn fuel_buffer_set(&self, _structure: &Structure, _type_id: ItemTypeId, _buffer: &FuelBuffer) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StructureObserver for NoopObserver {}

/// Observer that reports through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl StructureObserver for LoggingObserver {
    fn structure_updated(&self, structure: &Structure, changed: &[TrackedField]) {
        tracing::info!(
            "Structure {} changed {:?}: state {} at {:?}",
            structure.item_id(),
            changed,
            structure.state(),
            structure.state_timestamp()
        );
    }

    fn fuel_buffer_set(&self, structure: &Structure, type_id: ItemTypeId, buffer: &FuelBuffer) {
        tracing::debug!(
            "Structure {} fuel {} ({}) set to {} at {}, delta {}",
            structure.item_id(),
            type_id,
            buffer.resource_type_name(),
            buffer.value(),
            buffer.timestamp(),
            buffer.delta()
        );
    }
}

/// One observed event
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    Updated(Vec<TrackedField>),
    FuelSet { type_id: ItemTypeId, value: i64, delta: i64, timestamp: i64 },
}

/// Observer that keeps every event, for audit trails and tests
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the events recorded so far
    pub fn take(&self) -> Vec<ObservedEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    fn push(&self, event: ObservedEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

impl StructureObserver for RecordingObserver {
    fn structure_updated(&self, _structure: &Structure, changed: &[TrackedField]) {
        self.push(ObservedEvent::Updated(changed.to_vec()));
    }

    fn fuel_buffer_set(&self, _structure: &Structure, type_id: ItemTypeId, buffer: &FuelBuffer) {
        self.push(ObservedEvent::FuelSet {
            type_id,
            value: buffer.value(),
            delta: buffer.delta(),
            timestamp: buffer.timestamp(),
        });
    }
}
