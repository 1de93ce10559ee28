//! Core type definitions used throughout the codebase

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::TrackerError;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Length of one buffer cycle in seconds
pub const CYCLE_PERIOD: i64 = 3600;

/// Offline timestamp reported when no normal fuel is tracked yet
pub const NO_HORIZON: Timestamp = -1;

/// Cycle count used where a bound does not apply
pub const UNBOUNDED_CYCLES: i64 = i64::MAX;

/// Quantity per resource type, ordered by type id
pub type ResourceLevels = BTreeMap<ItemTypeId, i64>;

/// Identifier of an item type (fuel, reactant, structure type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemTypeId(pub u32);

impl fmt::Display for ItemTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a single physical structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Solar system identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemId(pub u32);

/// Celestial (moon) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CelestialId(pub u32);

/// Corporation or alliance holding standings on a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub u64);

/// Alliance identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllianceId(pub u64);

/// NPC faction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(pub u32);

/// Categorical structure state as reported by samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum StructureState {
    Anchored = 1,
    Onlining = 2,
    Reinforced = 3,
    Online = 4,
}

impl StructureState {
    /// States in which normal fuel is drawn every cycle
    pub fn consumes_fuel(&self) -> bool {
        matches!(self, StructureState::Reinforced | StructureState::Online)
    }

    pub fn name(&self) -> &'static str {
        match self {
            StructureState::Anchored => "anchored",
            StructureState::Onlining => "onlining",
            StructureState::Reinforced => "reinforced",
            StructureState::Online => "online",
        }
    }
}

impl fmt::Display for StructureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for StructureState {
    type Error = TrackerError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(StructureState::Anchored),
            2 => Ok(StructureState::Onlining),
            3 => Ok(StructureState::Reinforced),
            4 => Ok(StructureState::Online),
            other => Err(TrackerError::InvalidState(other.to_string())),
        }
    }
}

impl From<StructureState> for u8 {
    fn from(state: StructureState) -> u8 {
        state as u8
    }
}

impl FromStr for StructureState {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anchored" => Ok(StructureState::Anchored),
            "onlining" => Ok(StructureState::Onlining),
            "reinforced" => Ok(StructureState::Reinforced),
            "online" => Ok(StructureState::Online),
            _ => Err(TrackerError::InvalidState(s.to_string())),
        }
    }
}

/// What a fuel is consumed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum FuelPurpose {
    /// Drawn every cycle while the structure is energized
    Normal,
    /// Strontium: swallowed in bulk when reinforcement starts
    Reserve,
    /// Any other catalog purpose code, never drawn per cycle
    Other(u8),
}

impl FuelPurpose {
    pub fn is_normal(&self) -> bool {
        matches!(self, FuelPurpose::Normal)
    }
}

impl From<u8> for FuelPurpose {
    fn from(code: u8) -> Self {
        match code {
            1 => FuelPurpose::Normal,
            4 => FuelPurpose::Reserve,
            other => FuelPurpose::Other(other),
        }
    }
}

impl From<FuelPurpose> for u8 {
    fn from(purpose: FuelPurpose) -> u8 {
        match purpose {
            FuelPurpose::Normal => 1,
            FuelPurpose::Reserve => 4,
            FuelPurpose::Other(code) => code,
        }
    }
}

/// Named buffer collections of a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferGroup {
    Fuels,
    Silos,
}

impl FromStr for BufferGroup {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fuels" => Ok(BufferGroup::Fuels),
            "silos" => Ok(BufferGroup::Silos),
            _ => Err(TrackerError::InvalidBufferGroup(s.to_string())),
        }
    }
}
