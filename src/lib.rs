//! POS Tracker - fuel and silo bookkeeping for player-owned structures
//!
//! Sampled fuel levels are reconciled against time-windowed buffers that
//! extrapolate consumption between samples, so a structure's fuel, silo
//! contents and offline time can be read at any instant.

pub mod buffer;
pub mod catalog;
pub mod core;
pub mod importer;
pub mod sample;
pub mod structure;
