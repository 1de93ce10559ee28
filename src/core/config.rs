//! Tracker configuration with documented constants
//!
//! Values that the game rules fix but that tests or alternative data
//! sets may want to vary are collected here.

use serde::Deserialize;

use crate::core::error::{Result, TrackerError};
use crate::core::types::ItemTypeId;

/// Strontium Clathrates, the reinforcement reserve fuel
pub const STRONTIUM_TYPE_ID: ItemTypeId = ItemTypeId(16275);

/// Configuration for the tracker
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Multiplier applied to every fuel rate while the standing owner's
    /// alliance holds sovereignty over the structure's system.
    ///
    /// The discounted rate is `round(base * sov_discount)`, so a 40 block
    /// tower burns 30 blocks per cycle under the default of 0.75.
    pub sov_discount: f64,

    /// Fuel type consumed in bulk when a structure enters reinforcement
    pub reserve_type_id: ItemTypeId,

    /// Marker substituted for names the reference data cannot supply
    pub missing_name: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sov_discount: 0.75,
            reserve_type_id: STRONTIUM_TYPE_ID,
            missing_name: "<missing name>".into(),
        }
    }
}

impl TrackerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.sov_discount > 0.0 && self.sov_discount <= 1.0) {
            return Err(TrackerError::Config(format!(
                "sov_discount ({}) must be within (0, 1]",
                self.sov_discount
            )));
        }

        // the smallest catalog rate must still burn something
        if self.discounted_rate(1, true) < 1 {
            return Err(TrackerError::Config(format!(
                "sov_discount ({}) rounds a one unit rate down to zero",
                self.sov_discount
            )));
        }

        if self.missing_name.is_empty() {
            return Err(TrackerError::Config("missing_name must not be empty".into()));
        }

        Ok(())
    }

    /// Rate actually drawn per cycle for a catalog base rate
    pub fn discounted_rate(&self, base: i64, sov: bool) -> i64 {
        if sov {
            (base as f64 * self.sov_discount).round() as i64
        } else {
            base
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string, filling unset keys with defaults
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: TrackerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TrackerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reserve_type_id, STRONTIUM_TYPE_ID);
    }

    #[test]
    fn test_discounted_rate() {
        let config = TrackerConfig::default();
        assert_eq!(config.discounted_rate(40, true), 30);
        assert_eq!(config.discounted_rate(40, false), 40);
        // 400 * 0.75 and rounding half away from zero
        assert_eq!(config.discounted_rate(400, true), 300);
        assert_eq!(config.discounted_rate(10, true), 8);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = TrackerConfig::parse_toml("sov_discount = 0.5\n").unwrap();
        assert_eq!(config.sov_discount, 0.5);
        assert_eq!(config.missing_name, "<missing name>");
    }

    #[test]
    fn test_invalid_discount_rejected() {
        let err = TrackerConfig::parse_toml("sov_discount = 1.5\n").unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn test_discount_zeroing_rates_rejected() {
        let err = TrackerConfig::parse_toml("sov_discount = 0.001\n").unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
        assert!(TrackerConfig::parse_toml("sov_discount = 0.49\n").is_err());
        // one unit still rounds up to one
        assert!(TrackerConfig::parse_toml("sov_discount = 0.5\n").is_ok());
    }
}
