//! Execution cycle configuration.
//!
//! Defines the knobs the cycle exposes: how patiently it waits for the
//! editor's structural analysis and whether it sanity-checks resolved
//! URLs before hand-off.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one execution cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// How many times to retry reading the block when the editor reports
    /// structure as unavailable, before abandoning the cycle.
    pub structure_retry_limit: u32,

    /// Delay between structure retries, in milliseconds.
    pub structure_retry_delay_ms: u64,

    /// Whether to parse the resolved URL and log a warning when it is
    /// malformed. Never blocks hand-off; the transport owns real
    /// validation.
    pub check_urls: bool,
}

impl CycleConfig {
    /// Creates a config with the given retry behavior.
    pub fn new(structure_retry_limit: u32, structure_retry_delay_ms: u64) -> Self {
        Self {
            structure_retry_limit,
            structure_retry_delay_ms,
            ..Self::default()
        }
    }

    /// Returns the retry delay as a `Duration`.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.structure_retry_delay_ms)
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            structure_retry_limit: 3,
            structure_retry_delay_ms: 50,
            check_urls: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_config_default() {
        let config = CycleConfig::default();
        assert_eq!(config.structure_retry_limit, 3);
        assert_eq!(config.structure_retry_delay_ms, 50);
        assert!(config.check_urls);
    }

    #[test]
    fn test_cycle_config_new() {
        let config = CycleConfig::new(5, 10);
        assert_eq!(config.structure_retry_limit, 5);
        assert_eq!(config.retry_delay(), Duration::from_millis(10));
        assert!(config.check_urls);
    }

    #[test]
    fn test_serialization() {
        let config = CycleConfig::new(2, 25);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("25"));

        let deserialized: CycleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }
}
