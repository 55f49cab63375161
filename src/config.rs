//! Configuration - environment variable parsing
//!
//! Values are consumed once at startup. The simulation itself only sees the
//! derived [`SimConfig`], which never changes for the lifetime of a session.

use std::env;
use serde::{Serialize, Deserialize};

use crate::game::tick::SimConfig;

/// Arena configuration loaded from environment variables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Snapshots retained for rollback
    pub snapshot_window: usize,
    /// Furthest an input may be tagged ahead of the current tick
    pub max_input_lead: u32,
    /// World RNG seed
    pub seed: u64,
    /// tracing filter directive (trace, debug, info, warn, error, or per-target)
    pub log_filter: String,
    /// Length of the demo run in the binary, in seconds
    pub demo_seconds: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            snapshot_window: 120, // 2 seconds @ 60Hz
            max_input_lead: 120,
            seed: 0x00C0_FFEE,
            log_filter: "info".to_string(),
            demo_seconds: 5,
        }
    }
}

impl ArenaConfig {
    /// Load configuration from environment variables. Unset variables keep
    /// their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            tick_rate: parse_var(&lookup, "ARENA_TICK_RATE", defaults.tick_rate)?,
            snapshot_window: parse_var(&lookup, "ARENA_SNAPSHOT_WINDOW", defaults.snapshot_window)?,
            max_input_lead: parse_var(&lookup, "ARENA_MAX_INPUT_LEAD", defaults.max_input_lead)?,
            seed: parse_var(&lookup, "ARENA_SEED", defaults.seed)?,
            log_filter: lookup("ARENA_LOG").unwrap_or(defaults.log_filter),
            demo_seconds: parse_var(&lookup, "ARENA_DEMO_SECONDS", defaults.demo_seconds)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the arena cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 || self.tick_rate > 1000 {
            return Err(ConfigError::OutOfRange("ARENA_TICK_RATE"));
        }
        if self.snapshot_window == 0 {
            return Err(ConfigError::OutOfRange("ARENA_SNAPSHOT_WINDOW"));
        }
        Ok(())
    }

    /// Simulation configuration at this tick rate.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig::with_tick_rate(self.tick_rate)
    }

    /// Wall-clock period of one tick.
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_micros(1_000_000 / u64::from(self.tick_rate.max(1)))
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Value does not parse.
    #[error("Invalid value for {key}: {value:?}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
    },

    /// Value parses but cannot be used.
    #[error("Value out of range: {0}")]
    OutOfRange(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ArenaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ArenaConfig::default());
        assert_eq!(config.sim_config(), SimConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ArenaConfig::from_lookup(lookup(&[
            ("ARENA_TICK_RATE", "30"),
            ("ARENA_SNAPSHOT_WINDOW", " 64 "),
            ("ARENA_SEED", "7"),
            ("ARENA_LOG", "boss_arena=debug"),
        ]))
        .unwrap();

        assert_eq!(config.tick_rate, 30);
        assert_eq!(config.snapshot_window, 64);
        assert_eq!(config.seed, 7);
        assert_eq!(config.log_filter, "boss_arena=debug");
        assert_eq!(config.tick_period(), std::time::Duration::from_micros(33_333));
    }

    #[test]
    fn test_invalid_value() {
        let err = ArenaConfig::from_lookup(lookup(&[("ARENA_TICK_RATE", "fast")])).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "ARENA_TICK_RATE", value: "fast".to_string() });
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = ArenaConfig::from_lookup(lookup(&[("ARENA_SNAPSHOT_WINDOW", "0")])).unwrap_err();
        assert_eq!(err, ConfigError::OutOfRange("ARENA_SNAPSHOT_WINDOW"));
    }

    #[test]
    fn test_partial_json() {
        let config: ArenaConfig = serde_json::from_str(r#"{"tick_rate":120}"#).unwrap();
        assert_eq!(config.tick_rate, 120);
        assert_eq!(config.snapshot_window, 120);
    }
}
