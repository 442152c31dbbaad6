//! Runtime configuration.
//!
//! Both structs deserialize from JSON with every field optional, so a device
//! can ship a partial config file and fall back to the defaults.

use serde::Deserialize;

/// Timing parameters of the pattern library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Step interval of the strobe and rainbow patterns.
    pub step_interval_ms: u32,
    /// Initial Fade interval.
    pub fade_start_ms: u32,
    /// Lower bound of the Fade interval sweep.
    pub fade_min_ms: u32,
    /// Upper bound of the Fade interval sweep.
    pub fade_max_ms: u32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: 100,
            fade_start_ms: 500,
            fade_min_ms: 0,
            fade_max_ms: 5000,
        }
    }
}

/// Configuration of the playback loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Minimum spacing between accepted control inputs.
    pub debounce_ms: u32,
    /// Slot played until the server reports the active one.
    pub initial_slot: u8,
    /// Number of slots cycled by the slot switch until the server reports its count.
    pub slot_count: u8,
    /// Whether to ask the server for the active slot on every refresh.
    pub follow_server: bool,
    /// Whether to show the loading animation at start-up.
    pub boot_animation: bool,
    pub pattern: PatternConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 400,
            initial_slot: 1,
            slot_count: 1,
            follow_server: true,
            boot_animation: true,
            pattern: PatternConfig::default(),
        }
    }
}

/// Errors produced while reading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The document is not valid JSON or has fields of the wrong type.
    #[error("invalid configuration at line {line}, column {column}")]
    Parse { line: usize, column: usize },

    /// The fade bounds are inverted or exclude the start value.
    #[error("fade interval bounds must satisfy min <= start <= max")]
    FadeBounds,

    /// Slot numbers start at 1.
    #[error("slot numbers start at 1")]
    ZeroSlot,
}

impl PlayerConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PlayerConfig = serde_json::from_str(json).map_err(|err| ConfigError::Parse {
            line: err.line(),
            column: err.column(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the pattern engine and slot cycling rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fade = &self.pattern;
        if !(fade.fade_min_ms <= fade.fade_start_ms && fade.fade_start_ms <= fade.fade_max_ms) {
            return Err(ConfigError::FadeBounds);
        }
        if self.initial_slot == 0 || self.slot_count == 0 {
            return Err(ConfigError::ZeroSlot);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let config = PlayerConfig::from_json(r#"{"debounce_ms": 250, "pattern": {"step_interval_ms": 50}}"#).unwrap();

        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.pattern.step_interval_ms, 50);
        assert_eq!(config.pattern.fade_max_ms, 5000);
        assert_eq!(config.initial_slot, 1);
    }

    #[test]
    fn inverted_fade_bounds_are_rejected() {
        let result = PlayerConfig::from_json(r#"{"pattern": {"fade_min_ms": 600}}"#);
        assert_eq!(result, Err(ConfigError::FadeBounds));
    }

    #[test]
    fn zero_slot_is_rejected() {
        let result = PlayerConfig::from_json(r#"{"initial_slot": 0}"#);
        assert_eq!(result, Err(ConfigError::ZeroSlot));
    }

    #[test]
    fn invalid_json_reports_position() {
        let result = PlayerConfig::from_json("{\n  \"debounce_ms\": \"soon\"\n}");
        assert!(matches!(result, Err(ConfigError::Parse { line: 2, .. })));
    }
}
