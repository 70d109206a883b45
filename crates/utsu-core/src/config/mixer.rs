//! Mixer defaults and timing

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{clamp_eq, clamp_volume, EQ_FLAT};

/// Initial mixer settings and deferred-play timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Initial master volume (0-100)
    pub master_volume: f32,
    /// Initial volume of every channel (0-100)
    pub channel_volume: f32,
    /// Initial position of every EQ band (0-100, 50 = flat)
    pub eq: f32,
    /// Delay before re-issuing play after a track change when the graph
    /// gives no readiness signal (milliseconds)
    pub retry_delay_ms: u64,
    /// Upper bound on waiting for a readiness signal after a track change
    /// (milliseconds)
    pub ready_timeout_ms: u64,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            master_volume: 80.0,
            channel_volume: 75.0,
            eq: EQ_FLAT,
            retry_delay_ms: 50,
            ready_timeout_ms: 500,
        }
    }
}

impl MixerConfig {
    /// Copy with every slider value clamped into its range
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        config.sanitize();
        config
    }

    /// Clamp slider values into range in place
    ///
    /// Non-finite values are replaced by the default. Returns one note per
    /// changed field, e.g. `master_volume: 140 -> 100`.
    pub fn sanitize(&mut self) -> Vec<String> {
        let defaults = Self::default();
        let fields: [(&str, &mut f32, f32, fn(f32) -> f32); 3] = [
            ("master_volume", &mut self.master_volume, defaults.master_volume, clamp_volume),
            ("channel_volume", &mut self.channel_volume, defaults.channel_volume, clamp_volume),
            ("eq", &mut self.eq, defaults.eq, clamp_eq),
        ];

        let mut notes = Vec::new();
        for (name, value, default, clamp) in fields {
            let fixed = if value.is_finite() { clamp(*value) } else { default };
            if fixed != *value {
                notes.push(format!("{}: {} -> {}", name, value, fixed));
                *value = fixed;
            }
        }
        notes
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MixerConfig::default();
        assert_eq!(config.master_volume, 80.0);
        assert_eq!(config.channel_volume, 75.0);
        assert_eq!(config.eq, 50.0);
        assert_eq!(config.retry_delay(), Duration::from_millis(50));
        assert_eq!(config.ready_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: MixerConfig = serde_yaml::from_str("master_volume: 60\n").unwrap();
        assert_eq!(config.master_volume, 60.0);
        assert_eq!(config.channel_volume, 75.0);
        assert_eq!(config.retry_delay_ms, 50);
    }

    #[test]
    fn test_sanitized_clamps_sliders() {
        let config = MixerConfig {
            master_volume: 140.0,
            channel_volume: -5.0,
            eq: 300.0,
            ..Default::default()
        };
        let clean = config.sanitized();
        assert_eq!(clean.master_volume, 100.0);
        assert_eq!(clean.channel_volume, 0.0);
        assert_eq!(clean.eq, 100.0);
        assert_eq!(clean.ready_timeout_ms, config.ready_timeout_ms);
    }

    #[test]
    fn test_sanitize_reports_changes() {
        let mut config = MixerConfig {
            master_volume: 140.0,
            eq: f32::NAN,
            ..Default::default()
        };
        let notes = config.sanitize();

        assert_eq!(notes, ["master_volume: 140 -> 100", "eq: NaN -> 50"]);
        assert_eq!(config.master_volume, 100.0);
        assert_eq!(config.eq, 50.0);
        assert!(config.sanitize().is_empty());
    }
}
