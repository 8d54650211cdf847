/*
 * Simulation Parameters Module
 *
 * This module defines the SwarmConfig struct holding every tunable of the
 * moth swarm. Values can be loaded from JSON, adjusted through the UI, and
 * are validated before a swarm is built from them.
 *
 * Units: distances are world units (the lamp scene is modelled in metres),
 * accelerations and speeds are per frame at REFERENCE_FRAME_RATE, timers are
 * seconds.
 */

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::schedule::DeviceTier;

// Inclusive range a per-moth or per-event value is rolled from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    // Fleeing
    pub trigger_radius: f32,
    pub flee_duration: Span,
    pub flee_strength: f32,
    pub min_flee_distance: f32,

    // Orbit seeking
    pub seek_strength: f32,
    pub seek_dead_zone: f32,
    pub orbit_radius: Span,
    pub orbit_frequency: Span,
    pub orbit_vertical_ratio: f32,
    pub individual_offset_extent: f32,
    pub individual_offset_scale: f32,

    // Ambient motion
    pub jitter_amplitude: f32,
    pub jitter_frequency: f32,
    pub wiggle_interval: Span,
    pub wiggle_strength: f32,

    // Containment
    pub outer_radius: f32,
    pub containment_strength: f32,

    // Separation
    pub separation_radius: f32,
    pub separation_samples: usize,
    pub separation_weight: f32,

    // Integration
    pub damping: f32,
    pub max_speed: Span,

    // Spawning
    pub spawn_shell: Span,
    pub initial_speed: f32,

    // Wings
    pub wing_rate: f32,
    pub wing_wobble: f32,
    pub flap_amplitude: f32,

    // Population and performance
    pub standard_population: usize,
    pub constrained_population: usize,
    pub enable_parallel: bool,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            trigger_radius: 1.2,
            flee_duration: Span::new(0.8, 1.8),
            flee_strength: 0.006,
            min_flee_distance: 0.15,

            seek_strength: 0.0018,
            seek_dead_zone: 0.08,
            orbit_radius: Span::new(0.5, 1.3),
            orbit_frequency: Span::new(0.25, 0.7),
            orbit_vertical_ratio: 0.45,
            individual_offset_extent: 0.6,
            individual_offset_scale: 1.0,

            jitter_amplitude: 0.0006,
            jitter_frequency: 3.5,
            wiggle_interval: Span::new(0.4, 1.6),
            wiggle_strength: 0.012,

            outer_radius: 4.0,
            containment_strength: 0.003,

            separation_radius: 0.3,
            separation_samples: 3,
            separation_weight: 0.0015,

            damping: 0.96,
            max_speed: Span::new(0.035, 0.06),

            spawn_shell: Span::new(0.6, 1.6),
            initial_speed: 0.01,

            wing_rate: 28.0,
            wing_wobble: 6.0,
            flap_amplitude: 0.9,

            standard_population: 60,
            constrained_population: 24,
            enable_parallel: false,
        }
    }
}

impl SwarmConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SwarmConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    // Number of moths spawned for a device tier
    pub fn population_for(&self, tier: DeviceTier) -> usize {
        match tier {
            DeviceTier::Standard => self.standard_population,
            DeviceTier::Constrained => self.constrained_population,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("trigger_radius", self.trigger_radius)?;
        check_positive("min_flee_distance", self.min_flee_distance)?;
        check_non_negative("flee_strength", self.flee_strength)?;
        check_span("flee_duration", self.flee_duration, true)?;

        check_non_negative("seek_strength", self.seek_strength)?;
        check_non_negative("seek_dead_zone", self.seek_dead_zone)?;
        check_span("orbit_radius", self.orbit_radius, false)?;
        check_span("orbit_frequency", self.orbit_frequency, false)?;
        check_non_negative("orbit_vertical_ratio", self.orbit_vertical_ratio)?;
        check_non_negative("individual_offset_extent", self.individual_offset_extent)?;
        check_non_negative("individual_offset_scale", self.individual_offset_scale)?;

        check_non_negative("jitter_amplitude", self.jitter_amplitude)?;
        check_non_negative("jitter_frequency", self.jitter_frequency)?;
        check_span("wiggle_interval", self.wiggle_interval, true)?;
        check_non_negative("wiggle_strength", self.wiggle_strength)?;

        check_positive("outer_radius", self.outer_radius)?;
        check_non_negative("containment_strength", self.containment_strength)?;

        check_positive("separation_radius", self.separation_radius)?;
        check_non_negative("separation_weight", self.separation_weight)?;
        if self.separation_samples == 0 {
            return Err(invalid("separation_samples", "must sample at least one peer"));
        }

        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(invalid("damping", format!("{} is not in (0, 1)", self.damping)));
        }
        check_span("max_speed", self.max_speed, true)?;

        check_span("spawn_shell", self.spawn_shell, false)?;
        check_non_negative("initial_speed", self.initial_speed)?;

        check_positive("wing_rate", self.wing_rate)?;
        check_non_negative("wing_wobble", self.wing_wobble)?;
        if self.wing_wobble >= self.wing_rate {
            // Phase must keep advancing even on the most negative wobble
            return Err(invalid("wing_wobble", "must be smaller than wing_rate"));
        }
        check_non_negative("flap_amplitude", self.flap_amplitude)?;

        if self.standard_population == 0 {
            return Err(invalid("standard_population", "must be at least 1"));
        }
        if self.constrained_population == 0 {
            return Err(invalid("constrained_population", "must be at least 1"));
        }

        Ok(())
    }

    // Get parameter ranges for UI sliders
    pub fn get_trigger_radius_range() -> std::ops::RangeInclusive<f32> {
        0.2..=4.0
    }

    pub fn get_outer_radius_range() -> std::ops::RangeInclusive<f32> {
        1.0..=12.0
    }

    pub fn get_strength_range() -> std::ops::RangeInclusive<f32> {
        0.0..=0.02
    }

    pub fn get_separation_radius_range() -> std::ops::RangeInclusive<f32> {
        0.05..=1.5
    }

    pub fn get_separation_samples_range() -> std::ops::RangeInclusive<usize> {
        1..=12
    }

    pub fn get_damping_range() -> std::ops::RangeInclusive<f32> {
        0.8..=0.995
    }

    pub fn get_population_range() -> std::ops::RangeInclusive<usize> {
        1..=2000
    }
}

// Read the host configuration from the environment.
//
// MOTHS_CONFIG points at an optional JSON config file and MOTHS_DEVICE_TIER
// selects `standard` or `constrained`. Anything unreadable falls back to the
// defaults with a warning.
pub fn from_env() -> (SwarmConfig, DeviceTier) {
    let config = match std::env::var("MOTHS_CONFIG") {
        Ok(path) => match SwarmConfig::load(&path) {
            Ok(config) => {
                info!(%path, "loaded swarm config");
                config
            }
            Err(err) => {
                warn!(%path, error = %err, "falling back to default swarm config");
                SwarmConfig::default()
            }
        },
        Err(_) => SwarmConfig::default(),
    };

    let tier = match std::env::var("MOTHS_DEVICE_TIER") {
        Ok(value) => value.parse().unwrap_or_else(|err: ConfigError| {
            warn!(error = %err, "falling back to standard device tier");
            DeviceTier::Standard
        }),
        Err(_) => DeviceTier::Standard,
    };

    (config, tier)
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be positive")))
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be non-negative")))
    }
}

fn check_span(field: &'static str, span: Span, strictly_positive: bool) -> Result<(), ConfigError> {
    if !span.min.is_finite() || !span.max.is_finite() {
        return Err(invalid(field, "bounds must be finite"));
    }
    if span.min > span.max {
        return Err(invalid(field, format!("min {} exceeds max {}", span.min, span.max)));
    }
    if strictly_positive && span.min <= 0.0 {
        return Err(invalid(field, format!("min {} must be positive", span.min)));
    }
    if span.min < 0.0 {
        return Err(invalid(field, format!("min {} must be non-negative", span.min)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn default_config_is_valid() {
        assert!(SwarmConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SwarmConfig::from_json_str(r#"{ "trigger_radius": 2.5, "enable_parallel": true }"#)
            .expect("partial config should parse");
        assert_eq!(config.trigger_radius, 2.5);
        assert!(config.enable_parallel);
        assert_eq!(config.outer_radius, SwarmConfig::default().outer_radius);
    }

    #[test]
    fn damping_outside_unit_interval_is_rejected() {
        let err = SwarmConfig::from_json_str(r#"{ "damping": 1.2 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "damping", .. }));
    }

    #[test]
    fn inverted_span_is_rejected() {
        let config = SwarmConfig {
            flee_duration: Span::new(2.0, 1.0),
            ..SwarmConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "flee_duration", .. })
        ));
    }

    #[test]
    fn zero_separation_samples_is_rejected() {
        let config = SwarmConfig {
            separation_samples: 0,
            ..SwarmConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            SwarmConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SwarmConfig::load("/definitely/not/here/moths.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn span_samples_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let span = Span::new(0.4, 1.6);
        for _ in 0..1000 {
            assert!(span.contains(span.sample(&mut rng)));
        }
        assert_eq!(Span::new(3.0, 3.0).sample(&mut rng), 3.0);
    }

    #[test]
    fn population_follows_device_tier() {
        let config = SwarmConfig::default();
        assert_eq!(config.population_for(DeviceTier::Standard), config.standard_population);
        assert_eq!(config.population_for(DeviceTier::Constrained), config.constrained_population);
        assert!(config.constrained_population < config.standard_population);
    }
}
