/*
 * Schedule Module
 *
 * Decides, frame by frame, whether the swarm is simulated. Constrained
 * devices run the simulation on alternate frames only; the time of a skipped
 * frame is carried into the next simulated one so the swarm does not slow
 * down, and the previous poses stay on screen in between.
 */

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::MAX_STEP_SECONDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTier {
    #[default]
    Standard,
    Constrained,
}

impl DeviceTier {
    // Whether simulation updates run at half the render frame rate
    pub fn half_rate(self) -> bool {
        matches!(self, DeviceTier::Constrained)
    }
}

impl FromStr for DeviceTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(DeviceTier::Standard),
            "constrained" | "mobile" | "low" => Ok(DeviceTier::Constrained),
            other => Err(ConfigError::UnknownTier(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TickSchedule {
    half_rate: bool,
    frame: u64,
    pending: f32,
}

impl TickSchedule {
    pub fn new(half_rate: bool) -> Self {
        Self {
            half_rate,
            frame: 0,
            pending: 0.0,
        }
    }

    pub fn for_tier(tier: DeviceTier) -> Self {
        Self::new(tier.half_rate())
    }

    pub fn is_half_rate(&self) -> bool {
        self.half_rate
    }

    // Register a rendered frame. Returns the step to simulate, or None when
    // this frame is skipped.
    pub fn on_frame(&mut self, dt: f32) -> Option<f32> {
        // Negative or NaN frame times (clock hiccups) count as no time
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.pending += dt;

        let frame = self.frame;
        self.frame = self.frame.wrapping_add(1);
        if self.half_rate && frame % 2 == 1 {
            return None;
        }

        let step = self.pending.min(MAX_STEP_SECONDS);
        self.pending = 0.0;
        Some(step)
    }
}
