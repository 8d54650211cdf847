/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct with the per-frame metrics shown
 * in the UI, and sets up logging for the binary.
 *
 * Includes metrics for:
 * - FPS (frames per second)
 * - Frame time
 * - Simulated vs skipped frames (half-rate scheduling)
 * - Number of fleeing moths
 */

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::swarm::FrameReport;

// Debug information to display
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub simulated_frames: u64,
    pub skipped_frames: u64,
    pub last_step: f32,
    pub fleeing: usize,
    pub moths: usize,
}

impl DebugInfo {
    pub fn record(&mut self, report: FrameReport) {
        match report {
            FrameReport::AwaitingAnchor => {}
            FrameReport::Skipped => self.skipped_frames += 1,
            FrameReport::Simulated { step, fleeing } => {
                self.simulated_frames += 1;
                self.last_step = step;
                self.fleeing = fleeing;
            }
        }
    }
}

// Install the global tracing subscriber. RUST_LOG overrides the default
// `info` level; calling this twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
