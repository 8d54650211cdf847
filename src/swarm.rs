/*
 * Swarm Module
 *
 * The host-facing entry point of the simulation. It waits for the anchor
 * (the lamp) to be known before spawning, reads the repulsion point once per
 * frame, applies the device tier's update schedule and exposes the poses.
 */

use std::sync::{Arc, Mutex};

use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::params::SwarmConfig;
use crate::population::Population;
use crate::pose::Pose;
use crate::schedule::{DeviceTier, TickSchedule};

// Where the repulsion point rests when nothing is pointing at the scene
pub const PARKED_DISTANCE: f32 = 1.0e4;

pub fn parked_repulsion() -> Vec3 {
    Vec3::splat(PARKED_DISTANCE)
}

// Shared repulsion point, written by input handling and read by the swarm.
// Each frame works on a snapshot, so a writer on another thread can never
// change the point halfway through a tick.
#[derive(Debug, Clone)]
pub struct RepulsionFeed {
    point: Arc<Mutex<Vec3>>,
}

impl Default for RepulsionFeed {
    fn default() -> Self {
        Self {
            point: Arc::new(Mutex::new(parked_repulsion())),
        }
    }
}

impl RepulsionFeed {
    pub fn set(&self, point: Vec3) {
        if !point.is_finite() {
            return;
        }
        let mut guard = self.point.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = point;
    }

    // Move the point out of reach (pointer left the window)
    pub fn park(&self) {
        self.set(parked_repulsion());
    }

    pub fn snapshot(&self) -> Vec3 {
        *self.point.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameReport {
    // The anchor has not been resolved yet, nothing exists to simulate
    AwaitingAnchor,
    // Half-rate frame; previous poses stay in effect
    Skipped,
    Simulated { step: f32, fleeing: usize },
}

pub struct Swarm {
    config: SwarmConfig,
    tier: DeviceTier,
    population: Option<Population>,
    feed: RepulsionFeed,
    schedule: TickSchedule,
    rng: StdRng,
}

impl Swarm {
    pub fn new(config: SwarmConfig, tier: DeviceTier) -> Self {
        Self::with_rng(config, tier, StdRng::from_entropy())
    }

    // Reproducible swarm for tests and benchmarks
    pub fn with_seed(config: SwarmConfig, tier: DeviceTier, seed: u64) -> Self {
        Self::with_rng(config, tier, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SwarmConfig, tier: DeviceTier, rng: StdRng) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                warn!(error = %err, "invalid swarm config, using defaults");
                SwarmConfig::default()
            }
        };
        Self {
            config,
            tier,
            population: None,
            feed: RepulsionFeed::default(),
            schedule: TickSchedule::for_tier(tier),
            rng,
        }
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    // Swap tunables at runtime. Population size stays as spawned.
    pub fn set_config(&mut self, config: SwarmConfig) {
        if let Err(err) = config.validate() {
            warn!(error = %err, "ignoring invalid swarm config");
            return;
        }
        self.config = config;
    }

    pub fn tier(&self) -> DeviceTier {
        self.tier
    }

    pub fn is_ready(&self) -> bool {
        self.population.is_some()
    }

    pub fn population(&self) -> Option<&Population> {
        self.population.as_ref()
    }

    pub fn population_mut(&mut self) -> Option<&mut Population> {
        self.population.as_mut()
    }

    // Handle for the input side to write the repulsion point through
    pub fn repulsion_feed(&self) -> RepulsionFeed {
        self.feed.clone()
    }

    // One-time signal that the scene has loaded and the lamp is at `anchor`.
    // Returns false if the population already exists.
    pub fn resolve_anchor(&mut self, anchor: Vec3) -> bool {
        if let Some(population) = &self.population {
            warn!(
                existing = ?population.anchor(),
                ignored = ?anchor,
                "anchor already resolved"
            );
            return false;
        }

        let count = self.config.population_for(self.tier);
        info!(?anchor, count, tier = ?self.tier, "anchor resolved");
        self.population = Some(Population::spawn(anchor, count, &self.config, &mut self.rng));
        true
    }

    // Called once per rendered frame with the time since the previous one
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        let Some(population) = self.population.as_mut() else {
            return FrameReport::AwaitingAnchor;
        };
        let Some(step) = self.schedule.on_frame(dt) else {
            return FrameReport::Skipped;
        };

        let repulsion = self.feed.snapshot();
        population.tick(step, repulsion, &self.config);
        FrameReport::Simulated {
            step,
            fleeing: population.fleeing_count(),
        }
    }

    // Latest pose of every moth, empty until the anchor is resolved
    pub fn poses(&self) -> impl Iterator<Item = Pose> + '_ {
        self.population.iter().flat_map(|population| population.poses())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_wait_for_the_anchor() {
        let mut swarm = Swarm::with_seed(SwarmConfig::default(), DeviceTier::Standard, 1);
        assert_eq!(swarm.frame(1.0 / 60.0), FrameReport::AwaitingAnchor);
        assert_eq!(swarm.poses().count(), 0);
    }

    #[test]
    fn anchor_resolves_once() {
        let config = SwarmConfig::default();
        let mut swarm = Swarm::with_seed(config.clone(), DeviceTier::Standard, 2);
        assert!(swarm.resolve_anchor(Vec3::ZERO));
        assert!(!swarm.resolve_anchor(Vec3::ONE));
        let population = swarm.population().unwrap();
        assert_eq!(population.anchor(), Vec3::ZERO);
        assert_eq!(population.len(), config.standard_population);
    }

    #[test]
    fn constrained_tier_spawns_fewer_and_skips_frames() {
        let config = SwarmConfig::default();
        let mut swarm = Swarm::with_seed(config.clone(), DeviceTier::Constrained, 3);
        swarm.resolve_anchor(Vec3::ZERO);
        assert_eq!(swarm.poses().count(), config.constrained_population);

        assert!(matches!(swarm.frame(1.0 / 60.0), FrameReport::Simulated { .. }));
        let before: Vec<Pose> = swarm.poses().collect();
        assert_eq!(swarm.frame(1.0 / 60.0), FrameReport::Skipped);
        let after: Vec<Pose> = swarm.poses().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn feed_writes_reach_the_swarm() {
        let config = SwarmConfig::default();
        let mut swarm = Swarm::with_seed(config, DeviceTier::Standard, 4);
        swarm.resolve_anchor(Vec3::ZERO);

        let feed = swarm.repulsion_feed();
        let target = swarm.population().unwrap().moths()[0].position;
        feed.set(target);

        match swarm.frame(1.0 / 60.0) {
            FrameReport::Simulated { fleeing, .. } => assert!(fleeing >= 1),
            other => panic!("expected a simulated frame, got {other:?}"),
        }
    }

    #[test]
    fn feed_ignores_non_finite_points() {
        let feed = RepulsionFeed::default();
        feed.set(Vec3::ONE);
        feed.set(vec3(f32::NAN, 0.0, 0.0));
        assert_eq!(feed.snapshot(), Vec3::ONE);
        feed.park();
        assert_eq!(feed.snapshot(), parked_repulsion());
    }

    #[test]
    fn invalid_runtime_config_is_rejected() {
        let mut swarm = Swarm::with_seed(SwarmConfig::default(), DeviceTier::Standard, 5);
        let bad = SwarmConfig {
            damping: 2.0,
            ..SwarmConfig::default()
        };
        swarm.set_config(bad);
        assert_eq!(swarm.config().damping, SwarmConfig::default().damping);
    }

    #[test]
    fn invalid_initial_config_falls_back_to_defaults() {
        let bad = SwarmConfig {
            initial_speed: f32::NAN,
            ..SwarmConfig::default()
        };
        let mut swarm = Swarm::with_seed(bad, DeviceTier::Standard, 6);
        assert_eq!(swarm.config(), &SwarmConfig::default());
        assert!(swarm.resolve_anchor(Vec3::ZERO));
        assert!(swarm.poses().all(|pose| pose.position.is_finite()));
    }
}
