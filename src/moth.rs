/*
 * Moth Module
 *
 * This module defines the Moth struct and its per-tick behaviour.
 * A moth is either swarming around the lamp or fleeing the repulsion
 * point (the projected cursor). Its personality (anchor, phase, personal
 * orbit offset, speed cap) is rolled once at spawn and never changes.
 */

use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::params::SwarmConfig;
use crate::pose::{self, Pose};
use crate::population::PeerSnapshot;
use crate::steering;
use crate::REFERENCE_FRAME_RATE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MothState {
    Swarming,
    // Seconds left before the moth calms down
    Fleeing { remaining: f32 },
}

impl MothState {
    pub fn is_fleeing(&self) -> bool {
        matches!(self, MothState::Fleeing { .. })
    }
}

// Fixed per-moth traits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Personality {
    pub anchor: Vec3,
    pub swarm_phase: f32,
    pub individual_offset: Vec3,
    pub orbit_radius: f32,
    // Per-axis angular frequency of the orbit (radians per second)
    pub orbit_frequency: Vec3,
    pub max_speed: f32,
}

impl Personality {
    pub fn roll<R: Rng + ?Sized>(anchor: Vec3, config: &SwarmConfig, rng: &mut R) -> Self {
        let extent = config.individual_offset_extent;
        let mut offset_axis = || {
            if extent > 0.0 {
                rng.gen_range(-extent..=extent)
            } else {
                0.0
            }
        };
        let individual_offset = vec3(offset_axis(), offset_axis(), offset_axis());

        Self {
            anchor,
            swarm_phase: rng.gen_range(0.0..TAU),
            individual_offset,
            orbit_radius: config.orbit_radius.sample(rng),
            orbit_frequency: vec3(
                config.orbit_frequency.sample(rng),
                config.orbit_frequency.sample(rng),
                config.orbit_frequency.sample(rng),
            ),
            max_speed: config.max_speed.sample(rng),
        }
    }
}

// Everything a moth needs from the outside for one tick
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub dt: f32,
    // Swarm clock in seconds, drives the orbits and jitter
    pub time: f32,
    pub repulsion: Vec3,
    pub config: &'a SwarmConfig,
}

impl TickContext<'_> {
    pub fn frame_scale(&self) -> f32 {
        self.dt * REFERENCE_FRAME_RATE
    }
}

#[derive(Debug, Clone)]
pub struct Moth {
    pub position: Vec3,
    pub velocity: Vec3,
    pub state: MothState,
    pub wiggle_timer: f32,
    pub wing_phase: f32,
    personality: Personality,
    rng: StdRng,
    pose: Pose,
}

impl Moth {
    pub fn new(personality: Personality, position: Vec3, velocity: Vec3, seed: u64) -> Self {
        Self {
            position,
            velocity,
            state: MothState::Swarming,
            wiggle_timer: 0.0,
            wing_phase: 0.0,
            personality,
            rng: StdRng::seed_from_u64(seed),
            pose: Pose::at(position),
        }
    }

    // Spawn a moth on a spherical shell around `anchor`
    pub fn spawn<R: Rng + ?Sized>(anchor: Vec3, config: &SwarmConfig, rng: &mut R) -> Self {
        let personality = Personality::roll(anchor, config, rng);
        let radius = config.spawn_shell.sample(rng);
        let position = anchor + steering::random_unit_vector(rng) * radius;
        let velocity = steering::random_unit_vector(rng) * rng.gen_range(0.0..=config.initial_speed);

        let mut moth = Moth::new(personality, position, velocity, rng.gen());
        moth.wiggle_timer = config.wiggle_interval.sample(rng);
        moth.wing_phase = rng.gen_range(0.0..TAU);
        moth.pose = Pose::from_motion(position, velocity, moth.wing_phase, config.flap_amplitude, 0.0);
        moth
    }

    pub fn personality(&self) -> &Personality {
        &self.personality
    }

    pub fn anchor(&self) -> Vec3 {
        self.personality.anchor
    }

    pub fn max_speed(&self) -> f32 {
        self.personality.max_speed
    }

    // Seconds left in the fleeing state, zero while swarming
    pub fn flee_timer(&self) -> f32 {
        match self.state {
            MothState::Fleeing { remaining } => remaining,
            MothState::Swarming => 0.0,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    // Sum of the swarming terms for this tick
    fn swarm_acceleration(&mut self, ctx: &TickContext) -> Vec3 {
        let config = ctx.config;
        let target = steering::orbit_target(&self.personality, ctx.time, config);

        let mut acceleration = steering::seek(self.position, target, config);
        acceleration += steering::ambient_jitter(ctx.time, self.personality.swarm_phase, config);

        self.wiggle_timer -= ctx.dt;
        if self.wiggle_timer <= 0.0 {
            acceleration += steering::random_unit_vector(&mut self.rng) * config.wiggle_strength;
            self.wiggle_timer = config.wiggle_interval.sample(&mut self.rng);
        }

        acceleration + steering::containment(self.position, self.personality.anchor, config)
    }

    // Run one simulation tick. `index` is this moth's slot in `peers`.
    pub fn tick(&mut self, index: usize, ctx: &TickContext, peers: &PeerSnapshot) {
        let config = ctx.config;

        self.state = steering::update_state(
            self.state,
            self.position,
            ctx.repulsion,
            ctx.dt,
            &mut self.rng,
            config,
        );

        let mut acceleration = match self.state {
            MothState::Swarming => self.swarm_acceleration(ctx),
            MothState::Fleeing { .. } => steering::flee(self.position, ctx.repulsion, config),
        };
        acceleration += steering::separation(self.position, index, peers, &mut self.rng, config);

        // A fleeing moth never closes in on the repulsion point
        if self.state.is_fleeing() {
            self.velocity = steering::shed_inbound(self.velocity, self.position, ctx.repulsion);
            acceleration = steering::shed_inbound(acceleration, self.position, ctx.repulsion);
        }

        let (position, velocity) = steering::integrate(
            self.position,
            self.velocity,
            acceleration,
            self.personality.max_speed,
            config.damping,
            ctx.frame_scale(),
        );
        self.position = position;
        self.velocity = velocity;

        let wobble = if config.wing_wobble > 0.0 {
            self.rng.gen_range(-config.wing_wobble..=config.wing_wobble)
        } else {
            0.0
        };
        self.wing_phase = pose::advance_wing_phase(self.wing_phase, ctx.dt, config.wing_rate, wobble);
        self.pose = Pose::from_motion(
            self.position,
            self.velocity,
            self.wing_phase,
            config.flap_amplitude,
            self.pose.yaw,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(config: &SwarmConfig, repulsion: Vec3) -> TickContext<'_> {
        TickContext {
            dt: 1.0 / 60.0,
            time: 0.0,
            repulsion,
            config,
        }
    }

    #[test]
    fn spawned_moth_sits_on_the_shell() {
        let config = SwarmConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let anchor = vec3(1.0, 2.0, 3.0);
        for _ in 0..100 {
            let moth = Moth::spawn(anchor, &config, &mut rng);
            let r = moth.position.distance(anchor);
            assert!(r >= config.spawn_shell.min - 1e-4 && r <= config.spawn_shell.max + 1e-4);
            assert!(moth.velocity.length() <= config.initial_speed + 1e-6);
            assert!(config.max_speed.contains(moth.max_speed()));
            assert_eq!(moth.state, MothState::Swarming);
        }
    }

    #[test]
    fn personality_survives_ticks() {
        let config = SwarmConfig::default();
        let mut rng = StdRng::seed_from_u64(12);
        let mut moth = Moth::spawn(Vec3::ZERO, &config, &mut rng);
        let before = *moth.personality();
        let peers = PeerSnapshot::from_positions(vec![moth.position]);

        for step in 0..120 {
            let repulsion = if step % 2 == 0 { moth.position } else { Vec3::splat(50.0) };
            moth.tick(0, &context(&config, repulsion), &peers);
        }
        assert_eq!(*moth.personality(), before);
    }

    #[test]
    fn wiggle_timer_rerolls_after_impulse() {
        let config = SwarmConfig::default();
        let mut rng = StdRng::seed_from_u64(13);
        let mut moth = Moth::spawn(Vec3::ZERO, &config, &mut rng);
        moth.wiggle_timer = 0.001;
        let peers = PeerSnapshot::from_positions(vec![moth.position]);

        moth.tick(0, &context(&config, Vec3::splat(50.0)), &peers);
        assert!(config.wiggle_interval.contains(moth.wiggle_timer));
    }

    #[test]
    fn pose_tracks_position() {
        let config = SwarmConfig::default();
        let mut rng = StdRng::seed_from_u64(14);
        let mut moth = Moth::spawn(Vec3::ZERO, &config, &mut rng);
        let peers = PeerSnapshot::from_positions(vec![moth.position]);

        moth.tick(0, &context(&config, Vec3::splat(50.0)), &peers);
        assert_eq!(moth.pose().position, moth.position);
    }

    #[test]
    fn flee_timer_is_zero_while_swarming() {
        let config = SwarmConfig::default();
        let mut rng = StdRng::seed_from_u64(15);
        let moth = Moth::spawn(Vec3::ZERO, &config, &mut rng);
        assert_eq!(moth.flee_timer(), 0.0);
    }
}
