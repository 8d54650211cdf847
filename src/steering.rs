/*
 * Steering Module
 *
 * This module computes the acceleration terms that drive a moth:
 * - Seek: fly towards a moving personal orbit point around the lamp
 * - Jitter: constant low-amplitude micro motion
 * - Impulse: occasional random kicks (rolled by the moth's wiggle timer)
 * - Containment: pull back towards the lamp past the outer radius
 * - Flee: push away from the repulsion point while frightened
 * - Separation: push away from a few randomly sampled peers
 *
 * Every term short-circuits to zero on degenerate geometry, so no term can
 * produce NaN or infinity.
 */

use nannou::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use crate::moth::{MothState, Personality};
use crate::params::SwarmConfig;
use crate::population::PeerSnapshot;
use crate::EPSILON;

// Floor for the inverse-distance weight of a separation sample
const MIN_SEPARATION_DISTANCE: f32 = 0.05;

// Unit vector along `v`, or None when `v` is too short to have a direction
pub fn direction(v: Vec3) -> Option<(Vec3, f32)> {
    let length = v.length();
    if length.is_finite() && length > EPSILON {
        Some((v / length, length))
    } else {
        None
    }
}

// Uniformly distributed direction on the unit sphere
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta: f32 = rng.gen_range(0.0..TAU);
    let ring = (1.0 - z * z).max(0.0).sqrt();
    vec3(ring * theta.cos(), z, ring * theta.sin())
}

// Lissajous-like offset from the anchor at `time`
pub fn orbit_offset(personality: &Personality, time: f32, config: &SwarmConfig) -> Vec3 {
    let phase = personality.swarm_phase;
    let freq = personality.orbit_frequency;
    let radius = personality.orbit_radius;

    let x = (time * freq.x + phase).sin() + 0.3 * (time * freq.x * 2.3 + phase * 0.7).sin();
    let y = (time * freq.y + phase * 2.0).sin();
    let z = (time * freq.z + phase).cos() + 0.3 * (time * freq.z * 1.7 + phase * 1.3).cos();

    vec3(x * radius, y * radius * config.orbit_vertical_ratio, z * radius)
}

pub fn orbit_target(personality: &Personality, time: f32, config: &SwarmConfig) -> Vec3 {
    personality.anchor
        + orbit_offset(personality, time, config)
        + personality.individual_offset * config.individual_offset_scale
}

// Constant-strength pull towards `target`, silent inside the dead zone
pub fn seek(position: Vec3, target: Vec3, config: &SwarmConfig) -> Vec3 {
    match direction(target - position) {
        Some((dir, distance)) if distance > config.seek_dead_zone => dir * config.seek_strength,
        _ => Vec3::ZERO,
    }
}

pub fn ambient_jitter(time: f32, phase: f32, config: &SwarmConfig) -> Vec3 {
    let t = time * config.jitter_frequency;
    vec3(
        (t + phase).sin(),
        (t * 1.3 + phase + 2.0).sin(),
        (t * 0.7 + phase + 4.0).cos(),
    ) * config.jitter_amplitude
}

// Return-to-anchor pull past the outer radius, growing with the overshoot
pub fn containment(position: Vec3, anchor: Vec3, config: &SwarmConfig) -> Vec3 {
    match direction(anchor - position) {
        Some((dir, distance)) if distance > config.outer_radius => {
            let overshoot = (distance - config.outer_radius) / config.outer_radius;
            dir * config.containment_strength * (1.0 + overshoot)
        }
        _ => Vec3::ZERO,
    }
}

// Push directly away from the repulsion point, sharper up close
pub fn flee(position: Vec3, repulsion: Vec3, config: &SwarmConfig) -> Vec3 {
    match direction(position - repulsion) {
        Some((dir, distance)) => dir * (config.flee_strength / distance.max(config.min_flee_distance)),
        None => Vec3::ZERO,
    }
}

// Sampled separation.
//
// Only `separation_samples` random peers are looked at each tick instead of
// the whole population. Over many ticks every close neighbour is seen often
// enough for the flock to spread out.
// Drop the part of `v` that points back toward `repulsion`
pub fn shed_inbound(v: Vec3, position: Vec3, repulsion: Vec3) -> Vec3 {
    match direction(position - repulsion) {
        Some((away, _)) => {
            let radial = v.dot(away);
            if radial < 0.0 {
                v - away * radial
            } else {
                v
            }
        }
        None => v,
    }
}

pub fn separation<R: Rng + ?Sized>(
    position: Vec3,
    self_index: usize,
    peers: &PeerSnapshot,
    rng: &mut R,
    config: &SwarmConfig,
) -> Vec3 {
    let mut push = Vec3::ZERO;
    let mut count = 0;

    for _ in 0..config.separation_samples {
        let Some(other) = peers.sample_peer(self_index, rng) else {
            break;
        };
        let Some(peer) = peers.get(other) else {
            continue;
        };
        let diff = position - peer;
        let Some((away, distance)) = direction(diff) else {
            continue;
        };
        if distance < config.separation_radius {
            push += away / distance.max(MIN_SEPARATION_DISTANCE);
            count += 1;
        }
    }

    if count > 0 {
        push / count as f32 * config.separation_weight
    } else {
        Vec3::ZERO
    }
}

// Advance the Swarming/Fleeing state machine by `dt` seconds.
//
// A moth inside the trigger radius starts fleeing on the same tick. While
// fleeing, the timer only counts down; it is never refreshed early.
pub fn update_state<R: Rng + ?Sized>(
    state: MothState,
    position: Vec3,
    repulsion: Vec3,
    dt: f32,
    rng: &mut R,
    config: &SwarmConfig,
) -> MothState {
    let state = match state {
        MothState::Fleeing { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                return MothState::Fleeing { remaining };
            }
            MothState::Swarming
        }
        MothState::Swarming => MothState::Swarming,
    };

    let distance = position.distance(repulsion);
    if distance.is_finite() && distance < config.trigger_radius {
        MothState::Fleeing {
            remaining: config.flee_duration.sample(rng),
        }
    } else {
        state
    }
}

// Add acceleration, clamp to `max_speed`, apply drag, then move.
//
// `frame_scale` is the tick length in reference frames, so a double-length
// tick on a half-rate device covers the same distance as two normal ones.
pub fn integrate(
    position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    max_speed: f32,
    damping: f32,
    frame_scale: f32,
) -> (Vec3, Vec3) {
    let mut velocity = velocity + acceleration * frame_scale;
    if !velocity.is_finite() {
        velocity = Vec3::ZERO;
    }

    // Limit speed
    let speed_sq = velocity.length_squared();
    if speed_sq > max_speed * max_speed {
        velocity *= max_speed / speed_sq.sqrt();
    }

    velocity *= damping.powf(frame_scale);

    let moved = position + velocity * frame_scale;
    if moved.is_finite() {
        (moved, velocity)
    } else {
        (position, Vec3::ZERO)
    }
}
