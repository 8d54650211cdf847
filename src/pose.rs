/*
 * Pose Module
 *
 * Orientation and wing animation are derived from motion, never simulated.
 * Everything here is a pure function so the steering code can be tested
 * without any rendering-facing output.
 */

use nannou::prelude::*;
use std::f32::consts::TAU;

use crate::EPSILON;

// Pitch response to vertical speed (radians per unit/frame), and its limit
const PITCH_GAIN: f32 = 8.0;
const MAX_PITCH: f32 = 0.6;

// What the render adapter needs to place one moth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    // Heading around the world Y axis, 0 facing +Z
    pub yaw: f32,
    // Nose-up positive
    pub pitch: f32,
    pub wing_left: f32,
    pub wing_right: f32,
}

impl Pose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            wing_left: 0.0,
            wing_right: 0.0,
        }
    }

    // Derive a pose from the current kinematics.
    //
    // `previous_yaw` is kept when the moth has no horizontal motion, so a
    // hovering moth does not snap back to facing +Z.
    pub fn from_motion(
        position: Vec3,
        velocity: Vec3,
        wing_phase: f32,
        flap_amplitude: f32,
        previous_yaw: f32,
    ) -> Self {
        let horizontal_sq = velocity.x * velocity.x + velocity.z * velocity.z;
        let yaw = if horizontal_sq > EPSILON * EPSILON {
            velocity.x.atan2(velocity.z)
        } else {
            previous_yaw
        };

        let pitch = if velocity.y.is_finite() {
            (velocity.y * PITCH_GAIN).clamp(-MAX_PITCH, MAX_PITCH)
        } else {
            0.0
        };

        let flap = wing_phase.sin() * flap_amplitude;

        Self {
            position,
            yaw,
            pitch,
            wing_left: flap,
            wing_right: -flap,
        }
    }
}

// Advance the flapping phase by a fixed rate plus a per-tick wobble.
// The phase is kept in [0, TAU).
pub fn advance_wing_phase(phase: f32, dt: f32, rate: f32, wobble: f32) -> f32 {
    let step = ((rate + wobble) * dt).max(0.0);
    (phase + step).rem_euclid(TAU)
}
