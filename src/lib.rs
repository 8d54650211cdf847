/*
 * Moth Swarm Simulation - Module Definitions
 *
 * This file defines the module structure for the moth swarm.
 * The simulation core (moth, steering, pose, population, schedule, swarm)
 * has no rendering dependencies beyond nannou's math types; the remaining
 * modules are the nannou host that draws the swarm around a lamp.
 */

// Re-export key components for easier access
pub use moth::{Moth, MothState, Personality};
pub use pose::Pose;
pub use population::{PeerSnapshot, Population};
pub use schedule::{DeviceTier, TickSchedule};
pub use swarm::{FrameReport, RepulsionFeed, Swarm};
pub use params::{Span, SwarmConfig};
pub use error::ConfigError;

// Simulation core
pub mod error;
pub mod moth;
pub mod params;
pub mod pose;
pub mod population;
pub mod schedule;
pub mod steering;
pub mod swarm;

// Host
pub mod app;
pub mod camera;
pub mod debug;
pub mod input;
pub mod renderer;
pub mod ui;

// Constants

// Velocities are expressed in world units per frame at this rate.
pub const REFERENCE_FRAME_RATE: f32 = 60.0;

// Longest step a single simulation tick may integrate (seconds).
pub const MAX_STEP_SECONDS: f32 = 0.1;

// Lengths below this are treated as zero before normalizing.
pub const EPSILON: f32 = 1e-6;
