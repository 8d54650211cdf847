/*
 * Population Module
 *
 * Owns the fixed-size collection of moths and drives one tick for all of
 * them. Peers are read through a PeerSnapshot taken at the start of each
 * tick, so moths never observe each other half-updated and update order does
 * not matter. The same seed gives the same swarm in sequential and parallel
 * mode, since every moth carries its own random source.
 */

use nannou::prelude::*;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::moth::{Moth, TickContext};
use crate::params::SwarmConfig;
use crate::pose::Pose;

// Read-only copy of every moth's position for one tick
#[derive(Debug, Clone, Default)]
pub struct PeerSnapshot {
    positions: Vec<Vec3>,
}

impl PeerSnapshot {
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        Self { positions }
    }

    // Refill from the current moths, reusing the buffer
    pub fn capture(&mut self, moths: &[Moth]) {
        self.positions.clear();
        self.positions.extend(moths.iter().map(|moth| moth.position));
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    // Pick a uniformly random peer other than `self_index`
    pub fn sample_peer<R: Rng + ?Sized>(&self, self_index: usize, rng: &mut R) -> Option<usize> {
        let len = self.positions.len();
        if self_index >= len {
            return (len > 0).then(|| rng.gen_range(0..len));
        }
        if len < 2 {
            return None;
        }
        let pick = rng.gen_range(0..len - 1);
        Some(if pick >= self_index { pick + 1 } else { pick })
    }
}

pub struct Population {
    moths: Vec<Moth>,
    anchor: Vec3,
    // Simulated seconds since spawn
    clock: f32,
    snapshot: PeerSnapshot,
}

impl Population {
    // Spawn `count` moths spread on a shell around `anchor`
    pub fn spawn<R: Rng + ?Sized>(anchor: Vec3, count: usize, config: &SwarmConfig, rng: &mut R) -> Self {
        let moths: Vec<Moth> = (0..count).map(|_| Moth::spawn(anchor, config, rng)).collect();
        info!(count, x = anchor.x, y = anchor.y, z = anchor.z, "spawned moth population");
        Self::from_moths(anchor, moths)
    }

    pub fn from_moths(anchor: Vec3, moths: Vec<Moth>) -> Self {
        let snapshot = PeerSnapshot {
            positions: Vec::with_capacity(moths.len()),
        };
        Self {
            moths,
            anchor,
            clock: 0.0,
            snapshot,
        }
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn len(&self) -> usize {
        self.moths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moths.is_empty()
    }

    pub fn moths(&self) -> &[Moth] {
        &self.moths
    }

    // Direct access for hosts that need to place moths by hand
    pub fn moths_mut(&mut self) -> &mut [Moth] {
        &mut self.moths
    }

    pub fn poses(&self) -> impl Iterator<Item = Pose> + '_ {
        self.moths.iter().map(Moth::pose)
    }

    pub fn fleeing_count(&self) -> usize {
        self.moths.iter().filter(|moth| moth.state.is_fleeing()).count()
    }

    // Advance every moth by `dt` seconds
    pub fn tick(&mut self, dt: f32, repulsion: Vec3, config: &SwarmConfig) {
        self.clock += dt;
        self.snapshot.capture(&self.moths);

        let ctx = TickContext {
            dt,
            time: self.clock,
            repulsion,
            config,
        };
        let peers = &self.snapshot;

        if config.enable_parallel {
            self.moths
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, moth)| moth.tick(i, &ctx, peers));
        } else {
            for (i, moth) in self.moths.iter_mut().enumerate() {
                moth.tick(i, &ctx, peers);
            }
        }

        debug!(fleeing = self.fleeing_count(), clock = self.clock, "population tick");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sample_peer_never_returns_self() {
        let mut rng = StdRng::seed_from_u64(21);
        let peers = PeerSnapshot::from_positions(vec![Vec3::ZERO; 5]);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let pick = peers.sample_peer(2, &mut rng).unwrap();
            assert_ne!(pick, 2);
            seen[pick] = true;
        }
        assert_eq!(seen, [true, true, false, true, true]);
    }

    #[test]
    fn sample_peer_needs_two_moths() {
        let mut rng = StdRng::seed_from_u64(22);
        assert_eq!(PeerSnapshot::from_positions(vec![Vec3::ZERO]).sample_peer(0, &mut rng), None);
        assert_eq!(PeerSnapshot::default().sample_peer(0, &mut rng), None);
    }

    #[test]
    fn get_is_bounds_checked() {
        let peers = PeerSnapshot::from_positions(vec![Vec3::ONE, Vec3::ZERO]);
        assert_eq!(peers.get(0), Some(Vec3::ONE));
        assert_eq!(peers.get(2), None);
    }

    #[test]
    fn spawn_builds_requested_count() {
        let config = SwarmConfig::default();
        let mut rng = StdRng::seed_from_u64(23);
        let population = Population::spawn(Vec3::ONE, 17, &config, &mut rng);
        assert_eq!(population.len(), 17);
        assert_eq!(population.poses().count(), 17);
        assert!(population.moths().iter().all(|m| m.anchor() == Vec3::ONE));
    }

    #[test]
    fn spawned_moths_are_spread_out() {
        let config = SwarmConfig::default();
        let mut rng = StdRng::seed_from_u64(24);
        let population = Population::spawn(Vec3::ZERO, 20, &config, &mut rng);
        let first = population.moths()[0].position;
        assert!(population.moths().iter().skip(1).any(|m| m.position.distance(first) > 0.1));
    }

    #[test]
    fn tick_advances_clock() {
        let config = SwarmConfig::default();
        let mut rng = StdRng::seed_from_u64(25);
        let mut population = Population::spawn(Vec3::ZERO, 4, &config, &mut rng);
        population.tick(0.5, Vec3::splat(100.0), &config);
        population.tick(0.25, Vec3::splat(100.0), &config);
        assert!((population.clock() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn parallel_and_sequential_ticks_agree() {
        let sequential = SwarmConfig::default();
        let parallel = SwarmConfig {
            enable_parallel: true,
            ..SwarmConfig::default()
        };

        let mut a = Population::spawn(Vec3::ZERO, 32, &sequential, &mut StdRng::seed_from_u64(26));
        let mut b = Population::spawn(Vec3::ZERO, 32, &parallel, &mut StdRng::seed_from_u64(26));

        for step in 0..90 {
            let repulsion = vec3((step as f32 * 0.1).sin(), 0.0, 0.0);
            a.tick(1.0 / 60.0, repulsion, &sequential);
            b.tick(1.0 / 60.0, repulsion, &parallel);
        }

        for (x, y) in a.moths().iter().zip(b.moths()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.state, y.state);
        }
    }
}
