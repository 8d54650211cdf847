/*
 * Moths
 *
 * A swarm of moths circles a lamp. Each moth orbits its own wandering point
 * near the light, twitches now and then, keeps a little distance from the
 * moths it happens to notice, and scatters when the pointer comes too close.
 *
 * Environment:
 * - MOTHS_CONFIG: optional JSON file overriding the swarm tunables
 * - MOTHS_DEVICE_TIER: `standard` (default) or `constrained`
 * - RUST_LOG: log filter, `info` by default
 */

use moths::{app, debug};

fn main() {
    debug::init_logging();
    nannou::app(app::model).update(app::update).run();
}
