/*
 * Application Module
 *
 * This module defines the nannou model for the moth scene: a lamp in a
 * room, watched by a perspective camera, with the swarm orbiting the lamp.
 * It wires the host signals into the swarm:
 * - The anchor is resolved once the scene is ready (first update)
 * - The pointer feeds the repulsion point (see input)
 * - Every update drives one frame of the tick schedule
 */

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::info;

use crate::camera::OrbitCamera;
use crate::debug::DebugInfo;
use crate::input;
use crate::params::{self, SwarmConfig};
use crate::renderer;
use crate::schedule::DeviceTier;
use crate::swarm::{RepulsionFeed, Swarm};
use crate::ui::{self, PanelState};

// Room camera and lamp placement
pub const CAMERA_EYE: [f32; 3] = [-28.48, 4.71, -17.18];
pub const CAMERA_TARGET: [f32; 3] = [1.38, 0.80, -2.63];
pub const LAMP_POSITION: [f32; 3] = [1.38, 2.40, -2.63];

// Main model for the application
pub struct Model {
    pub swarm: Swarm,
    pub repulsion: RepulsionFeed,
    // Working copy edited by the UI
    pub config: SwarmConfig,
    pub tier: DeviceTier,
    pub anchor: Vec3,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub camera: OrbitCamera,
    pub mouse_position: Vec2,
    pub show_debug: bool,
    pub pause_simulation: bool,
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let (window_width, window_height) = match app.primary_monitor() {
        Some(monitor) => {
            let size = monitor.size();
            (size.width as f32 * 0.8, size.height as f32 * 0.8)
        }
        None => (1280.0, 720.0),
    };

    let window_id = app
        .new_window()
        .title("Moths")
        .size(window_width as u32, window_height as u32)
        .view(renderer::view)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .mouse_exited(input::mouse_exited)
        .mouse_wheel(input::mouse_wheel)
        .touch(input::touch)
        .raw_event(input::raw_window_event)
        .build()
        .expect("failed to build the main window");

    let window = app.window(window_id).expect("main window vanished right after creation");
    let egui = Egui::from_window(&window);

    let (config, tier) = params::from_env();
    let swarm = Swarm::new(config.clone(), tier);
    let repulsion = swarm.repulsion_feed();

    info!(?tier, "moth scene ready, waiting for the lamp");

    Model {
        swarm,
        repulsion,
        config,
        tier,
        anchor: Vec3::from(LAMP_POSITION),
        egui,
        debug_info: DebugInfo::default(),
        camera: OrbitCamera::looking_at(Vec3::from(CAMERA_EYE), Vec3::from(CAMERA_TARGET)),
        mouse_position: Vec2::ZERO,
        show_debug: false,
        pause_simulation: false,
    }
}

// Rebuild the swarm after a tier switch or population change
fn respawn(model: &mut Model) {
    let mut swarm = Swarm::new(model.config.clone(), model.tier);
    swarm.resolve_anchor(model.anchor);
    model.repulsion = swarm.repulsion_feed();
    model.swarm = swarm;
    info!(tier = ?model.tier, "respawned moths");
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let actions = ui::update_ui(
        &mut model.egui,
        PanelState {
            config: &mut model.config,
            tier: &mut model.tier,
            pause_simulation: &mut model.pause_simulation,
            show_debug: &mut model.show_debug,
        },
        &model.debug_info,
    );

    if actions.respawn {
        respawn(model);
    } else if actions.config_changed {
        model.swarm.set_config(model.config.clone());
    }

    // The room has no loading step here, so the lamp is known on the first update
    if !model.swarm.is_ready() {
        model.swarm.resolve_anchor(model.anchor);
    }

    model.camera.update();

    if !model.pause_simulation {
        let report = model.swarm.frame(update.since_last.as_secs_f32());
        model.debug_info.record(report);
    }
    model.debug_info.moths = model.swarm.population().map_or(0, |population| population.len());
}
