/*
 * UI Module
 *
 * This module contains functions for creating and updating the control
 * panel using nannou_egui. It edits a working copy of the swarm config and
 * reports what changed so the app can apply it.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::SwarmConfig;
use crate::schedule::DeviceTier;

// What the panel asked for this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiActions {
    pub config_changed: bool,
    // Tier switch or explicit respawn: the population must be rebuilt
    pub respawn: bool,
}

pub struct PanelState<'a> {
    pub config: &'a mut SwarmConfig,
    pub tier: &'a mut DeviceTier,
    pub pause_simulation: &'a mut bool,
    pub show_debug: &'a mut bool,
}

pub fn update_ui(egui: &mut Egui, panel: PanelState<'_>, debug_info: &DebugInfo) -> UiActions {
    let PanelState {
        config,
        tier,
        pause_simulation,
        show_debug,
    } = panel;

    let before = config.clone();
    let previous_tier = *tier;
    let mut respawn = false;

    let ctx = egui.begin_frame();

    egui::Window::new("Moth Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Population", |ui| {
                ui.horizontal(|ui| {
                    ui.radio_value(&mut *tier, DeviceTier::Standard, "Standard");
                    ui.radio_value(&mut *tier, DeviceTier::Constrained, "Constrained");
                });
                ui.add(
                    egui::Slider::new(&mut config.standard_population, SwarmConfig::get_population_range())
                        .text("Standard Moths"),
                );
                ui.add(
                    egui::Slider::new(&mut config.constrained_population, SwarmConfig::get_population_range())
                        .text("Constrained Moths"),
                );
                if ui.button("Respawn Moths").clicked() {
                    respawn = true;
                }
                ui.checkbox(&mut config.enable_parallel, "Parallel Updates");
            });

            ui.collapsing("Fleeing", |ui| {
                ui.add(
                    egui::Slider::new(&mut config.trigger_radius, SwarmConfig::get_trigger_radius_range())
                        .text("Trigger Radius"),
                );
                ui.add(
                    egui::Slider::new(&mut config.flee_strength, SwarmConfig::get_strength_range())
                        .text("Flee Strength"),
                );
            });

            ui.collapsing("Swarming", |ui| {
                ui.add(
                    egui::Slider::new(&mut config.seek_strength, SwarmConfig::get_strength_range())
                        .text("Seek Strength"),
                );
                ui.add(
                    egui::Slider::new(&mut config.wiggle_strength, SwarmConfig::get_strength_range())
                        .text("Wiggle Strength"),
                );
                ui.add(
                    egui::Slider::new(&mut config.outer_radius, SwarmConfig::get_outer_radius_range())
                        .text("Outer Radius"),
                );
                ui.add(egui::Slider::new(&mut config.damping, SwarmConfig::get_damping_range()).text("Damping"));
            });

            ui.collapsing("Separation", |ui| {
                ui.add(
                    egui::Slider::new(&mut config.separation_radius, SwarmConfig::get_separation_radius_range())
                        .text("Separation Radius"),
                );
                ui.add(
                    egui::Slider::new(&mut config.separation_samples, SwarmConfig::get_separation_samples_range())
                        .text("Peers Sampled"),
                );
                ui.add(
                    egui::Slider::new(&mut config.separation_weight, SwarmConfig::get_strength_range())
                        .text("Separation Weight"),
                );
            });

            ui.collapsing("Performance", |ui| {
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Moths: {}", debug_info.moths));
                ui.label(format!("Fleeing: {}", debug_info.fleeing));
                ui.label(format!("Skipped frames: {}", debug_info.skipped_frames));
            });

            ui.checkbox(&mut *show_debug, "Show Debug Info");
            ui.checkbox(&mut *pause_simulation, "Pause Simulation");
        });

    // Population size only takes effect on respawn
    let population_changed = config.standard_population != before.standard_population
        || config.constrained_population != before.constrained_population;

    UiActions {
        config_changed: *config != before,
        respawn: respawn || *tier != previous_tier || population_changed,
    }
}

// Draw debug information on the screen
pub fn draw_debug_info(draw: &nannou::Draw, debug_info: &DebugInfo, window_rect: nannou::geom::Rect) {
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 220.0;
    let panel_height = line_height * 5.0 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = window_rect.right() - panel_width + margin;
    let text_y = window_rect.top() - margin;

    let debug_texts = [
        format!("FPS: {:.1}", debug_info.fps),
        format!("Sim step: {:.1} ms", debug_info.last_step * 1000.0),
        format!("Simulated: {}", debug_info.simulated_frames),
        format!("Skipped: {}", debug_info.skipped_frames),
        format!("Fleeing: {}/{}", debug_info.fleeing, debug_info.moths),
    ];

    for (i, text) in debug_texts.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);
        draw.text(text)
            .x_y(text_x + 70.0, y)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
