/*
 * Renderer Module
 *
 * This is the render adapter: it owns no simulation state and only applies
 * the latest poses to drawn shapes. Moths are drawn back to front so nearer
 * ones cover farther ones, scaled by perspective depth.
 */

use nannou::prelude::*;

use crate::app::Model;
use crate::camera::OrbitCamera;
use crate::pose::Pose;
use crate::ui;

// World-space half wingspan of a moth
pub const MOTH_SIZE: f32 = 0.06;
const LAMP_GLOW_RADIUS: f32 = 0.35;

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(rgb(0.03, 0.03, 0.05));

    let window_rect = app.window_rect();
    draw_lamp(&draw, &model.camera, model.anchor, window_rect);
    draw_moths(&draw, &model.camera, model.swarm.poses(), window_rect);

    if model.show_debug {
        draw_debug_overlay(&draw, model, window_rect);
        ui::draw_debug_info(&draw, &model.debug_info, window_rect);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        tracing::warn!(error = ?err, "failed to draw frame");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        tracing::warn!(error = ?err, "failed to draw ui");
    }
}

fn draw_lamp(draw: &Draw, camera: &OrbitCamera, anchor: Vec3, window_rect: Rect) {
    let Some((screen, depth)) = camera.project(anchor, window_rect) else {
        return;
    };
    let radius = screen_size(camera, LAMP_GLOW_RADIUS, depth, window_rect);
    for ring in 0..4 {
        let t = ring as f32 / 4.0;
        draw.ellipse()
            .xy(screen)
            .radius(radius * (1.0 + t * 2.0))
            .color(rgba(1.0, 0.85, 0.5, 0.25 * (1.0 - t)));
    }
}

pub fn draw_moths(draw: &Draw, camera: &OrbitCamera, poses: impl Iterator<Item = Pose>, window_rect: Rect) {
    let mut projected: Vec<(Pose, Vec2, f32)> = poses
        .filter_map(|pose| {
            camera
                .project(pose.position, window_rect)
                .map(|(screen, depth)| (pose, screen, depth))
        })
        .collect();
    projected.sort_by(|a, b| b.2.total_cmp(&a.2));

    for (pose, screen, depth) in projected {
        draw_moth(draw, camera, &pose, screen, depth, window_rect);
    }
}

fn draw_moth(draw: &Draw, camera: &OrbitCamera, pose: &Pose, screen: Vec2, depth: f32, window_rect: Rect) {
    let size = screen_size(camera, MOTH_SIZE, depth, window_rect).max(1.0);

    // Screen heading from a point a little ahead along the yaw
    let ahead = pose.position + vec3(pose.yaw.sin(), -pose.pitch.sin(), pose.yaw.cos()) * MOTH_SIZE;
    let angle = camera
        .project(ahead, window_rect)
        .map(|(tip, _)| (tip.y - screen.y).atan2(tip.x - screen.x))
        .unwrap_or(0.0);

    // Nearer moths are brighter
    let shade = (1.0 - depth / (camera.distance * 2.0)).clamp(0.35, 1.0);
    let wing_color = rgba(0.85 * shade, 0.78 * shade, 0.65 * shade, 0.9);

    // Wings foreshorten as they flap up and down
    for (side, flap) in [(1.0, pose.wing_left), (-1.0, pose.wing_right)] {
        let span = size * flap.cos().abs().max(0.15);
        let points = [
            pt2(size * 0.3, 0.0),
            pt2(-size * 0.2, side * span),
            pt2(-size * 0.6, side * span * 0.4),
        ];
        draw.polygon()
            .color(wing_color)
            .points(points)
            .xy(screen)
            .rotate(angle);
    }

    draw.ellipse()
        .xy(screen)
        .w_h(size * 0.8, size * 0.25)
        .rotate(angle)
        .color(rgb(0.35 * shade, 0.3 * shade, 0.25 * shade));
}

// Outline of the trigger and containment radii around the lamp
fn draw_debug_overlay(draw: &Draw, model: &Model, window_rect: Rect) {
    let Some((screen, depth)) = model.camera.project(model.anchor, window_rect) else {
        return;
    };
    let config = model.swarm.config();
    draw.ellipse()
        .xy(screen)
        .radius(screen_size(&model.camera, config.outer_radius, depth, window_rect))
        .no_fill()
        .stroke(rgba(0.4, 0.4, 0.4, 1.0))
        .stroke_weight(1.0);

    let repulsion = model.repulsion.snapshot();
    if let Some((point, depth)) = model.camera.project(repulsion, window_rect) {
        draw.ellipse()
            .xy(point)
            .radius(screen_size(&model.camera, config.trigger_radius, depth, window_rect))
            .no_fill()
            .stroke(RED)
            .stroke_weight(1.0);
    }
}

// Projected size in pixels of a world-space length at `depth`
fn screen_size(camera: &OrbitCamera, world: f32, depth: f32, window_rect: Rect) -> f32 {
    let focal = 1.0 / (camera.fov_y * 0.5).tan();
    world * focal / depth * window_rect.h() * 0.5
}
