/*
 * Input Module
 *
 * This module handles pointer input for the moth scene.
 * Pointer and touch positions are projected into the room and written to the
 * swarm's repulsion feed; the moths flee whatever is pointing at them.
 *
 * Features:
 * - Repulsion point from mouse or touch
 * - Camera orbit with left drag, zoom with the wheel
 * - Pointer over the UI never moves the camera
 */

use nannou::event::TouchEvent;
use nannou::prelude::*;
use nannou::winit::event::{MouseScrollDelta, TouchPhase};

use crate::app::Model;

// Project a screen position onto the plane through the lamp
fn update_repulsion(app: &App, model: &Model, screen: Vec2) {
    let window_rect = app.window_rect();
    if let Some(point) = model.camera.unproject_to_plane(screen, window_rect, model.anchor) {
        model.repulsion.set(point);
    }
}

// Mouse moved event handler
pub fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    let new_pos = vec2(pos.x, pos.y);

    if model.camera.is_dragging {
        model.camera.drag(new_pos);
    } else {
        update_repulsion(app, model, new_pos);
    }

    model.mouse_position = new_pos;
}

// Mouse pressed event handler
pub fn mouse_pressed(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left && !model.egui.ctx().is_pointer_over_area() {
        model.camera.start_drag(model.mouse_position);
    }
}

// Mouse released event handler
pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.camera.end_drag();
    }
}

pub fn mouse_exited(_app: &App, model: &mut Model) {
    model.camera.end_drag();
    model.repulsion.park();
}

// Mouse wheel event handler for zooming
pub fn mouse_wheel(_app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }
    match delta {
        MouseScrollDelta::LineDelta(x, y) => model.camera.zoom(vec2(x, y)),
        MouseScrollDelta::PixelDelta(pos) => model.camera.zoom(vec2(pos.x as f32, pos.y as f32) * 0.01),
    }
}

// Touches repel the moths while the finger is down
pub fn touch(app: &App, model: &mut Model, touch: TouchEvent) {
    match touch.phase {
        TouchPhase::Started | TouchPhase::Moved => update_repulsion(app, model, touch.position),
        TouchPhase::Ended | TouchPhase::Cancelled => model.repulsion.park(),
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
