/*
 * Camera Module
 *
 * This module defines the OrbitCamera that looks at the room from a fixed
 * perspective. Dragging orbits around the target, the wheel zooms, and the
 * motion eases towards the requested orbit every frame. It provides the
 * transforms between world space and screen space the host needs: drawing
 * the moths, and projecting the pointer into the scene as the repulsion
 * point.
 */

use nannou::prelude::*;

// Vertical field of view of the room camera (degrees)
pub const FIELD_OF_VIEW: f32 = 35.0;
const NEAR_PLANE: f32 = 0.1;
const MAX_PITCH: f32 = 1.45;
// Radians of orbit per pixel dragged
const ORBIT_SPEED: f32 = 0.005;

pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    goal_yaw: f32,
    goal_pitch: f32,
    goal_distance: f32,
    pub fov_y: f32,
    // Fraction of the remaining orbit covered per frame
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub is_dragging: bool,
    pub last_cursor_pos: Vec2,
}

impl OrbitCamera {
    // Place the camera at `eye`, orbiting `target`
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(NEAR_PLANE * 10.0);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);

        Self {
            target,
            yaw,
            pitch,
            distance,
            goal_yaw: yaw,
            goal_pitch: pitch,
            goal_distance: distance,
            fov_y: FIELD_OF_VIEW.to_radians(),
            damping: 0.5,
            min_distance: 2.0,
            max_distance: 80.0,
            is_dragging: false,
            last_cursor_pos: Vec2::ZERO,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.target + vec3(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    // Forward, right and up unit vectors
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.eye()).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        (forward, right, up)
    }

    fn focal(&self) -> f32 {
        1.0 / (self.fov_y * 0.5).tan()
    }

    // Convert a point from world space to screen space.
    // Returns the screen point and its depth, or None behind the camera.
    pub fn project(&self, point: Vec3, window_rect: Rect) -> Option<(Vec2, f32)> {
        let (forward, right, up) = self.basis();
        let relative = point - self.eye();
        let depth = relative.dot(forward);
        if depth <= NEAR_PLANE {
            return None;
        }

        let half = window_rect.wh() * 0.5;
        let aspect = half.x / half.y.max(1.0);
        let focal = self.focal();
        let ndc_x = relative.dot(right) * focal / (depth * aspect);
        let ndc_y = relative.dot(up) * focal / depth;
        Some((window_rect.xy() + vec2(ndc_x * half.x, ndc_y * half.y), depth))
    }

    // Convert a screen point into the world point where its ray crosses the
    // plane through `plane_point` facing the camera
    pub fn unproject_to_plane(&self, screen: Vec2, window_rect: Rect, plane_point: Vec3) -> Option<Vec3> {
        let (forward, right, up) = self.basis();
        let half = window_rect.wh() * 0.5;
        if half.x <= 0.0 || half.y <= 0.0 {
            return None;
        }
        let aspect = half.x / half.y;
        let focal = self.focal();
        let centered = screen - window_rect.xy();

        let ray = forward + right * (centered.x / half.x * aspect / focal) + up * (centered.y / half.y / focal);
        let along = ray.dot(forward);
        if along <= f32::EPSILON {
            return None;
        }
        let eye = self.eye();
        let t = (plane_point - eye).dot(forward) / along;
        (t > 0.0).then(|| eye + ray * t)
    }

    // Ease the orbit towards the requested one
    pub fn update(&mut self) {
        self.yaw += (self.goal_yaw - self.yaw) * self.damping;
        self.pitch += (self.goal_pitch - self.pitch) * self.damping;
        self.distance += (self.goal_distance - self.distance) * self.damping;
    }

    // Handle mouse wheel events for zooming
    pub fn zoom(&mut self, scroll_delta: Vec2) {
        let zoom_factor = 1.0 - scroll_delta.y * 0.1;
        self.goal_distance = (self.goal_distance * zoom_factor).clamp(self.min_distance, self.max_distance);
    }

    // Start dragging the camera
    pub fn start_drag(&mut self, position: Vec2) {
        self.last_cursor_pos = position;
        self.is_dragging = true;
    }

    // Orbit while dragging
    pub fn drag(&mut self, position: Vec2) {
        if self.is_dragging {
            let delta = position - self.last_cursor_pos;
            if delta.length_squared() > 0.0 {
                self.goal_yaw -= delta.x * ORBIT_SPEED;
                self.goal_pitch = (self.goal_pitch - delta.y * ORBIT_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
                self.last_cursor_pos = position;
            }
        }
    }

    // End dragging
    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Rect {
        Rect::from_w_h(1280.0, 720.0)
    }

    fn room_camera() -> OrbitCamera {
        OrbitCamera::looking_at(vec3(-28.5, 4.7, -17.2), vec3(1.4, 0.8, -2.6))
    }

    #[test]
    fn looking_at_reproduces_the_eye() {
        let camera = room_camera();
        assert!(camera.eye().distance(vec3(-28.5, 4.7, -17.2)) < 1e-3);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = room_camera();
        let (screen, depth) = camera.project(camera.target, window()).unwrap();
        assert!(screen.length() < 1e-2);
        assert!((depth - camera.distance).abs() < 1e-3);
    }

    #[test]
    fn points_behind_the_camera_are_not_projected() {
        let camera = room_camera();
        let behind = camera.eye() - camera.basis().0 * 5.0;
        assert!(camera.project(behind, window()).is_none());
    }

    #[test]
    fn unproject_inverts_project() {
        let camera = room_camera();
        let point = camera.target + camera.basis().1 * 1.5 + camera.basis().2 * 0.5;
        let (screen, _) = camera.project(point, window()).unwrap();
        let back = camera.unproject_to_plane(screen, window(), camera.target).unwrap();
        assert!(back.distance(point) < 1e-2);
    }

    #[test]
    fn zoom_is_clamped_and_eased() {
        let mut camera = room_camera();
        for _ in 0..100 {
            camera.zoom(vec2(0.0, 1.0));
        }
        for _ in 0..60 {
            camera.update();
        }
        assert!((camera.distance - camera.min_distance).abs() < 1e-3);
    }
}
