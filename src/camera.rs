use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::transform;

/// Discrete movement commands, decoupled from any window-system input enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person camera driven by yaw/pitch Euler angles.
///
/// The orthonormal `front`/`right`/`up` basis is derived from the angles and
/// recomputed whenever they change; callers never set it directly. The view
/// matrix is rebuilt from current state on every call, never cached.
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space location, moved by [`Camera::process_keyboard`].
    pub position: Vec3,
    /// Units per second applied to keyboard movement.
    pub movement_speed: f32,
    /// Scale applied to raw mouse offsets before they become degrees.
    pub mouse_sensitivity: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    zoom: f32,
}

impl Camera {
    const DEFAULT_YAW: f32 = -90.0;
    const DEFAULT_PITCH: f32 = 0.0;
    const DEFAULT_SPEED: f32 = 5.5;
    const DEFAULT_SENSITIVITY: f32 = 0.1;
    const DEFAULT_ZOOM: f32 = 45.0;

    const PITCH_LIMIT: f32 = 89.0;
    const ZOOM_MIN: f32 = 1.0;
    const ZOOM_MAX: f32 = 45.0;

    /// Creates a camera at `position` with the given world-up reference and
    /// initial angles in degrees.
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            movement_speed: Self::DEFAULT_SPEED,
            mouse_sensitivity: Self::DEFAULT_SENSITIVITY,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: world_up,
            world_up,
            yaw,
            pitch,
            zoom: Self::DEFAULT_ZOOM,
        };
        camera.update_vectors();
        camera
    }

    /// Unit vector the camera looks along.
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit vector pointing to the camera's right.
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit up vector of the camera basis (not the world up).
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Horizontal look angle in degrees; unbounded.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Vertical look angle in degrees.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees, controlled by the scroll wheel.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Returns the view matrix for the current position and orientation.
    pub fn view_matrix(&self) -> Mat4 {
        transform::look_at(self.position, self.position + self.front, self.up)
    }

    /// Moves the camera along its basis for `delta_seconds` of travel time.
    ///
    /// The basis itself is unchanged, so no recompute happens here.
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_seconds: f32) {
        let velocity = self.movement_speed * delta_seconds;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Applies a mouse offset to yaw/pitch and rebuilds the basis.
    ///
    /// Positive `yoffset` looks up. With `constrain_pitch` the pitch stays
    /// inside `[-89, 89]` degrees so the view cannot flip over the pole.
    pub fn process_mouse_movement(&mut self, xoffset: f32, yoffset: f32, constrain_pitch: bool) {
        self.yaw += xoffset * self.mouse_sensitivity;
        self.pitch += yoffset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Narrows or widens the field of view, clamped to `[1, 45]` degrees.
    pub fn process_mouse_scroll(&mut self, yoffset: f32) {
        self.zoom = (self.zoom - yoffset).clamp(Self::ZOOM_MIN, Self::ZOOM_MAX);
    }

    /// Rebuilds `front`, `right` and `up` from the current Euler angles.
    ///
    /// The order matters: `up` is re-derived from the fresh `right` and
    /// `front` each time, which keeps the basis orthonormal across many
    /// frames of accumulated floating-point drift.
    fn update_vectors(&mut self) {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();

        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Vec3::ZERO,
            Vec3::Y,
            Self::DEFAULT_YAW,
            Self::DEFAULT_PITCH,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    fn assert_orthonormal(camera: &Camera) {
        assert!((camera.front().length() - 1.0).abs() < TOLERANCE);
        assert!((camera.right().length() - 1.0).abs() < TOLERANCE);
        assert!((camera.up().length() - 1.0).abs() < TOLERANCE);
        assert!(camera.front().dot(camera.right()).abs() < TOLERANCE);
        assert!(camera.front().dot(camera.up()).abs() < TOLERANCE);
        assert!(camera.right().dot(camera.up()).abs() < TOLERANCE);
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert!(camera.front().abs_diff_eq(Vec3::NEG_Z, TOLERANCE));
        assert!(camera.right().abs_diff_eq(Vec3::X, TOLERANCE));
        assert!(camera.up().abs_diff_eq(Vec3::Y, TOLERANCE));
    }

    #[test]
    fn basis_stays_orthonormal_under_mouse_movement() {
        let mut camera = Camera::default();
        // Deterministic pseudo-random walk over many frames.
        let mut seed = 0x2545f491u32;
        for _ in 0..5_000 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let dx = ((seed >> 8) % 2_000) as f32 / 10.0 - 100.0;
            let dy = ((seed >> 20) % 2_000) as f32 / 10.0 - 100.0;
            camera.process_mouse_movement(dx, dy, true);
        }
        assert_orthonormal(&camera);
    }

    #[test]
    fn pitch_is_clamped_when_constrained() {
        let mut camera = Camera::default();
        for _ in 0..100 {
            camera.process_mouse_movement(0.0, 50.0, true);
            assert!(camera.pitch() <= 89.0);
        }
        assert_eq!(camera.pitch(), 89.0);
        for _ in 0..200 {
            camera.process_mouse_movement(0.0, -50.0, true);
            assert!(camera.pitch() >= -89.0);
        }
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn pitch_is_free_when_unconstrained() {
        let mut camera = Camera::default();
        for _ in 0..30 {
            camera.process_mouse_movement(0.0, 50.0, false);
        }
        assert!(camera.pitch() > 89.0);
        assert_orthonormal(&camera);
    }

    #[test]
    fn yaw_is_never_clamped() {
        let mut camera = Camera::default();
        for _ in 0..100 {
            camera.process_mouse_movement(100.0, 0.0, true);
        }
        assert!(camera.yaw() > 360.0);
        assert_orthonormal(&camera);
    }

    #[test]
    fn zoom_stays_inside_limits() {
        let mut camera = Camera::default();
        for _ in 0..100 {
            camera.process_mouse_scroll(3.0);
            assert!(camera.zoom() >= 1.0 && camera.zoom() <= 45.0);
        }
        assert_eq!(camera.zoom(), 1.0);
        for _ in 0..100 {
            camera.process_mouse_scroll(-3.0);
            assert!(camera.zoom() >= 1.0 && camera.zoom() <= 45.0);
        }
        assert_eq!(camera.zoom(), 45.0);
    }

    #[test]
    fn keyboard_movement_scales_with_delta_time() {
        let mut camera = Camera::default();
        camera.process_keyboard(CameraMovement::Forward, 2.0);
        let expected = Vec3::NEG_Z * camera.movement_speed * 2.0;
        assert!(camera.position.abs_diff_eq(expected, TOLERANCE));

        camera.position = Vec3::ZERO;
        camera.process_keyboard(CameraMovement::Left, 1.0);
        assert!(camera
            .position
            .abs_diff_eq(Vec3::X * -camera.movement_speed, TOLERANCE));
    }

    #[test]
    fn view_matrix_places_eye_at_origin_of_camera_space() {
        let mut camera = Camera::default();
        camera.position = Vec3::new(4.0, 1.0, -2.0);
        camera.process_mouse_movement(123.0, -42.0, true);

        let view = camera.view_matrix();
        let eye_in_camera_space = view * camera.position.extend(1.0);
        assert!(eye_in_camera_space
            .truncate()
            .abs_diff_eq(Vec3::ZERO, 1e-4));
    }
}
