//! Free-look camera driven by the keyboard.

use glam::{Mat4, Vec3};

use crate::input::{key, InputState};

const MOVE_SPEED: f32 = 4.0; // units per second
const TURN_SPEED: f32 = 1.6; // radians per second
const PITCH_LIMIT: f32 = 1.5;

pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    fov_y: f32,
    aspect: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, -8.0),
            yaw: 0.0,
            pitch: -0.2,
            fov_y: 45f32.to_radians(),
            aspect,
        }
    }

    /// WASD strafes and advances on the ground plane, arrows turn.
    pub fn update(&mut self, input: &InputState, dt: f32) {
        self.yaw += input.axis(key::LEFT, key::RIGHT) * TURN_SPEED * dt;
        self.pitch = (self.pitch + input.axis(key::DOWN, key::UP) * TURN_SPEED * dt)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let forward = Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos());
        let right = Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin());

        let advance = input.axis(key::S, key::W);
        let strafe = input.axis(key::A, key::D);
        self.position += (forward * advance + right * strafe) * MOVE_SPEED * dt;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    fn look_direction(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_to_lh(self.position, self.look_direction(), Vec3::Y);
        let projection = Mat4::perspective_lh(self.fov_y, self.aspect, 0.1, 100.0);
        projection * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_input_leaves_the_camera_in_place() {
        let mut camera = Camera::new(16.0 / 9.0);
        let before = camera.position();
        camera.update(&InputState::new(), 1.0 / 60.0);
        assert_eq!(camera.position(), before);
    }

    #[test]
    fn advancing_moves_along_the_view_direction() {
        let mut camera = Camera::new(16.0 / 9.0);
        let mut input = InputState::new();
        input.set_down(key::W);

        let before = camera.position();
        camera.update(&input, 0.5);
        let moved = camera.position() - before;

        // yaw starts at zero, so forward is +Z and stays on the ground plane
        assert!(moved.z > 0.0);
        assert_eq!(moved.y, 0.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(1.0);
        let mut input = InputState::new();
        input.set_down(key::UP);

        for _ in 0..600 {
            camera.update(&input, 0.1);
        }
        assert!(camera.pitch <= PITCH_LIMIT);
    }

    #[test]
    fn view_projection_is_finite() {
        let camera = Camera::new(4.0 / 3.0);
        let matrix = camera.view_projection();
        assert!(matrix.to_cols_array().iter().all(|v| v.is_finite()));
        assert_ne!(matrix, Mat4::IDENTITY);
    }
}
