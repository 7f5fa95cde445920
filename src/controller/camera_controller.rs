use glam::{Quat, Vec3};
use crate::model::Camera;

/// Follow camera with drag-to-orbit around the player.
pub struct CameraController {
    pub offset: Vec3,
    pub orbit_sensitivity: f32,
    pub orbit_yaw: f32,
}

impl CameraController {
    pub fn new(offset: Vec3, orbit_sensitivity: f32) -> Self {
        Self {
            offset,
            orbit_sensitivity,
            orbit_yaw: 0.0,
        }
    }

    /// Apply a drag delta (pixels) to the orbit angle. Vertical drag is ignored.
    pub fn apply_drag(&mut self, dx: f32, _dy: f32) {
        self.orbit_yaw = (self.orbit_yaw - dx * self.orbit_sensitivity)
            .rem_euclid(std::f32::consts::TAU);
    }

    /// Offset from the player to the eye, including the orbit angle.
    pub fn current_offset(&self) -> Vec3 {
        Quat::from_rotation_y(self.orbit_yaw) * self.offset
    }

    /// Put the camera behind the player and look at it.
    pub fn follow_player(&self, camera: &mut Camera, player_pos: Vec3) {
        camera.follow(player_pos, self.current_offset());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_drag_offset_is_fixed() {
        let controller = CameraController::new(Vec3::new(0.0, 15.0, -13.0), 0.005);
        let mut cam = Camera::new(800, 600);
        controller.follow_player(&mut cam, Vec3::new(1.0, 1.0, 1.0));
        assert!(cam.eye.abs_diff_eq(Vec3::new(1.0, 16.0, -12.0), 1e-6));
        assert_eq!(cam.target, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn drag_orbits_around_player_keeping_distance() {
        let mut controller = CameraController::new(Vec3::new(0.0, 15.0, -13.0), 0.01);
        controller.apply_drag(-100.0, 40.0);
        assert!((controller.orbit_yaw - 1.0).abs() < 1e-6);

        let offset = controller.current_offset();
        assert!((offset.length() - Vec3::new(0.0, 15.0, -13.0).length()).abs() < 1e-4);
        assert!((offset.y - 15.0).abs() < 1e-6);
        assert!(offset.x.abs() > 1.0);
    }
}
