use glam::{Mat4, Vec3};

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 30.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: aspect_ratio(width, height),
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Place the eye at `subject + offset` and aim at the subject.
    pub fn follow(&mut self, subject: Vec3, offset: Vec3) {
        self.eye = subject + offset;
        self.target = subject;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * self.view()
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_offsets_eye_and_targets_subject() {
        let mut cam = Camera::new(800, 600);
        let player = Vec3::new(2.0, 1.0, -4.0);
        cam.follow(player, Vec3::new(0.0, 15.0, -13.0));
        assert_eq!(cam.eye, Vec3::new(2.0, 16.0, -17.0));
        assert_eq!(cam.target, player);

        // the subject projects to the center of the screen
        let clip = cam.view_proj() * player.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let mut cam = Camera::new(800, 0);
        assert!(cam.aspect.is_finite());
        cam.set_aspect(1920, 1080);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}
