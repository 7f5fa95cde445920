use glam::{Mat4, Quat, Vec3};

use crate::assets::LoadedModel;
use crate::model::animation::AnimationMixer;
use crate::utils::Mesh;

/// Position plus heading about +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub yaw: f32,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self { position, yaw: 0.0 }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position)
    }
}

/// The loaded character: its transform and triangle mesh.
pub struct PlayerVisual {
    pub transform: Transform,
    pub mesh: Mesh,
}

/// The collision-test box spawned alongside the player.
pub struct ObstacleVisual {
    pub transform: Transform,
    pub half_extents: Vec3,
    pub color: [f32; 4],
}

/// Point light with a helper drawn at its position.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub color: [f32; 3],
}

/// Visual side of the demo: everything that gets drawn, mirroring physics.
pub struct Scene {
    pub player: Option<PlayerVisual>,
    pub obstacle: Option<ObstacleVisual>,
    pub mixer: Option<AnimationMixer>,
    pub ambient: f32,
    pub point_light: PointLight,
    pub ground_size: f32,
    pub ground_color: [f32; 4],
    pub grid_size: f32,
    pub grid_divisions: u32,
    /// Bumped every time the player mesh is replaced so the renderer re-uploads it.
    pub player_revision: u64,
}

impl Scene {
    pub fn new(
        ground_size: f32,
        ground_color: [f32; 4],
        grid_size: f32,
        grid_divisions: u32,
        light_pos: Vec3,
    ) -> Self {
        Self {
            player: None,
            obstacle: None,
            mixer: None,
            ambient: 0.6,
            point_light: PointLight {
                position: light_pos,
                color: [1.0, 1.0, 1.0],
            },
            ground_size,
            ground_color,
            grid_size,
            grid_divisions,
            player_revision: 0,
        }
    }

    /// Install the loaded model as the player and spawn the obstacle box.
    /// A mixer is only created when the model carries at least one clip.
    pub fn on_model_loaded(
        &mut self,
        model: LoadedModel,
        player_at: Vec3,
        obstacle_at: Vec3,
        obstacle_half_extents: Vec3,
        obstacle_color: [f32; 4],
    ) {
        self.mixer = AnimationMixer::from_clips(&model.clips);
        self.player = Some(PlayerVisual {
            transform: Transform::at(player_at),
            mesh: model.mesh,
        });
        self.player_revision += 1;
        self.obstacle = Some(ObstacleVisual {
            transform: Transform::at(obstacle_at),
            half_extents: obstacle_half_extents,
            color: obstacle_color,
        });
    }

    pub fn player_transform(&self) -> Option<&Transform> {
        self.player.as_ref().map(|p| &p.transform)
    }

    pub fn player_transform_mut(&mut self) -> Option<&mut Transform> {
        self.player.as_mut().map(|p| &mut p.transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::animation::AnimationClip;

    fn scene() -> Scene {
        Scene::new(1000.0, [1.0, 0.9, 0.0, 1.0], 200.0, 50, Vec3::splat(5.0))
    }

    fn model(clips: Vec<AnimationClip>) -> LoadedModel {
        LoadedModel {
            mesh: Mesh::empty(),
            clips,
        }
    }

    #[test]
    fn loading_populates_player_and_obstacle() {
        let mut scene = scene();
        assert!(scene.player.is_none() && scene.obstacle.is_none());

        let clip = AnimationClip { name: "run".into(), duration: 1.2 };
        scene.on_model_loaded(
            model(vec![clip]),
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(0.0, 5.0, -5.0),
            Vec3::ONE,
            [0.0, 0.0, 1.0, 1.0],
        );

        assert_eq!(scene.player_transform().unwrap().position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(scene.obstacle.as_ref().unwrap().transform.position, Vec3::new(0.0, 5.0, -5.0));
        assert_eq!(scene.mixer.as_ref().unwrap().action().clip.name, "run");
        assert_eq!(scene.player_revision, 1);
    }

    #[test]
    fn model_without_clips_gets_no_mixer() {
        let mut scene = scene();
        scene.on_model_loaded(model(Vec::new()), Vec3::ZERO, Vec3::ONE, Vec3::ONE, [1.0; 4]);
        assert!(scene.player.is_some());
        assert!(scene.mixer.is_none());
    }

    #[test]
    fn transform_matrix_rotates_forward_by_yaw() {
        let t = Transform {
            position: Vec3::new(1.0, 0.0, 0.0),
            yaw: std::f32::consts::FRAC_PI_2,
        };
        let forward = t.matrix().transform_vector3(Vec3::Z);
        assert!(forward.abs_diff_eq(Vec3::X, 1e-6));
        assert!(t.matrix().transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::X, 1e-6));
    }
}
