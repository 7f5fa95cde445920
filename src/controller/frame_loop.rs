use glam::Vec3;
use tracing::{debug, info};

use crate::assets::LoadedModel;
use crate::config::{rgb_hex, DemoConfig};
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{InputEvent, InputProcessor, InputState};
use crate::controller::movement::{MotionState, MovementResolver};
use crate::controller::physics::{BodyHandle, BodyKind, BodyShape, PhysicsSystem};
use crate::model::{Camera, Scene};

/// Per-frame numbers surfaced to the overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub frame: u64,
    /// Measured wall-clock delta used for movement, seconds.
    pub dt: f32,
    pub displacement: Vec3,
}

/// Owns every piece of demo state and runs the per-frame update.
pub struct FrameLoopContext {
    pub config: DemoConfig,
    pub cam: Camera,
    pub scene: Scene,
    pub input_state: InputState,
    pub input_processor: InputProcessor,
    pub camera_controller: CameraController,
    pub physics_system: PhysicsSystem,
    pub movement: MovementResolver,
    pub player_body: BodyHandle,
    pub obstacle_body: BodyHandle,
    pub ground_body: BodyHandle,
    pub stats: FrameStats,
    last_time: Option<f64>,
}

impl FrameLoopContext {
    /// Build the physics bodies, scene and camera. The player and obstacle
    /// visuals only appear once [`Self::on_model_loaded`] runs.
    pub fn new(config: DemoConfig, width: u32, height: u32) -> Self {
        let mut physics_system = PhysicsSystem::new(config.gravity_y);
        let player_body = physics_system.create_body(
            BodyShape::Cuboid { half_extents: config.player_half_extents },
            BodyKind::Dynamic { mass: config.player_mass },
            config.player_start,
        );
        let obstacle_body = physics_system.create_body(
            BodyShape::Cuboid { half_extents: config.obstacle_half_extents },
            BodyKind::Dynamic { mass: config.obstacle_mass },
            config.obstacle_start,
        );
        let ground_body = physics_system.create_body(BodyShape::Ground, BodyKind::Fixed, Vec3::ZERO);

        let mut cam = Camera::new(width, height);
        cam.fov_y = config.camera_fov_y_deg.to_radians();
        cam.z_near = config.camera_z_near;
        cam.z_far = config.camera_z_far;
        cam.eye = config.camera_start_eye;
        cam.set_look_at(Vec3::ZERO);

        let scene = Scene::new(
            config.ground_size,
            rgb_hex(config.ground_color),
            config.grid_size,
            config.grid_divisions,
            config.point_light_pos,
        );

        Self {
            camera_controller: CameraController::new(config.camera_offset, config.orbit_sensitivity),
            movement: MovementResolver::new(config.move_speed, config.rotation_speed),
            input_state: InputState::new(),
            input_processor: InputProcessor::default(),
            config,
            cam,
            scene,
            physics_system,
            player_body,
            obstacle_body,
            ground_body,
            stats: FrameStats::default(),
            last_time: None,
        }
    }

    /// Completion of the asynchronous model load.
    pub fn on_model_loaded(&mut self, model: LoadedModel) {
        info!(
            vertices = model.mesh.vertices.len(),
            clips = model.clips.len(),
            "model loaded"
        );
        let player_at = self
            .physics_system
            .position(self.player_body)
            .unwrap_or(self.config.player_start);
        let obstacle_at = self
            .physics_system
            .position(self.obstacle_body)
            .unwrap_or(self.config.obstacle_start);
        self.scene.on_model_loaded(
            model,
            player_at,
            obstacle_at,
            self.config.obstacle_half_extents,
            rgb_hex(self.config.obstacle_color),
        );
    }

    /// Feed a platform input event. Pressing a movement key resumes the
    /// animation right away; releasing the last one pauses it. The per-frame
    /// check in [`Self::update`] has the final say either way.
    pub fn handle_event(&mut self, event: &InputEvent) {
        self.input_state.process_event(event);

        match event {
            // nothing to animate or move until the model is in
            InputEvent::KeyDown(_) | InputEvent::TouchStart(_) if !self.model_loaded() => {}
            InputEvent::KeyDown(key) if self.input_processor.is_movement_key(key) => {
                self.movement.resume(self.scene.mixer.as_mut());
            }
            InputEvent::TouchStart(_) => {
                self.movement.resume(self.scene.mixer.as_mut());
            }
            InputEvent::KeyUp(_)
            | InputEvent::TouchEnd(_)
            | InputEvent::FocusLost
            | InputEvent::VisibilityChanged { .. } => {
                let actions = self.input_processor.actions(&self.input_state);
                if actions.is_empty() {
                    self.movement.pause(self.scene.mixer.as_mut());
                }
            }
            _ => {}
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        debug!(width, height, "resize");
        self.cam.set_aspect(width, height);
    }

    /// Run one frame. `now_ms` is a monotonic timestamp in milliseconds.
    pub fn update(&mut self, now_ms: f64) -> FrameStats {
        let dt = match self.last_time {
            // a clock stepping backwards yields zero, long frames are kept whole
            Some(last) => ((now_ms - last) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(now_ms);

        // Animation advances by a fixed nominal amount, not by dt
        let increment = self.config.animation_increment();
        if let Some(mixer) = self.scene.mixer.as_mut() {
            mixer.update(increment);
        }

        let (dx, dy) = self.input_state.consume_drag();
        self.camera_controller.apply_drag(dx, dy);

        self.physics_system.step();

        // Physics -> visual
        if let (Some(player), Some(pos)) = (
            self.scene.player_transform_mut(),
            self.physics_system.position(self.player_body),
        ) {
            player.position = pos;
        }
        if let (Some(obstacle), Some(pos)) = (
            self.scene.obstacle.as_mut(),
            self.physics_system.position(self.obstacle_body),
        ) {
            obstacle.transform.position = pos;
        }

        if let Some(player) = self.scene.player_transform() {
            self.camera_controller.follow_player(&mut self.cam, player.position);
        }

        // Movement is computed visually, then pushed into the body
        let actions = self.input_processor.actions(&self.input_state);
        let Scene { player, mixer, .. } = &mut self.scene;
        let mut displacement = Vec3::ZERO;
        if let Some(player) = player.as_mut() {
            displacement = self
                .movement
                .resolve(actions, &mut player.transform, mixer.as_mut(), dt);
            self.physics_system
                .set_position(self.player_body, player.transform.position);
        }

        self.stats = FrameStats {
            frame: self.stats.frame + 1,
            dt,
            displacement,
        };
        self.stats
    }

    pub fn motion_state(&self) -> MotionState {
        self.movement.state()
    }

    pub fn model_loaded(&self) -> bool {
        self.scene.player.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FIXED_TIMESTEP;
    use crate::model::AnimationClip;
    use crate::utils::create_box_mesh;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn context() -> FrameLoopContext {
        FrameLoopContext::new(DemoConfig::default(), 800, 600)
    }

    fn model(clips: usize) -> LoadedModel {
        LoadedModel {
            mesh: create_box_mesh(Vec3::ONE, [1.0; 4]),
            clips: (0..clips)
                .map(|i| AnimationClip { name: format!("clip{i}"), duration: 1.0 })
                .collect(),
        }
    }

    fn key(ctx: &mut FrameLoopContext, k: &str, down: bool) {
        let event = if down {
            InputEvent::KeyDown(k.to_string())
        } else {
            InputEvent::KeyUp(k.to_string())
        };
        ctx.handle_event(&event);
    }

    #[test]
    fn frames_before_load_are_harmless() {
        let mut ctx = context();
        key(&mut ctx, "w", true);
        for i in 0..30 {
            ctx.update(i as f64 * FRAME_MS);
        }
        assert!(!ctx.model_loaded());
        assert!(ctx.scene.mixer.is_none());
        assert_eq!(ctx.physics_system.step_count(), 30);
        // the body still falls while the model is loading
        assert!(ctx.physics_system.position(ctx.player_body).unwrap().y < 5.0);
    }

    #[test]
    fn physics_step_ignores_measured_frame_time() {
        let mut ctx = context();
        ctx.on_model_loaded(model(1));
        let mut now = 0.0;
        for gap in [1.0, 16.0, 33.0, 250.0, 7.0, 100.0] {
            now += gap;
            ctx.update(now);
            assert_eq!(ctx.physics_system.last_step_dt(), Some(FIXED_TIMESTEP));
        }
        assert_eq!(ctx.physics_system.step_count(), 6);
    }

    #[test]
    fn measured_dt_is_wall_clock_delta() {
        let mut ctx = context();
        assert_eq!(ctx.update(1000.0).dt, 0.0);
        assert!((ctx.update(1016.0).dt - 0.016).abs() < 1e-6);
        assert!((ctx.update(5000.0).dt - 3.984).abs() < 1e-5);
        assert_eq!(ctx.update(4000.0).dt, 0.0);
    }

    #[test]
    fn long_frame_moves_full_distance() {
        let mut ctx = context();
        ctx.on_model_loaded(model(1));
        ctx.update(0.0);
        key(&mut ctx, "w", true);
        let stats = ctx.update(250.0);
        assert!((stats.dt - 0.25).abs() < 1e-6);
        // move_speed * dt, nothing lost to a cap
        assert!((stats.displacement.length() - 3.75).abs() < 1e-4, "moved {}", stats.displacement);
    }

    #[test]
    fn walking_back_runs_into_the_obstacle() {
        let mut ctx = context();
        ctx.on_model_loaded(model(1));
        for i in 0..120 {
            ctx.update(i as f64 * FRAME_MS);
        }
        let obstacle_start = ctx.scene.obstacle.as_ref().unwrap().transform.position;
        // both boxes have landed
        assert!((obstacle_start.y - 1.0).abs() < 0.1, "obstacle at {obstacle_start}");

        key(&mut ctx, "s", true);
        let mut min_player_z = f32::MAX;
        for i in 120..240 {
            ctx.update(i as f64 * FRAME_MS);
            min_player_z = min_player_z.min(ctx.scene.player_transform().unwrap().position.z);
        }
        let obstacle_end = ctx.scene.obstacle.as_ref().unwrap().transform.position;
        let delta = obstacle_end - obstacle_start;
        let shoved = (delta.x * delta.x + delta.z * delta.z).sqrt();
        let blocked = min_player_z > obstacle_start.z + 1.0;
        assert!(
            shoved > 0.5 || blocked,
            "no contact: obstacle moved {shoved}, player reached z = {min_player_z}"
        );
    }

    #[test]
    fn keys_before_load_keep_motion_idle() {
        let mut ctx = context();
        key(&mut ctx, "w", true);
        ctx.handle_event(&InputEvent::TouchStart(crate::controller::input::TouchButton::Up));
        assert_eq!(ctx.motion_state(), MotionState::Idle);
        ctx.update(0.0);
        assert_eq!(ctx.motion_state(), MotionState::Idle);

        // the held key takes effect on the first frame after the load
        ctx.on_model_loaded(model(1));
        ctx.update(FRAME_MS);
        assert_eq!(ctx.motion_state(), MotionState::Moving);
    }

    #[test]
    fn visuals_match_bodies_after_each_frame() {
        let mut ctx = context();
        ctx.on_model_loaded(model(1));
        key(&mut ctx, "w", true);
        key(&mut ctx, "a", true);
        for i in 0..90 {
            ctx.update(i as f64 * FRAME_MS);
            let player = ctx.scene.player_transform().unwrap().position;
            let obstacle = ctx.scene.obstacle.as_ref().unwrap().transform.position;
            assert_eq!(Some(player), ctx.physics_system.position(ctx.player_body));
            assert_eq!(Some(obstacle), ctx.physics_system.position(ctx.obstacle_body));
        }
    }

    #[test]
    fn camera_tracks_player_with_offset() {
        let mut ctx = context();
        ctx.on_model_loaded(model(0));
        ctx.update(0.0);
        let player = ctx.scene.player_transform().unwrap().position;
        assert_eq!(ctx.cam.target, player);
        assert!(ctx.cam.eye.abs_diff_eq(player + Vec3::new(0.0, 15.0, -13.0), 1e-5));
    }

    #[test]
    fn releasing_all_keys_pauses_within_the_frame() {
        let mut ctx = context();
        ctx.on_model_loaded(model(1));
        key(&mut ctx, "ArrowUp", true);
        key(&mut ctx, "d", true);
        ctx.update(0.0);
        ctx.update(FRAME_MS);
        assert_eq!(ctx.motion_state(), MotionState::Moving);
        assert!(ctx.scene.mixer.as_ref().unwrap().action().is_playing());

        key(&mut ctx, "ArrowUp", false);
        key(&mut ctx, "d", false);
        assert_eq!(ctx.motion_state(), MotionState::Idle);
        ctx.update(2.0 * FRAME_MS);
        assert_eq!(ctx.motion_state(), MotionState::Idle);
        assert!(ctx.scene.mixer.as_ref().unwrap().action().paused);
    }

    #[test]
    fn non_movement_key_does_not_resume() {
        let mut ctx = context();
        ctx.on_model_loaded(model(1));
        ctx.update(0.0);
        assert!(ctx.scene.mixer.as_ref().unwrap().action().paused);
        key(&mut ctx, "x", true);
        assert!(ctx.scene.mixer.as_ref().unwrap().action().paused);
        assert_eq!(ctx.motion_state(), MotionState::Idle);
    }

    #[test]
    fn touch_buttons_drive_movement() {
        use crate::controller::input::TouchButton;
        let mut ctx = context();
        ctx.on_model_loaded(model(1));
        ctx.update(0.0);
        ctx.handle_event(&InputEvent::TouchStart(TouchButton::Up));
        let stats = ctx.update(FRAME_MS);
        assert!(stats.displacement.z > 0.0);
        ctx.handle_event(&InputEvent::TouchEnd(TouchButton::Up));
        assert!(ctx.scene.mixer.as_ref().unwrap().action().paused);
    }

    #[test]
    fn holding_w_for_one_second_moves_move_speed_forward() {
        let mut ctx = context();
        ctx.on_model_loaded(model(1));
        // settle onto the ground first
        for i in 0..120 {
            ctx.update(i as f64 * FRAME_MS);
        }
        let start = ctx.scene.player_transform().unwrap().position;

        key(&mut ctx, "w", true);
        let mut total = Vec3::ZERO;
        for i in 120..180 {
            total += ctx.update(i as f64 * FRAME_MS).displacement;
        }
        let end = ctx.scene.player_transform().unwrap().position;

        assert!((total.z - 15.0).abs() < 1e-3, "summed displacement {total}");
        assert!(total.x.abs() < 1e-4);
        assert!((end.z - start.z - 15.0).abs() < 0.1, "moved {}", end - start);
        assert!((end.x - start.x).abs() < 0.1);
    }

    #[test]
    fn zero_clip_model_skips_animation_updates() {
        let mut ctx = context();
        ctx.on_model_loaded(model(0));
        assert!(ctx.scene.mixer.is_none());
        key(&mut ctx, "w", true);
        for i in 0..10 {
            ctx.update(i as f64 * FRAME_MS);
        }
        assert!(ctx.scene.mixer.is_none());
        assert_eq!(ctx.motion_state(), MotionState::Moving);
    }

    #[test]
    fn animation_advances_by_nominal_increment() {
        let mut ctx = context();
        let mut clip = model(1);
        clip.clips[0].duration = 100.0;
        ctx.on_model_loaded(clip);
        key(&mut ctx, "w", true);
        // wildly uneven frame gaps must not change the animation rate
        for now in [0.0, 5.0, 200.0, 210.0, 900.0] {
            ctx.update(now);
        }
        let mixer = ctx.scene.mixer.as_ref().unwrap();
        assert_eq!(mixer.update_count(), 5);
        assert!((mixer.action().time - 5.0 * 0.03).abs() < 1e-5);
    }
}
