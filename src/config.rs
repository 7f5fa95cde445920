use glam::Vec3;

/// Fixed timestep used for every physics step (60Hz).
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Tunables for the demo. Everything the frame loop, movement and bootstrap
/// read lives here so native and web builds agree on the same numbers.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Player translation speed in units per second.
    pub move_speed: f32,
    /// Player yaw speed in radians per second.
    pub rotation_speed: f32,
    /// Multiplier applied to the nominal animation increment.
    pub animation_speed_factor: f32,
    /// Nominal animation increment per frame, before the speed factor.
    pub animation_step: f32,
    pub gravity_y: f32,

    pub camera_offset: Vec3,
    pub camera_start_eye: Vec3,
    pub camera_fov_y_deg: f32,
    pub camera_z_near: f32,
    pub camera_z_far: f32,
    pub orbit_sensitivity: f32,

    pub player_start: Vec3,
    pub player_half_extents: Vec3,
    pub player_mass: f32,
    pub obstacle_start: Vec3,
    pub obstacle_half_extents: Vec3,
    /// Light enough for the player to shove around.
    pub obstacle_mass: f32,
    pub obstacle_color: u32,

    pub ground_size: f32,
    pub ground_color: u32,
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub point_light_pos: Vec3,

    /// Root every asset path below is resolved against.
    pub asset_root: String,
    pub model_path: String,
    pub sky_path: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            move_speed: 15.0,
            rotation_speed: 3.0,
            animation_speed_factor: 3.0,
            animation_step: 0.01,
            gravity_y: -5.0,

            camera_offset: Vec3::new(0.0, 15.0, -13.0),
            camera_start_eye: Vec3::new(0.0, 10.0, 30.0),
            camera_fov_y_deg: 75.0,
            camera_z_near: 0.1,
            camera_z_far: 1000.0,
            orbit_sensitivity: 0.005,

            player_start: Vec3::new(0.0, 5.0, 0.0),
            player_half_extents: Vec3::ONE,
            player_mass: 1.0,
            obstacle_start: Vec3::new(0.0, 5.0, -5.0),
            obstacle_half_extents: Vec3::ONE,
            obstacle_mass: 0.1,
            obstacle_color: 0x2596be,

            ground_size: 1000.0,
            ground_color: 0xffe400,
            grid_size: 200.0,
            grid_divisions: 50,
            point_light_pos: Vec3::new(5.0, 5.0, 5.0),

            asset_root: "assets".to_string(),
            model_path: "robot_dog/scene.gltf".to_string(),
            sky_path: "images/sky.jpeg".to_string(),
        }
    }
}

impl DemoConfig {
    /// Per-frame animation advance, independent of the measured frame time.
    pub fn animation_increment(&self) -> f32 {
        self.animation_step * self.animation_speed_factor
    }

    pub fn model_url(&self) -> String {
        join_asset_path(&self.asset_root, &self.model_path)
    }

    pub fn sky_url(&self) -> String {
        join_asset_path(&self.asset_root, &self.sky_path)
    }

    /// Native builds may relocate the asset root with `ROBODOG_ASSET_DIR`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("ROBODOG_ASSET_DIR") {
            if !dir.is_empty() {
                config.asset_root = dir;
            }
        }
        config
    }
}

fn join_asset_path(root: &str, rel: &str) -> String {
    let root = root.trim_end_matches('/');
    let rel = rel.trim_start_matches('/');
    if root.is_empty() {
        rel.to_string()
    } else {
        format!("{root}/{rel}")
    }
}

/// Convert a `0xRRGGBB` color into linear-ish RGBA floats.
pub fn rgb_hex(color: u32) -> [f32; 4] {
    [
        ((color >> 16) & 0xff) as f32 / 255.0,
        ((color >> 8) & 0xff) as f32 / 255.0,
        (color & 0xff) as f32 / 255.0,
        1.0,
    ]
}
