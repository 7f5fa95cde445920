// MODEL: Scene state and data
pub mod animation;
pub mod camera;
pub mod scene;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer};
pub use camera::Camera;
pub use scene::{ObstacleVisual, PlayerVisual, PointLight, Scene, Transform};
