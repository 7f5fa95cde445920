// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;

pub use render::{RenderState, CameraUniform, LightingUniform, ObjectUniform};
pub use gpu_init::{GpuContext, GpuError};
