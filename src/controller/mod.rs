// CONTROLLER: Input, physics, movement and the per-frame update
pub mod input;
pub mod physics;
pub mod movement;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{ActionSet, InputEvent, InputProcessor, InputState, MoveAction, TouchButton};
pub use physics::{BodyHandle, BodyKind, BodyShape, PhysicsSystem};
pub use movement::{MotionState, MovementResolver};
pub use camera_controller::CameraController;
pub use frame_loop::{FrameLoopContext, FrameStats};
