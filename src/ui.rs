use egui::Context;
use glam::Vec3;

use crate::controller::{FrameLoopContext, MotionState};

/// Frames-per-second averaged over roughly one second of measured time.
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn tick(&mut self, dt: f32) -> f32 {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed >= 1.0 {
            self.fps = self.frames as f32 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
        }
        self.fps
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationStatus {
    /// Model not loaded yet, or it has no clips.
    None,
    Paused { time: f32 },
    Playing { time: f32 },
}

impl AnimationStatus {
    pub fn label(&self) -> String {
        match self {
            AnimationStatus::None => "none".to_string(),
            AnimationStatus::Paused { time } => format!("paused @ {time:.2}s"),
            AnimationStatus::Playing { time } => format!("playing @ {time:.2}s"),
        }
    }
}

/// Snapshot of what the overlay shows, taken after the frame update.
#[derive(Debug, Clone, Copy)]
pub struct OverlayInfo {
    pub fps: f32,
    pub player: Option<(Vec3, f32)>,
    pub motion: MotionState,
    pub animation: AnimationStatus,
    pub physics_steps: u64,
}

impl OverlayInfo {
    pub fn from_context(ctx: &FrameLoopContext, fps: f32) -> Self {
        let animation = match ctx.scene.mixer.as_ref().map(|m| m.action()) {
            Some(action) if action.paused => AnimationStatus::Paused { time: action.time },
            Some(action) => AnimationStatus::Playing { time: action.time },
            None => AnimationStatus::None,
        };
        Self {
            fps,
            player: ctx.scene.player_transform().map(|t| (t.position, t.yaw)),
            motion: ctx.motion_state(),
            animation,
            physics_steps: ctx.physics_system.step_count(),
        }
    }
}

/// Raw input for a canvas of `width`x`height` physical pixels.
pub fn screen_input(width: u32, height: u32, dpr: f32, now_ms: f64, events: Vec<egui::Event>) -> egui::RawInput {
    let mut raw_input = egui::RawInput::default();
    raw_input.time = Some(now_ms / 1000.0);
    raw_input.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::new(0.0, 0.0),
        egui::vec2(width as f32 / dpr, height as f32 / dpr),
    ));
    raw_input.events = events;
    raw_input
}

/// Build the complete UI and return egui output
pub fn build_ui(egui_ctx: &Context, raw_input: egui::RawInput, info: &OverlayInfo) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        draw_debug_window(ctx, info);
    })
}

fn draw_debug_window(ctx: &Context, info: &OverlayInfo) {
    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .default_size([180.0, 140.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", info.fps)).small());
            match info.player {
                Some((pos, yaw)) => {
                    ui.label(egui::RichText::new(format!("Pos: x: {:.1} y: {:.1} z: {:.1}", pos.x, pos.y, pos.z)).small());
                    ui.label(egui::RichText::new(format!("Yaw: {:.1}", yaw.to_degrees())).small());
                }
                None => {
                    ui.label(egui::RichText::new("Loading model...").small());
                }
            }
            let motion = match info.motion {
                MotionState::Idle => "idle",
                MotionState::Moving => "moving",
            };
            ui.label(egui::RichText::new(format!("Motion: {motion}")).small());
            ui.label(egui::RichText::new(format!("Animation: {}", info.animation.label())).small());
            ui.label(egui::RichText::new(format!("Physics steps: {}", info.physics_steps)).small());
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            ui.label(egui::RichText::new("W / Up - Forward").small());
            ui.label(egui::RichText::new("S / Down - Back").small());
            ui.label(egui::RichText::new("A / D - Strafe and turn").small());
            ui.label(egui::RichText::new("Left / Right - Turn").small());
            ui.label(egui::RichText::new("Drag - Orbit camera").small());
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoConfig;

    #[test]
    fn fps_updates_once_per_second() {
        let mut fps = FpsCounter::default();
        for _ in 0..59 {
            assert_eq!(fps.tick(1.0 / 60.0), 0.0);
        }
        // float drift may need one more frame to cross the second
        let mut value = fps.tick(1.0 / 60.0);
        if value == 0.0 {
            value = fps.tick(1.0 / 60.0);
        }
        assert!((value - 60.0).abs() < 1.5, "fps {value}");
        assert_eq!(fps.fps(), value);
    }

    #[test]
    fn animation_labels() {
        assert_eq!(AnimationStatus::None.label(), "none");
        assert_eq!(AnimationStatus::Paused { time: 0.5 }.label(), "paused @ 0.50s");
        assert_eq!(AnimationStatus::Playing { time: 1.25 }.label(), "playing @ 1.25s");
    }

    #[test]
    fn overlay_before_model_load() {
        let ctx = FrameLoopContext::new(DemoConfig::default(), 800, 600);
        let info = OverlayInfo::from_context(&ctx, 30.0);
        assert!(info.player.is_none());
        assert_eq!(info.animation, AnimationStatus::None);
        assert_eq!(info.motion, MotionState::Idle);
        assert_eq!(info.physics_steps, 0);
    }

    #[test]
    fn builds_headless() {
        let ctx = FrameLoopContext::new(DemoConfig::default(), 800, 600);
        let info = OverlayInfo::from_context(&ctx, 60.0);
        let egui_ctx = Context::default();
        let output = build_ui(&egui_ctx, screen_input(800, 600, 1.0, 0.0, Vec::new()), &info);
        // the first pass always uploads the font atlas
        assert!(!output.textures_delta.set.is_empty());
    }
}
