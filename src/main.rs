use std::path::Path;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};
use winit::{
    event::*,
    event_loop::EventLoop,
    window::Window,
};

// Import from the library crate
use robodog::{
    assets::{self, AssetError, LoadedModel},
    config::DemoConfig,
    controller::{input, FrameLoopContext, InputEvent},
    logging, ui,
    view::{GpuContext, RenderState},
};

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,
    frame_ctx: FrameLoopContext,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    model_rx: Option<Receiver<Result<LoadedModel, AssetError>>>,
    last_cursor: Option<(f64, f64)>,
    started: Instant,
    fps: ui::FpsCounter,
}

impl App {
    async fn new(window: Arc<Window>, config: DemoConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let size = window.inner_size();
        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await?;

        let frame_ctx = FrameLoopContext::new(config.clone(), size.width, size.height);
        let mut render_state = RenderState::new(&gpu, &frame_ctx.scene);

        let sky_path = config.sky_url();
        match assets::native::load_sky(Path::new(&sky_path)) {
            Ok(sky) => render_state.sky.set_image(&gpu.device, &gpu.queue, &sky),
            Err(e) => warn!(path = %sky_path, error = %e, "sky load failed, using clear color"),
        }

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        Ok(Self {
            window,
            gpu,
            render_state,
            frame_ctx,
            egui_state,
            egui_ctx,
            model_rx: Some(assets::native::spawn_model_load(config.model_url())),
            last_cursor: None,
            started: Instant::now(),
            fps: ui::FpsCounter::default(),
        })
    }

    /// Returns true when the event was fully handled here.
    fn input(&mut self, event: &WindowEvent) -> bool {
        // First let egui process the event
        let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;

        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, logical_key, .. }, .. } => {
                if let Some(key) = input::native::key_id(logical_key) {
                    let event = match state {
                        ElementState::Pressed => InputEvent::KeyDown(key),
                        ElementState::Released => InputEvent::KeyUp(key),
                    };
                    self.frame_ctx.handle_event(&event);
                }
                true
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                match state {
                    ElementState::Pressed if !egui_captured => self.frame_ctx.handle_event(&InputEvent::DragStart),
                    ElementState::Pressed => {}
                    ElementState::Released => self.frame_ctx.handle_event(&InputEvent::DragEnd),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((lx, ly)) = self.last_cursor {
                    self.frame_ctx.handle_event(&InputEvent::DragMove {
                        dx: (position.x - lx) as f32,
                        dy: (position.y - ly) as f32,
                    });
                }
                self.last_cursor = Some((position.x, position.y));
                true
            }
            WindowEvent::Focused(false) => {
                self.frame_ctx.handle_event(&InputEvent::FocusLost);
                true
            }
            WindowEvent::Occluded(occluded) => {
                self.frame_ctx
                    .handle_event(&InputEvent::VisibilityChanged { visible: !occluded });
                true
            }
            _ => egui_captured,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.render_state
                .resize(&self.gpu.device, &self.gpu.surface, new_size.width, new_size.height);
            self.frame_ctx.resize(new_size.width, new_size.height);
        }
    }

    /// Hand a finished background load to the frame loop.
    fn poll_model(&mut self) {
        let Some(rx) = &self.model_rx else { return };
        match rx.try_recv() {
            Ok(Ok(model)) => {
                self.frame_ctx.on_model_loaded(model);
                self.model_rx = None;
            }
            Ok(Err(e)) => {
                error!(error = %e, "model load failed");
                self.model_rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                error!("model loader exited without a result");
                self.model_rx = None;
            }
        }
    }

    fn update(&mut self) {
        self.poll_model();
        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let stats = self.frame_ctx.update(now_ms);
        let fps = self.fps.tick(stats.dt);

        self.render_state
            .prepare(&self.gpu.device, &self.gpu.queue, &self.frame_ctx.cam, &self.frame_ctx.scene);

        let info = ui::OverlayInfo::from_context(&self.frame_ctx, fps);
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let mut full_output = ui::build_ui(&self.egui_ctx, raw_input, &info);
        self.egui_state
            .handle_platform_output(&self.window, std::mem::take(&mut full_output.platform_output));
        let ppp = full_output.pixels_per_point;
        let primitives = self.egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), ppp);
        self.render_state.set_ui(primitives, full_output, ppp);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.render_state
            .draw_frame(&self.gpu.device, &self.gpu.queue, &self.gpu.surface)
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DemoConfig::from_env();
    info!(assets = %config.asset_root, "robodog starting");

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("Robodog")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window, config))?;

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            app.update();
                            match app.render() {
                                Ok(()) => {}
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    error!("GPU out of memory");
                                    elwt.exit();
                                }
                                Err(e) => warn!(error = ?e, "surface error"),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;
    Ok(())
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        error!(error = %e, "robodog failed");
        std::process::exit(1);
    }
}
