pub mod assets;
pub mod config;
pub mod logging;
pub mod utils;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
use std::cell::{Cell, RefCell};
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use tracing::{error, info, warn};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Event, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent, Window};

#[cfg(target_arch = "wasm32")]
use assets::{LoadedModel, SkyImage};
#[cfg(target_arch = "wasm32")]
use config::DemoConfig;
#[cfg(target_arch = "wasm32")]
use controller::input::{self, InputEvent, TouchButton};
#[cfg(target_arch = "wasm32")]
use controller::FrameLoopContext;
#[cfg(target_arch = "wasm32")]
use view::{GpuContext, RenderState};

#[cfg(target_arch = "wasm32")]
const CANVAS_ID: &str = "bg";
#[cfg(target_arch = "wasm32")]
const MOBILE_CONTROLS_ID: &str = "mobile-controls";

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();
    info!("robodog starting");

    let window = web_sys::window().ok_or_else(|| js_error("no global `window`"))?;
    let document = window.document().ok_or_else(|| js_error("no document on window"))?;
    let canvas = init_canvas(&document)?;
    let (width, height) = fit_canvas(&window, &canvas);
    setup_app(&window, &document, &canvas, width, height).await
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    width: u32,
    height: u32,
) -> Result<(), JsValue> {
    let gpu = GpuContext::new(canvas, width, height)
        .await
        .map_err(|e| js_error(format!("GPU init failed: {e}")))?;

    let config = DemoConfig::default();
    let frame_ctx = Rc::new(RefCell::new(FrameLoopContext::new(config.clone(), width, height)));
    let mut render_state = RenderState::new(&gpu, &frame_ctx.borrow().scene);

    let egui_ctx = egui::Context::default();
    let egui_events: Rc<RefCell<Vec<egui::Event>>> = Rc::new(RefCell::new(Vec::new()));
    let model_inbox: Rc<RefCell<Option<LoadedModel>>> = Rc::new(RefCell::new(None));
    let sky_inbox: Rc<RefCell<Option<SkyImage>>> = Rc::new(RefCell::new(None));
    let pending_resize: Rc<Cell<Option<(u32, u32)>>> = Rc::new(Cell::new(None));

    setup_input_listeners(document, window, canvas, frame_ctx.clone(), egui_ctx.clone(), egui_events.clone())?;
    setup_touch_controls(document, frame_ctx.clone())?;
    update_mobile_controls_visibility(window, document);
    setup_resize_listener(window, canvas, pending_resize.clone())?;
    spawn_asset_loads(&config, model_inbox.clone(), sky_inbox.clone());

    let mut fps = ui::FpsCounter::default();
    let f = RcCellCallback::new(window.clone(), {
        let window = window.clone();

        move || {
            let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
            let device = gpu.device.as_ref();
            let queue = gpu.queue.as_ref();

            // Completed loads land at the start of the frame
            if let Some(model) = model_inbox.borrow_mut().take() {
                frame_ctx.borrow_mut().on_model_loaded(model);
            }
            if let Some(sky) = sky_inbox.borrow_mut().take() {
                render_state.sky.set_image(device, queue, &sky);
            }
            if let Some((w, h)) = pending_resize.take() {
                render_state.resize(device, &gpu.surface, w, h);
                frame_ctx.borrow_mut().resize(w, h);
            }

            let mut ctx = frame_ctx.borrow_mut();
            let stats = ctx.update(now);
            render_state.prepare(device, queue, &ctx.cam, &ctx.scene);
            let info = ui::OverlayInfo::from_context(&ctx, fps.tick(stats.dt));
            drop(ctx);

            let dpr = window.device_pixel_ratio() as f32;
            egui_ctx.set_pixels_per_point(dpr);
            let events = egui_events.borrow_mut().drain(..).collect();
            let raw_input = ui::screen_input(render_state.width(), render_state.height(), dpr, now, events);
            let mut full_output = ui::build_ui(&egui_ctx, raw_input, &info);
            let primitives = egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), dpr);
            render_state.set_ui(primitives, full_output, dpr);

            if let Err(e) = render_state.draw_frame(device, queue, &gpu.surface) {
                error!(error = ?e, "frame render failed");
            }
        }
    });
    f.start()?;

    info!(width, height, "robodog running");
    Ok(())
}

/// Kick off model and sky fetches; results are picked up by the frame loop.
#[cfg(target_arch = "wasm32")]
fn spawn_asset_loads(
    config: &DemoConfig,
    model_inbox: Rc<RefCell<Option<LoadedModel>>>,
    sky_inbox: Rc<RefCell<Option<SkyImage>>>,
) {
    let model_url = config.model_url();
    wasm_bindgen_futures::spawn_local(async move {
        match assets::web::load_model(&model_url).await {
            Ok(model) => *model_inbox.borrow_mut() = Some(model),
            Err(e) => error!(url = %model_url, error = %e, "model load failed"),
        }
    });

    let sky_url = config.sky_url();
    wasm_bindgen_futures::spawn_local(async move {
        match assets::web::load_sky(&sky_url).await {
            Ok(sky) => *sky_inbox.borrow_mut() = Some(sky),
            Err(e) => error!(url = %sky_url, error = %e, "sky load failed"),
        }
    });
}

/// Setup all input event listeners with platform-agnostic abstractions
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    canvas: &HtmlCanvasElement,
    frame_ctx: Rc<RefCell<FrameLoopContext>>,
    egui_ctx: egui::Context,
    egui_events: Rc<RefCell<Vec<egui::Event>>>,
) -> Result<(), JsValue> {
    // Keyboard down
    {
        let frame_ctx = frame_ctx.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let mut ctx = frame_ctx.borrow_mut();
            if ctx.input_processor.wants_prevent_default(&e.key()) {
                e.prevent_default();
            }
            ctx.handle_event(&input::wasm::keyboard_event_to_input(&e, true));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let frame_ctx = frame_ctx.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            frame_ctx
                .borrow_mut()
                .handle_event(&input::wasm::keyboard_event_to_input(&e, false));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss - clear all keys
    {
        let frame_ctx = frame_ctx.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            frame_ctx.borrow_mut().handle_event(&InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Visibility change - clear all keys
    {
        let frame_ctx = frame_ctx.clone();
        let doc = document.clone();
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            let visible = !doc.hidden();
            frame_ctx
                .borrow_mut()
                .handle_event(&InputEvent::VisibilityChanged { visible });
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
        visibility.forget();
    }

    // Mouse down on the canvas starts an orbit drag unless egui has the pointer
    {
        let frame_ctx = frame_ctx.clone();
        let egui_events_q = egui_events.clone();
        let mousedown = Closure::wrap(Box::new(move |e: MouseEvent| {
            let pos = egui::pos2(e.client_x() as f32, e.client_y() as f32);
            egui_events_q.borrow_mut().push(pointer_button(pos, true));
            if !egui_ctx.is_pointer_over_area() {
                frame_ctx.borrow_mut().handle_event(&InputEvent::DragStart);
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();
    }

    // Mouse move
    {
        let frame_ctx = frame_ctx.clone();
        let egui_events_q = egui_events.clone();
        let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
            egui_events_q
                .borrow_mut()
                .push(egui::Event::PointerMoved(egui::pos2(e.client_x() as f32, e.client_y() as f32)));
            frame_ctx
                .borrow_mut()
                .handle_event(&input::wasm::mouse_move_to_input(&e));
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
        mm.forget();
    }

    // Mouse up anywhere ends the drag
    {
        let mouseup = Closure::wrap(Box::new(move |e: MouseEvent| {
            let pos = egui::pos2(e.client_x() as f32, e.client_y() as f32);
            egui_events.borrow_mut().push(pointer_button(pos, false));
            frame_ctx.borrow_mut().handle_event(&InputEvent::DragEnd);
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
        mouseup.forget();
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn pointer_button(pos: egui::Pos2, pressed: bool) -> egui::Event {
    egui::Event::PointerButton {
        pos,
        button: egui::PointerButton::Primary,
        pressed,
        modifiers: egui::Modifiers::default(),
    }
}

/// Touch listeners on the on-screen arrow buttons. Missing buttons are skipped.
#[cfg(target_arch = "wasm32")]
fn setup_touch_controls(document: &Document, frame_ctx: Rc<RefCell<FrameLoopContext>>) -> Result<(), JsValue> {
    for button in TouchButton::ALL {
        let Some(element) = document.get_element_by_id(button.element_id()) else {
            warn!(id = button.element_id(), "mobile control button missing");
            continue;
        };

        let start = {
            let frame_ctx = frame_ctx.clone();
            Closure::wrap(Box::new(move |e: TouchEvent| {
                e.prevent_default();
                frame_ctx.borrow_mut().handle_event(&InputEvent::TouchStart(button));
            }) as Box<dyn FnMut(TouchEvent)>)
        };
        let end = {
            let frame_ctx = frame_ctx.clone();
            Closure::wrap(Box::new(move |_e: TouchEvent| {
                frame_ctx.borrow_mut().handle_event(&InputEvent::TouchEnd(button));
            }) as Box<dyn FnMut(TouchEvent)>)
        };

        element.add_event_listener_with_callback("touchstart", start.as_ref().unchecked_ref())?;
        element.add_event_listener_with_callback("touchend", end.as_ref().unchecked_ref())?;
        element.add_event_listener_with_callback("touchcancel", end.as_ref().unchecked_ref())?;
        start.forget();
        end.forget();
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn update_mobile_controls_visibility(window: &Window, document: &Document) {
    let Some(controls) = document
        .get_element_by_id(MOBILE_CONTROLS_ID)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        warn!(id = MOBILE_CONTROLS_ID, "mobile controls container missing");
        return;
    };
    let user_agent = window.navigator().user_agent().unwrap_or_default();
    let mobile = input::is_mobile_user_agent(&user_agent);
    let display = if mobile { "block" } else { "none" };
    if let Err(e) = controls.style().set_property("display", display) {
        warn!(error = ?e, "could not toggle mobile controls");
    }
    info!(mobile, "mobile controls visibility set");
}

#[cfg(target_arch = "wasm32")]
fn setup_resize_listener(
    window: &Window,
    canvas: &HtmlCanvasElement,
    pending_resize: Rc<Cell<Option<(u32, u32)>>>,
) -> Result<(), JsValue> {
    let win = window.clone();
    let canvas = canvas.clone();
    let resize = Closure::wrap(Box::new(move |_e: Event| {
        pending_resize.set(Some(fit_canvas(&win, &canvas)));
    }) as Box<dyn FnMut(Event)>);
    window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
    resize.forget();
    Ok(())
}

/// Size the canvas backing store to the window in physical pixels.
#[cfg(target_arch = "wasm32")]
fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
    let css_w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
    let css_h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
    let dpr = window.device_pixel_ratio();
    let width = (css_w * dpr).round().max(1.0) as u32;
    let height = (css_h * dpr).round().max(1.0) as u32;
    canvas.set_width(width);
    canvas.set_height(height);
    let style = canvas.style();
    let _ = style.set_property("width", &format!("{css_w}px"));
    let _ = style.set_property("height", &format!("{css_h}px"));
    (width, height)
}

/// The `#bg` canvas from the page, or a fresh one appended to the body.
#[cfg(target_arch = "wasm32")]
fn init_canvas(document: &Document) -> Result<HtmlCanvasElement, JsValue> {
    if let Some(existing) = document.get_element_by_id(CANVAS_ID) {
        return existing
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("#bg is not a canvas"));
    }
    let body = document.body().ok_or_else(|| js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_id(CANVAS_ID);
    body.append_child(&canvas_el)?;
    Ok(canvas_el)
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

/// requestAnimationFrame driver. The next frame is requested before the
/// callback body runs.
#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) -> Result<(), JsValue> {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if let Some(cb) = callback_clone.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    error!(error = ?e, "requestAnimationFrame failed");
                }
            }
            inner.borrow_mut().as_mut()();
        }) as Box<dyn FnMut()>));

        if let Some(cb) = callback.borrow().as_ref() {
            self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        }

        // Leak the closure to keep it alive
        std::mem::forget(callback);
        Ok(())
    }
}
