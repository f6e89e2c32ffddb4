#![cfg(target_arch = "wasm32")]
//! Browser front-end: a `<canvas>`-backed viewport exposed to JavaScript.

mod dom;
mod events;
mod frame;

use std::cell::RefCell;
use std::rc::Rc;
use viewport_core::{
    GpuRenderer, Theme, ViewMode, ViewportConfig, ViewportEngine, ViewportError, ViewportSize,
};
use wasm_bindgen::prelude::*;
use web_sys as web;

type Engine = ViewportEngine<GpuRenderer<'static>>;
pub(crate) type SharedEngine = Rc<RefCell<Option<Engine>>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("viewport-web loaded");
    Ok(())
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Live viewport bound to one canvas. Call `destroy()` to stop rendering and
/// release the GPU resources.
#[wasm_bindgen]
pub struct ScreenViewport {
    engine: SharedEngine,
    canvas: web::HtmlCanvasElement,
    listeners: events::Listeners,
    frame_loop: frame::FrameLoop,
}

/// Create a viewport on `#canvasId`. Rejects when no GPU context can be
/// acquired.
#[wasm_bindgen(js_name = createViewport)]
pub async fn create_viewport(canvas_id: String) -> Result<ScreenViewport, JsValue> {
    let canvas = dom::canvas_by_id(&canvas_id).map_err(js_err)?;
    let (w, h) = dom::sync_canvas_backing_size(&canvas);
    let renderer = GpuRenderer::new(
        wgpu::SurfaceTarget::Canvas(canvas.clone()),
        ViewportSize::new(w, h),
    )
    .await
    .map_err(|e| {
        log::error!("[gpu] init failed: {}", e);
        js_err(e)
    })?;
    let mut engine = ViewportEngine::new(ViewportConfig::default(), renderer).map_err(js_err)?;
    engine.resize(w, h).map_err(js_err)?;

    let engine: SharedEngine = Rc::new(RefCell::new(Some(engine)));
    let listeners = events::wire_input_handlers(&canvas, &engine);
    let mut frame_loop = frame::FrameLoop::default();
    frame_loop.start(engine.clone());
    log::info!("[scene] viewport ready on #{} ({}x{})", canvas_id, w, h);
    Ok(ScreenViewport {
        engine,
        canvas,
        listeners,
        frame_loop,
    })
}

impl ScreenViewport {
    fn with_engine<T>(
        &self,
        f: impl FnOnce(&mut Engine) -> Result<T, ViewportError>,
    ) -> Result<T, JsValue> {
        let mut slot = self.engine.borrow_mut();
        let engine = slot
            .as_mut()
            .ok_or_else(|| JsValue::from_str("viewport destroyed"))?;
        f(engine).map_err(js_err)
    }
}

#[wasm_bindgen]
impl ScreenViewport {
    /// Replace the screen list. Accepts an array of screen objects or its
    /// JSON text.
    #[wasm_bindgen(js_name = updateScreens)]
    pub fn update_screens(&self, specs: JsValue) -> Result<(), JsValue> {
        let json = match specs.as_string() {
            Some(s) => s,
            None => js_sys::JSON::stringify(&specs)?
                .as_string()
                .ok_or_else(|| JsValue::from_str("screens are not serializable"))?,
        };
        self.with_engine(|e| e.update_screens_json(&json))
    }

    /// `"front" | "top" | "isometric"`
    #[wasm_bindgen(js_name = setViewMode)]
    pub fn set_view_mode(&self, mode: &str) -> Result<(), JsValue> {
        self.with_engine(|e| {
            e.set_view_mode(mode.parse::<ViewMode>()?);
            Ok(())
        })
    }

    /// `"light" | "dark"`
    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, theme: &str) -> Result<(), JsValue> {
        self.with_engine(|e| e.set_theme(theme.parse::<Theme>()?))
    }

    /// New CSS size of the canvas; the backing store follows the device
    /// pixel ratio.
    pub fn resize(&self, css_width: f64, css_height: f64) -> Result<(), JsValue> {
        let (w, h) = dom::set_backing_size(&self.canvas, css_width, css_height);
        self.with_engine(|e| e.resize(w, h))
    }

    /// Stop the frame loop, detach listeners and drop the GPU renderer.
    pub fn destroy(&mut self) {
        self.frame_loop.stop();
        self.listeners.remove_all();
        if let Some(engine) = self.engine.borrow_mut().take() {
            drop(engine.shutdown());
            log::info!("[gpu] renderer released");
        }
    }
}
