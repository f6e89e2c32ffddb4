use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn canvas_by_id(canvas_id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    let document = window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let el = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", canvas_id))?;
    el.dyn_into::<web::HtmlCanvasElement>()
        .map_err(|_| anyhow::anyhow!("#{} is not a canvas", canvas_id))
}

#[inline]
pub fn device_pixel_ratio() -> f64 {
    web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0)
}

/// Set the canvas backing store from a CSS size; returns the physical pixels.
pub fn set_backing_size(canvas: &web::HtmlCanvasElement, css_w: f64, css_h: f64) -> (u32, u32) {
    let dpr = device_pixel_ratio();
    let w_px = ((css_w * dpr) as u32).max(1);
    let h_px = ((css_h * dpr) as u32).max(1);
    canvas.set_width(w_px);
    canvas.set_height(h_px);
    (w_px, h_px)
}

/// Match the backing store to the element's laid-out size.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> (u32, u32) {
    let rect = canvas.get_bounding_client_rect();
    set_backing_size(canvas, rect.width(), rect.height())
}

/// Client (CSS px) -> canvas backing pixel coordinates.
pub fn to_canvas_coords(
    canvas: &web::HtmlCanvasElement,
    client_x: f64,
    client_y: f64,
) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    let sx = (client_x - rect.left()) / rect.width().max(1.0) * canvas.width() as f64;
    let sy = (client_y - rect.top()) / rect.height().max(1.0) * canvas.height() as f64;
    (sx as f32, sy as f32)
}
