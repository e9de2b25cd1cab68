//! Drawing-surface allocation.
//!
//! Mounts the `<canvas>` element the renderer draws into: physical size
//! scaled by the device pixel ratio, CSS size at the configured extent,
//! attached to the document body.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// A mounted drawing surface and the parameters every render pass needs.
pub struct Surface {
    pub ctx: CanvasRenderingContext2d,
    /// Viewport width in CSS pixels.
    pub width: f64,
    /// Viewport height in CSS pixels.
    pub height: f64,
    /// Device pixel ratio the backing store is scaled by.
    pub dpr: f64,
}

/// Create a canvas of the given CSS extent and attach it to the body.
///
/// # Errors
///
/// Returns `Err` when the DOM is unavailable or refuses the element.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn mount(width: u32, height: u32) -> Result<Surface, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("no document body"))?;

    let dpr = window.device_pixel_ratio().max(1.0);
    let canvas = document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width((f64::from(width) * dpr).round() as u32);
    canvas.set_height((f64::from(height) * dpr).round() as u32);
    canvas.style().set_property("width", &format!("{width}px"))?;
    canvas.style().set_property("height", &format!("{height}px"))?;
    body.append_child(&canvas)?;

    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    Ok(Surface { ctx, width: f64::from(width), height: f64::from(height), dpr })
}
