//! Rendering: draws a scene snapshot to a 2D context.
//!
//! This module is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]. It receives a read-only [`Scene`]
//! view and produces pixels. It never mutates application state, so
//! repeated draws of an unchanged scene are visually identical. Every pass
//! clears the previous one first; primitives never accumulate.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The session loop handles the result.

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use protocol::Point;

use crate::consts::{
    MARKER_FILL, MARKER_RADIUS, MARKER_SIZE, POLYGON_FILL, POLYGON_STROKE, POLYGON_STROKE_WIDTH,
};
use crate::scene::Scene;

/// Presentation parameters for a render pass. These are client construction
/// inputs, not protocol data.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Polygon fill color (CSS color string).
    pub fill: String,
    /// Polygon outline color.
    pub stroke: String,
    /// Polygon outline width in surface pixels.
    pub stroke_width: f64,
    /// Centroid marker fill color.
    pub marker_fill: String,
    /// Centroid marker edge length in surface pixels.
    pub marker_size: f64,
    /// Centroid marker corner radius.
    pub marker_radius: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: POLYGON_FILL.to_owned(),
            stroke: POLYGON_STROKE.to_owned(),
            stroke_width: POLYGON_STROKE_WIDTH,
            marker_fill: MARKER_FILL.to_owned(),
            marker_size: MARKER_SIZE,
            marker_radius: MARKER_RADIUS,
        }
    }
}

/// Draw the full scene: polygon fills and outlines first, centroid markers
/// on top so they are never occluded.
///
/// `viewport_w` and `viewport_h` are in CSS pixels. `dpr` is the device
/// pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene<'_>,
    style: &Style,
    viewport_w: f64,
    viewport_h: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    // Layer 0: reset the transform and clear the previous pass.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);

    // Layer 1: polygons in index order.
    for ring in scene.polygons {
        draw_polygon(ctx, ring, style);
    }

    // Layer 2: centroid markers in index order.
    for point in scene.centroids {
        draw_marker(ctx, *point, style)?;
    }

    Ok(())
}

fn draw_polygon(ctx: &CanvasRenderingContext2d, ring: &[Point], style: &Style) {
    let Some(first) = ring.first() else {
        return;
    };

    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for point in &ring[1..] {
        ctx.line_to(point.x, point.y);
    }
    ctx.close_path();

    ctx.set_fill_style_str(&style.fill);
    ctx.fill();

    ctx.set_stroke_style_str(&style.stroke);
    ctx.set_line_width(style.stroke_width);
    ctx.stroke();
}

/// Small filled rounded rectangle centered on the centroid.
fn draw_marker(ctx: &CanvasRenderingContext2d, center: Point, style: &Style) -> Result<(), JsValue> {
    let size = style.marker_size;
    let half = size / 2.0;
    let r = style.marker_radius.min(half);
    let x = center.x - half;
    let y = center.y - half;

    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.arc_to(x + size, y, x + size, y + size, r)?;
    ctx.arc_to(x + size, y + size, x, y + size, r)?;
    ctx.arc_to(x, y + size, x, y, r)?;
    ctx.arc_to(x, y, x + size, y, r)?;
    ctx.close_path();

    ctx.set_fill_style_str(&style.marker_fill);
    ctx.fill();
    Ok(())
}

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;
