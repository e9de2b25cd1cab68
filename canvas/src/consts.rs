//! Default presentation parameters for the canvas crate.

// ── Polygons ────────────────────────────────────────────────────

/// Default polygon fill color.
pub const POLYGON_FILL: &str = "#66ccff";

/// Default polygon outline color.
pub const POLYGON_STROKE: &str = "#ff3300";

/// Default polygon outline width in surface pixels.
pub const POLYGON_STROKE_WIDTH: f64 = 2.0;

// ── Centroid markers ────────────────────────────────────────────

/// Centroid marker fill color.
pub const MARKER_FILL: &str = "#1f1a17";

/// Centroid marker edge length in surface pixels.
pub const MARKER_SIZE: f64 = 6.0;

/// Corner radius of the centroid marker.
pub const MARKER_RADIUS: f64 = 2.0;
