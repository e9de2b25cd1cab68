//! Shared wire grammar for the territory map protocol.
//!
//! This crate owns the wire representation used by both the browser client
//! and the native CLI probe: outbound ASCII commands and inbound
//! text-prefixed frames carrying JSON payloads. Frames are decoded exactly
//! once at the channel boundary into [`ServerFrame`], so everything
//! downstream pattern-matches a tagged value instead of sniffing string
//! prefixes.
//!
//! Polygon rings travel as flat alternating-coordinate lists
//! (`[[x0,y0,x1,y1,...], ...]`); the decoder pairs them into [`Point`]s and
//! rejects rings that are structurally unusable (odd coordinate count, fewer
//! than three points). Centroids travel as an array of `{"x":…,"y":…}`
//! objects.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;

/// Error returned by [`decode_frame`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The frame starts with no known prefix.
    #[error("unrecognized frame prefix: {0:?}")]
    UnknownPrefix(String),
    /// The body after a known prefix is not valid JSON of the expected shape.
    #[error("invalid JSON body after {prefix}: {source}")]
    Json {
        /// The prefix whose body failed to parse.
        prefix: &'static str,
        /// The underlying parser error.
        #[source]
        source: serde_json::Error,
    },
    /// A ring carried an odd number of coordinates and cannot be paired.
    #[error("ring {index} has an odd coordinate count ({len})")]
    OddCoordinates {
        /// Position of the offending ring in the payload.
        index: usize,
        /// Number of raw coordinates received.
        len: usize,
    },
    /// A ring describes fewer than three points.
    #[error("ring {index} has {len} points; a closed ring needs at least 3")]
    ShortRing {
        /// Position of the offending ring in the payload.
        index: usize,
        /// Number of decoded points.
        len: usize,
    },
}

/// A coordinate pair in drawing-surface space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Closed ordered sequence of points describing one polygon's boundary.
/// Insertion order defines draw winding.
pub type Ring = Vec<Point>;

/// An outbound command. The protocol allows a single outstanding command at
/// a time; [`Command::Generate`] opens a cycle and the two queries follow
/// strictly one reply apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Request a fresh map generation with the given surface extent and
    /// subdivision density.
    Generate {
        width: u32,
        height: u32,
        cells_x: u32,
        cells_y: u32,
    },
    /// Fetch the polygon rings of the current map.
    Polygons,
    /// Fetch the per-polygon centroids of the current map.
    Centroids,
}

impl Command {
    /// Render the command in wire form: ASCII, space-separated, no
    /// terminator.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Generate { width, height, cells_x, cells_y } => {
                format!("GEN {width} {height} {cells_x} {cells_y}")
            }
            Self::Polygons => "POL".to_owned(),
            Self::Centroids => "CEN".to_owned(),
        }
    }
}

/// An inbound frame, decoded once at the channel boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerFrame {
    /// A new map has been generated server-side. No body.
    Generated,
    /// Polygon rings of the current map, in index order.
    Polygons(Vec<Ring>),
    /// Per-polygon centroids, positionally matching the polygon order.
    Centroids(Vec<Point>),
    /// No active generation session exists for this connection.
    NoGame,
    /// The server rejected the last command as malformed.
    Invalid,
}

impl ServerFrame {
    /// Wire prefix of this frame, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generated => PREFIX_GENERATED,
            Self::Polygons(_) => PREFIX_POLYGONS,
            Self::Centroids(_) => PREFIX_CENTROIDS,
            Self::NoGame => PREFIX_NOGAME,
            Self::Invalid => PREFIX_INVALID,
        }
    }
}

const PREFIX_GENERATED: &str = "GENERATED";
const PREFIX_POLYGONS: &str = "POLYGONS";
const PREFIX_CENTROIDS: &str = "CENTROIDS";
const PREFIX_NOGAME: &str = "NOGAME";
const PREFIX_INVALID: &str = "INVALID";

/// Decode one inbound text frame.
///
/// Data-bearing frames are `"<PREFIX><JSON body>"` with no separator; exactly
/// the prefix length is stripped before the body is parsed. Bodyless frames
/// must match their prefix exactly.
///
/// # Errors
///
/// [`DecodeError::UnknownPrefix`] for unrecognized frames (a recoverable
/// protocol violation for callers), and the remaining variants for payloads
/// that fail to parse or break ring shape.
pub fn decode_frame(text: &str) -> Result<ServerFrame, DecodeError> {
    match text {
        PREFIX_GENERATED => return Ok(ServerFrame::Generated),
        PREFIX_NOGAME => return Ok(ServerFrame::NoGame),
        PREFIX_INVALID => return Ok(ServerFrame::Invalid),
        _ => {}
    }

    // CENTROIDS before POLYGONS is not load-bearing; no prefix is a prefix
    // of another.
    if let Some(body) = text.strip_prefix(PREFIX_CENTROIDS) {
        let points = serde_json::from_str::<Vec<Point>>(body)
            .map_err(|source| DecodeError::Json { prefix: PREFIX_CENTROIDS, source })?;
        return Ok(ServerFrame::Centroids(points));
    }

    if let Some(body) = text.strip_prefix(PREFIX_POLYGONS) {
        let flat = serde_json::from_str::<Vec<Vec<f64>>>(body)
            .map_err(|source| DecodeError::Json { prefix: PREFIX_POLYGONS, source })?;
        let rings = flat
            .iter()
            .enumerate()
            .map(|(index, coords)| decode_ring(index, coords))
            .collect::<Result<Vec<Ring>, DecodeError>>()?;
        return Ok(ServerFrame::Polygons(rings));
    }

    Err(DecodeError::UnknownPrefix(frame_head(text)))
}

/// Pair one flat alternating-coordinate list into a point ring.
fn decode_ring(index: usize, coords: &[f64]) -> Result<Ring, DecodeError> {
    if coords.len() % 2 != 0 {
        return Err(DecodeError::OddCoordinates { index, len: coords.len() });
    }

    let ring: Ring = coords
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect();

    if ring.len() < 3 {
        return Err(DecodeError::ShortRing { index, len: ring.len() });
    }
    Ok(ring)
}

/// First few characters of an unrecognized frame, for the error message.
fn frame_head(text: &str) -> String {
    text.chars().take(16).collect()
}
