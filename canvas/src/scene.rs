//! Scene store: the single source of truth for what gets drawn.
//!
//! Geometry flows in from the protocol decoder on receipt of polygon and
//! centroid payloads and is replaced wholesale each generation cycle; there
//! is no incremental patching. The renderer reads from here through an
//! immutable [`Scene`] snapshot and never writes back.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use protocol::{Point, Ring};

/// Error raised when an insertion would break scene consistency.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// Centroids correspond to polygons by index, so the counts must agree.
    #[error("{centroids} centroids for {polygons} polygons")]
    CountMismatch {
        /// Polygons currently stored.
        polygons: usize,
        /// Centroids in the rejected payload.
        centroids: usize,
    },
}

/// Immutable view of the current scene, borrowed for one render pass.
///
/// `centroids[i]` belongs to `polygons[i]`; the association is positional,
/// never an explicit reference.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub polygons: &'a [Ring],
    pub centroids: &'a [Point],
}

impl Scene<'_> {
    /// True once both payloads of a cycle have landed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.polygons.is_empty() && self.polygons.len() == self.centroids.len()
    }
}

/// Mutable holder for the latest decoded geometry.
///
/// Two replace-not-merge slots. Only the protocol decoder writes here;
/// everything else sees [`Scene`] snapshots.
#[derive(Debug, Default)]
pub struct SceneStore {
    polygons: Vec<Ring>,
    centroids: Vec<Point>,
}

impl SceneStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all geometry at the start of a fresh generation cycle.
    pub fn clear(&mut self) {
        self.polygons.clear();
        self.centroids.clear();
    }

    /// Replace the polygon slot. Any previously stored centroids are dropped
    /// with it, since their positional association no longer holds.
    pub fn set_polygons(&mut self, polygons: Vec<Ring>) {
        self.polygons = polygons;
        self.centroids.clear();
    }

    /// Replace the centroid slot.
    ///
    /// # Errors
    ///
    /// Rejects the payload when its count does not match the stored polygon
    /// count, leaving the store unchanged.
    pub fn set_centroids(&mut self, centroids: Vec<Point>) -> Result<(), SceneError> {
        if centroids.len() != self.polygons.len() {
            return Err(SceneError::CountMismatch {
                polygons: self.polygons.len(),
                centroids: centroids.len(),
            });
        }
        self.centroids = centroids;
        Ok(())
    }

    /// Read-only snapshot for a render pass.
    #[must_use]
    pub fn scene(&self) -> Scene<'_> {
        Scene { polygons: &self.polygons, centroids: &self.centroids }
    }

    /// Number of polygons currently stored.
    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Returns `true` when no geometry is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.centroids.is_empty()
    }
}
