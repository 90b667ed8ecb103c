use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::complex::Complex;
use crate::error::CoreError;
use crate::escape::{classify, Membership};
use crate::viewport::{Extent, Viewport};

/// Immutable snapshot of everything a render needs.
///
/// A render takes this by value when it starts; later edits to the live
/// configuration produce a new snapshot and never reach a render in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderParameters {
    pub viewport: Viewport,
    pub max_iterations: u32,
    pub divergence_threshold: f64,
    #[serde(default)]
    pub show_axes: bool,
}

impl RenderParameters {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 10_000;
    pub const DEFAULT_THRESHOLD: f64 = 2.0;

    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Classify the point under pixel `(px, py)`.
    #[inline]
    pub fn classify_pixel(&self, px: u32, py: u32) -> Membership {
        let c = self.viewport.to_plane(px as f64, py as f64);
        classify(c.re, c.im, self.max_iterations, self.divergence_threshold)
    }

    /// Return a copy with a different iteration bound.
    pub fn with_max_iterations(self, max_iterations: u32) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// Return a copy with a different divergence threshold, rejecting
    /// values that would make every point escape or none.
    pub fn with_threshold(self, threshold: f64) -> crate::Result<Self> {
        if threshold <= 0.0 || !threshold.is_finite() {
            debug!(threshold, "Rejected divergence threshold");
            return Err(CoreError::InvalidThreshold(threshold));
        }
        Ok(Self {
            divergence_threshold: threshold,
            ..self
        })
    }

    /// Return a copy looking at `center`, which must be finite.
    pub fn with_center(self, center: Complex) -> crate::Result<Self> {
        if !center.is_finite() {
            return Err(CoreError::InvalidCenter(center));
        }
        let mut next = self;
        next.viewport.center = center;
        Ok(next)
    }

    /// Return a copy spanning `extent`, whose sides must be positive and finite.
    pub fn with_extent(self, extent: Extent) -> crate::Result<Self> {
        let valid = |v: f64| v > 0.0 && v.is_finite();
        if !valid(extent.width) || !valid(extent.height) {
            debug!(width = extent.width, height = extent.height, "Rejected extent");
            return Err(CoreError::InvalidExtent {
                width: extent.width,
                height: extent.height,
            });
        }
        let mut next = self;
        next.viewport.extent = extent;
        Ok(next)
    }
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            divergence_threshold: Self::DEFAULT_THRESHOLD,
            show_axes: false,
        }
    }
}
