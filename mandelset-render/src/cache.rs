use std::sync::{PoisonError, RwLock};

use crate::raster::Raster;

/// Holds the most recent completed Preview raster.
///
/// Readers get their own copy, so nothing a caller does with a frame can
/// reach the cached one. Only finished, display-ordered rasters are stored.
#[derive(Debug, Default)]
pub struct ImageCache {
    frame: RwLock<Option<Raster>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the cached frame, if any.
    pub fn get(&self) -> Option<Raster> {
        self.frame
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the cached frame.
    pub fn put(&self, raster: Raster) {
        *self.frame.write().unwrap_or_else(PoisonError::into_inner) = Some(raster);
    }

    pub fn is_empty(&self) -> bool {
        self.frame
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
