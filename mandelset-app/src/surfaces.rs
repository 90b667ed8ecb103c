use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use image::RgbaImage;
use tracing::{debug, warn};

use mandelset_render::{Purpose, Raster, RenderObserver};

use crate::overlay::raster_to_image;
use crate::status::{ProgressBoard, StatusBoard};

/// The observable side of the application: progress, status line and the
/// image currently on display.
///
/// Render threads write here through [`RenderObserver`]; the controller and
/// `main` read from it.
pub struct AppSurfaces {
    progress: ProgressBoard,
    status: StatusBoard,
    display: Mutex<Option<RgbaImage>>,
    frames_shown: AtomicUsize,
}

impl AppSurfaces {
    pub fn new(status_quiet_period: Duration) -> Self {
        Self {
            progress: ProgressBoard::new(),
            status: StatusBoard::new(status_quiet_period),
            display: Mutex::new(None),
            frames_shown: AtomicUsize::new(0),
        }
    }

    pub fn progress(&self) -> &ProgressBoard {
        &self.progress
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Replace the displayed image.
    pub fn show(&self, image: RgbaImage) {
        *self.display.lock().unwrap_or_else(PoisonError::into_inner) = Some(image);
        self.frames_shown.fetch_add(1, Ordering::Relaxed);
    }

    pub fn display(&self) -> Option<RgbaImage> {
        self.display
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times the display has been replaced.
    pub fn frames_shown(&self) -> usize {
        self.frames_shown.load(Ordering::Relaxed)
    }
}

impl RenderObserver for AppSurfaces {
    fn on_progress(&self, percent: i32, purpose: Purpose) {
        self.progress.update(percent, purpose);
    }

    fn on_frame_ready(&self, raster: Raster) {
        debug!(
            width = raster.width(),
            height = raster.height(),
            "Displaying frame"
        );
        self.show(raster_to_image(&raster));
    }

    fn on_error(&self, message: &str) {
        warn!("{message}");
        self.status.set(message);
    }
}
