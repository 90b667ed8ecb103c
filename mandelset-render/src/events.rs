use std::fmt;

use crate::raster::Raster;

/// Progress value meaning "no render of this purpose is active".
pub const PROGRESS_IDLE: i32 = -1;

/// Why a render was requested. Each purpose has its own session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Interactive render shown on screen and kept in the frame cache.
    Preview,
    /// Export render written to the output file.
    Save,
}

impl Purpose {
    pub const ALL: [Purpose; 2] = [Purpose::Preview, Purpose::Save];

    pub fn label(self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Save => "save",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Callbacks the engine uses to talk to the outside world.
///
/// Called from render threads, never from the thread that triggered the
/// render. Implementations must return quickly.
pub trait RenderObserver: Send + Sync {
    /// `percent` is in `0..100` while rendering and [`PROGRESS_IDLE`] once done.
    fn on_progress(&self, percent: i32, purpose: Purpose);

    /// A Preview render finished, or a degraded one fell back to the cached frame.
    fn on_frame_ready(&self, raster: Raster);

    /// A render degraded or a save failed.
    fn on_error(&self, message: &str);
}

/// Observer that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RenderObserver for NullObserver {
    fn on_progress(&self, _percent: i32, _purpose: Purpose) {}
    fn on_frame_ready(&self, _raster: Raster) {}
    fn on_error(&self, _message: &str) {}
}
