use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal shared between a session and its render.
///
/// Each session allocates a fresh token; once cancelled a token stays
/// cancelled. The rasterizer polls it once per column.
#[derive(Debug, Clone, Default)]
pub struct RenderCancel {
    flag: Arc<AtomicBool>,
}

impl RenderCancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the render holding this token to stop at its next column boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
