use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use mandelset_core::RenderParameters;

use crate::cache::ImageCache;
use crate::cancel::RenderCancel;
use crate::error::RenderError;
use crate::events::{Purpose, RenderObserver, PROGRESS_IDLE};
use crate::export::FrameWriter;
use crate::raster::Raster;
use crate::rasterizer::Rasterizer;
use crate::session::{RenderSession, SessionState};

/// Runs Preview and Save renders in the background.
///
/// Each purpose has its own [`RenderSession`]; the two may run at the same
/// time but never touch the same mutable state. Preview results go to the
/// [`ImageCache`] and the observer; Save results go to the [`FrameWriter`].
pub struct RenderEngine {
    rasterizer: Rasterizer,
    cache: Arc<ImageCache>,
    observer: Arc<dyn RenderObserver>,
    writer: Arc<dyn FrameWriter>,
    preview: RenderSession,
    save: RenderSession,
}

impl RenderEngine {
    pub fn new(
        worker_budget: u32,
        observer: Arc<dyn RenderObserver>,
        writer: Arc<dyn FrameWriter>,
    ) -> crate::Result<Self> {
        Ok(Self {
            rasterizer: Rasterizer::new(worker_budget)?,
            cache: Arc::new(ImageCache::new()),
            observer,
            writer,
            preview: RenderSession::new(Purpose::Preview),
            save: RenderSession::new(Purpose::Save),
        })
    }

    pub fn worker_budget(&self) -> u32 {
        self.rasterizer.worker_budget()
    }

    /// Swap the worker pool. Running renders finish on the old pool.
    pub fn set_worker_budget(&mut self, worker_budget: u32) -> crate::Result<()> {
        if worker_budget.max(1) != self.rasterizer.worker_budget() {
            self.rasterizer = Rasterizer::new(worker_budget)?;
        }
        Ok(())
    }

    /// Shared handle to the last completed Preview frame.
    pub fn cache(&self) -> Arc<ImageCache> {
        Arc::clone(&self.cache)
    }

    pub fn cached_frame(&self) -> Option<Raster> {
        self.cache.get()
    }

    fn session(&self, purpose: Purpose) -> &RenderSession {
        match purpose {
            Purpose::Preview => &self.preview,
            Purpose::Save => &self.save,
        }
    }

    fn session_mut(&mut self, purpose: Purpose) -> &mut RenderSession {
        match purpose {
            Purpose::Preview => &mut self.preview,
            Purpose::Save => &mut self.save,
        }
    }

    pub fn state(&self, purpose: Purpose) -> SessionState {
        self.session(purpose).state()
    }

    /// Start a render of `purpose` with `params`, superseding any render of
    /// the same purpose. Returns once the old render has stopped and the new
    /// one is running; a zero-sized viewport does nothing.
    pub fn trigger(&mut self, purpose: Purpose, params: RenderParameters) -> crate::Result<()> {
        if !params.viewport.is_renderable() {
            debug!(%purpose, "Ignoring render of empty viewport");
            return Ok(());
        }

        let job = RenderJob {
            purpose,
            params,
            rasterizer: self.rasterizer.clone(),
            cache: Arc::clone(&self.cache),
            observer: Arc::clone(&self.observer),
            writer: Arc::clone(&self.writer),
        };
        self.session_mut(purpose).start(move |cancel| job.run(cancel))
    }

    /// Cancel the render of `purpose`, if any, and wait for it to stop.
    pub fn cancel(&mut self, purpose: Purpose) -> SessionState {
        self.session_mut(purpose).cancel()
    }

    /// Wait for the render of `purpose` to finish without cancelling it.
    pub fn wait(&mut self, purpose: Purpose) -> SessionState {
        self.session_mut(purpose).wait()
    }

    /// Cancel and join both sessions.
    pub fn shutdown(&mut self) {
        for purpose in Purpose::ALL {
            self.cancel(purpose);
        }
        debug!("Render engine shut down");
    }
}

impl Drop for RenderEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Everything one background render needs, moved onto its thread.
struct RenderJob {
    purpose: Purpose,
    params: RenderParameters,
    rasterizer: Rasterizer,
    cache: Arc<ImageCache>,
    observer: Arc<dyn RenderObserver>,
    writer: Arc<dyn FrameWriter>,
}

impl RenderJob {
    fn run(self, cancel: &RenderCancel) -> SessionState {
        let purpose = self.purpose;
        let observer = Arc::clone(&self.observer);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.rasterizer
                .render(&self.params, cancel, |p| observer.on_progress(p, purpose))
        }));
        let result = outcome
            .unwrap_or_else(|payload| Err(RenderError::Degraded(panic_message(payload.as_ref()))));

        match result {
            // Superseded after the last column: the frame is already stale.
            Ok(_) if cancel.is_cancelled() => SessionState::Cancelled,
            Ok(raster) => self.finish(raster),
            Err(RenderError::Cancelled) => SessionState::Cancelled,
            Err(e) => self.degrade(e),
        }
    }

    fn finish(self, raster: Raster) -> SessionState {
        match self.purpose {
            Purpose::Preview => {
                self.cache.put(raster.clone());
                self.observer.on_frame_ready(raster);
                SessionState::Completed
            }
            Purpose::Save => match self.writer.write_frame(&raster, &self.params) {
                Ok(()) => {
                    info!(
                        width = raster.width(),
                        height = raster.height(),
                        "Saved rendered image"
                    );
                    SessionState::Completed
                }
                Err(e) => {
                    let err = RenderError::from(e);
                    error!("Failed to save image: {err}");
                    self.observer.on_error(&format!("Failed to save image: {err}"));
                    SessionState::Failed
                }
            },
        }
    }

    /// Report a failed render and, for Preview, re-show the last good frame.
    fn degrade(self, err: RenderError) -> SessionState {
        warn!(purpose = %self.purpose, "Render degraded: {err}");
        self.observer.on_progress(PROGRESS_IDLE, self.purpose);
        self.observer.on_error(&err.to_string());
        if self.purpose == Purpose::Preview {
            if let Some(previous) = self.cache.get() {
                self.observer.on_frame_ready(previous);
            }
        }
        SessionState::Failed
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
