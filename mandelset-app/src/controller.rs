use std::fmt::Display;
use std::sync::Arc;

use tracing::{debug, info, warn};

use mandelset_core::{Complex, Extent, PixelSize, RenderParameters, Viewport};
use mandelset_render::{
    FrameWriter, PngFileWriter, Purpose, RenderEngine, RenderError, SessionState,
};

use crate::overlay::{draw_selection, raster_to_image, SelectionRect};
use crate::preferences::AppPreferences;
use crate::surfaces::AppSurfaces;

/// A drag in progress, in canvas pixels.
#[derive(Debug, Clone, Copy)]
struct Selection {
    begin: (f64, f64),
    end: (f64, f64),
}

impl Selection {
    fn rect(&self) -> SelectionRect {
        SelectionRect::from_corners(self.begin, self.end)
    }
}

/// Live render configuration and the actions that change it.
///
/// Every change snapshots the parameters and starts a Preview render,
/// superseding the previous one. Invalid values are rejected, reported on
/// the status board, and leave the configuration untouched.
pub struct Controller {
    params: RenderParameters,
    lock_aspect: bool,
    selection: Option<Selection>,
    surfaces: Arc<AppSurfaces>,
    engine: RenderEngine,
}

impl Controller {
    /// Build a controller. Nothing is rendered until the first change or
    /// an explicit [`refresh`](Self::refresh).
    pub fn new(
        params: RenderParameters,
        lock_aspect: bool,
        worker_budget: u32,
        surfaces: Arc<AppSurfaces>,
        writer: Arc<dyn FrameWriter>,
    ) -> Result<Self, RenderError> {
        let engine = RenderEngine::new(worker_budget, surfaces.clone(), writer)?;
        let mut params = params;
        if lock_aspect {
            params.viewport = params.viewport.with_locked_aspect();
        }
        Ok(Self {
            params,
            lock_aspect,
            selection: None,
            surfaces,
            engine,
        })
    }

    /// Controller for the stored preferences, saving to `output_path`.
    pub fn from_preferences(
        prefs: &AppPreferences,
        output_path: &str,
        surfaces: Arc<AppSurfaces>,
    ) -> Result<Self, RenderError> {
        Self::new(
            prefs.render_parameters(),
            prefs.lock_aspect,
            prefs.worker_budget,
            surfaces,
            Arc::new(PngFileWriter::new(output_path)),
        )
    }

    pub fn params(&self) -> &RenderParameters {
        &self.params
    }

    pub fn lock_aspect(&self) -> bool {
        self.lock_aspect
    }

    pub fn worker_budget(&self) -> u32 {
        self.engine.worker_budget()
    }

    pub fn surfaces(&self) -> &Arc<AppSurfaces> {
        &self.surfaces
    }

    pub fn state(&self, purpose: Purpose) -> SessionState {
        self.engine.state(purpose)
    }

    pub fn wait(&mut self, purpose: Purpose) -> SessionState {
        self.engine.wait(purpose)
    }

    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }

    fn report(&self, err: impl Display) {
        warn!("{err}");
        self.surfaces.status().set(err.to_string());
    }

    /// Start a Preview render of the current parameters.
    pub fn refresh(&mut self) {
        if let Err(e) = self.engine.trigger(Purpose::Preview, self.params) {
            self.report(e);
        }
    }

    /// Start a Save render of the current parameters.
    pub fn request_save(&mut self) {
        info!(
            width = self.params.viewport.pixel_size.width,
            height = self.params.viewport.pixel_size.height,
            "Save requested"
        );
        if let Err(e) = self.engine.trigger(Purpose::Save, self.params) {
            self.report(e);
        }
    }

    /// Accept `next` and re-render, or report the error and keep the old
    /// parameters.
    fn apply(&mut self, next: mandelset_core::Result<RenderParameters>) -> mandelset_core::Result<()> {
        match next {
            Ok(params) => {
                self.params = params;
                self.refresh();
                Ok(())
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    fn locked(&self, viewport: Viewport) -> Viewport {
        if self.lock_aspect {
            viewport.with_locked_aspect()
        } else {
            viewport
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> mandelset_core::Result<()> {
        let viewport = self.locked(viewport);
        let next = self
            .params
            .with_center(viewport.center)
            .and_then(|p| p.with_extent(viewport.extent))
            .map(|mut p| {
                p.viewport.pixel_size = viewport.pixel_size;
                p
            });
        self.apply(next)
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        let viewport = Viewport {
            pixel_size: PixelSize::new(width, height),
            ..self.params.viewport
        };
        self.params.viewport = self.locked(viewport);
        self.refresh();
    }

    pub fn set_center(&mut self, center: Complex) -> mandelset_core::Result<()> {
        let next = self.params.with_center(center);
        self.apply(next)
    }

    /// Set the plane width; under aspect lock the height follows the canvas.
    pub fn set_extent_width(&mut self, width: f64) -> mandelset_core::Result<()> {
        let vp = &self.params.viewport;
        let height = if self.lock_aspect && vp.is_renderable() {
            vp.aspect_ratio() * width
        } else {
            vp.extent.height
        };
        let next = self.params.with_extent(Extent::new(width, height));
        self.apply(next)
    }

    /// Set the plane height; under aspect lock the width follows the canvas.
    pub fn set_extent_height(&mut self, height: f64) -> mandelset_core::Result<()> {
        let vp = &self.params.viewport;
        let width = if self.lock_aspect && vp.is_renderable() {
            height / vp.aspect_ratio()
        } else {
            vp.extent.width
        };
        let next = self.params.with_extent(Extent::new(width, height));
        self.apply(next)
    }

    pub fn set_iteration_bound(&mut self, max_iterations: u32) {
        self.params = self.params.with_max_iterations(max_iterations);
        self.refresh();
    }

    pub fn set_threshold(&mut self, threshold: f64) -> mandelset_core::Result<()> {
        let next = self.params.with_threshold(threshold);
        self.apply(next)
    }

    pub fn set_show_axes(&mut self, show_axes: bool) {
        self.params.show_axes = show_axes;
        self.refresh();
    }

    /// Turning the lock on recomputes the height from the width.
    pub fn set_lock_aspect(&mut self, lock_aspect: bool) {
        self.lock_aspect = lock_aspect;
        if lock_aspect {
            self.params.viewport = self.params.viewport.with_locked_aspect();
            self.refresh();
        }
    }

    pub fn set_worker_budget(&mut self, worker_budget: u32) {
        match self.engine.set_worker_budget(worker_budget) {
            Ok(()) => self.refresh(),
            Err(e) => self.report(e),
        }
    }

    /// Back to the initial view over the whole set, with aspect lock on.
    pub fn reset(&mut self) {
        self.lock_aspect = true;
        self.params.viewport = Viewport::new(
            self.params.viewport.pixel_size,
            Viewport::DEFAULT_CENTER,
            Viewport::DEFAULT_EXTENT,
        )
        .with_locked_aspect();
        self.refresh();
    }

    /// Shrink both plane sides by `n`.
    pub fn zoom_in(&mut self, n: u32) -> mandelset_core::Result<()> {
        let next = self
            .params
            .with_extent(self.params.viewport.extent.scaled(1.0 / n as f64));
        self.apply(next)
    }

    /// Grow both plane sides by `n`.
    pub fn zoom_out(&mut self, n: u32) -> mandelset_core::Result<()> {
        let next = self
            .params
            .with_extent(self.params.viewport.extent.scaled(n as f64));
        self.apply(next)
    }

    /// Re-center on the plane point under canvas pixel `(x, y)`.
    ///
    /// Ignored while a selection is being dragged.
    pub fn move_to(&mut self, x: f64, y: f64) -> mandelset_core::Result<()> {
        if self.selection.is_some() || !self.params.viewport.is_renderable() {
            debug!("Ignoring move while selecting or with an empty canvas");
            return Ok(());
        }
        let next = self.params.with_center(self.params.viewport.to_plane(x, y));
        self.apply(next)
    }

    // -- Zoom by selection ---------------------------------------------------

    pub fn is_selecting(&self) -> bool {
        self.selection.is_some()
    }

    /// The rectangle being dragged, if any.
    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection.map(|s| s.rect())
    }

    pub fn begin_selection(&mut self, x: f64, y: f64) {
        self.selection = Some(Selection {
            begin: (x, y),
            end: (x, y),
        });
    }

    /// Move the free corner. Under aspect lock the corner's y is derived
    /// from its x so the rectangle keeps the canvas proportions.
    pub fn update_selection(&mut self, x: f64, y: f64) {
        let Some(mut selection) = self.selection else {
            return;
        };
        let vp = &self.params.viewport;
        selection.end = if self.lock_aspect && vp.is_renderable() {
            let (bx, by) = selection.begin;
            (x, vp.aspect_ratio() * (x - bx) + by)
        } else {
            (x, y)
        };
        self.selection = Some(selection);
        self.redraw_overlay(Some(selection.rect()));
    }

    /// Zoom to the selected rectangle. A selection under one pixel wide or
    /// tall is dropped without changing the view.
    pub fn end_selection(&mut self) -> mandelset_core::Result<()> {
        let Some(selection) = self.selection.take() else {
            return Ok(());
        };
        let rect = selection.rect();
        if rect.is_degenerate() || !self.params.viewport.is_renderable() {
            debug!(?rect, "Ignoring degenerate selection");
            self.redraw_overlay(None);
            return Ok(());
        }

        let vp = &self.params.viewport;
        let bottom_left = vp.to_plane(rect.left(), rect.bottom());
        let top_right = vp.to_plane(rect.right(), rect.top());
        let extent = Extent::new(top_right.re - bottom_left.re, top_right.im - bottom_left.im);

        let next = self
            .params
            .with_center(bottom_left.midpoint(top_right))
            .and_then(|p| p.with_extent(extent));
        self.apply(next)
    }

    pub fn cancel_selection(&mut self) {
        if self.selection.take().is_some() {
            self.redraw_overlay(None);
        }
    }

    /// Re-show the cached frame, optionally outlined, without re-rendering.
    fn redraw_overlay(&self, rect: Option<SelectionRect>) {
        let Some(raster) = self.engine.cached_frame() else {
            return;
        };
        let image = match rect {
            Some(rect) => draw_selection(&raster, &rect),
            None => raster_to_image(&raster),
        };
        self.surfaces.show(image);
    }
}
