use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use mandelset_core::{Complex, Membership, RenderParameters};

use crate::cancel::RenderCancel;
use crate::error::RenderError;
use crate::events::PROGRESS_IDLE;
use crate::raster::{PixelColor, Raster};

/// Worker count used when the caller does not pick one.
pub const DEFAULT_WORKER_BUDGET: u32 = 8;

// ---------------------------------------------------------------------------
// Rasterizer
// ---------------------------------------------------------------------------

/// Column-batched parallel renderer backed by a fixed-size worker pool.
///
/// Each column fans out one evaluation per pixel onto the pool and joins
/// before the next column starts, so at most `worker_budget` pixels are in
/// flight and only one column of results is buffered at a time. The pool is
/// shared by every render that goes through this rasterizer.
#[derive(Clone)]
pub struct Rasterizer {
    pool: Arc<rayon::ThreadPool>,
    worker_budget: u32,
}

impl Rasterizer {
    /// Build a rasterizer with `worker_budget` pool threads (at least one).
    pub fn new(worker_budget: u32) -> crate::Result<Self> {
        let worker_budget = worker_budget.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_budget as usize)
            .thread_name(|i| format!("pixel-worker-{i}"))
            .build()?;
        debug!(worker_budget, "Built pixel worker pool");
        Ok(Self {
            pool: Arc::new(pool),
            worker_budget,
        })
    }

    pub fn worker_budget(&self) -> u32 {
        self.worker_budget
    }

    /// Render a full frame.
    ///
    /// `cancel` is checked before every column; a cancelled render reports
    /// [`RenderError::Cancelled`] and never returns partial data. After each
    /// column `on_progress` receives `100 * column / width`, and
    /// [`PROGRESS_IDLE`] once the render ends either way.
    ///
    /// The returned raster has row 0 at the top of the image (largest
    /// imaginary part).
    ///
    /// A zero-sized viewport has nothing to draw and yields
    /// [`RenderError::InvalidDimensions`] without reporting progress. Callers
    /// that treat such a viewport as a no-op check
    /// [`Viewport::is_renderable`](mandelset_core::Viewport::is_renderable)
    /// first, as [`RenderEngine::trigger`](crate::RenderEngine::trigger) does.
    pub fn render<P>(
        &self,
        params: &RenderParameters,
        cancel: &RenderCancel,
        mut on_progress: P,
    ) -> crate::Result<Raster>
    where
        P: FnMut(i32),
    {
        let start = Instant::now();
        let size = params.viewport.pixel_size;
        let (width, height) = (size.width, size.height);
        if !params.viewport.is_renderable() {
            return Err(RenderError::InvalidDimensions { width, height });
        }

        // Assembled bottom-up (row 0 = smallest imaginary part) and flipped at the end.
        let mut raster = Raster::new(width, height)?;
        let mut column: Vec<Membership> = Vec::with_capacity(height as usize);

        debug!(
            width,
            height,
            max_iterations = params.max_iterations,
            threshold = params.divergence_threshold,
            workers = self.worker_budget,
            "Starting column render"
        );

        for x in 0..width {
            if cancel.is_cancelled() {
                on_progress(PROGRESS_IDLE);
                debug!(column = x, "Render cancelled");
                return Err(RenderError::Cancelled);
            }

            self.pool.install(|| {
                (0..height)
                    .into_par_iter()
                    .map(|py| params.classify_pixel(x, py))
                    .collect_into_vec(&mut column);
            });

            for (py, membership) in column.iter().enumerate() {
                if membership.is_bounded() {
                    raster.set(x, height - 1 - py as u32, PixelColor::Member);
                }
            }

            on_progress((100 * x as u64 / width as u64) as i32);
        }
        on_progress(PROGRESS_IDLE);

        raster.flip_vertical();
        if params.show_axes {
            raster.draw_axes(params.viewport.to_pixel(Complex::ZERO));
        }

        info!(
            elapsed_ms = start.elapsed().as_millis(),
            width,
            height,
            members = raster.member_count(),
            "Render complete"
        );
        Ok(raster)
    }
}

/// One-shot render on a temporary pool of `worker_budget` threads.
///
/// Same contract as [`Rasterizer::render`]: callers skip zero-sized viewports.
pub fn render<P>(
    params: &RenderParameters,
    worker_budget: u32,
    cancel: &RenderCancel,
    on_progress: P,
) -> crate::Result<Raster>
where
    P: FnMut(i32),
{
    Rasterizer::new(worker_budget)?.render(params, cancel, on_progress)
}
