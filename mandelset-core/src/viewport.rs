use serde::{Deserialize, Serialize};

use crate::complex::Complex;

/// Output resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels, or `None` if it does not fit in `usize`.
    pub fn area(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }
}

/// Size of the visible region in complex-plane units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides scaled by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// Maps between pixel space and the region of the complex plane on screen.
///
/// The region is centred on `center` and spans `extent` plane units across
/// `pixel_size` pixels. Pixel `(0, 0)` is the top-left corner: pixel y grows
/// downward while the imaginary axis grows upward.
///
/// Accuracy is bounded by `f64`. Once `extent` drops below roughly `1e-15`
/// of `|center|` neighbouring pixels collapse onto the same plane value; deep
/// zoom beyond that point is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pixel_size: PixelSize,
    pub center: Complex,
    pub extent: Extent,
}

impl Viewport {
    pub const DEFAULT_CENTER: Complex = Complex { re: -0.5, im: 0.0 };
    pub const DEFAULT_EXTENT: Extent = Extent {
        width: 3.0,
        height: 2.11,
    };

    pub fn new(pixel_size: PixelSize, center: Complex, extent: Extent) -> Self {
        Self {
            pixel_size,
            center,
            extent,
        }
    }

    /// The initial view over the whole set at the given resolution.
    pub fn default_mandelbrot(width: u32, height: u32) -> Self {
        Self::new(
            PixelSize::new(width, height),
            Self::DEFAULT_CENTER,
            Self::DEFAULT_EXTENT,
        )
    }

    /// `false` when either pixel dimension is zero; such a viewport is never rendered.
    #[inline]
    pub fn is_renderable(&self) -> bool {
        self.pixel_size.width >= 1 && self.pixel_size.height >= 1
    }

    /// Map a pixel coordinate to a point on the complex plane.
    ///
    /// Accepts fractional coordinates so selection corners can be mapped
    /// without rounding. Must not be called on a non-renderable viewport.
    #[inline]
    pub fn to_plane(&self, pixel_x: f64, pixel_y: f64) -> Complex {
        let width = self.pixel_size.width as f64;
        let height = self.pixel_size.height as f64;

        let ratio_x = pixel_x / width;
        let re = self.extent.width * ratio_x - self.extent.width / 2.0 + self.center.re;

        let ratio_y = (height - pixel_y) / height;
        let im = self.extent.height * ratio_y - self.extent.height / 2.0 + self.center.im;

        Complex::new(re, im)
    }

    /// Inverse of [`to_plane`](Self::to_plane), floored to whole pixels.
    ///
    /// The result may lie outside the image; callers clip.
    pub fn to_pixel(&self, point: Complex) -> (i64, i64) {
        let width = self.pixel_size.width as f64;
        let height = self.pixel_size.height as f64;

        let ratio_x = (point.re - self.center.re + self.extent.width / 2.0) / self.extent.width;
        let ratio_y = (point.im - self.center.im + self.extent.height / 2.0) / self.extent.height;

        let px = (width * ratio_x).floor();
        let py = (height - height * ratio_y).floor();
        (px as i64, py as i64)
    }

    /// Pixel aspect ratio (height / width).
    pub fn aspect_ratio(&self) -> f64 {
        self.pixel_size.height as f64 / self.pixel_size.width as f64
    }

    /// Copy with `extent.height` recomputed from `extent.width` so the plane
    /// region has the same proportions as the pixel grid.
    pub fn with_locked_aspect(self) -> Self {
        if !self.is_renderable() {
            return self;
        }
        Self {
            extent: Extent::new(self.extent.width, self.aspect_ratio() * self.extent.width),
            ..self
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::default_mandelbrot(1, 1)
    }
}
