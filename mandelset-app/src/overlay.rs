use image::{Rgba, RgbaImage};

use mandelset_render::Raster;

/// Outline color of the zoom selection.
const SELECTION_RGBA: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Axis-aligned rectangle in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    /// Normalized rectangle spanning two corners given in any order.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x: a.0.min(b.0),
            y: a.1.min(b.1),
            width: (a.0 - b.0).abs(),
            height: (a.1 - b.1).abs(),
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Narrower or shorter than one pixel. Such a selection cannot define a view.
    pub fn is_degenerate(&self) -> bool {
        !(self.width >= 1.0 && self.height >= 1.0)
    }
}

/// Convert a raster to a displayable RGBA image.
pub fn raster_to_image(raster: &Raster) -> RgbaImage {
    RgbaImage::from_fn(raster.width(), raster.height(), |x, y| {
        Rgba(raster.get(x, y).unwrap_or_default().rgba())
    })
}

/// Render `raster` with a one-pixel red outline around `rect`.
///
/// The outline is clipped to the image; sides entirely outside are skipped.
pub fn draw_selection(raster: &Raster, rect: &SelectionRect) -> RgbaImage {
    let mut img = raster_to_image(raster);
    let (w, h) = (img.width() as i64, img.height() as i64);

    let left = rect.left() as i64;
    let top = rect.top() as i64;
    let right = left + rect.width as i64;
    let bottom = top + rect.height as i64;

    let mut plot = |x: i64, y: i64| {
        if (0..w).contains(&x) && (0..h).contains(&y) {
            img.put_pixel(x as u32, y as u32, SELECTION_RGBA);
        }
    };

    for x in left.max(0)..=right.min(w - 1) {
        plot(x, top);
        plot(x, bottom);
    }
    for y in top.max(0)..=bottom.min(h - 1) {
        plot(left, y);
        plot(right, y);
    }
    img
}
