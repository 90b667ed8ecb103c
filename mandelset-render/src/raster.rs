use crate::error::RenderError;

/// Display color of one raster cell.
///
/// Classification is binary; `Axis` marks the optional guide lines drawn
/// over the finished image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelColor {
    /// The orbit escaped. Shown as the background.
    #[default]
    Escaped,
    /// The orbit stayed bounded. Shown opaque black.
    Member,
    /// Axis guide line through the plane origin.
    Axis,
}

impl PixelColor {
    pub const BACKGROUND_RGBA: [u8; 4] = [255, 255, 255, 255];
    pub const MEMBER_RGBA: [u8; 4] = [0, 0, 0, 255];
    pub const AXIS_RGBA: [u8; 4] = [128, 128, 128, 255];

    #[inline]
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Self::Escaped => Self::BACKGROUND_RGBA,
            Self::Member => Self::MEMBER_RGBA,
            Self::Axis => Self::AXIS_RGBA,
        }
    }
}

/// A `width × height` grid of [`PixelColor`], row-major.
///
/// Row 0 is the top of the displayed image, i.e. the row with the largest
/// imaginary part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<PixelColor>,
}

impl Raster {
    /// Create a raster filled with background.
    pub fn new(width: u32, height: u32) -> crate::Result<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(RenderError::InvalidDimensions { width, height })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| RenderError::InvalidDimensions { width, height })?;
        pixels.resize(len, PixelColor::Escaped);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[PixelColor] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Color at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<PixelColor> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: PixelColor) {
        debug_assert!(x < self.width && y < self.height);
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    /// Borrow one row.
    pub fn row(&self, y: u32) -> &[PixelColor] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    /// Reverse the row order in place.
    pub fn flip_vertical(&mut self) {
        let w = self.width as usize;
        let h = self.height as usize;
        for top in 0..h / 2 {
            let bottom = h - 1 - top;
            let (upper, lower) = self.pixels.split_at_mut(bottom * w);
            upper[top * w..(top + 1) * w].swap_with_slice(&mut lower[..w]);
        }
    }

    /// Draw a vertical and a horizontal guide line through `origin`.
    ///
    /// Either line is skipped when its coordinate falls outside the grid.
    pub fn draw_axes(&mut self, origin: (i64, i64)) {
        let (ox, oy) = origin;
        if (0..self.width as i64).contains(&ox) {
            for y in 0..self.height {
                self.set(ox as u32, y, PixelColor::Axis);
            }
        }
        if (0..self.height as i64).contains(&oy) {
            for x in 0..self.width {
                self.set(x, oy as u32, PixelColor::Axis);
            }
        }
    }

    /// Number of cells classified as set members.
    pub fn member_count(&self) -> usize {
        self.pixels
            .iter()
            .filter(|&&c| c == PixelColor::Member)
            .count()
    }

    /// Expand to 8-bit RGBA, 4 bytes per pixel, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            out.extend_from_slice(&color.rgba());
        }
        out
    }
}
