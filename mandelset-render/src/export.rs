//! PNG export with embedded view metadata (tEXt chunks).

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::debug;

use mandelset_core::RenderParameters;

use crate::error::ExportError;
use crate::raster::Raster;

/// Default file the Save render writes to.
pub const DEFAULT_OUTPUT_PATH: &str = "output.png";

/// Persists a finished raster.
pub trait FrameWriter: Send + Sync {
    fn write_frame(&self, raster: &Raster, params: &RenderParameters) -> Result<(), ExportError>;
}

/// Writes 8-bit RGBA PNG files to a fixed path.
#[derive(Debug, Clone)]
pub struct PngFileWriter {
    path: PathBuf,
}

impl PngFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for PngFileWriter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PATH)
    }
}

impl FrameWriter for PngFileWriter {
    fn write_frame(&self, raster: &Raster, params: &RenderParameters) -> Result<(), ExportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        export_png(raster, &self.path, &ExportMetadata::from_params(params))
    }
}

/// Metadata embedded in an exported PNG.
pub struct ExportMetadata {
    pub center_re: f64,
    pub center_im: f64,
    pub extent_width: f64,
    pub extent_height: f64,
    pub max_iterations: u32,
    pub threshold: f64,
}

impl ExportMetadata {
    pub fn from_params(params: &RenderParameters) -> Self {
        let vp = &params.viewport;
        Self {
            center_re: vp.center.re,
            center_im: vp.center.im,
            extent_width: vp.extent.width,
            extent_height: vp.extent.height,
            max_iterations: params.max_iterations,
            threshold: params.divergence_threshold,
        }
    }
}

/// Write `raster` to `path` as a PNG with `metadata` in tEXt chunks.
///
/// Uses the `png` crate directly so the chunks are readable by exiftool and
/// most image viewers.
pub fn export_png(raster: &Raster, path: &Path, metadata: &ExportMetadata) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, raster.width(), raster.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), "MandelSet".to_string())?;
    encoder.add_text_chunk("Description".to_string(), build_description(metadata))?;
    for (key, value) in build_metadata_pairs(metadata, raster) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&raster.to_rgba())?;
    png_writer.finish()?;

    debug!(
        width = raster.width(),
        height = raster.height(),
        "Exported PNG to {}",
        path.display()
    );
    Ok(())
}

fn build_description(meta: &ExportMetadata) -> String {
    format!(
        "Mandelbrot set - Center: {} {:+}i, Extent: {}x{}, Iterations: {}",
        meta.center_re, meta.center_im, meta.extent_width, meta.extent_height, meta.max_iterations,
    )
}

fn build_metadata_pairs(meta: &ExportMetadata, raster: &Raster) -> Vec<(String, String)> {
    vec![
        ("MandelSet.CenterRe".into(), meta.center_re.to_string()),
        ("MandelSet.CenterIm".into(), meta.center_im.to_string()),
        ("MandelSet.ExtentWidth".into(), meta.extent_width.to_string()),
        ("MandelSet.ExtentHeight".into(), meta.extent_height.to_string()),
        ("MandelSet.MaxIterations".into(), meta.max_iterations.to_string()),
        ("MandelSet.Threshold".into(), meta.threshold.to_string()),
        (
            "MandelSet.Resolution".into(),
            format!("{}x{}", raster.width(), raster.height()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelColor;
    use mandelset_core::Viewport;
    use std::io::Read;

    fn sample_raster() -> Raster {
        let mut r = Raster::new(4, 3).unwrap();
        r.set(1, 2, PixelColor::Member);
        r
    }

    #[test]
    fn export_creates_valid_png() {
        let dir = std::env::temp_dir().join("mandelset_test_export");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("frame.png");

        let writer = PngFileWriter::new(&path);
        writer
            .write_frame(&sample_raster(), &RenderParameters::default())
            .expect("export should succeed");

        let mut file = std::fs::File::open(&path).expect("file should exist");
        let mut header = [0u8; 8];
        file.read_exact(&mut header).expect("should read header");
        assert_eq!(&header, b"\x89PNG\r\n\x1a\n", "valid PNG signature");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_preserves_pixels_and_text() {
        let dir = std::env::temp_dir().join("mandelset_test_export_meta");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("meta.png");
        let params = RenderParameters::new(Viewport::default_mandelbrot(4, 3)).with_max_iterations(123);

        let raster = sample_raster();
        PngFileWriter::new(&path)
            .write_frame(&raster, &params)
            .expect("export should succeed");

        let decoder = png::Decoder::new(std::fs::File::open(&path).expect("file should exist"));
        let mut reader = decoder.read_info().expect("should read info");
        let texts = &reader.info().uncompressed_latin1_text;
        assert!(texts
            .iter()
            .any(|t| t.keyword == "Software" && t.text == "MandelSet"));
        assert!(texts
            .iter()
            .any(|t| t.keyword == "MandelSet.MaxIterations" && t.text == "123"));

        let mut buf = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buf).expect("should decode frame");
        assert_eq!((frame.width, frame.height), (4, 3));
        assert_eq!(&buf[..frame.buffer_size()], raster.to_rgba().as_slice());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unwritable_path_reports_io_error() {
        let dir = std::env::temp_dir().join("mandelset_test_export_dir_as_file");
        let _ = std::fs::create_dir_all(&dir);
        // The target is an existing directory, so creating the file fails.
        let result = export_png(
            &sample_raster(),
            &dir,
            &ExportMetadata::from_params(&RenderParameters::default()),
        );
        assert!(matches!(result, Err(ExportError::Io { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
