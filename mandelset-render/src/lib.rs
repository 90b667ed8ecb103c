pub mod cache;
pub mod cancel;
pub mod engine;
pub mod error;
pub mod events;
pub mod export;
pub mod raster;
pub mod rasterizer;
pub mod session;

pub use cache::ImageCache;
pub use cancel::RenderCancel;
pub use engine::RenderEngine;
pub use error::{ExportError, RenderError};
pub use events::{NullObserver, Purpose, RenderObserver, PROGRESS_IDLE};
pub use export::{export_png, ExportMetadata, FrameWriter, PngFileWriter, DEFAULT_OUTPUT_PATH};
pub use raster::{PixelColor, Raster};
pub use rasterizer::{render, Rasterizer, DEFAULT_WORKER_BUDGET};
pub use session::{RenderSession, SessionState};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
