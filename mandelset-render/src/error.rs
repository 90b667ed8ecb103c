use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A newer trigger superseded this render. Expected; never surfaced to the user.
    #[error("render cancelled")]
    Cancelled,

    #[error("invalid image dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to spawn render thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// Pixel evaluation or assembly failed; the caller falls back to the last good frame.
    #[error("render failed: {0}")]
    Degraded(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors from persisting a finished raster.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode PNG: {0}")]
    Encoding(#[from] png::EncodingError),
}
