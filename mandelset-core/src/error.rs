use thiserror::Error;

/// Errors raised by the checked parameter setters.
///
/// The render path itself never fails on parameter values: a zero-sized
/// viewport is a no-op and any finite extent is accepted as given.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid divergence threshold: {0} (must be positive and finite)")]
    InvalidThreshold(f64),

    #[error("invalid extent: {width}×{height} (must be positive and finite)")]
    InvalidExtent { width: f64, height: f64 },

    #[error("invalid center: {0} (must be finite)")]
    InvalidCenter(crate::Complex),
}
