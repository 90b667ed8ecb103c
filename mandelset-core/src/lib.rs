pub mod complex;
pub mod error;
pub mod escape;
pub mod params;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use escape::{classify, Membership};
pub use params::RenderParameters;
pub use viewport::{Extent, PixelSize, Viewport};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
