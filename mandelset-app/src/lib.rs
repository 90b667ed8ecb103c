//! Headless front end for the MandelSet renderer: persistent preferences,
//! the live render controller and the surfaces it reports to.

pub mod controller;
pub mod overlay;
pub mod preferences;
pub mod status;
pub mod surfaces;

pub use controller::Controller;
pub use overlay::{draw_selection, raster_to_image, SelectionRect};
pub use preferences::AppPreferences;
pub use status::{ProgressBoard, StatusBoard, DEFAULT_STATUS};
pub use surfaces::AppSurfaces;
