use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use mandelset_core::{Complex, Extent, RenderParameters, Viewport};
use mandelset_render::{DEFAULT_OUTPUT_PATH, DEFAULT_WORKER_BUDGET};

const PREFERENCES_FILE: &str = "preferences.json";

// ---------------------------------------------------------------------------
// Application preferences
// ---------------------------------------------------------------------------

/// Persistent settings, stored as JSON next to the executable.
///
/// Every field has a serde default so older or hand-edited files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppPreferences {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    #[serde(default = "default_center_re")]
    pub center_re: f64,
    #[serde(default)]
    pub center_im: f64,
    #[serde(default = "default_extent_width")]
    pub extent_width: f64,
    /// Only used when `lock_aspect` is off; otherwise derived from the width.
    #[serde(default = "default_extent_height")]
    pub extent_height: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub show_axes: bool,
    #[serde(default = "default_true")]
    pub lock_aspect: bool,
    /// Number of pixel-evaluation threads.
    #[serde(default = "default_worker_budget")]
    pub worker_budget: u32,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    /// Seconds an error message stays up before the status returns to "Ready".
    #[serde(default = "default_status_quiet_secs")]
    pub status_quiet_secs: u64,
}

fn default_canvas_width() -> u32 {
    800
}
fn default_canvas_height() -> u32 {
    562
}
fn default_center_re() -> f64 {
    Viewport::DEFAULT_CENTER.re
}
fn default_extent_width() -> f64 {
    Viewport::DEFAULT_EXTENT.width
}
fn default_extent_height() -> f64 {
    Viewport::DEFAULT_EXTENT.height
}
fn default_max_iterations() -> u32 {
    RenderParameters::DEFAULT_MAX_ITERATIONS
}
fn default_threshold() -> f64 {
    RenderParameters::DEFAULT_THRESHOLD
}
fn default_true() -> bool {
    true
}
fn default_worker_budget() -> u32 {
    DEFAULT_WORKER_BUDGET
}
fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}
fn default_status_quiet_secs() -> u64 {
    5
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            center_re: default_center_re(),
            center_im: 0.0,
            extent_width: default_extent_width(),
            extent_height: default_extent_height(),
            max_iterations: default_max_iterations(),
            threshold: default_threshold(),
            show_axes: false,
            lock_aspect: true,
            worker_budget: default_worker_budget(),
            output_path: default_output_path(),
            status_quiet_secs: default_status_quiet_secs(),
        }
    }
}

impl AppPreferences {
    /// Load preferences from next to the executable, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str::<AppPreferences>(&json) {
                    Ok(prefs) => {
                        info!("Loaded preferences from {}", path.display());
                        return prefs;
                    }
                    Err(e) => error!("Failed to parse preferences: {e}"),
                },
                Err(e) => error!("Failed to read preferences file: {e}"),
            }
        } else {
            debug!("No preferences file at {}", path.display());
        }
        Self::default()
    }

    /// Persist preferences next to the executable.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write preferences: {e}");
                } else {
                    debug!("Saved preferences");
                }
            }
            Err(e) => error!("Failed to serialize preferences: {e}"),
        }
    }

    /// The render parameters these preferences describe.
    ///
    /// Stored values go through the checked builders; a rejected center,
    /// extent or threshold is logged and replaced by its default.
    pub fn render_parameters(&self) -> RenderParameters {
        let lock = |vp: Viewport| {
            if self.lock_aspect {
                vp.with_locked_aspect()
            } else {
                vp
            }
        };

        let mut params = RenderParameters::new(Viewport::default_mandelbrot(
            self.canvas_width,
            self.canvas_height,
        ))
        .with_max_iterations(self.max_iterations);
        params.show_axes = self.show_axes;

        let center = Complex::new(self.center_re, self.center_im);
        let params = params.with_center(center).unwrap_or_else(|e| {
            warn!("Ignoring stored center: {e}");
            params
        });

        let stored = lock(Viewport {
            extent: Extent::new(self.extent_width, self.extent_height),
            ..params.viewport
        });
        let params = params.with_extent(stored.extent).unwrap_or_else(|e| {
            warn!("Ignoring stored extent: {e}");
            let mut fallback = params;
            fallback.viewport = lock(fallback.viewport);
            fallback
        });

        params.with_threshold(self.threshold).unwrap_or_else(|e| {
            warn!("Ignoring stored threshold: {e}");
            params
        })
    }

    /// Remember the current view so the next start resumes from it.
    pub fn remember_view(&mut self, params: &RenderParameters, lock_aspect: bool) {
        let vp = &params.viewport;
        self.canvas_width = vp.pixel_size.width;
        self.canvas_height = vp.pixel_size.height;
        self.center_re = vp.center.re;
        self.center_im = vp.center.im;
        self.extent_width = vp.extent.width;
        self.extent_height = vp.extent.height;
        self.max_iterations = params.max_iterations;
        self.threshold = params.divergence_threshold;
        self.show_axes = params.show_axes;
        self.lock_aspect = lock_aspect;
    }
}

/// `preferences.json` in the executable's directory, or the working
/// directory when the executable path is unavailable.
fn config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(PREFERENCES_FILE)
}
