use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use mandelset_app::{AppPreferences, AppSurfaces, Controller};
use mandelset_render::{Purpose, SessionState};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting MandelSet");

    let mut prefs = AppPreferences::load();
    // A path on the command line overrides the stored one for this run only.
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| prefs.output_path.clone());

    let surfaces = Arc::new(AppSurfaces::new(Duration::from_secs(
        prefs.status_quiet_secs,
    )));
    let mut controller =
        match Controller::from_preferences(&prefs, &output_path, Arc::clone(&surfaces)) {
            Ok(controller) => controller,
            Err(e) => {
                error!("Failed to start renderer: {e}");
                return ExitCode::FAILURE;
            }
        };

    controller.refresh();
    controller.request_save();

    let preview = controller.wait(Purpose::Preview);
    let save = controller.wait(Purpose::Save);
    info!(
        ?preview,
        ?save,
        status = %surfaces.status().message(),
        "Renders finished"
    );

    prefs.remember_view(controller.params(), controller.lock_aspect());
    prefs.save();

    if save == SessionState::Completed {
        info!("Wrote {output_path}");
        ExitCode::SUCCESS
    } else {
        error!("No image written to {output_path}");
        ExitCode::FAILURE
    }
}
