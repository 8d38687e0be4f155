mod app;
mod input;
mod preferences;
mod seed_picker;
mod ui;

use eframe::egui;
use tracing::info;

use app::FractoscopeApp;
use preferences::AppPreferences;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Fractoscope");

    let prefs = AppPreferences::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Fractoscope")
            .with_inner_size([prefs.window_width, prefs.window_height]),
        ..Default::default()
    };

    eframe::run_native(
        "Fractoscope",
        options,
        Box::new(move |cc| Ok(Box::new(FractoscopeApp::new(&cc.egui_ctx, prefs)?))),
    )
}
