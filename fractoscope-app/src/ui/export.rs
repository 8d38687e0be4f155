//! Image export commands, the background high-resolution worker, and the
//! save dialog.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;

use eframe::egui;
use tracing::{debug, error, info, warn};

use fractoscope_core::{CoreError, ExportPipeline, ExportedImage, ImageFormat};
use fractoscope_engine::SoftwareEngine;

use super::{overlay_frame, OVERLAY_TEXT};
use crate::app::{FractoscopeApp, HUD_MARGIN};

/// Seconds a notification stays on screen.
const NOTIFICATION_SECS: f32 = 5.0;

// ---------------------------------------------------------------------------
// Export state (held by FractoscopeApp)
// ---------------------------------------------------------------------------

pub(crate) struct ExportState {
    pub(crate) pipeline: ExportPipeline,
    result_rx: Option<mpsc::Receiver<Result<ExportedImage, CoreError>>>,
    notification: Option<(String, Instant, bool)>,
}

impl ExportState {
    pub(crate) fn new() -> Self {
        Self {
            pipeline: ExportPipeline::new(),
            result_rx: None,
            notification: None,
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.pipeline.is_busy()
    }

    fn notify(&mut self, message: String, is_error: bool) {
        self.notification = Some((message, Instant::now(), is_error));
    }

    /// Offer `image` in a save dialog and write it. Runs on the UI thread.
    fn save(&mut self, image: &ExportedImage) {
        let Some(path) = pick_path(image) else {
            debug!("Export save dialog dismissed");
            return;
        };
        match std::fs::write(&path, &image.bytes) {
            Ok(()) => {
                info!("Export saved: {}", path.display());
                self.notify(format!("Saved: {}", short_name(&path)), false);
            }
            Err(e) => {
                error!("Failed to write export {}: {e}", path.display());
                self.notify(format!("Export failed: {e}"), true);
            }
        }
    }

    fn fail(&mut self, e: CoreError) {
        match e {
            CoreError::ExportInProgress => {
                warn!("Export refused: another export is running");
                self.notify("An export is already running".into(), true);
            }
            other => {
                error!("Export failed: {other}");
                self.notify(format!("Export failed: {other}"), true);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

impl FractoscopeApp {
    /// Encode the live engine's framebuffer and save it.
    pub(crate) fn export_current_view(&mut self) {
        let Some(engine) = self.engine.engine_mut() else {
            return;
        };
        match self.export_state.pipeline.export_current_view(engine) {
            Ok(image) => self.export_state.save(&image),
            Err(e) => self.export_state.fail(e),
        }
    }

    /// Render the view at `canvas × scale` on a worker thread with its own
    /// engine instance.
    pub(crate) fn start_high_res_export(&mut self) {
        let reservation = match self.export_state.pipeline.reserve() {
            Ok(r) => r,
            Err(e) => return self.export_state.fail(e),
        };

        let viewport = self.viewport;
        let params = self.params.with_max_iterations(self.target_max_iterations());
        let canvas_px = self.canvas_px();
        let scale = self.preferences.export_scale;
        let format = self.preferences.export_format;

        let (tx, rx) = mpsc::channel();
        self.export_state.result_rx = Some(rx);
        debug!(canvas_px, scale, ?format, "High-resolution export started");

        let ctx = self.egui_ctx.clone();
        let spawned = std::thread::Builder::new()
            .name("export-worker".into())
            .spawn(move || {
                let mut engine = SoftwareEngine::new().with_format(format);
                let result =
                    reservation.export_high_res(&mut engine, &viewport, &params, canvas_px, scale);
                drop(reservation);
                let _ = tx.send(result);
                ctx.request_repaint();
            });
        if let Err(e) = spawned {
            error!("Failed to spawn export thread: {e}");
            self.export_state.result_rx = None;
            self.export_state.notify(format!("Export failed: {e}"), true);
        }
    }

    pub(crate) fn poll_export_result(&mut self) {
        let Some(rx) = self.export_state.result_rx.as_ref() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.export_state.result_rx = None;
                error!("Export worker exited without a result");
                self.export_state.notify("Export failed: worker stopped".into(), true);
                return;
            }
        };
        self.export_state.result_rx = None;
        match result {
            Ok(image) => {
                info!(bytes = image.bytes.len(), "High-resolution export ready");
                self.export_state.save(&image);
            }
            Err(e) => self.export_state.fail(e),
        }
    }

    /// Last export result, faded out over its final second and dropped
    /// once expired. Sits over the canvas's bottom-left corner.
    pub(crate) fn draw_export_notification(&mut self, ctx: &egui::Context) {
        let Some((msg, at, is_error)) = &self.export_state.notification else {
            return;
        };
        let Some(opacity) = notification_opacity(at.elapsed().as_secs_f32()) else {
            self.export_state.notification = None;
            return;
        };
        let Some(rect) = self.canvas_rect else {
            return;
        };
        let tint = if *is_error {
            egui::Color32::from_rgb(255, 120, 120)
        } else {
            OVERLAY_TEXT
        };
        let text = egui::RichText::new(msg.as_str()).color(tint.gamma_multiply(opacity));

        egui::Area::new(egui::Id::new("export_notification"))
            .pivot(egui::Align2::LEFT_BOTTOM)
            .fixed_pos(rect.left_bottom() + egui::vec2(HUD_MARGIN, -HUD_MARGIN))
            .interactable(false)
            .show(ctx, |ui| {
                overlay_frame(opacity).show(ui, |ui| ui.label(text));
            });
        ctx.request_repaint();
    }
}

/// Opacity of a notification `elapsed` seconds old, or `None` once expired.
fn notification_opacity(elapsed: f32) -> Option<f32> {
    (elapsed <= NOTIFICATION_SECS).then(|| (NOTIFICATION_SECS - elapsed).min(1.0))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn pick_path(image: &ExportedImage) -> Option<PathBuf> {
    let ext = image.format.extension();
    rfd::FileDialog::new()
        .set_file_name(&image.file_name)
        .add_filter(filter_label(image.format), &[ext])
        .save_file()
}

fn filter_label(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Bmp => "Bitmap image",
        ImageFormat::Png => "PNG image",
    }
}

fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_fades_over_its_last_second() {
        assert_eq!(notification_opacity(0.0), Some(1.0));
        assert_eq!(notification_opacity(NOTIFICATION_SECS - 2.0), Some(1.0));
        let fading = notification_opacity(NOTIFICATION_SECS - 0.25).unwrap();
        assert!((fading - 0.25).abs() < 1e-5);
        assert_eq!(notification_opacity(NOTIFICATION_SECS + 0.1), None);
    }

    #[test]
    fn short_name_keeps_only_the_file() {
        assert_eq!(short_name(Path::new("/tmp/out/fractal.png")), "fractal.png");
    }
}
