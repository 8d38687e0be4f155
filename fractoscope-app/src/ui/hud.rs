use eframe::egui;

use fractoscope_core::transform::sample_to_plane;

use super::{overlay_frame, OVERLAY_TEXT};
use crate::app::{FractoscopeApp, HUD_MARGIN};

impl FractoscopeApp {
    /// Viewport readout over the canvas's top-left corner.
    pub(crate) fn show_hud(&mut self, ctx: &egui::Context) {
        let Some(rect) = self.canvas_rect else {
            return;
        };

        egui::Area::new(egui::Id::new("hud_params"))
            .fixed_pos(rect.min + egui::vec2(HUD_MARGIN, HUD_MARGIN))
            .interactable(false)
            .show(ctx, |ui| {
                overlay_frame(1.0).show(ui, |ui| {
                    ui.style_mut().visuals.override_text_color = Some(OVERLAY_TEXT);

                    ui.label(format!("Mode: {}", self.params.mode.label()));
                    ui.label(format!(
                        "Top-left: {:.10} {:+.10}i",
                        self.viewport.min_re, self.viewport.max_im
                    ));
                    ui.label(format!("Size: {:.3e}", self.viewport.view_size));
                    if self.ramp.is_running() {
                        ui.label(format!(
                            "Iterations: {} / {}",
                            self.params.max_iterations,
                            self.ramp.target()
                        ));
                    } else {
                        ui.label(format!("Iterations: {}", self.params.max_iterations));
                    }
                    if let Some(sample) = self.input.pointer() {
                        let p = sample_to_plane(
                            sample,
                            &self.viewport,
                            self.gestures.canvas_size(),
                        );
                        ui.label(format!("Pointer: {:.10} {:+.10}i", p.re, p.im));
                    }
                    ui.label(format!(
                        "Renders: {} ({} coalesced)",
                        self.scheduler.renders_issued(),
                        self.scheduler.changes_coalesced()
                    ));
                });
            });
    }
}
