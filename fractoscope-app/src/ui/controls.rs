use eframe::egui;
use tracing::warn;

use fractoscope_core::{FractalMode, ImageFormat};

use crate::app::FractoscopeApp;
use crate::seed_picker;

impl FractoscopeApp {
    pub(crate) fn show_controls_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("controls")
            .resizable(false)
            .default_width(230.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.engine_status(ui);
                    ui.separator();
                    self.fractal_controls(ui, ctx);
                    ui.separator();
                    self.navigation_controls(ui);
                    ui.separator();
                    self.export_controls(ui);
                });
            });
    }

    fn engine_status(&mut self, ui: &mut egui::Ui) {
        if self.engine.is_pending() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Starting engine");
            });
        } else if let Some(e) = self.engine.error() {
            ui.colored_label(
                egui::Color32::from_rgb(255, 120, 120),
                format!("Engine failed: {e}"),
            );
            if ui.button("Retry").clicked() {
                self.retry_engine();
            }
        } else if let Some(msg) = &self.render_error {
            ui.colored_label(egui::Color32::from_rgb(255, 180, 50), msg.as_str());
        } else {
            ui.label("Engine ready");
        }
    }

    fn fractal_controls(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading("Fractal");
        let mut changed = false;

        let mut mode = self.params.mode;
        egui::ComboBox::from_label("Mode")
            .selected_text(mode.label())
            .show_ui(ui, |ui| {
                for m in [FractalMode::Mandelbrot, FractalMode::Julia] {
                    ui.selectable_value(&mut mode, m, m.label());
                }
            });
        if mode != self.params.mode {
            self.params.mode = mode;
            changed = true;
        }

        ui.add_space(4.0);
        ui.label(match self.params.mode {
            FractalMode::Mandelbrot => "Starting point z₀",
            FractalMode::Julia => "Julia constant c",
        });
        ui.horizontal(|ui| {
            for (value, prefix) in [
                (&mut self.params.start_re, "re "),
                (&mut self.params.start_im, "im "),
            ] {
                changed |= ui
                    .add(egui::DragValue::new(value).speed(0.001).prefix(prefix))
                    .changed();
            }
        });

        if self.params.mode == FractalMode::Julia && self.seed_backdrop.is_none() {
            self.seed_backdrop = Some(seed_picker::mandelbrot_backdrop(ctx));
        }
        let backdrop = match self.params.mode {
            FractalMode::Julia => self.seed_backdrop.as_ref(),
            FractalMode::Mandelbrot => None,
        };
        changed |= seed_picker::show(ui, &mut self.params, backdrop);

        ui.add_space(4.0);
        egui::Grid::new("fractal_params").num_columns(2).show(ui, |ui| {
            ui.label("Cutoff |z|²");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut self.params.cutoff)
                        .speed(1.0)
                        .range(4.0..=1e6),
                )
                .changed();
            ui.end_row();

            ui.label("Max iterations");
            let ramping = self.ramp.is_running();
            changed |= ui
                .add_enabled(
                    !ramping,
                    egui::DragValue::new(&mut self.params.max_iterations).range(1..=100_000),
                )
                .changed();
            ui.end_row();
        });

        if changed {
            self.params_changed();
        }
        if ui.button("Reset view").clicked() {
            self.reset_view();
        }
    }

    fn navigation_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Navigation");
        let mut zoom_changed = false;
        let mut interval_changed = false;
        egui::Grid::new("navigation_params").num_columns(2).show(ui, |ui| {
            ui.label("Wheel damping");
            zoom_changed |= ui
                .add(
                    egui::DragValue::new(&mut self.preferences.zoom_damping)
                        .speed(1.0)
                        .range(1.0..=1000.0),
                )
                .changed();
            ui.end_row();

            ui.label("Max wheel step");
            zoom_changed |= ui
                .add(
                    egui::DragValue::new(&mut self.preferences.zoom_max_factor)
                        .speed(0.01)
                        .range(1.0..=4.0)
                        .suffix("×"),
                )
                .changed();
            ui.end_row();

            ui.label("Min render gap");
            interval_changed |= ui
                .add(
                    egui::DragValue::new(&mut self.preferences.min_render_interval_ms)
                        .range(0..=1000)
                        .suffix(" ms"),
                )
                .changed();
            ui.end_row();
        });

        if zoom_changed {
            if let Err(e) = self.gestures.set_zoom_settings(self.preferences.zoom_settings()) {
                warn!("Zoom settings rejected: {e}");
            }
        }
        if interval_changed {
            self.scheduler
                .set_min_interval(self.preferences.min_render_interval());
        }
    }

    fn export_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Export");

        let mut format = self.preferences.export_format;
        ui.horizontal(|ui| {
            ui.radio_value(&mut format, ImageFormat::Bmp, "BMP");
            ui.radio_value(&mut format, ImageFormat::Png, "PNG");
        });
        if format != self.preferences.export_format {
            self.preferences.export_format = format;
            if let Some(engine) = self.engine.engine_mut() {
                engine.set_format(format);
            }
        }

        ui.horizontal(|ui| {
            ui.label("Scale");
            ui.add(
                egui::DragValue::new(&mut self.preferences.export_scale)
                    .speed(0.05)
                    .range(0.25..=16.0)
                    .suffix("×"),
            );
        });
        ui.weak(format!(
            "{0} × {0} px",
            (self.canvas_px() as f64 * self.preferences.export_scale).round() as u64
        ));

        let ready = self.engine.engine_mut().is_some() && !self.export_state.is_busy();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(ready, egui::Button::new("Save view"))
                .clicked()
            {
                self.export_current_view();
            }
            if ui
                .add_enabled(ready, egui::Button::new("Save high-res"))
                .clicked()
            {
                self.start_high_res_export();
            }
        });
        if self.export_state.is_busy() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Exporting");
            });
        }
    }
}
