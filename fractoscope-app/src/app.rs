use std::time::Instant;

use eframe::egui;
use tracing::{error, info, warn};

use fractoscope_core::{
    CanvasBounds, EngineSlot, FrameOutcome, GenerationParams, GestureController, RenderScheduler,
    SlotTransition, StartupRamp, Viewport,
};
use fractoscope_engine::SoftwareEngine;

use crate::input::{self, InputTranslator};
use crate::preferences::{AppPreferences, LastView};
use crate::ui::export::ExportState;

pub(crate) const HUD_MARGIN: f32 = 8.0;
pub(crate) const HUD_CORNER_RADIUS: f32 = 6.0;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

pub(crate) struct FractoscopeApp {
    pub(crate) preferences: AppPreferences,
    pub(crate) egui_ctx: egui::Context,

    pub(crate) engine: EngineSlot<SoftwareEngine>,
    pub(crate) viewport: Viewport,
    pub(crate) params: GenerationParams,

    pub(crate) gestures: GestureController,
    pub(crate) scheduler: RenderScheduler,
    pub(crate) ramp: StartupRamp,
    pub(crate) input: InputTranslator,

    /// Canvas side in points; gesture positions use this unit.
    canvas_points: u32,
    /// Canvas side in physical pixels; the framebuffer uses this unit.
    canvas_px: u32,
    pub(crate) canvas_rect: Option<egui::Rect>,

    texture: Option<egui::TextureHandle>,
    texture_revision: u64,
    pub(crate) seed_backdrop: Option<egui::TextureHandle>,
    pub(crate) render_error: Option<String>,

    pub(crate) export_state: ExportState,
}

impl FractoscopeApp {
    pub(crate) fn new(
        ctx: &egui::Context,
        preferences: AppPreferences,
    ) -> fractoscope_core::Result<Self> {
        let (viewport, params) = preferences.initial_view();
        let canvas_points = preferences.canvas_size.max(1.0) as u32;
        let canvas_px = physical(canvas_points, ctx.pixels_per_point());

        let engine = SoftwareEngine::load(canvas_px, preferences.export_format);
        let gestures = GestureController::new(canvas_points, preferences.zoom_settings())?;
        let scheduler = RenderScheduler::new(canvas_px, preferences.min_render_interval())?;
        let ramp = StartupRamp::new(preferences.ramp_duration());

        info!(canvas_points, canvas_px, "Fractoscope initialised");

        Ok(Self {
            preferences,
            egui_ctx: ctx.clone(),
            engine,
            viewport,
            params,
            gestures,
            scheduler,
            ramp,
            input: InputTranslator::default(),
            canvas_points,
            canvas_px,
            canvas_rect: None,
            texture: None,
            texture_revision: 0,
            seed_backdrop: None,
            render_error: None,
            export_state: ExportState::new(),
        })
    }

    // -- Engine lifecycle --------------------------------------------------

    fn poll_engine(&mut self) {
        if self.engine.poll() == SlotTransition::Ready {
            self.ramp.start(self.params.max_iterations);
            self.scheduler.notify_change();
        }
    }

    /// Start a fresh initialisation after a failure.
    pub(crate) fn retry_engine(&mut self) {
        info!("Retrying engine initialisation");
        self.engine = SoftwareEngine::load(self.canvas_px, self.preferences.export_format);
    }

    fn advance_ramp(&mut self, now: Instant) {
        if let Some(n) = self.ramp.tick(now).max_iterations() {
            if n != self.params.max_iterations {
                self.params.max_iterations = n;
                self.scheduler.notify_change();
            }
        }
    }

    /// Iteration count the user asked for, even mid-ramp.
    pub(crate) fn target_max_iterations(&self) -> u32 {
        if self.ramp.is_running() {
            self.ramp.target()
        } else {
            self.params.max_iterations
        }
    }

    /// A parameter widget changed.
    pub(crate) fn params_changed(&mut self) {
        self.scheduler.notify_change();
    }

    pub(crate) fn reset_view(&mut self) {
        self.viewport = Viewport::default();
        self.scheduler.notify_change();
    }

    // -- Canvas ------------------------------------------------------------

    fn resize_canvas(&mut self, points: u32, pixels_per_point: f32) {
        if points != self.canvas_points {
            self.canvas_points = points;
            if let Err(e) = self.gestures.set_canvas_size(points) {
                warn!("Ignoring canvas resize: {e}");
            }
        }
        let px = physical(points, pixels_per_point);
        if px != self.canvas_px {
            self.canvas_px = px;
            if let Err(e) = self.scheduler.set_canvas_size(px) {
                warn!("Ignoring canvas resize: {e}");
            }
        }
    }

    pub(crate) fn canvas_px(&self) -> u32 {
        self.canvas_px
    }

    fn forward_input(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        bounds: &CanvasBounds,
    ) {
        let raw = ctx.input(|i| i.events.clone());
        let mut events = self.input.translate(&raw, bounds);

        if response.hovered() && !self.input.has_contacts() {
            let scroll_y = ctx.input(|i| i.raw_scroll_delta.y);
            events.extend(input::wheel_event(scroll_y, response.hover_pos(), bounds));
        }

        for event in &events {
            let busy = self.scheduler.is_generating();
            if self
                .gestures
                .handle(event, &mut self.viewport, busy)
                .viewport_changed()
            {
                self.scheduler.notify_change();
            }
        }
    }

    fn render_frame(&mut self, now: Instant) {
        match self
            .scheduler
            .run_frame(now, self.engine.engine_mut(), &self.viewport, &self.params)
        {
            Ok(FrameOutcome::Rendered) => self.render_error = None,
            Ok(_) => {}
            Err(e) => {
                error!("Render failed: {e}");
                self.render_error = Some(e.to_string());
            }
        }
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        let Some(engine) = self.engine.engine_mut() else {
            return;
        };
        if engine.revision() == self.texture_revision {
            return;
        }
        let Some(fb) = engine.framebuffer() else {
            return;
        };
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [fb.size as usize, fb.size as usize],
            &fb.pixels,
        );
        self.texture_revision = engine.revision();
        match self.texture.as_mut() {
            Some(tex) => tex.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("fractal", image, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn draw_canvas(&mut self, ctx: &egui::Context, now: Instant) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::from_gray(18)))
            .show(ctx, |ui| {
                let available = ui.available_size();
                let side = available
                    .x
                    .min(available.y)
                    .min(self.preferences.canvas_size)
                    .floor()
                    .max(1.0);
                self.resize_canvas(side as u32, ctx.pixels_per_point());

                let (response, painter) = ui.allocate_painter(
                    egui::vec2(side, side),
                    egui::Sense::click_and_drag(),
                );
                let rect = response.rect;
                self.canvas_rect = Some(rect);
                let bounds =
                    CanvasBounds::new(rect.min.x as f64, rect.min.y as f64, side as f64);

                self.forward_input(ctx, &response, &bounds);
                self.render_frame(now);
                self.upload_texture(ctx);

                if let Some(tex) = &self.texture {
                    let uv =
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    painter.image(tex.id(), rect, uv, egui::Color32::WHITE);
                } else {
                    painter.rect_filled(rect, 0.0, egui::Color32::BLACK);
                }

                if self.engine.is_pending() {
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        "Loading engine...",
                        egui::FontId::proportional(16.0),
                        egui::Color32::GRAY,
                    );
                }
            });
    }

    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        if self.ramp.is_running() || self.engine.is_pending() || self.export_state.is_busy() {
            ctx.request_repaint();
            return;
        }
        if self.scheduler.is_dirty() && self.engine.error().is_none() {
            match self.scheduler.next_allowed() {
                Some(at) if at > now => ctx.request_repaint_after(at - now),
                _ => ctx.request_repaint(),
            }
        }
    }

    fn capture_last_view(&self) -> LastView {
        LastView {
            viewport: self.viewport,
            params: self.params.with_max_iterations(self.target_max_iterations()),
        }
    }
}

fn physical(points: u32, pixels_per_point: f32) -> u32 {
    ((points as f32 * pixels_per_point).round() as u32).max(1)
}

// ---------------------------------------------------------------------------
// eframe integration
// ---------------------------------------------------------------------------

impl eframe::App for FractoscopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());
        let now = Instant::now();

        self.poll_engine();
        self.advance_ramp(now);
        self.poll_export_result();

        self.show_controls_panel(ctx);
        self.draw_canvas(ctx, now);
        self.show_hud(ctx);
        self.draw_export_notification(ctx);

        self.schedule_repaint(ctx, now);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.preferences.last_view = if self.preferences.restore_last_view {
            Some(self.capture_last_view())
        } else {
            None
        };
        self.preferences.save();
        info!("Preferences saved on exit");
    }
}
