//! Disc widget for choosing the seed `(start_re, start_im)` by dragging.
//!
//! The disc spans `|seed| <= 2`: its centre is the origin and its rim sits at
//! radius 2 in the plane.

use eframe::egui;

use fractoscope_core::{GenerationParams, Viewport};
use fractoscope_engine::{FrameBuffer, Palette};

/// Radius of the disc in points.
pub(crate) const RADIUS: f32 = 100.0;

/// Seed for a position relative to the disc's top-left corner, or `None`
/// outside the disc.
pub(crate) fn seed_at(x: f64, y: f64, radius: f64) -> Option<(f64, f64)> {
    let re = (x - radius) / (radius / 2.0);
    let im = -(y - radius) / (radius / 2.0);
    (re * re + im * im <= 4.0).then_some((re, im))
}

/// Inverse of [`seed_at`].
pub(crate) fn offset_of(re: f64, im: f64, radius: f64) -> (f64, f64) {
    (re * radius / 2.0 + radius, radius - im * radius / 2.0)
}

/// Mandelbrot thumbnail shown behind the disc in Julia mode, so the seed
/// can be picked against the set it comes from.
pub(crate) fn mandelbrot_backdrop(ctx: &egui::Context) -> egui::TextureHandle {
    let size = (RADIUS * 2.0) as u32;
    let mut buffer = FrameBuffer::new(size);
    buffer.paint(
        &Viewport::default(),
        &GenerationParams::default().with_max_iterations(100),
        &Palette::default(),
    );
    let image = egui::ColorImage::from_rgba_unmultiplied(
        [size as usize, size as usize],
        &buffer.pixels,
    );
    ctx.load_texture("seed_backdrop", image, egui::TextureOptions::LINEAR)
}

/// Draw the picker. Returns true when the seed changed.
pub(crate) fn show(
    ui: &mut egui::Ui,
    params: &mut GenerationParams,
    backdrop: Option<&egui::TextureHandle>,
) -> bool {
    let side = RADIUS * 2.0;
    let (response, painter) = ui.allocate_painter(egui::vec2(side, side), egui::Sense::drag());
    let rect = response.rect;
    let centre = rect.center();

    painter.circle_filled(centre, RADIUS, egui::Color32::from_gray(30));
    if let Some(tex) = backdrop {
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        painter.image(tex.id(), rect, uv, egui::Color32::from_white_alpha(160));
    }
    painter.circle_stroke(centre, RADIUS, egui::Stroke::new(1.0, egui::Color32::GRAY));

    let mut changed = false;
    if response.dragged() || response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            let local = pos - rect.min;
            if let Some((re, im)) = seed_at(local.x as f64, local.y as f64, RADIUS as f64) {
                params.start_re = re;
                params.start_im = im;
                changed = true;
            }
        }
    }

    let (x, y) = offset_of(params.start_re, params.start_im, RADIUS as f64);
    let marker = rect.min + egui::vec2(x as f32, y as f32);
    painter.circle_filled(marker, 4.0, egui::Color32::from_rgb(255, 200, 60));
    changed
}
