pub(crate) mod controls;
pub(crate) mod export;
pub(crate) mod hud;

use eframe::egui;

use crate::app::{HUD_CORNER_RADIUS, HUD_MARGIN};

/// Text colour for overlays drawn on top of the fractal.
pub(crate) const OVERLAY_TEXT: egui::Color32 = egui::Color32::from_rgb(220, 220, 220);

/// Dark translucent panel shared by everything painted over the canvas.
/// `opacity` in `[0, 1]` scales the backdrop so overlays can fade out.
pub(crate) fn overlay_frame(opacity: f32) -> egui::Frame {
    let alpha = (165.0 * opacity.clamp(0.0, 1.0)).round() as u8;
    egui::Frame::NONE
        .fill(egui::Color32::from_black_alpha(alpha))
        .inner_margin(egui::Margin::same(HUD_MARGIN as i8))
        .corner_radius(HUD_CORNER_RADIUS)
}
