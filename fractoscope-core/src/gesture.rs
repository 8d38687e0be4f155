//! Drag, pinch, and wheel gestures applied to the [`Viewport`].
//!
//! The controller is a small state machine (idle, dragging, pinching). A
//! drag or pinch captures a [`GestureSession`] when it starts; every update
//! is computed from that snapshot rather than accumulated, so rounding does
//! not drift over a long gesture.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::transform::{distance, midpoint, screen_to_plane, ScreenPos};
use crate::viewport::Viewport;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Tuning for wheel zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomSettings {
    /// Wheel delta that corresponds to a 2x step before clamping.
    pub damping: f64,
    /// Largest zoom step a single wheel event may apply (and its reciprocal).
    pub max_factor: f64,
}

impl ZoomSettings {
    pub const DEFAULT_DAMPING: f64 = 100.0;
    pub const DEFAULT_MAX_FACTOR: f64 = 1.3;

    pub fn new(damping: f64, max_factor: f64) -> crate::Result<Self> {
        let settings = Self {
            damping,
            max_factor,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Damping must be positive and the cap at least 1, otherwise a wheel
    /// step could exceed the cap or zoom the wrong way.
    pub fn validate(&self) -> crate::Result<()> {
        let damping_ok = self.damping.is_finite() && self.damping > 0.0;
        let max_ok = self.max_factor.is_finite() && self.max_factor >= 1.0;
        if damping_ok && max_ok {
            Ok(())
        } else {
            Err(CoreError::InvalidZoomSettings {
                damping: self.damping,
                max_factor: self.max_factor,
            })
        }
    }
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            damping: Self::DEFAULT_DAMPING,
            max_factor: Self::DEFAULT_MAX_FACTOR,
        }
    }
}

// ---------------------------------------------------------------------------
// Events, state, and sessions
// ---------------------------------------------------------------------------

/// Raw input forwarded from the UI, with positions already canvas-relative.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    PointerDown(ScreenPos),
    PointerMove(ScreenPos),
    PointerUp,
    PointerLeave,
    /// A contact was added; carries every active contact.
    TouchStart(Vec<ScreenPos>),
    /// Contacts moved; carries every active contact.
    TouchMove(Vec<ScreenPos>),
    /// A contact was lifted; carries the contacts that remain.
    TouchEnd(Vec<ScreenPos>),
    /// Positive `delta` zooms out, negative zooms in.
    Wheel { pos: ScreenPos, delta: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Dragging,
    Pinching,
}

/// State captured when a drag or pinch begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureSession {
    Drag {
        anchor_pos: ScreenPos,
        anchor_viewport: Viewport,
    },
    Pinch {
        /// Midpoint of the two contacts at gesture start.
        anchor_pos: ScreenPos,
        anchor_viewport: Viewport,
        anchor_distance: f64,
    },
}

/// What a call to [`GestureController::handle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Nothing happened: no session, busy engine, or a degenerate update.
    Ignored,
    /// A session was captured or torn down; the viewport is unchanged.
    StateChanged,
    /// The viewport was mutated.
    ViewportChanged,
}

impl GestureOutcome {
    pub fn viewport_changed(self) -> bool {
        self == Self::ViewportChanged
    }
}

// ---------------------------------------------------------------------------
// Pure update functions
// ---------------------------------------------------------------------------

/// Per-event zoom multiplier for a wheel delta.
///
/// Always within `[1 / max_factor, max_factor]`; `> 1` zooms out.
pub fn wheel_scale_factor(delta: f64, settings: &ZoomSettings) -> f64 {
    let factor = (1.0 + delta.abs() / settings.damping).min(settings.max_factor);
    if delta < 0.0 {
        1.0 / factor
    } else {
        factor
    }
}

/// Viewport after dragging from `anchor_pos` to `pos`.
///
/// The content follows the pointer: moving right shows plane points further
/// left. `view_size` is taken from the current viewport.
pub fn pan(
    anchor_viewport: &Viewport,
    anchor_pos: ScreenPos,
    pos: ScreenPos,
    view_size: f64,
    canvas_size: f64,
) -> Viewport {
    let scale = view_size / canvas_size;
    Viewport {
        min_re: anchor_viewport.min_re - (pos.x - anchor_pos.x) * scale,
        max_im: anchor_viewport.max_im + (pos.y - anchor_pos.y) * scale,
        view_size,
    }
}

/// Viewport after one wheel event at `pos`, keeping the point under the
/// cursor fixed.
pub fn wheel_zoom(
    viewport: &Viewport,
    pos: ScreenPos,
    delta: f64,
    canvas_size: f64,
    settings: &ZoomSettings,
) -> Option<Viewport> {
    if delta == 0.0 || !delta.is_finite() {
        return None;
    }
    let anchor = screen_to_plane(pos, viewport, canvas_size);
    viewport.zoomed_about(anchor, wheel_scale_factor(delta, settings))
}

/// Viewport for a pinch whose contacts are now at `a` and `b`.
///
/// The plane point under the gesture-start midpoint is placed under the
/// current midpoint.
pub fn pinch_zoom(
    anchor_viewport: &Viewport,
    anchor_pos: ScreenPos,
    anchor_distance: f64,
    a: ScreenPos,
    b: ScreenPos,
    canvas_size: f64,
) -> Option<Viewport> {
    let current = distance(a, b);
    if current <= 0.0 || anchor_distance <= 0.0 {
        return None;
    }
    let view_size = anchor_viewport.view_size * (anchor_distance / current);
    let mid = screen_to_plane(anchor_pos, anchor_viewport, canvas_size);
    let current_mid = midpoint(a, b);
    let zoomed = Viewport {
        min_re: mid.re - (current_mid.x / canvas_size) * view_size,
        max_im: mid.im + (current_mid.y / canvas_size) * view_size,
        view_size,
    };
    zoomed.is_valid().then_some(zoomed)
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GestureController {
    canvas_size: f64,
    zoom: ZoomSettings,
    session: Option<GestureSession>,
}

impl GestureController {
    pub fn new(canvas_size: u32, zoom: ZoomSettings) -> crate::Result<Self> {
        if canvas_size == 0 {
            return Err(CoreError::InvalidCanvasSize(canvas_size));
        }
        zoom.validate()?;
        Ok(Self {
            canvas_size: canvas_size as f64,
            zoom,
            session: None,
        })
    }

    pub fn canvas_size(&self) -> f64 {
        self.canvas_size
    }

    /// Change the canvas size. Any running gesture is dropped, since its
    /// anchors were measured against the old size.
    pub fn set_canvas_size(&mut self, canvas_size: u32) -> crate::Result<()> {
        if canvas_size == 0 {
            return Err(CoreError::InvalidCanvasSize(canvas_size));
        }
        self.canvas_size = canvas_size as f64;
        self.session = None;
        Ok(())
    }

    pub fn zoom_settings(&self) -> &ZoomSettings {
        &self.zoom
    }

    pub fn set_zoom_settings(&mut self, zoom: ZoomSettings) -> crate::Result<()> {
        zoom.validate()?;
        self.zoom = zoom;
        Ok(())
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn state(&self) -> GestureState {
        match self.session {
            None => GestureState::Idle,
            Some(GestureSession::Drag { .. }) => GestureState::Dragging,
            Some(GestureSession::Pinch { .. }) => GestureState::Pinching,
        }
    }

    /// Feed one input event.
    ///
    /// `busy` is true while a render is in flight; viewport updates are then
    /// dropped rather than queued, though sessions still start and end.
    pub fn handle(
        &mut self,
        event: &GestureEvent,
        viewport: &mut Viewport,
        busy: bool,
    ) -> GestureOutcome {
        match event {
            GestureEvent::PointerDown(pos) => {
                if self.state() == GestureState::Pinching {
                    return GestureOutcome::Ignored;
                }
                self.begin_drag(*pos, viewport);
                GestureOutcome::StateChanged
            }
            GestureEvent::PointerMove(pos) => match self.session {
                Some(GestureSession::Drag { .. }) => self.update_drag(*pos, viewport, busy),
                _ => GestureOutcome::Ignored,
            },
            GestureEvent::PointerUp | GestureEvent::PointerLeave => self.end(),
            GestureEvent::TouchStart(contacts) | GestureEvent::TouchEnd(contacts) => {
                self.recapture(contacts, viewport)
            }
            GestureEvent::TouchMove(contacts) => match (self.session, contacts.as_slice()) {
                (Some(GestureSession::Drag { .. }), [pos]) => {
                    self.update_drag(*pos, viewport, busy)
                }
                (Some(GestureSession::Pinch { .. }), [a, b, ..]) => {
                    self.update_pinch(*a, *b, viewport, busy)
                }
                // Contact count changed without a start/end event.
                (Some(_), _) => self.recapture(contacts, viewport),
                (None, _) => GestureOutcome::Ignored,
            },
            GestureEvent::Wheel { pos, delta } => {
                if busy {
                    return GestureOutcome::Ignored;
                }
                match wheel_zoom(viewport, *pos, *delta, self.canvas_size, &self.zoom) {
                    Some(zoomed) => {
                        *viewport = zoomed;
                        GestureOutcome::ViewportChanged
                    }
                    None => GestureOutcome::Ignored,
                }
            }
        }
    }

    /// Replace the session to match the current set of contacts.
    fn recapture(&mut self, contacts: &[ScreenPos], viewport: &Viewport) -> GestureOutcome {
        match contacts {
            [] => self.end(),
            [pos] => {
                self.begin_drag(*pos, viewport);
                GestureOutcome::StateChanged
            }
            [a, b, ..] => {
                self.begin_pinch(*a, *b, viewport);
                GestureOutcome::StateChanged
            }
        }
    }

    fn begin_drag(&mut self, pos: ScreenPos, viewport: &Viewport) {
        debug!(x = pos.x, y = pos.y, "Drag started");
        self.session = Some(GestureSession::Drag {
            anchor_pos: pos,
            anchor_viewport: *viewport,
        });
    }

    fn begin_pinch(&mut self, a: ScreenPos, b: ScreenPos, viewport: &Viewport) {
        let anchor_distance = distance(a, b);
        debug!(distance = anchor_distance, "Pinch started");
        self.session = Some(GestureSession::Pinch {
            anchor_pos: midpoint(a, b),
            anchor_viewport: *viewport,
            anchor_distance,
        });
    }

    fn end(&mut self) -> GestureOutcome {
        match self.session.take() {
            Some(_) => {
                debug!("Gesture ended");
                GestureOutcome::StateChanged
            }
            None => GestureOutcome::Ignored,
        }
    }

    fn update_drag(&self, pos: ScreenPos, viewport: &mut Viewport, busy: bool) -> GestureOutcome {
        let Some(GestureSession::Drag {
            anchor_pos,
            anchor_viewport,
        }) = self.session
        else {
            return GestureOutcome::Ignored;
        };
        if busy {
            return GestureOutcome::Ignored;
        }
        let panned = pan(
            &anchor_viewport,
            anchor_pos,
            pos,
            viewport.view_size,
            self.canvas_size,
        );
        if !panned.is_valid() {
            return GestureOutcome::Ignored;
        }
        *viewport = panned;
        GestureOutcome::ViewportChanged
    }

    fn update_pinch(
        &self,
        a: ScreenPos,
        b: ScreenPos,
        viewport: &mut Viewport,
        busy: bool,
    ) -> GestureOutcome {
        let Some(GestureSession::Pinch {
            anchor_pos,
            anchor_viewport,
            anchor_distance,
        }) = self.session
        else {
            return GestureOutcome::Ignored;
        };
        if busy {
            return GestureOutcome::Ignored;
        }
        match pinch_zoom(
            &anchor_viewport,
            anchor_pos,
            anchor_distance,
            a,
            b,
            self.canvas_size,
        ) {
            Some(zoomed) => {
                *viewport = zoomed;
                GestureOutcome::ViewportChanged
            }
            None => GestureOutcome::Ignored,
        }
    }
}
