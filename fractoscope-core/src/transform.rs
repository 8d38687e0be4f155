//! Mapping between canvas pixels and complex-plane coordinates.
//!
//! Screen positions are always relative to the canvas' top-left corner.
//! Nothing here clamps: a drag may legitimately leave the canvas.

use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

/// A position in canvas pixels, `(0, 0)` at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPos {
    pub x: f64,
    pub y: f64,
}

impl ScreenPos {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point on the complex plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanePoint {
    pub re: f64,
    pub im: f64,
}

impl PlanePoint {
    #[inline]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// Where the canvas sits in window (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub left: f64,
    pub top: f64,
    /// Side length in pixels of the square canvas.
    pub size: f64,
}

impl CanvasBounds {
    pub fn new(left: f64, top: f64, size: f64) -> Self {
        Self { left, top, size }
    }

    /// Convert a client position into a canvas-relative one.
    #[inline]
    pub fn relative(&self, client_x: f64, client_y: f64) -> ScreenPos {
        ScreenPos::new(client_x - self.left, client_y - self.top)
    }

    /// Whether a canvas-relative position lies on the canvas.
    pub fn contains(&self, pos: ScreenPos) -> bool {
        (0.0..self.size).contains(&pos.x) && (0.0..self.size).contains(&pos.y)
    }
}

/// One pointer reading, already made canvas-relative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerSample {
    Mouse(ScreenPos),
    Touch { pos: ScreenPos, index: usize },
}

impl PointerSample {
    /// Pick the contact at `index` from a touch list.
    pub fn from_touches(contacts: &[ScreenPos], index: usize) -> Option<Self> {
        contacts
            .get(index)
            .map(|&pos| Self::Touch { pos, index })
    }

    #[inline]
    pub fn pos(&self) -> ScreenPos {
        match *self {
            Self::Mouse(pos) | Self::Touch { pos, .. } => pos,
        }
    }
}

/// Map a canvas position to the plane point it displays.
#[inline]
pub fn screen_to_plane(pos: ScreenPos, viewport: &Viewport, canvas_size: f64) -> PlanePoint {
    PlanePoint::new(
        viewport.min_re + (pos.x / canvas_size) * viewport.view_size,
        viewport.max_im - (pos.y / canvas_size) * viewport.view_size,
    )
}

/// Inverse of [`screen_to_plane`].
#[inline]
pub fn plane_to_screen(point: PlanePoint, viewport: &Viewport, canvas_size: f64) -> ScreenPos {
    ScreenPos::new(
        (point.re - viewport.min_re) / viewport.view_size * canvas_size,
        (viewport.max_im - point.im) / viewport.view_size * canvas_size,
    )
}

/// The plane point under a pointer sample.
#[inline]
pub fn sample_to_plane(sample: PointerSample, viewport: &Viewport, canvas_size: f64) -> PlanePoint {
    screen_to_plane(sample.pos(), viewport, canvas_size)
}

#[inline]
pub fn midpoint(a: ScreenPos, b: ScreenPos) -> ScreenPos {
    ScreenPos::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

#[inline]
pub fn distance(a: ScreenPos, b: ScreenPos) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn close(a: PlanePoint, b: PlanePoint) -> bool {
        (a.re - b.re).abs() < EPSILON && (a.im - b.im).abs() < EPSILON
    }

    #[test]
    fn corners_and_center() {
        let vp = Viewport::default();
        let tl = screen_to_plane(ScreenPos::ORIGIN, &vp, 400.0);
        assert!(close(tl, PlanePoint::new(-2.0, 2.0)));

        let br = screen_to_plane(ScreenPos::new(400.0, 400.0), &vp, 400.0);
        assert!(close(br, PlanePoint::new(2.0, -2.0)));

        let c = screen_to_plane(ScreenPos::new(200.0, 200.0), &vp, 400.0);
        assert!(close(c, PlanePoint::new(0.0, 0.0)));
    }

    #[test]
    fn outside_canvas_is_not_clamped() {
        let vp = Viewport::default();
        let p = screen_to_plane(ScreenPos::new(-100.0, 500.0), &vp, 400.0);
        assert!(close(p, PlanePoint::new(-3.0, -3.0)));
    }

    #[test]
    fn plane_to_screen_inverts() {
        let vp = Viewport::new(-0.7435, 0.1314, 0.0021).unwrap();
        for &(x, y) in &[(0.0, 0.0), (13.5, 377.25), (799.0, 2.0), (-40.0, 900.0)] {
            let pos = ScreenPos::new(x, y);
            let back = plane_to_screen(screen_to_plane(pos, &vp, 800.0), &vp, 800.0);
            assert!((back.x - x).abs() < 1e-6, "x: {} vs {x}", back.x);
            assert!((back.y - y).abs() < 1e-6, "y: {} vs {y}", back.y);
        }
    }

    #[test]
    fn samples_map_through_same_transform() {
        let vp = Viewport::default();
        let pos = ScreenPos::new(100.0, 300.0);
        let mouse = sample_to_plane(PointerSample::Mouse(pos), &vp, 400.0);
        let touch = sample_to_plane(PointerSample::Touch { pos, index: 1 }, &vp, 400.0);
        assert_eq!(mouse, touch);
        assert!(close(mouse, PlanePoint::new(-1.0, -1.0)));
    }

    #[test]
    fn touch_sample_picks_index() {
        let contacts = [ScreenPos::new(1.0, 2.0), ScreenPos::new(3.0, 4.0)];
        let s = PointerSample::from_touches(&contacts, 1).unwrap();
        assert_eq!(s.pos(), ScreenPos::new(3.0, 4.0));
        assert!(PointerSample::from_touches(&contacts, 2).is_none());
    }

    #[test]
    fn canvas_bounds_relative() {
        let bounds = CanvasBounds::new(50.0, 20.0, 400.0);
        let pos = bounds.relative(60.0, 25.0);
        assert_eq!(pos, ScreenPos::new(10.0, 5.0));
        assert!(bounds.contains(pos));
        assert!(!bounds.contains(bounds.relative(10.0, 25.0)));
    }

    #[test]
    fn geometry_helpers() {
        let a = ScreenPos::new(0.0, 0.0);
        let b = ScreenPos::new(6.0, 8.0);
        assert_eq!(midpoint(a, b), ScreenPos::new(3.0, 4.0));
        assert!((distance(a, b) - 10.0).abs() < EPSILON);
    }
}
