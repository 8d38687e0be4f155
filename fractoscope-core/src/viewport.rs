use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::transform::PlanePoint;

/// Defines the visible region of the complex plane.
///
/// The region is always square. `(min_re, max_im)` is the top-left corner;
/// the imaginary axis is flipped relative to screen space, so moving down the
/// canvas decreases the imaginary part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Real coordinate of the left edge.
    pub min_re: f64,

    /// Imaginary coordinate of the top edge.
    pub max_im: f64,

    /// Side length of the square in complex-plane units. Always `> 0`.
    pub view_size: f64,
}

impl Viewport {
    pub const DEFAULT_MIN_RE: f64 = -2.0;
    pub const DEFAULT_MAX_IM: f64 = 2.0;
    pub const DEFAULT_VIEW_SIZE: f64 = 4.0;

    /// Create a viewport with explicit parameters.
    pub fn new(min_re: f64, max_im: f64, view_size: f64) -> crate::Result<Self> {
        if !is_valid_view_size(view_size) {
            return Err(CoreError::InvalidViewSize(view_size));
        }
        Ok(Self {
            min_re,
            max_im,
            view_size,
        })
    }

    /// Real coordinate of the right edge.
    #[inline]
    pub fn max_re(&self) -> f64 {
        self.min_re + self.view_size
    }

    /// Imaginary coordinate of the bottom edge.
    #[inline]
    pub fn min_im(&self) -> f64 {
        self.max_im - self.view_size
    }

    /// The plane point at the centre of the viewport.
    pub fn center(&self) -> PlanePoint {
        let half = self.view_size / 2.0;
        PlanePoint::new(self.min_re + half, self.max_im - half)
    }

    /// Whether every field is finite and the size invariant holds.
    pub fn is_valid(&self) -> bool {
        self.min_re.is_finite() && self.max_im.is_finite() && is_valid_view_size(self.view_size)
    }

    /// Scale the viewport by `factor` while keeping `anchor` at the same
    /// relative position inside it.
    ///
    /// Returns `None` if the result would violate the viewport invariants
    /// (e.g. the size underflows to zero or overflows to infinity).
    pub fn zoomed_about(&self, anchor: PlanePoint, factor: f64) -> Option<Self> {
        let zoomed = Self {
            min_re: anchor.re + (self.min_re - anchor.re) * factor,
            max_im: anchor.im + (self.max_im - anchor.im) * factor,
            view_size: self.view_size * factor,
        };
        zoomed.is_valid().then_some(zoomed)
    }

    /// Zoom level relative to the default view (`4.0 / view_size`).
    pub fn zoom(&self) -> f64 {
        Self::DEFAULT_VIEW_SIZE / self.view_size
    }
}

impl Default for Viewport {
    /// The full `[-2, 2] × [-2, 2]` square, which contains the whole
    /// Mandelbrot set and most Julia sets.
    fn default() -> Self {
        Self {
            min_re: Self::DEFAULT_MIN_RE,
            max_im: Self::DEFAULT_MAX_IM,
            view_size: Self::DEFAULT_VIEW_SIZE,
        }
    }
}

#[inline]
fn is_valid_view_size(view_size: f64) -> bool {
    view_size > 0.0 && view_size.is_finite()
}
