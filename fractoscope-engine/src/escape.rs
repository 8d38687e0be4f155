use fractoscope_core::{FractalMode, GenerationParams, PlanePoint};

/// Outcome of iterating one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// `|z|²` exceeded the cutoff after this many iterations.
    Escaped(u32),
    /// Still bounded after `max_iterations`.
    Bounded,
}

/// Iterate `z ← z² + c` from `z0` until `|z|² > cutoff` or the budget runs out.
#[inline]
pub fn escape_time(z0: (f64, f64), c: (f64, f64), cutoff: f64, max_iterations: u32) -> Escape {
    let (mut zr, mut zi) = z0;
    let (cr, ci) = c;
    for n in 0..max_iterations {
        let zr2 = zr * zr;
        let zi2 = zi * zi;
        if zr2 + zi2 > cutoff {
            return Escape::Escaped(n);
        }
        zi = 2.0 * zr * zi + ci;
        zr = zr2 - zi2 + cr;
    }
    if zr * zr + zi * zi > cutoff {
        Escape::Escaped(max_iterations)
    } else {
        Escape::Bounded
    }
}

/// Iterate the plane point under the mode's roles for seed and pixel.
///
/// Mandelbrot: `z0` is the seed and `c` the pixel. Julia: the other way round.
#[inline]
pub fn sample(params: &GenerationParams, point: PlanePoint) -> Escape {
    let seed = (params.start_re, params.start_im);
    let pixel = (point.re, point.im);
    let (z0, c) = match params.mode {
        FractalMode::Mandelbrot => (seed, pixel),
        FractalMode::Julia => (pixel, seed),
    };
    escape_time(z0, c, params.cutoff, params.max_iterations)
}
