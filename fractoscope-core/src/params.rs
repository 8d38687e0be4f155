use serde::{Deserialize, Serialize};

/// Which escape-time family the engine should compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractalMode {
    /// `z₀ = start`, `c` = pixel.
    #[default]
    Mandelbrot,
    /// `z₀` = pixel, `c = start`.
    Julia,
}

impl FractalMode {
    /// Numeric code understood by engines.
    pub fn code(self) -> u32 {
        match self {
            Self::Mandelbrot => 0,
            Self::Julia => 1,
        }
    }

    /// Inverse of [`code`](Self::code). Unknown codes fall back to Mandelbrot.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Julia,
            _ => Self::Mandelbrot,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mandelbrot => "Mandelbrot",
            Self::Julia => "Julia",
        }
    }
}

/// Parameters sent to the engine alongside the viewport on every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Real part of the Julia seed, or of `z₀` in Mandelbrot mode.
    pub start_re: f64,

    /// Imaginary part of the Julia seed, or of `z₀` in Mandelbrot mode.
    pub start_im: f64,

    /// Escape threshold compared against `|z|²`.
    pub cutoff: f64,

    /// Iteration budget per point.
    pub max_iterations: u32,

    pub mode: FractalMode,
}

impl GenerationParams {
    pub const DEFAULT_CUTOFF: f64 = 100.0;
    pub const DEFAULT_MAX_ITERATIONS: u32 = 250;

    /// Return a copy with a different `max_iterations` value.
    pub fn with_max_iterations(self, max_iterations: u32) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// Return a copy with a different mode.
    pub fn with_mode(self, mode: FractalMode) -> Self {
        Self { mode, ..self }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            start_re: 0.0,
            start_im: 0.0,
            cutoff: Self::DEFAULT_CUTOFF,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            mode: FractalMode::Mandelbrot,
        }
    }
}
