pub mod engine;
pub mod error;
pub mod export;
pub mod gesture;
pub mod params;
pub mod ramp;
pub mod scheduler;
pub mod transform;
pub mod viewport;

// Re-export primary types for convenience.
pub use engine::{EngineSlot, FractalEngine, RenderRequest, SlotTransition};
pub use error::{CoreError, EngineError};
pub use export::{ExportPipeline, ExportReservation, ExportedImage, ImageFormat};
pub use gesture::{GestureController, GestureEvent, GestureOutcome, GestureState, ZoomSettings};
pub use params::{FractalMode, GenerationParams};
pub use ramp::{RampStep, StartupRamp};
pub use scheduler::{FrameOutcome, RenderScheduler};
pub use transform::{CanvasBounds, PlanePoint, PointerSample, ScreenPos};
pub use viewport::Viewport;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
pub(crate) mod testing;
