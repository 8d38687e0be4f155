use std::sync::mpsc::{self, TryRecvError};

use tracing::{error, info};

use crate::error::EngineError;
use crate::export::ImageFormat;
use crate::params::GenerationParams;
use crate::viewport::Viewport;

/// Everything an engine needs to produce one image. Built fresh per call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub viewport: Viewport,
    pub params: GenerationParams,
    /// Side length in pixels of the square output.
    pub output_size: u32,
}

/// The computation engine the controller drives.
///
/// The controller only ever talks to the engine through these entry points,
/// so a recording double can stand in for it in tests.
pub trait FractalEngine {
    /// Allocate a framebuffer of `canvas_size × canvas_size` pixels.
    fn initialise_graphics(&mut self, canvas_size: u32) -> Result<(), EngineError>;

    /// Compute the request and paint it into the bound framebuffer.
    fn render(&mut self, request: &RenderRequest) -> Result<(), EngineError>;

    /// Compute the request at its own `output_size` and encode the result
    /// into the image file, without touching the framebuffer.
    fn generate_and_save(&mut self, request: &RenderRequest) -> Result<(), EngineError>;

    /// Encode the current framebuffer into the image file.
    fn save_image(&mut self) -> Result<(), EngineError>;

    /// Raw bytes of a file in the engine's virtual filesystem.
    fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError>;

    /// Encoding used by [`save_image`](Self::save_image) and
    /// [`generate_and_save`](Self::generate_and_save).
    fn image_format(&self) -> ImageFormat {
        ImageFormat::Bmp
    }
}

// ---------------------------------------------------------------------------
// Asynchronous initialisation
// ---------------------------------------------------------------------------

/// What changed during a call to [`EngineSlot::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTransition {
    None,
    Ready,
    Failed,
}

/// Holds an engine that is initialised on a background thread.
///
/// The handle is absent until the initialiser finishes; poll once per frame.
#[derive(Debug)]
pub enum EngineSlot<E> {
    Empty,
    Pending(mpsc::Receiver<Result<E, EngineError>>),
    Ready(E),
    Failed(EngineError),
}

impl<E: Send + 'static> EngineSlot<E> {
    /// Start initialising an engine on a dedicated thread.
    pub fn spawn<F>(init: F) -> Self
    where
        F: FnOnce() -> Result<E, EngineError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("engine-init".into())
            .spawn(move || {
                let _ = tx.send(init());
            });
        match spawned {
            Ok(_) => Self::Pending(rx),
            Err(e) => {
                error!("Failed to spawn engine init thread: {e}");
                Self::Failed(EngineError::InitFailed(e.to_string()))
            }
        }
    }
}

impl<E> EngineSlot<E> {
    /// Check whether a pending initialisation has finished.
    pub fn poll(&mut self) -> SlotTransition {
        let Self::Pending(rx) = self else {
            return SlotTransition::None;
        };
        match rx.try_recv() {
            Err(TryRecvError::Empty) => SlotTransition::None,
            Ok(Ok(engine)) => {
                info!("Engine ready");
                *self = Self::Ready(engine);
                SlotTransition::Ready
            }
            Ok(Err(e)) => {
                error!("Engine initialisation failed: {e}");
                *self = Self::Failed(e);
                SlotTransition::Failed
            }
            Err(TryRecvError::Disconnected) => {
                error!("Engine init thread exited without a result");
                *self = Self::Failed(EngineError::WorkerDisconnected);
                SlotTransition::Failed
            }
        }
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        match self {
            Self::Ready(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub fn error(&self) -> Option<&EngineError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> Default for EngineSlot<E> {
    fn default() -> Self {
        Self::Empty
    }
}
