use thiserror::Error;

/// Errors originating from the viewport controller.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid view size: {0} (must be positive and finite)")]
    InvalidViewSize(f64),

    #[error("invalid canvas size: {0} (must be >= 1)")]
    InvalidCanvasSize(u32),

    #[error("invalid zoom settings: damping {damping}, max factor {max_factor}")]
    InvalidZoomSettings { damping: f64, max_factor: f64 },

    #[error("invalid export scale: {0} (must be positive and finite)")]
    InvalidExportScale(f64),

    #[error("an export is already in progress")]
    ExportInProgress,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors reported by a fractal engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine graphics not initialised")]
    NotInitialised,

    #[error("invalid output size: {0}")]
    InvalidOutputSize(u32),

    #[error("file not found in engine filesystem: {0}")]
    FileNotFound(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("engine initialisation failed: {0}")]
    InitFailed(String),

    #[error("engine worker disconnected")]
    WorkerDisconnected,
}
