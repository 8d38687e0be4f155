pub mod encode;
pub mod escape;
pub mod framebuffer;
pub mod palette;
pub mod software;
pub mod vfs;

// Re-export primary types for convenience.
pub use escape::Escape;
pub use framebuffer::FrameBuffer;
pub use palette::Palette;
pub use software::SoftwareEngine;
pub use vfs::VirtualFs;

/// Convenience result type for the engine crate.
pub type Result<T> = std::result::Result<T, fractoscope_core::EngineError>;
