//! CPU implementation of [`FractalEngine`].

use std::time::Instant;

use fractoscope_core::{EngineError, EngineSlot, FractalEngine, ImageFormat, RenderRequest};
use tracing::{debug, info};

use crate::encode::{self, ImageMetadata};
use crate::framebuffer::FrameBuffer;
use crate::palette::Palette;
use crate::vfs::VirtualFs;

/// Largest accepted output side length (16384² RGBA is 1 GiB).
pub const MAX_OUTPUT_SIZE: u32 = 16_384;

fn check_size(size: u32) -> crate::Result<()> {
    if size == 0 || size > MAX_OUTPUT_SIZE {
        return Err(EngineError::InvalidOutputSize(size));
    }
    Ok(())
}

/// Escape-time engine that renders on the CPU with rayon and writes encoded
/// images into a [`VirtualFs`].
#[derive(Debug, Clone, Default)]
pub struct SoftwareEngine {
    framebuffer: Option<FrameBuffer>,
    /// Request behind the current framebuffer contents.
    painted: Option<RenderRequest>,
    fs: VirtualFs,
    palette: Palette,
    format: ImageFormat,
    revision: u64,
}

impl SoftwareEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Initialise an engine with a `canvas_size²` framebuffer on a background
    /// thread.
    pub fn load(canvas_size: u32, format: ImageFormat) -> EngineSlot<Self> {
        EngineSlot::spawn(move || {
            let mut engine = Self::new().with_format(format);
            engine.initialise_graphics(canvas_size)?;
            Ok(engine)
        })
    }

    /// Switch the output format. A file left over from the previous format
    /// is discarded so it cannot be read back as the current image.
    pub fn set_format(&mut self, format: ImageFormat) {
        if format != self.format {
            self.fs.remove(&self.format.file_name());
            self.format = format;
        }
    }

    pub fn framebuffer(&self) -> Option<&FrameBuffer> {
        self.framebuffer.as_ref()
    }

    /// Bumped whenever the framebuffer contents change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn last_request(&self) -> Option<&RenderRequest> {
        self.painted.as_ref()
    }

    pub fn files(&self) -> &VirtualFs {
        &self.fs
    }

    fn compute(&self, request: &RenderRequest) -> crate::Result<FrameBuffer> {
        check_size(request.output_size)?;
        let start = Instant::now();
        let mut buffer = FrameBuffer::new(request.output_size);
        buffer.paint(&request.viewport, &request.params, &self.palette);
        debug!(
            size = request.output_size,
            mode = request.params.mode.code(),
            max_iter = request.params.max_iterations,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Computed escape-time image"
        );
        Ok(buffer)
    }

    fn store(&mut self, buffer: &FrameBuffer, request: Option<&RenderRequest>) -> crate::Result<()> {
        let metadata = request.map(ImageMetadata::from);
        let bytes = encode::encode(buffer, self.format, metadata.as_ref())?;
        self.fs.write(self.format.file_name(), bytes);
        Ok(())
    }
}

impl FractalEngine for SoftwareEngine {
    fn initialise_graphics(&mut self, canvas_size: u32) -> crate::Result<()> {
        check_size(canvas_size)?;
        self.framebuffer = Some(FrameBuffer::new(canvas_size));
        self.painted = None;
        self.revision += 1;
        info!(canvas_size, "Graphics initialised");
        Ok(())
    }

    /// A request of a different size rebinds the framebuffer at that size.
    fn render(&mut self, request: &RenderRequest) -> crate::Result<()> {
        let bound = self
            .framebuffer
            .as_ref()
            .ok_or(EngineError::NotInitialised)?
            .size;
        if bound != request.output_size {
            debug!(from = bound, to = request.output_size, "Resizing framebuffer");
        }
        let buffer = self.compute(request)?;
        self.framebuffer = Some(buffer);
        self.painted = Some(*request);
        self.revision += 1;
        Ok(())
    }

    fn generate_and_save(&mut self, request: &RenderRequest) -> crate::Result<()> {
        let buffer = self.compute(request)?;
        self.store(&buffer, Some(request))
    }

    fn save_image(&mut self) -> crate::Result<()> {
        let buffer = self.framebuffer.take().ok_or(EngineError::NotInitialised)?;
        let request = self.painted;
        let result = self.store(&buffer, request.as_ref());
        self.framebuffer = Some(buffer);
        result
    }

    fn read_file(&self, name: &str) -> crate::Result<Vec<u8>> {
        self.fs.read(name).map(<[u8]>::to_vec)
    }

    fn image_format(&self) -> ImageFormat {
        self.format
    }
}
