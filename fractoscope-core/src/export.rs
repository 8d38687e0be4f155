//! One-shot image exports through the engine's virtual filesystem.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{FractalEngine, RenderRequest};
use crate::error::CoreError;
use crate::params::GenerationParams;
use crate::viewport::Viewport;

/// Encoding an engine writes its image file in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    #[default]
    Bmp,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Bmp => "bmp",
            Self::Png => "png",
        }
    }

    /// Name of the file inside the engine's filesystem.
    pub fn file_name(self) -> String {
        format!("image.{}", self.extension())
    }

    /// Name offered to the user for the download.
    pub fn download_name(self) -> String {
        format!("fractal.{}", self.extension())
    }
}

/// An encoded image ready to be handed to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub file_name: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Output side length for a high-resolution export.
pub fn high_res_output_size(canvas_size: u32, scale: f64) -> crate::Result<u32> {
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(CoreError::InvalidExportScale(scale));
    }
    let size = (canvas_size as f64 * scale).round();
    if size < 1.0 || size > u32::MAX as f64 {
        return Err(CoreError::InvalidExportScale(scale));
    }
    Ok(size as u32)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Issues exports, never more than one at a time.
///
/// Exports ignore the render scheduler's in-flight flag. Clones share the
/// same guard, so a clone can be moved to a worker thread.
#[derive(Debug, Clone, Default)]
pub struct ExportPipeline {
    busy: Arc<AtomicBool>,
}

impl ExportPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Claim the pipeline. The claim is released when the reservation drops.
    pub fn reserve(&self) -> crate::Result<ExportReservation> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| CoreError::ExportInProgress)?;
        Ok(ExportReservation {
            busy: Arc::clone(&self.busy),
        })
    }

    /// Encode whatever the engine last rendered.
    pub fn export_current_view<E: FractalEngine + ?Sized>(
        &self,
        engine: &mut E,
    ) -> crate::Result<ExportedImage> {
        self.reserve()?.export_current_view(engine)
    }

    /// Generate the view at `canvas_size * scale` pixels and encode it.
    pub fn export_high_res<E: FractalEngine + ?Sized>(
        &self,
        engine: &mut E,
        viewport: &Viewport,
        params: &GenerationParams,
        canvas_size: u32,
        scale: f64,
    ) -> crate::Result<ExportedImage> {
        self.reserve()?
            .export_high_res(engine, viewport, params, canvas_size, scale)
    }
}

/// Exclusive right to run one export.
#[derive(Debug)]
pub struct ExportReservation {
    busy: Arc<AtomicBool>,
}

impl ExportReservation {
    pub fn export_current_view<E: FractalEngine + ?Sized>(
        &self,
        engine: &mut E,
    ) -> crate::Result<ExportedImage> {
        engine.save_image()?;
        let image = read_image(engine)?;
        info!(bytes = image.bytes.len(), "Exported current view");
        Ok(image)
    }

    pub fn export_high_res<E: FractalEngine + ?Sized>(
        &self,
        engine: &mut E,
        viewport: &Viewport,
        params: &GenerationParams,
        canvas_size: u32,
        scale: f64,
    ) -> crate::Result<ExportedImage> {
        let output_size = high_res_output_size(canvas_size, scale)?;
        debug!(output_size, scale, "Generating high-resolution export");
        engine.generate_and_save(&RenderRequest {
            viewport: *viewport,
            params: *params,
            output_size,
        })?;
        let image = read_image(engine)?;
        info!(
            output_size,
            bytes = image.bytes.len(),
            "Exported high-resolution view"
        );
        Ok(image)
    }
}

impl Drop for ExportReservation {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

fn read_image<E: FractalEngine + ?Sized>(engine: &E) -> crate::Result<ExportedImage> {
    let format = engine.image_format();
    let bytes = engine.read_file(&format.file_name())?;
    Ok(ExportedImage {
        file_name: format.download_name(),
        format,
        bytes,
    })
}
