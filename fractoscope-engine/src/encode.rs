//! Image encoders for the engine's file output.
//!
//! BMP goes through `image`. PNG uses the `png` crate directly so the view
//! that produced the picture can ride along as tEXt chunks.

use std::io::Cursor;

use fractoscope_core::{EngineError, ImageFormat, RenderRequest};
use tracing::debug;

use crate::framebuffer::FrameBuffer;

/// Parameters of the view, embedded in PNG output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    pub mode: &'static str,
    pub min_re: f64,
    pub max_im: f64,
    pub view_size: f64,
    pub start_re: f64,
    pub start_im: f64,
    pub cutoff: f64,
    pub max_iterations: u32,
    pub size: u32,
}

impl From<&RenderRequest> for ImageMetadata {
    fn from(request: &RenderRequest) -> Self {
        Self {
            mode: request.params.mode.label(),
            min_re: request.viewport.min_re,
            max_im: request.viewport.max_im,
            view_size: request.viewport.view_size,
            start_re: request.params.start_re,
            start_im: request.params.start_im,
            cutoff: request.params.cutoff,
            max_iterations: request.params.max_iterations,
            size: request.output_size,
        }
    }
}

/// Encode `buffer` in `format`. PNG output carries `metadata` when given.
pub fn encode(
    buffer: &FrameBuffer,
    format: ImageFormat,
    metadata: Option<&ImageMetadata>,
) -> crate::Result<Vec<u8>> {
    match format {
        ImageFormat::Bmp => encode_bmp(buffer),
        ImageFormat::Png => encode_png(buffer, metadata),
    }
}

/// 24-bit BMP.
pub fn encode_bmp(buffer: &FrameBuffer) -> crate::Result<Vec<u8>> {
    let image = image::RgbImage::from_raw(buffer.size, buffer.size, buffer.to_rgb())
        .ok_or_else(|| EngineError::Encode("pixel buffer does not match its size".into()))?;
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Bmp)
        .map_err(|e| EngineError::Encode(e.to_string()))?;
    let bytes = bytes.into_inner();
    debug!(size = buffer.size, bytes = bytes.len(), "Encoded BMP");
    Ok(bytes)
}

/// RGBA PNG with optional view metadata.
pub fn encode_png(buffer: &FrameBuffer, metadata: Option<&ImageMetadata>) -> crate::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, buffer.size, buffer.size);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Default);

        encoder
            .add_text_chunk("Software".to_string(), "Fractoscope".to_string())
            .map_err(encode_err)?;
        if let Some(meta) = metadata {
            encoder
                .add_text_chunk("Description".to_string(), describe(meta))
                .map_err(encode_err)?;
            for (key, value) in metadata_pairs(meta) {
                encoder.add_text_chunk(key, value).map_err(encode_err)?;
            }
        }

        let mut writer = encoder.write_header().map_err(encode_err)?;
        writer.write_image_data(&buffer.pixels).map_err(encode_err)?;
        writer.finish().map_err(encode_err)?;
    }
    debug!(size = buffer.size, bytes = bytes.len(), "Encoded PNG");
    Ok(bytes)
}

fn encode_err(e: png::EncodingError) -> EngineError {
    EngineError::Encode(e.to_string())
}

fn describe(meta: &ImageMetadata) -> String {
    format!(
        "{} - Corner: {} {}i, Size: {}, Iterations: {}",
        meta.mode, meta.min_re, meta.max_im, meta.view_size, meta.max_iterations,
    )
}

fn metadata_pairs(meta: &ImageMetadata) -> Vec<(String, String)> {
    vec![
        ("Fractoscope.Mode".into(), meta.mode.to_string()),
        ("Fractoscope.MinRe".into(), meta.min_re.to_string()),
        ("Fractoscope.MaxIm".into(), meta.max_im.to_string()),
        ("Fractoscope.ViewSize".into(), meta.view_size.to_string()),
        ("Fractoscope.StartRe".into(), meta.start_re.to_string()),
        ("Fractoscope.StartIm".into(), meta.start_im.to_string()),
        ("Fractoscope.Cutoff".into(), meta.cutoff.to_string()),
        ("Fractoscope.MaxIterations".into(), meta.max_iterations.to_string()),
        ("Fractoscope.Resolution".into(), format!("{0}x{0}", meta.size)),
    ]
}
