//! Atlas debug export
//!
//! Reads the atlas texture back from the device and writes it as an opaque
//! grayscale PNG (coverage in RGB, alpha 255).

use std::path::Path;

use image::{Rgba, RgbaImage};
use log::info;

use super::atlas::FontAtlas;
use crate::error::{GfxError, Result};
use crate::gpu::GraphicsDevice;

/// Render the atlas coverage into an RGBA image
pub fn atlas_image<D: GraphicsDevice + ?Sized>(device: &D, atlas: &FontAtlas) -> Result<RgbaImage> {
    let (width, height) = (atlas.width(), atlas.height());
    let pixels = device.read_all_pixels(atlas.texture())?;
    let expected = (width * height) as usize;
    if pixels.len() < expected {
        return Err(GfxError::device(
            "read_all_pixels",
            format!("expected {} bytes, got {}", expected, pixels.len()),
        ));
    }

    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let a = pixels[(y * width + x) as usize];
        Rgba([a, a, a, 255])
    }))
}

/// Write the atlas to `path` as PNG
pub fn write_atlas_png<D: GraphicsDevice + ?Sized>(
    device: &D,
    atlas: &FontAtlas,
    path: &Path,
) -> Result<()> {
    let img = atlas_image(device, atlas)?;
    img.save_with_format(path, image::ImageFormat::Png)?;
    info!("Atlas saved: {} ({}x{})", path.display(), img.width(), img.height());
    Ok(())
}
