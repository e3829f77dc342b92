//! Glyph atlas
//!
//! Rasterizes the printable ASCII range of a font and stacks the bitmaps
//! vertically into one single-channel texture. Each glyph keeps the row it
//! starts at plus its layout metrics.

use log::{debug, info, warn};

use super::fixed::{ceil_extent, round_extent};
use super::rasterizer::{FaceMetricsFixed, Rasterizer};
use crate::error::{GfxError, Result};
use crate::gpu::{FilterMode, GraphicsDevice, PixelFormat, TextureDesc, TextureHandle};

/// First character in the atlas
pub const FIRST_CHAR: char = ' ';
/// Last character in the atlas
pub const LAST_CHAR: char = '~';
/// Number of glyphs in the atlas
pub const GLYPH_COUNT: usize = (LAST_CHAR as usize) - (FIRST_CHAR as usize) + 1;

/// Characters covered by the atlas, in atlas order
pub fn supported_chars() -> impl Iterator<Item = char> {
    FIRST_CHAR..=LAST_CHAR
}

/// Atlas slot for `ch`, or `None` when outside the range
pub fn glyph_index(ch: char) -> Option<usize> {
    if (FIRST_CHAR..=LAST_CHAR).contains(&ch) {
        Some(ch as usize - FIRST_CHAR as usize)
    } else {
        None
    }
}

/// Layout metrics for one glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    /// First texel row of the bitmap in the atlas
    pub row: u32,
    /// Bitmap width (pixels)
    pub width: u32,
    /// Bitmap height (pixels)
    pub height: u32,
    /// Pen origin to left ink edge
    pub bearing_x: f32,
    /// Baseline to the ink edge the quad hangs from (y-down)
    pub bearing_y: f32,
    /// Pen advance after this glyph
    pub advance: f32,
}

/// Face-wide metrics
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaceMetrics {
    pub line_height: f32,
    pub ascent: f32,
    /// Positive distance below the baseline
    pub descent: f32,
    pub x_height: f32,
    pub cap_height: f32,
    /// (run, rise)
    pub caret_slope: (i32, i32),
}

impl From<FaceMetricsFixed> for FaceMetrics {
    fn from(m: FaceMetricsFixed) -> Self {
        Self {
            line_height: m.height.to_f32(),
            ascent: m.ascent.to_f32(),
            descent: m.descent.to_f32(),
            x_height: m.x_height.to_f32(),
            cap_height: m.cap_height.to_f32(),
            caret_slope: m.caret_slope,
        }
    }
}

/// Packed glyph texture plus per-glyph metrics
///
/// Immutable once built. The texture belongs to whoever built the atlas
/// (normally the font cache) until [`FontAtlas::destroy`] is called.
#[derive(Debug)]
pub struct FontAtlas {
    texture: TextureHandle,
    width: u32,
    height: u32,
    glyphs: Vec<GlyphMetrics>,
    metrics: FaceMetrics,
}

impl FontAtlas {
    /// Rasterize every supported character and upload the atlas texture
    ///
    /// Fails with [`GfxError::GlyphMissing`] on the first character the
    /// rasterizer cannot produce; no texture is left behind on failure.
    pub fn build<D, R>(device: &D, rasterizer: &R) -> Result<Self>
    where
        D: GraphicsDevice + ?Sized,
        R: Rasterizer + ?Sized,
    {
        let mut rasterized = Vec::with_capacity(GLYPH_COUNT);
        for ch in supported_chars() {
            let glyph = rasterizer.rasterize(ch).ok_or(GfxError::GlyphMissing(ch))?;
            let needed = glyph.width as usize * glyph.height as usize;
            if glyph.bitmap.len() < needed {
                warn!(
                    "Glyph {:?}: bitmap has {} bytes, {}x{} needs {}",
                    ch,
                    glyph.bitmap.len(),
                    glyph.width,
                    glyph.height,
                    needed
                );
                return Err(GfxError::GlyphMissing(ch));
            }
            rasterized.push(glyph);
        }

        // Common row stride: the widest glyph
        let stride = rasterized.iter().map(|g| g.width).max().unwrap_or(0).max(1);

        let mut pixels: Vec<u8> = Vec::new();
        let mut glyphs = Vec::with_capacity(GLYPH_COUNT);
        let mut row = 0u32;

        for glyph in &rasterized {
            glyphs.push(GlyphMetrics {
                row,
                width: glyph.width,
                height: glyph.height,
                bearing_x: round_extent(glyph.bounds.min_x.to_f32()),
                bearing_y: ceil_extent(glyph.bounds.max_y.to_f32()),
                advance: round_extent(glyph.advance.to_f32()),
            });

            let w = glyph.width as usize;
            for y in 0..glyph.height as usize {
                pixels.extend_from_slice(&glyph.bitmap[y * w..(y + 1) * w]);
                pixels.resize(pixels.len() + (stride as usize - w), 0);
            }
            row += glyph.height;
        }

        // A range of blank glyphs still gets a valid 1-row texture
        let height = row.max(1);
        pixels.resize((stride * height) as usize, 0);

        debug!(
            "Atlas packed: {} glyphs, {}x{} ({} bytes)",
            glyphs.len(),
            stride,
            height,
            pixels.len()
        );

        let desc = TextureDesc {
            width: stride,
            height,
            format: PixelFormat::Alpha,
            alignment: 1,
        };
        let texture = device.create_texture(&desc, Some(&pixels))?;
        // Nearest sampling: glyphs sit edge to edge with no padding
        if let Err(e) = device.set_filter_mode(texture, FilterMode::Nearest, FilterMode::Nearest) {
            device.destroy(texture);
            return Err(e);
        }

        let metrics = FaceMetrics::from(rasterizer.face_metrics());

        info!(
            "Glyph atlas generated: {}x{}, {} glyphs, line height {:.1}",
            stride,
            height,
            glyphs.len(),
            metrics.line_height
        );

        Ok(Self {
            texture,
            width: stride,
            height,
            glyphs,
            metrics,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        texture: TextureHandle,
        width: u32,
        height: u32,
        glyphs: Vec<GlyphMetrics>,
        metrics: FaceMetrics,
    ) -> Self {
        Self {
            texture,
            width,
            height,
            glyphs,
            metrics,
        }
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Texture width (row stride in texels)
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Texture height (total stacked rows)
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn metrics(&self) -> &FaceMetrics {
        &self.metrics
    }

    /// Metrics for `ch`, `None` when outside the atlas range
    pub fn glyph(&self, ch: char) -> Option<&GlyphMetrics> {
        glyph_index(ch).and_then(|i| self.glyphs.get(i))
    }

    /// All glyph metrics in atlas order
    pub fn glyphs(&self) -> &[GlyphMetrics] {
        &self.glyphs
    }

    /// Release the texture
    pub fn destroy<D: GraphicsDevice + ?Sized>(&self, device: &D) {
        device.destroy(self.texture);
    }
}
