//! Glyph rasterizer
//!
//! The atlas builder only sees the [`Rasterizer`] trait. The fontdue-backed
//! implementation converts fontdue's float metrics into 26.6 fixed point and
//! y-down precise bounds, which is what the builder consumes.

use fontdue::{Font, FontSettings};
use log::debug;

use super::fixed::Fixed26_6;
use crate::error::{GfxError, Result};

/// Sub-pixel ink bounds of a glyph, relative to the pen origin
///
/// Y axis points down: `min_y` is the top of the ink (negative above the
/// baseline), `max_y` the bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreciseBounds {
    pub min_x: Fixed26_6,
    pub min_y: Fixed26_6,
    pub max_x: Fixed26_6,
    pub max_y: Fixed26_6,
}

/// One rasterized glyph
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGlyph {
    /// Coverage mask, row-major, `width` bytes per row
    pub bitmap: Vec<u8>,
    /// Bitmap width (pixels)
    pub width: u32,
    /// Bitmap height (pixels)
    pub height: u32,
    pub bounds: PreciseBounds,
    /// Pen advance
    pub advance: Fixed26_6,
}

/// Face-wide metrics as reported by the rasterizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceMetricsFixed {
    /// Baseline-to-baseline distance
    pub height: Fixed26_6,
    pub ascent: Fixed26_6,
    /// Positive distance below the baseline
    pub descent: Fixed26_6,
    pub x_height: Fixed26_6,
    pub cap_height: Fixed26_6,
    /// Caret slope as (run, rise)
    pub caret_slope: (i32, i32),
}

/// Glyph source for one font at one size
pub trait Rasterizer {
    /// Rasterize `ch` at the pen origin
    ///
    /// Returns `None` when the font has no mask or no bounds for `ch`.
    fn rasterize(&self, ch: char) -> Option<RasterGlyph>;

    /// Face-wide metrics at this rasterizer's size
    fn face_metrics(&self) -> FaceMetricsFixed;
}

/// fontdue-backed rasterizer
pub struct FontdueRasterizer {
    font: Font,
    size: f32,
    metrics: FaceMetricsFixed,
}

impl FontdueRasterizer {
    /// Parse `font_data` and prepare rasterization at `size` pixels
    ///
    /// `label` names the font in errors.
    pub fn new(label: &str, font_data: &[u8], size: f32) -> Result<Self> {
        let settings = FontSettings {
            scale: size,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(font_data, settings).map_err(|e| GfxError::FontFile {
            font: label.to_string(),
            reason: e.to_string(),
        })?;

        let line = font
            .horizontal_line_metrics(size)
            .ok_or_else(|| GfxError::FontFile {
                font: label.to_string(),
                reason: "no horizontal line metrics".to_string(),
            })?;

        let x_height = Self::ink_top(&font, 'x', size);
        let cap_height = Self::ink_top(&font, 'H', size);

        let metrics = FaceMetricsFixed {
            height: Fixed26_6::from_f32(line.new_line_size),
            ascent: Fixed26_6::from_f32(line.ascent),
            // fontdue descent is negative (y-up)
            descent: Fixed26_6::from_f32(-line.descent),
            x_height: Fixed26_6::from_f32(x_height),
            cap_height: Fixed26_6::from_f32(cap_height),
            // fontdue exposes no post/hhea caret data; treat faces as upright
            caret_slope: (0, 1),
        };

        debug!(
            "{}: size={} ascent={:.2} descent={:.2} x_height={:.2}",
            label, size, line.ascent, -line.descent, x_height
        );

        Ok(Self {
            font,
            size,
            metrics,
        })
    }

    /// Height of the ink top above the baseline, 0 when the glyph is absent
    fn ink_top(font: &Font, ch: char, size: f32) -> f32 {
        if font.lookup_glyph_index(ch) == 0 {
            return 0.0;
        }
        let b = font.metrics(ch, size).bounds;
        b.ymin + b.height
    }

    pub fn size(&self) -> f32 {
        self.size
    }
}

impl Rasterizer for FontdueRasterizer {
    fn rasterize(&self, ch: char) -> Option<RasterGlyph> {
        // Index 0 is .notdef
        if self.font.lookup_glyph_index(ch) == 0 {
            return None;
        }

        let (m, bitmap) = self.font.rasterize(ch, self.size);
        let b = m.bounds;

        Some(RasterGlyph {
            bitmap,
            width: m.width as u32,
            height: m.height as u32,
            bounds: PreciseBounds {
                min_x: Fixed26_6::from_f32(b.xmin),
                min_y: Fixed26_6::from_f32(-(b.ymin + b.height)),
                max_x: Fixed26_6::from_f32(b.xmin + b.width),
                max_y: Fixed26_6::from_f32(-b.ymin),
            },
            advance: Fixed26_6::from_f32(m.advance_width),
        })
    }

    fn face_metrics(&self) -> FaceMetricsFixed {
        self.metrics
    }
}
