//! Table-driven rasterizer for unit tests

use std::collections::HashMap;

use super::atlas::supported_chars;
use super::fixed::Fixed26_6;
use super::rasterizer::{FaceMetricsFixed, PreciseBounds, RasterGlyph, Rasterizer};

/// Glyph with the given pixel size, bearings and advance, filled with 0xFF
pub(crate) fn stub_glyph(
    width: u32,
    height: u32,
    bearing_x: f32,
    bearing_y: f32,
    advance: f32,
) -> RasterGlyph {
    RasterGlyph {
        bitmap: vec![0xFF; (width * height) as usize],
        width,
        height,
        bounds: PreciseBounds {
            min_x: Fixed26_6::from_f32(bearing_x),
            min_y: Fixed26_6::from_f32(bearing_y - height as f32),
            max_x: Fixed26_6::from_f32(bearing_x + width as f32),
            max_y: Fixed26_6::from_f32(bearing_y),
        },
        advance: Fixed26_6::from_f32(advance),
    }
}

pub(crate) struct StubRasterizer {
    glyphs: HashMap<char, RasterGlyph>,
    metrics: FaceMetricsFixed,
}

impl StubRasterizer {
    fn metrics() -> FaceMetricsFixed {
        FaceMetricsFixed {
            height: Fixed26_6::from_f32(18.5),
            ascent: Fixed26_6::from_f32(12.25),
            descent: Fixed26_6::from_f32(3.75),
            x_height: Fixed26_6::from_int(7),
            cap_height: Fixed26_6::from_int(10),
            caret_slope: (0, 1),
        }
    }

    /// Every character gets a copy of `glyph`
    pub(crate) fn uniform(glyph: RasterGlyph) -> Self {
        Self {
            glyphs: supported_chars().map(|c| (c, glyph.clone())).collect(),
            metrics: Self::metrics(),
        }
    }

    /// Sizes vary per character; bitmaps are filled with the character byte.
    /// Space is blank.
    pub(crate) fn varied() -> Self {
        let glyphs = supported_chars()
            .map(|c| {
                let code = c as u32;
                let glyph = if c == ' ' {
                    stub_glyph(0, 0, 0.0, 0.0, 5.0)
                } else {
                    let mut g = stub_glyph(3 + code % 7, 2 + code % 5, 1.0, 8.0, 10.0);
                    g.bitmap.fill(c as u8);
                    g
                };
                (c, glyph)
            })
            .collect();
        Self {
            glyphs,
            metrics: Self::metrics(),
        }
    }

    pub(crate) fn with_glyph(mut self, ch: char, glyph: RasterGlyph) -> Self {
        self.glyphs.insert(ch, glyph);
        self
    }

    pub(crate) fn without(mut self, ch: char) -> Self {
        self.glyphs.remove(&ch);
        self
    }
}

impl Rasterizer for StubRasterizer {
    fn rasterize(&self, ch: char) -> Option<RasterGlyph> {
        self.glyphs.get(&ch).cloned()
    }

    fn face_metrics(&self) -> FaceMetricsFixed {
        self.metrics
    }
}
