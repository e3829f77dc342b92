//! Text layout
//!
//! Turns a string into textured quads using an atlas's glyph metrics, and
//! measures strings without building geometry. Both share the same width
//! computation, including the trailing-ink correction for the last glyph.

use bytemuck::{Pod, Zeroable};

use super::atlas::{FontAtlas, GlyphMetrics};
use super::fixed::ceil_extent;
use crate::error::{GfxError, Result};

/// 2 triangles per glyph
pub const VERTICES_PER_GLYPH: usize = 6;
/// x, y, s, t
pub const FLOATS_PER_VERTEX: usize = 4;

/// Horizontal alignment relative to the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HAlign {
    /// Left edge on the anchor
    Left = -1,
    /// Left and right edges equidistant from the anchor
    #[default]
    Center = 0,
    /// Right edge on the anchor
    Right = 1,
}

/// Vertical alignment relative to the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VAlign {
    /// Top side on the anchor
    Above = -1,
    /// Centered on the x-height
    #[default]
    Middle = 0,
    /// Bottom side on the anchor
    Below = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Align {
    pub v: VAlign,
    pub h: HAlign,
}

impl Align {
    pub const fn new(h: HAlign, v: VAlign) -> Self {
        Self { v, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Screen position plus atlas texel coordinate
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct TextVertex {
    pub x: f32,
    pub y: f32,
    pub s: f32,
    pub t: f32,
}

impl TextVertex {
    fn new(pos: Point, tex: Point) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            s: tex.x,
            t: tex.y,
        }
    }
}

/// Triangle-list geometry for a string, six vertices per character
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMesh {
    vertices: Vec<TextVertex>,
}

impl TextMesh {
    pub fn vertices(&self) -> &[TextVertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn glyph_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_GLYPH
    }

    /// Flat (x, y, s, t) floats for buffer upload
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// (min x, max x) over all vertices
    pub fn x_extent(&self) -> Option<(f32, f32)> {
        self.vertices.iter().fold(None, |acc, v| match acc {
            None => Some((v.x, v.x)),
            Some((lo, hi)) => Some((lo.min(v.x), hi.max(v.x))),
        })
    }
}

/// Sum of advances, widened when the last glyph's ink runs past its advance
fn string_width(glyphs: &[&GlyphMetrics]) -> f32 {
    let mut width: f32 = glyphs.iter().map(|g| g.advance).sum();
    if let Some(last) = glyphs.last() {
        let ink = last.bearing_x + last.width as f32;
        if ink > last.advance {
            width += ink - last.advance;
        }
    }
    width
}

impl FontAtlas {
    /// Resolve every character of a non-empty string
    fn lookup(&self, text: &str) -> Result<Vec<&GlyphMetrics>> {
        if text.is_empty() {
            return Err(GfxError::EmptyText);
        }
        text.chars()
            .map(|c| self.glyph(c).ok_or(GfxError::UnsupportedChar(c)))
            .collect()
    }

    /// Build quads for `text` positioned at `anchor` under `align`
    ///
    /// Positions use bottom-left as the local zero; texture coordinates are
    /// atlas texels with (0, 0) at the glyph's top-left. Any final axis flip
    /// or normalization is left to the shader.
    pub fn map_string(&self, text: &str, anchor: Point, align: Align) -> Result<TextMesh> {
        let glyphs = self.lookup(text)?;

        let half = string_width(&glyphs) / 2.0;
        let off_x = -half - (align.h as i32 as f32) * half;
        let metrics = self.metrics();
        let off_y = match align.v {
            VAlign::Below => -ceil_extent(metrics.ascent),
            VAlign::Middle => -metrics.x_height / 2.0,
            VAlign::Above => ceil_extent(metrics.descent),
        };

        let mut origin = Point::new(anchor.x + off_x, anchor.y + off_y);
        let mut vertices = Vec::with_capacity(glyphs.len() * VERTICES_PER_GLYPH);

        for g in glyphs {
            let (w, h) = (g.width as f32, g.height as f32);

            let pos_tl = Point::new(origin.x + g.bearing_x, origin.y + (h - g.bearing_y));
            let pos_tr = Point::new(pos_tl.x + w, pos_tl.y);
            let pos_bl = Point::new(pos_tl.x, origin.y - g.bearing_y);
            let pos_br = Point::new(pos_tr.x, pos_bl.y);

            let tex_tl = Point::new(0.0, g.row as f32);
            let tex_tr = Point::new(w, tex_tl.y);
            let tex_bl = Point::new(tex_tl.x, tex_tl.y + h);
            let tex_br = Point::new(tex_tr.x, tex_bl.y);

            vertices.extend_from_slice(&[
                TextVertex::new(pos_bl, tex_bl),
                TextVertex::new(pos_tl, tex_tl),
                TextVertex::new(pos_tr, tex_tr),
                TextVertex::new(pos_bl, tex_bl),
                TextVertex::new(pos_tr, tex_tr),
                TextVertex::new(pos_br, tex_br),
            ]);

            origin.x += g.advance;
        }

        Ok(TextMesh { vertices })
    }

    /// (width, height) of single-line `text`
    ///
    /// Height is always the face's line height.
    pub fn measure(&self, text: &str) -> Result<(f32, f32)> {
        let glyphs = self.lookup(text)?;
        Ok((string_width(&glyphs), self.metrics().line_height))
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::font::atlas::{glyph_index, FaceMetrics, GLYPH_COUNT};
    use crate::gpu::TextureHandle;

    fn glyph(
        row: u32,
        width: u32,
        height: u32,
        bearing_x: f32,
        bearing_y: f32,
        advance: f32,
    ) -> GlyphMetrics {
        GlyphMetrics {
            row,
            width,
            height,
            bearing_x,
            bearing_y,
            advance,
        }
    }

    fn atlas_with(entries: &[(char, GlyphMetrics)]) -> FontAtlas {
        let mut glyphs = vec![glyph(0, 0, 0, 0.0, 0.0, 0.0); GLYPH_COUNT];
        for (c, g) in entries {
            glyphs[glyph_index(*c).unwrap()] = *g;
        }
        let metrics = FaceMetrics {
            line_height: 18.5,
            ascent: 12.25,
            descent: 3.75,
            x_height: 7.0,
            cap_height: 10.0,
            caret_slope: (0, 1),
        };
        let texture = TextureHandle(NonZeroU32::new(1).unwrap());
        FontAtlas::from_parts(texture, 8, 64, glyphs, metrics)
    }

    fn scenario_atlas() -> FontAtlas {
        atlas_with(&[
            ('A', glyph(0, 6, 8, 1.0, 8.0, 10.0)),
            ('a', glyph(8, 6, 6, 1.0, 6.0, 10.0)),
            ('f', glyph(14, 8, 9, 2.0, 9.0, 7.0)),
            ('m', glyph(23, 10, 6, 0.0, 6.0, 10.0)),
        ])
    }

    #[test]
    fn test_single_char_scenario() {
        let atlas = scenario_atlas();
        let mesh = atlas
            .map_string("A", Point::new(0.0, 0.0), Align::new(HAlign::Center, VAlign::Below))
            .unwrap();
        let v = mesh.vertices();
        assert_eq!(v.len(), 6);

        // BL, TL, TR, BL, TR, BR
        let (bl, tl, tr, br) = (v[0], v[1], v[2], v[5]);
        assert!((bl.x + 4.0).abs() < 1e-6);
        assert!((tr.x - 2.0).abs() < 1e-6);
        assert_eq!(tl.t, 0.0);
        assert_eq!(bl.t, 8.0);
        assert_eq!((tl.s, tr.s), (0.0, 6.0));

        // below: origin.y = -ceil(12.25) = -13
        assert!((bl.y + 21.0).abs() < 1e-6);
        assert!((tl.y + 13.0).abs() < 1e-6);
        assert_eq!(br.y, bl.y);
        assert_eq!(v[3], bl);
        assert_eq!(v[4], tr);
    }

    #[test]
    fn test_mesh_size_law() {
        let atlas = scenario_atlas();
        for text in ["A", "aa", "Aafm", "mmmmmmmmmm"] {
            let mesh = atlas.map_string(text, Point::default(), Align::default()).unwrap();
            assert_eq!(mesh.len(), VERTICES_PER_GLYPH * text.len());
            assert_eq!(mesh.glyph_count(), text.len());
            assert_eq!(mesh.as_floats().len(), VERTICES_PER_GLYPH * FLOATS_PER_VERTEX * text.len());
            assert_eq!(mesh.as_bytes().len(), mesh.as_floats().len() * 4);
        }
    }

    #[test]
    fn test_width_is_sum_of_advances() {
        let atlas = scenario_atlas();
        for n in 1..8 {
            let text = "a".repeat(n);
            let (w, h) = atlas.measure(&text).unwrap();
            assert_eq!(w, 10.0 * n as f32);
            assert_eq!(h, 18.5);
        }
    }

    #[test]
    fn test_last_glyph_overflow() {
        let atlas = scenario_atlas();
        // 'f': 2 + 8 = 10 > 7, excess 3
        let (w, _) = atlas.measure("aaf").unwrap();
        assert_eq!(w, 10.0 + 10.0 + 7.0 + 3.0);
        // Only the last glyph counts
        let (w, _) = atlas.measure("fa").unwrap();
        assert_eq!(w, 17.0);
    }

    #[test]
    fn test_center_alignment_is_symmetric() {
        let atlas = scenario_atlas();
        for anchor_x in [-33.0, 0.0, 12.5, 400.0] {
            let anchor = Point::new(anchor_x, 5.0);
            let mesh = atlas
                .map_string("mmm", anchor, Align::new(HAlign::Center, VAlign::Middle))
                .unwrap();
            let (lo, hi) = mesh.x_extent().unwrap();
            assert!((lo + hi - 2.0 * anchor_x).abs() < 1e-4);
        }
    }

    #[test]
    fn test_horizontal_alignment() {
        let atlas = scenario_atlas();
        let anchor = Point::new(100.0, 0.0);

        let left = atlas
            .map_string("mm", anchor, Align::new(HAlign::Left, VAlign::Middle))
            .unwrap();
        assert_eq!(left.x_extent().unwrap(), (100.0, 120.0));

        let right = atlas
            .map_string("mm", anchor, Align::new(HAlign::Right, VAlign::Middle))
            .unwrap();
        assert_eq!(right.x_extent().unwrap(), (80.0, 100.0));
    }

    #[test]
    fn test_vertical_alignment() {
        let atlas = scenario_atlas();
        let anchor = Point::new(0.0, 50.0);
        // 'm': bearing_y 6 so BL.y = origin.y - 6
        let bottom = |v: VAlign| {
            atlas
                .map_string("m", anchor, Align::new(HAlign::Left, v))
                .unwrap()
                .vertices()[0]
                .y
        };
        assert_eq!(bottom(VAlign::Below), 50.0 - 13.0 - 6.0);
        assert_eq!(bottom(VAlign::Middle), 50.0 - 3.5 - 6.0);
        assert_eq!(bottom(VAlign::Above), 50.0 + 4.0 - 6.0);
    }

    #[test]
    fn test_pen_advances_between_glyphs() {
        let atlas = scenario_atlas();
        let mesh = atlas
            .map_string("fA", Point::default(), Align::new(HAlign::Left, VAlign::Middle))
            .unwrap();
        let v = mesh.vertices();
        // 'f' left = 0 + 2, 'A' left = 7 + 1
        assert_eq!(v[0].x, 2.0);
        assert_eq!(v[6].x, 8.0);
        // texture rows follow each glyph's row
        assert_eq!(v[1].t, 14.0);
        assert_eq!(v[7].t, 0.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        let atlas = scenario_atlas();
        let align = Align::default();
        assert!(matches!(
            atlas.map_string("", Point::default(), align),
            Err(GfxError::EmptyText)
        ));
        assert!(matches!(atlas.measure(""), Err(GfxError::EmptyText)));
        assert!(matches!(
            atlas.map_string("caf\u{e9}", Point::default(), align),
            Err(GfxError::UnsupportedChar('\u{e9}'))
        ));
        assert!(matches!(
            atlas.measure("a\nb"),
            Err(GfxError::UnsupportedChar('\n'))
        ));
    }
}
