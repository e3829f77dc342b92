//! Font loading, glyph atlas and text layout
//!
//! Handles:
//! - TTF/OTF rasterization (fontdue) behind the `Rasterizer` trait
//! - 26.6 fixed-point metric conversion
//! - Glyph atlas texture generation
//! - Per (font, size) atlas caching
//! - Text mesh generation and string measurement

pub mod atlas;
pub mod cache;
pub mod export;
pub mod fixed;
pub mod layout;
pub mod loader;
pub mod rasterizer;

#[cfg(test)]
pub(crate) mod testing;

pub use atlas::{FaceMetrics, FontAtlas, GlyphMetrics, FIRST_CHAR, GLYPH_COUNT, LAST_CHAR};
pub use cache::{FontCache, FontKey};
pub use export::write_atlas_png;
pub use fixed::Fixed26_6;
pub use layout::{Align, HAlign, Point, TextMesh, TextVertex, VAlign};
pub use rasterizer::{FaceMetricsFixed, FontdueRasterizer, PreciseBounds, RasterGlyph, Rasterizer};
