//! End-to-end atlas pipeline on the in-memory device
//!
//! Cache → atlas build → layout → PNG export, with a monospace stub font.

use std::sync::Arc;

use gfxtext::font::{
    Align, FaceMetricsFixed, Fixed26_6, FontCache, HAlign, Point, PreciseBounds, RasterGlyph,
    Rasterizer, VAlign, GLYPH_COUNT,
};
use gfxtext::gpu::{GraphicsDevice, MemoryDevice};
use gfxtext::GfxError;

/// Every printable glyph is a 6x9 block, 1px left bearing, 8px advance
struct MonoFont {
    missing: Option<char>,
}

impl Rasterizer for MonoFont {
    fn rasterize(&self, ch: char) -> Option<RasterGlyph> {
        if Some(ch) == self.missing {
            return None;
        }
        let (w, h) = if ch == ' ' { (0, 0) } else { (6, 9) };
        Some(RasterGlyph {
            bitmap: vec![0x80; w * h],
            width: w as u32,
            height: h as u32,
            bounds: PreciseBounds {
                min_x: Fixed26_6::from_int(1),
                min_y: Fixed26_6::from_int(-7),
                max_x: Fixed26_6::from_int(7),
                max_y: Fixed26_6::from_int(2),
            },
            advance: Fixed26_6::from_int(8),
        })
    }

    fn face_metrics(&self) -> FaceMetricsFixed {
        FaceMetricsFixed {
            height: Fixed26_6::from_int(12),
            ascent: Fixed26_6::from_int(9),
            descent: Fixed26_6::from_int(3),
            x_height: Fixed26_6::from_int(5),
            cap_height: Fixed26_6::from_int(7),
            caret_slope: (0, 1),
        }
    }
}

fn mono() -> std::result::Result<MonoFont, GfxError> {
    Ok(MonoFont { missing: None })
}

#[test]
fn test_cache_builds_once_per_key() {
    let dev = MemoryDevice::new();
    let cache = FontCache::new();

    let a = cache.get_or_build_with(&dev, "mono", 16, mono).unwrap();
    let b = cache.get_or_build_with(&dev, "mono", 16, mono).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.build_count(), 1);
    assert_eq!(dev.created_count(), 1);

    let c = cache.get_or_build_with(&dev, "mono", 24, mono).unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_missing_glyph_leaves_cache_empty() {
    let dev = MemoryDevice::new();
    let cache = FontCache::new();

    let err = cache
        .get_or_build_with(&dev, "broken", 16, || Ok(MonoFont { missing: Some('q') }))
        .unwrap_err();
    assert!(matches!(err, GfxError::GlyphMissing('q')));
    assert!(cache.get("broken", 16).is_none());
    assert!(cache.is_empty());
    assert_eq!(dev.live_count(), 0);

    // A later successful build for the same key goes through
    cache.get_or_build_with(&dev, "broken", 16, mono).unwrap();
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_atlas_layout_and_texture() {
    let dev = MemoryDevice::new();
    let cache = FontCache::new();
    let atlas = cache.get_or_build_with(&dev, "mono", 16, mono).unwrap();

    // 94 inked glyphs of 9 rows each, blank space contributes none
    assert_eq!(atlas.width(), 6);
    assert_eq!(atlas.height(), 9 * (GLYPH_COUNT as u32 - 1));

    let pixels = dev.read_all_pixels(atlas.texture()).unwrap();
    assert_eq!(pixels.len(), (atlas.width() * atlas.height()) as usize);
    assert!(pixels.iter().all(|&p| p == 0x80));

    let g = atlas.glyph('!').unwrap();
    assert_eq!((g.row, g.width, g.height), (0, 6, 9));
    assert!((g.bearing_x - 1.0).abs() < 1e-6);
    assert!((g.bearing_y - 2.0).abs() < 1e-6);
    assert!((g.advance - 8.0).abs() < 1e-6);
}

#[test]
fn test_measure_and_mesh() {
    let dev = MemoryDevice::new();
    let cache = FontCache::new();
    let atlas = cache.get_or_build_with(&dev, "mono", 16, mono).unwrap();

    let (w1, h) = atlas.measure("Hi").unwrap();
    let (w2, _) = atlas.measure("Hi!").unwrap();
    assert!(w2 > w1);
    assert!((h - 12.0).abs() < 1e-6);

    let mesh = atlas
        .map_string("Hello", Point::new(10.0, 20.0), Align::new(HAlign::Left, VAlign::Below))
        .unwrap();
    assert_eq!(mesh.glyph_count(), 5);
    assert_eq!(mesh.len(), 30);
    assert_eq!(mesh.as_floats().len(), 30 * 4);

    let (min_x, _) = mesh.x_extent().unwrap();
    assert!(min_x >= 10.0);

    assert!(matches!(
        atlas.measure("\u{263A}"),
        Err(GfxError::UnsupportedChar('\u{263A}'))
    ));
}

#[test]
fn test_evict_and_rebuild() {
    let dev = MemoryDevice::new();
    let cache = FontCache::new();
    let first = cache.get_or_build_with(&dev, "mono", 16, mono).unwrap();

    let evicted = cache.evict("mono", 16).unwrap();
    assert!(Arc::ptr_eq(&first, &evicted));
    evicted.destroy(&dev);
    assert_eq!(dev.live_count(), 0);

    let again = cache.get_or_build_with(&dev, "mono", 16, mono).unwrap();
    assert!(!Arc::ptr_eq(&first, &again));
    assert_eq!(cache.build_count(), 2);
}

#[test]
fn test_export_png() {
    let dev = MemoryDevice::new();
    let cache = FontCache::new();
    let atlas = cache.get_or_build_with(&dev, "mono", 16, mono).unwrap();

    let path = std::env::temp_dir().join(format!("gfxtext-pipeline-{}.png", std::process::id()));
    gfxtext::font::write_atlas_png(&dev, &atlas, &path).unwrap();
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (atlas.width(), atlas.height()));
    assert_eq!(img.get_pixel(0, 0).0, [0x80, 0x80, 0x80, 255]);
    std::fs::remove_file(&path).unwrap();
}
