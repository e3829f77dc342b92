//! gfxtext - build a glyph atlas and inspect text layout from the console
//!
//! Builds the atlas on the in-memory device through the font cache, writes
//! it as PNG and reports sample text metrics.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use log::info;

use gfxtext::config::Config;
use gfxtext::font::{write_atlas_png, Align, FontCache, Point};
use gfxtext::gpu::MemoryDevice;

/// Minimum font size (pixels)
const MIN_FONT_SIZE: u32 = 4;

/// Maximum font size (pixels)
const MAX_FONT_SIZE: u32 = 512;

/// Command line overrides on top of the config file
#[derive(Debug, Default, PartialEq)]
struct Options {
    help: bool,
    version: bool,
    font: Option<String>,
    size: Option<u32>,
    out: Option<PathBuf>,
    text: Option<String>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Options> {
    let mut opts = Options::default();
    let mut it = args.into_iter();

    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().ok_or_else(|| anyhow!("{} requires a value", flag));
        match arg.as_str() {
            "-h" | "--help" => opts.help = true,
            "-V" | "--version" => opts.version = true,
            "--font" => opts.font = Some(value("--font")?),
            "--size" => {
                let raw = value("--size")?;
                let size: u32 = raw
                    .parse()
                    .with_context(|| format!("invalid --size: {}", raw))?;
                opts.size = Some(size);
            }
            "--out" => opts.out = Some(PathBuf::from(value("--out")?)),
            "--text" => opts.text = Some(value("--text")?),
            other => return Err(anyhow!("unknown argument: {} (see --help)", other)),
        }
    }
    Ok(opts)
}

/// Print help message
fn print_help() {
    println!(
        r#"gfxtext {} - glyph atlas builder and text layout inspector

USAGE:
    gfxtext [OPTIONS]

OPTIONS:
    --font PATH     Font file (default: config, $GFXTEXT_FONT, system fonts)
    --size N        Pixel size (default: config, 16)
    --out FILE      Atlas PNG output (default: config, atlas.png)
    --text STR      Sample text to measure and mesh
    -h, --help      Print this help message
    -V, --version   Print version information

ENVIRONMENT:
    GFXTEXT_CONFIG  Config file path (default: ~/.config/gfxtext/config.toml)
    GFXTEXT_FONT    Default font file
    RUST_LOG        Log filter (default: warn)"#,
        env!("CARGO_PKG_VERSION")
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let opts = parse_args(std::env::args().skip(1))?;

    if opts.help {
        print_help();
        return Ok(());
    }

    if opts.version {
        println!("gfxtext {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load();
    let font = opts.font.unwrap_or(config.font.path);
    let size = opts
        .size
        .unwrap_or(config.font.size)
        .clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    let out = opts.out.unwrap_or(config.export.atlas_png);
    let text = opts.text.unwrap_or(config.text.sample);

    info!("gfxtext starting: font={:?} size={}", font, size);

    let device = MemoryDevice::new();
    let cache = FontCache::new();
    let atlas = cache
        .get_or_build(&device, &font, size)
        .context("Failed to build glyph atlas")?;

    write_atlas_png(&device, &atlas, &out)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    let m = atlas.metrics();
    println!(
        "atlas:    {}x{} ({} glyphs)",
        atlas.width(),
        atlas.height(),
        atlas.glyphs().len()
    );
    println!(
        "metrics:  line height {:.2}, ascent {:.2}, descent {:.2}",
        m.line_height, m.ascent, m.descent
    );
    println!(
        "          x-height {:.2}, cap height {:.2}",
        m.x_height, m.cap_height
    );
    println!("written:  {}", out.display());

    if text.is_empty() {
        return Ok(());
    }

    let (w, h) = atlas.measure(&text).context("Failed to measure sample text")?;
    let mesh = atlas
        .map_string(&text, Point::default(), Align::default())
        .context("Failed to build text mesh")?;
    println!("text:     {:?}", text);
    println!("measure:  {:.2} x {:.2}", w, h);
    println!("mesh:     {} vertices ({} glyphs)", mesh.len(), mesh.glyph_count());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_all_flags() {
        let opts = parse_args(args(&[
            "--font", "/tmp/a.ttf", "--size", "24", "--out", "x.png", "--text", "Hi",
        ]))
        .unwrap();
        assert_eq!(opts.font.as_deref(), Some("/tmp/a.ttf"));
        assert_eq!(opts.size, Some(24));
        assert_eq!(opts.out, Some(PathBuf::from("x.png")));
        assert_eq!(opts.text.as_deref(), Some("Hi"));
        assert!(!opts.help);
    }

    #[test]
    fn test_parse_help_version() {
        assert!(parse_args(args(&["-h"])).unwrap().help);
        assert!(parse_args(args(&["--version"])).unwrap().version);
        assert_eq!(parse_args(args(&[])).unwrap(), Options::default());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(args(&["--size"])).is_err());
        assert!(parse_args(args(&["--size", "big"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }
}
