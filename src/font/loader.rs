//! Font file resolution and loading

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{GfxError, Result};

/// Environment variable naming a default font file
pub const FONT_ENV: &str = "GFXTEXT_FONT";

/// Well-known monospace font locations, tried in order
const CANDIDATES: &[&str] = &[
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    // macOS (development/testing)
    "/System/Library/Fonts/Monaco.ttf",
    "/Library/Fonts/Courier New.ttf",
];

/// Resolve a font identifier to a file
///
/// A non-empty `name` must be an existing path. An empty name falls back to
/// `GFXTEXT_FONT`, then to the well-known system locations.
pub fn resolve_font_path(name: &str) -> Result<PathBuf> {
    if !name.is_empty() {
        let path = Path::new(name);
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(GfxError::FontFile {
            font: name.to_string(),
            reason: "file not found".to_string(),
        });
    }

    if let Ok(env_path) = std::env::var(FONT_ENV) {
        let path = PathBuf::from(&env_path);
        if path.is_file() {
            info!("Font resolved: {} ({})", env_path, FONT_ENV);
            return Ok(path);
        }
        debug!("{} points to missing file {}", FONT_ENV, env_path);
    }

    for candidate in CANDIDATES {
        let path = Path::new(candidate);
        if path.is_file() {
            info!("Font resolved: {}", candidate);
            return Ok(path.to_path_buf());
        }
    }

    Err(GfxError::FontFile {
        font: String::new(),
        reason: format!(
            "no system font found, set {} or pass a path. Searched:\n{}",
            FONT_ENV,
            CANDIDATES.join("\n")
        ),
    })
}

/// Read a font file into memory
pub fn read_font(path: &Path) -> Result<Vec<u8>> {
    let data = std::fs::read(path).map_err(|e| GfxError::FontFile {
        font: path.display().to_string(),
        reason: e.to_string(),
    })?;
    debug!("Font loaded: {} ({} bytes)", path.display(), data.len());
    Ok(data)
}
