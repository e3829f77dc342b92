//! Error types
//!
//! One error enum for the whole library. Atlas construction errors are fatal
//! to the build that raised them; nothing is retried.

use thiserror::Error;

/// Library error
#[derive(Debug, Error)]
pub enum GfxError {
    /// The rasterizer could not produce a glyph for a required character
    #[error("font does not contain glyph {0:?}")]
    GlyphMissing(char),

    /// The font file could not be read or parsed
    #[error("font file {font}: {reason}")]
    FontFile { font: String, reason: String },

    /// The graphics device rejected a creation or upload
    #[error("device rejected {op}: {reason}")]
    DeviceUpload { op: &'static str, reason: String },

    /// Character outside the atlas range was passed to layout
    #[error("character {0:?} is outside the supported glyph range")]
    UnsupportedChar(char),

    /// Layout was asked for an empty string
    #[error("text is empty")]
    EmptyText,

    /// Sub-data write past the end of a buffer store
    #[error("buffer write out of bounds: {end} > {size}")]
    BufferOutOfBounds { end: usize, size: usize },

    /// Vertex data is empty so cannot be loaded
    #[error("vertex data is empty")]
    EmptyVertexData,

    #[error("{stage} shader compile failed: {log}")]
    ShaderCompile { stage: &'static str, log: String },

    #[error("program link failed: {0}")]
    ProgramLink(String),

    /// Unknown uniform name or unsupported component count
    #[error("invalid uniform {name:?}: {reason}")]
    InvalidUniform { name: String, reason: String },

    #[error("framebuffer incomplete: status=0x{0:X}")]
    FramebufferIncomplete(u32),

    /// Atlas image export failed
    #[error("atlas export failed: {0}")]
    Export(#[from] image::ImageError),
}

impl GfxError {
    /// Shorthand for device failures
    pub(crate) fn device(op: &'static str, reason: impl Into<String>) -> Self {
        Self::DeviceUpload {
            op,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GfxError>;
