//! gfxtext - bitmap font atlas and text meshes for OpenGL ES
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │     Font file  →  Rasterizer (fontdue)   │
//! │                        ↓                 │
//! │  FontCache  →  FontAtlas (GraphicsDevice)│
//! │                        ↓                 │
//! │  map_string / measure  →  TextMesh       │
//! │                        ↓                 │
//! │  TextRenderer (VertexArray + Shader)     │
//! └──────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod gpu;

pub use error::{GfxError, Result};
pub use font::{Align, FontAtlas, FontCache, HAlign, Point, TextMesh, VAlign};
pub use gpu::{GlDevice, GraphicsDevice, MemoryDevice};
