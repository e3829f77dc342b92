//! Graphics device abstraction and OpenGL ES object wrappers
//!
//! Handles:
//! - `GraphicsDevice` texture capability (in-memory and glow backends)
//! - Buffer, vertex array, shader program and framebuffer objects
//! - Text mesh rendering

pub mod buffer;
pub mod device;
pub mod fbo;
pub mod gl_device;
pub mod memory;
pub mod renderer;
pub mod shader;
pub mod vao;

pub use buffer::BufferObject;
pub use device::{FilterMode, GraphicsDevice, PixelFormat, Region, TextureDesc, TextureHandle};
pub use fbo::Framebuffer;
pub use gl_device::GlDevice;
pub use memory::{MemoryDevice, TextureInfo};
pub use renderer::TextRenderer;
pub use shader::{ortho_projection, ShaderProgram};
pub use vao::VertexArray;
