//! Vertex array object
//!
//! A VAO paired with one VBO of tightly packed f32 attributes.
//! Layout `[2, 2]` means attribute 0 is a vec2 and attribute 1 a vec2,
//! stride 16 bytes.

use glow::HasContext;
use log::debug;

use super::buffer::BufferObject;
use crate::error::{GfxError, Result};

pub struct VertexArray {
    vao: glow::VertexArray,
    vbo: BufferObject,
    mode: u32,
    /// Floats per vertex
    vertex_floats: usize,
    attribs: u32,
}

/// Total floats per vertex and per-attribute float offsets
fn layout_offsets(layout: &[i32]) -> (usize, Vec<i32>) {
    let mut offsets = Vec::with_capacity(layout.len());
    let mut total = 0i32;
    for &size in layout {
        offsets.push(total);
        total += size;
    }
    (total as usize, offsets)
}

impl VertexArray {
    /// Create a VAO + VBO for `mode` (e.g. `glow::TRIANGLES`) and `layout`
    pub fn new(gl: &glow::Context, mode: u32, layout: &[i32]) -> Result<Self> {
        let (vertex_floats, offsets) = layout_offsets(layout);
        let stride = (vertex_floats * 4) as i32;
        let vbo = BufferObject::new(gl)?;

        let vao = unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| GfxError::device("create_vertex_array", e))?;
            gl.bind_vertex_array(Some(vao));
            vbo.bind(gl, glow::ARRAY_BUFFER);

            for (i, (&size, &offset)) in layout.iter().zip(&offsets).enumerate() {
                gl.vertex_attrib_pointer_f32(
                    i as u32,
                    size,
                    glow::FLOAT,
                    false,
                    stride,
                    offset * 4,
                );
            }

            gl.bind_vertex_array(None);
            vbo.unbind(gl, glow::ARRAY_BUFFER);
            vao
        };

        debug!("VAO created: layout {:?}, stride {}", layout, stride);
        Ok(Self {
            vao,
            vbo,
            mode,
            vertex_floats,
            attribs: layout.len() as u32,
        })
    }

    /// Replace the vertex data (`usage` e.g. `glow::DYNAMIC_DRAW`)
    pub fn load(&mut self, gl: &glow::Context, data: &[f32], usage: u32) -> Result<()> {
        if data.is_empty() {
            return Err(GfxError::EmptyVertexData);
        }
        self.vbo
            .buffer_data(gl, glow::ARRAY_BUFFER, bytemuck::cast_slice(data), usage);
        Ok(())
    }

    /// Number of vertices currently loaded
    pub fn vertex_count(&self) -> usize {
        if self.vertex_floats == 0 {
            return 0;
        }
        self.vbo.size_bytes() / (4 * self.vertex_floats)
    }

    /// Draw all loaded vertices
    pub fn draw(&self, gl: &glow::Context) {
        let count = self.vertex_count();
        if count == 0 {
            return;
        }
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            for i in 0..self.attribs {
                gl.enable_vertex_attrib_array(i);
            }
            gl.draw_arrays(self.mode, 0, count as i32);
            for i in 0..self.attribs {
                gl.disable_vertex_attrib_array(i);
            }
            gl.bind_vertex_array(None);
        }
    }

    /// Release resources
    pub fn destroy(&mut self, gl: &glow::Context) {
        unsafe { gl.delete_vertex_array(self.vao) };
        self.vbo.destroy(gl);
    }
}
